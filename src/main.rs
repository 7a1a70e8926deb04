use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use flappy_countdown::clock::FrameClock;
use flappy_countdown::constants::{FONT_PATH, FRAME_DURATION, MAX_FRAME_DT};
use flappy_countdown::font::Font;
use flappy_countdown::game::{self, GameState};
use flappy_countdown::input::{self, Action, ImpulseDebouncer};
use flappy_countdown::render::{PixelBuf, Scene, Viewport};
use log::{debug, info, warn};
use std::io::{self, Stdout, Write, stdout};
use std::time::{Duration, Instant};

// ── Terminal ────────────────────────────────────────────────────────────────

fn enter(out: &mut Stdout, reports_release: bool) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;
    if reports_release {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(())
}

fn leave(out: &mut Stdout, reports_release: bool) -> io::Result<()> {
    if reports_release {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

// ── Loop ────────────────────────────────────────────────────────────────────

fn run(out: &mut Stdout, font: &Font, reports_release: bool) -> Result<()> {
    let (cols, rows) = terminal::size().context("querying terminal size")?;
    let mut viewport = Viewport::for_terminal(cols, rows);
    let mut buf = PixelBuf::new(viewport.pw, viewport.ph);

    let mut state = GameState::new();
    let mut debouncer = ImpulseDebouncer::default();
    let mut rng = rand::thread_rng();
    let mut clock = FrameClock::new(MAX_FRAME_DT);

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            for action in input::translate(&ev, reports_release) {
                match action {
                    Action::Quit => return Ok(()),
                    Action::ImpulsePress => {
                        if debouncer.press() {
                            game::impulse(&mut state);
                        }
                    }
                    Action::ImpulseRelease => debouncer.release(),
                    Action::PointerPress { column, row } => {
                        let point = viewport.cell_to_world(column, row);
                        if !game::try_restart_at(&mut state, point) {
                            debug!("click at ({:.0}, {:.0}) ignored", point.x, point.y);
                        }
                    }
                    Action::Resize { cols, rows } => {
                        viewport = Viewport::for_terminal(cols, rows);
                        buf.resize(viewport.pw, viewport.ph);
                    }
                }
            }
        }

        // Update
        game::update(&mut state, clock.tick(), &mut rng);

        // Render
        let scene = Scene { font, viewport };
        scene.draw(&state, &mut buf);
        buf.render(out).context("drawing frame")?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Loaded before the alternate screen so a failure stays visible.
    let font = Font::load_or_empty(FONT_PATH);

    let reports_release = terminal::supports_keyboard_enhancement().unwrap_or_else(|e| {
        warn!("cannot query keyboard enhancement support: {e}");
        false
    });
    if !reports_release {
        info!("terminal does not report key releases, every press counts as a tap");
    }

    let mut out = stdout();
    enter(&mut out, reports_release).context("setting up terminal")?;
    let result = run(&mut out, &font, reports_release);
    leave(&mut out, reports_release).context("restoring terminal")?;
    out.flush()?;
    result
}
