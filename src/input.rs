//! Terminal events to game actions, and the edge trigger for the impulse key.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Edge trigger for the impulse key: one impulse per press, none while held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImpulseDebouncer {
    /// Key is up; the next press fires.
    #[default]
    Idle,
    /// Key is down; presses are swallowed until a release.
    Armed,
}

impl ImpulseDebouncer {
    /// Returns true when this press should produce an impulse.
    pub fn press(&mut self) -> bool {
        match self {
            ImpulseDebouncer::Idle => {
                *self = ImpulseDebouncer::Armed;
                true
            }
            ImpulseDebouncer::Armed => false,
        }
    }

    pub fn release(&mut self) {
        *self = ImpulseDebouncer::Idle;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ImpulsePress,
    ImpulseRelease,
    /// Left button down at a terminal cell.
    PointerPress { column: u16, row: u16 },
    Resize { cols: u16, rows: u16 },
    Quit,
}

/// Maps one terminal event to zero or more actions.
///
/// Terminals without the keyboard enhancement protocol never send key
/// releases, so with `reports_release` false every press is paired with a
/// synthetic release.
pub fn translate(event: &Event, reports_release: bool) -> Vec<Action> {
    match event {
        Event::Key(key) => translate_key(key, reports_release),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => vec![Action::PointerPress {
            column: *column,
            row: *row,
        }],
        Event::Resize(cols, rows) => vec![Action::Resize {
            cols: *cols,
            rows: *rows,
        }],
        _ => Vec::new(),
    }
}

fn translate_key(key: &KeyEvent, reports_release: bool) -> Vec<Action> {
    let is_quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
    if is_quit {
        return if key.kind == KeyEventKind::Press {
            vec![Action::Quit]
        } else {
            Vec::new()
        };
    }

    if !matches!(key.code, KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter) {
        return Vec::new();
    }
    match key.kind {
        KeyEventKind::Press if reports_release => vec![Action::ImpulsePress],
        KeyEventKind::Press => vec![Action::ImpulsePress, Action::ImpulseRelease],
        KeyEventKind::Release => vec![Action::ImpulseRelease],
        KeyEventKind::Repeat => Vec::new(),
    }
}
