//! Half-block terminal rendering of the world.
//!
//! The simulation works in an 800x600 world; [`Viewport`] scales it onto a
//! pixel grid where every terminal cell holds two vertical pixels.

use crate::constants::*;
use crate::font::Font;
use crate::game::{GameState, ObstaclePair, RunState, restart_button};
use crate::geometry::{Point, Rect};
use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    /// `over` composited on `self` with `alpha` out of 255.
    pub const fn blend(self, over: Rgb, alpha: u8) -> Rgb {
        Rgb::lerp(self, over, (alpha as u16 * 256) / 255)
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const PASSED_L: Rgb = Rgb(96, 104, 110);
const PASSED_M: Rgb = Rgb(128, 138, 146);
const PASSED_R: Rgb = Rgb(140, 150, 158);
const PASSED_HI: Rgb = Rgb(170, 180, 188);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const WHITE: Rgb = Rgb(255, 255, 255);
const BLACK: Rgb = Rgb(0, 0, 0);
const SUCCESS_GREEN: Rgb = Rgb(90, 230, 90);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Composites `c` over the existing pixels, clipped to the buffer.
    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb, alpha: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.w as i32);
        let y1 = (y + h).min(self.h as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                let under = self.get(px as usize, py as usize);
                self.set(px, py, under.blend(c, alpha));
            }
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(top.to_crossterm()))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── World to pixel mapping ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pw: usize,
    pub ph: usize,
}

impl Viewport {
    /// Viewport for a terminal of `cols` x `rows` cells.
    pub fn for_terminal(cols: u16, rows: u16) -> Self {
        Self {
            pw: cols as usize,
            ph: rows as usize * 2,
        }
    }

    fn sx(&self) -> f32 {
        self.pw as f32 / WINDOW_WIDTH
    }

    fn sy(&self) -> f32 {
        self.ph as f32 / WINDOW_HEIGHT
    }

    pub fn px_x(&self, x: f32) -> i32 {
        (x * self.sx()).round() as i32
    }

    pub fn px_y(&self, y: f32) -> i32 {
        (y * self.sy()).round() as i32
    }

    /// Pixel rectangle `(x, y, w, h)` covering a world rectangle.
    pub fn px_rect(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let x0 = self.px_x(r.x);
        let y0 = self.px_y(r.y);
        let x1 = self.px_x(r.right());
        let y1 = self.px_y(r.bottom());
        (x0, y0, x1 - x0, y1 - y0)
    }

    /// World coordinates of the centre of a terminal cell's lower pixel.
    pub fn cell_to_world(&self, column: u16, row: u16) -> Point {
        let px = column as f32 + 0.5;
        let py = row as f32 * 2.0 + 1.0;
        Point::new(px / self.sx(), py / self.sy())
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

pub fn draw_text(buf: &mut PixelBuf, font: &Font, x: i32, y: i32, text: &str, fg: Rgb, shadow: bool) {
    let (gw, advance) = (font.width() as i32, font.advance() as i32);
    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = font.glyph(ch) else {
            continue;
        };
        let gx = x + i as i32 * advance;
        for (j, _) in glyph.iter().enumerate().filter(|(_, on)| **on) {
            let px = gx + j as i32 % gw;
            let py = y + j as i32 / gw;
            if shadow {
                buf.set(px + 1, py + 1, SHADOW);
            }
            buf.set(px, py, fg);
        }
    }
}

fn draw_text_centered(buf: &mut PixelBuf, font: &Font, cx: i32, cy: i32, text: &str, fg: Rgb) {
    let x = cx - font.text_width(text) as i32 / 2;
    let y = cy - font.height() as i32 / 2;
    draw_text(buf, font, x, y, text, fg, false);
}

// ── Scene ───────────────────────────────────────────────────────────────────

pub struct Scene<'a> {
    pub font: &'a Font,
    pub viewport: Viewport,
}

impl Scene<'_> {
    pub fn draw(&self, state: &GameState, buf: &mut PixelBuf) {
        self.draw_sky(buf);
        for pair in &state.obstacles {
            self.draw_pair(buf, pair);
        }
        self.draw_avatar(buf, state);
        self.draw_score(buf, state.score);

        match state.run_state {
            RunState::Running => {}
            RunState::Lost => self.draw_end_panel(buf, "GAME OVER!", WHITE),
            RunState::Won => self.draw_end_panel(buf, "SUCCESS!", SUCCESS_GREEN),
        }
    }

    fn draw_sky(&self, buf: &mut PixelBuf) {
        let h = buf.height();
        for y in 0..h {
            let t = (y * 256 / h.max(1)) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..buf.width() {
                buf.set(x as i32, y as i32, c);
            }
        }
    }

    fn draw_pair(&self, buf: &mut PixelBuf, pair: &ObstaclePair) {
        for rect in [pair.upper(), pair.lower()] {
            let (x, y, w, h) = self.viewport.px_rect(&rect);
            for dx in 0..w {
                let c = pipe_shade(dx, w, pair.scored);
                for dy in 0..h {
                    buf.set(x + dx, y + dy, c);
                }
            }
        }
    }

    fn draw_avatar(&self, buf: &mut PixelBuf, state: &GameState) {
        let vp = &self.viewport;
        let center = state.avatar.center();
        let cx = center.x * vp.sx();
        let cy = center.y * vp.sy();
        let rx = (state.avatar.radius * vp.sx()).max(1.0);
        let ry = (state.avatar.radius * vp.sy()).max(1.0);

        let x0 = (cx - rx).floor() as i32;
        let x1 = (cx + rx).ceil() as i32;
        let y0 = (cy - ry).floor() as i32;
        let y1 = (cy + ry).ceil() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    let c = if ny < -0.4 { BIRD_HI } else { BIRD_Y };
                    buf.set(x, y, c);
                }
            }
        }

        // Eye, towards the direction of travel.
        let ex = (cx + rx * 0.4) as i32;
        let ey = (cy - ry * 0.3) as i32;
        buf.set(ex, ey, BIRD_EYE);
        if rx >= 2.0 {
            buf.set(ex + 1, ey, BIRD_PUPIL);
        }
    }

    fn draw_score(&self, buf: &mut PixelBuf, score: i32) {
        let x = self.viewport.px_x(SCORE_LABEL_X);
        let y = self.viewport.px_y(SCORE_LABEL_Y);
        let label = format!("TARGET SCORE: {score}");
        draw_text(buf, self.font, x, y, &label, WHITE, true);
    }

    fn draw_end_panel(&self, buf: &mut PixelBuf, title: &str, title_color: Rgb) {
        let vp = &self.viewport;
        let (px, py, pw, ph) = vp.px_rect(&Rect::new(PANEL_X, PANEL_Y, PANEL_W, PANEL_H));
        buf.blend_rect(px, py, pw, ph, BLACK, PANEL_ALPHA);

        let cx = vp.px_x(PANEL_X + PANEL_W / 2.0);
        draw_text_centered(buf, self.font, cx, vp.px_y(PANEL_Y + PANEL_H * 0.35), title, title_color);

        let button = restart_button();
        let (bx, by, bw, bh) = vp.px_rect(&button);
        buf.fill_rect(bx, by, bw.max(1), bh.max(1), WHITE);
        let bc = button.x + button.w / 2.0;
        let bm = button.y + button.h / 2.0;
        draw_text_centered(buf, self.font, vp.px_x(bc), vp.px_y(bm), "RESTART", BLACK);
    }
}

fn pipe_shade(x: i32, total_w: i32, scored: bool) -> Rgb {
    let (l, m, hi, r) = if scored {
        (PASSED_L, PASSED_M, PASSED_HI, PASSED_R)
    } else {
        (PIPE_L, PIPE_M, PIPE_HI, PIPE_R)
    };
    if total_w <= 1 {
        return m;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(l, m, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(m, hi, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(hi, r, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(r, l, ((t - 160) * 3).min(256))
    }
}
