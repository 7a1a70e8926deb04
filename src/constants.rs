//! Tuning values for the simulation, the end-of-run overlay and the loop.
//!
//! All world coordinates live in a fixed 800x600 space; the renderer scales
//! them onto the terminal.

use std::time::Duration;

// ── World ───────────────────────────────────────────────────────────────────

pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;

// ── Avatar ──────────────────────────────────────────────────────────────────

pub const AVATAR_RADIUS: f32 = 20.0;
pub const AVATAR_START_X: f32 = 100.0;
pub const AVATAR_START_Y: f32 = 300.0;
pub const GRAVITY: f32 = 100.0;
/// Impulse velocity as a multiple of gravity (negative is up).
pub const IMPULSE_FACTOR: f32 = 0.5;

// ── Obstacles ───────────────────────────────────────────────────────────────

pub const PIPE_WIDTH: f32 = 50.0;
pub const PIPE_GAP: f32 = 250.0;
pub const MIN_PIPE_HEIGHT: f32 = 50.0;
pub const MAX_PIPE_HEIGHT: f32 = 300.0;
pub const PIPE_SPAWN_X: f32 = 800.0;
pub const PIPE_SPAWN_INTERVAL: f32 = 1.5;
pub const PIPE_SPEED: f32 = 100.0;

// ── Scoring ─────────────────────────────────────────────────────────────────

pub const START_SCORE: i32 = 20;

// ── Overlay ─────────────────────────────────────────────────────────────────

pub const SCORE_LABEL_X: f32 = 10.0;
pub const SCORE_LABEL_Y: f32 = 10.0;

pub const PANEL_X: f32 = 200.0;
pub const PANEL_Y: f32 = 200.0;
pub const PANEL_W: f32 = 400.0;
pub const PANEL_H: f32 = 200.0;
/// Panel opacity out of 255.
pub const PANEL_ALPHA: u8 = 150;

pub const RESTART_X: f32 = 300.0;
pub const RESTART_Y: f32 = 400.0;
pub const RESTART_W: f32 = 200.0;
pub const RESTART_H: f32 = 50.0;

// ── Loop ────────────────────────────────────────────────────────────────────

pub const FRAME_DURATION: Duration = Duration::from_millis(33); // ~30 fps
/// Longest step fed to the simulation; hitches beyond this are dropped.
pub const MAX_FRAME_DT: f32 = 0.1;

pub const FONT_PATH: &str = "assets/font.txt";
