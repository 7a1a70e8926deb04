//! A countdown Flappy Bird for the terminal.
//!
//! The avatar falls under gravity and jumps on Space. Pipes scroll in from the
//! right; each pair passed lowers the target score, and reaching zero wins the
//! run. Touching a pipe or leaving the screen loses it.

pub mod clock;
pub mod constants;
pub mod font;
pub mod game;
pub mod geometry;
pub mod input;
pub mod render;

pub use game::{GameState, RunState};
