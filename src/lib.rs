//! Brick Sim - A deterministic brick-breaker simulation engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, levels, scheduler, game state)
//! - `config`: Data-driven tunables injected at session construction
//! - `leaderboard`: In-memory high score table
//!
//! Rendering, input polling and asset loading live outside this crate. They talk
//! to the core through [`sim::TickInput`], [`sim::Snapshot`] and a millisecond clock.

pub mod config;
pub mod leaderboard;
pub mod sim;

pub use config::{Config, ConfigError, ItemDrop};
pub use leaderboard::Leaderboard;

use glam::Vec2;

/// Game configuration constants (defaults for [`Config`])
pub mod consts {
    /// Fixed simulation rate (one `tick` per frame)
    pub const FPS: u32 = 60;
    /// Nominal frame length fed to the scheduler clock by fixed-rate drivers
    pub const FRAME_MS: u64 = 1000 / FPS as u64;

    /// Screen dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    pub const PADDLE_BOTTOM_MARGIN: f32 = 20.0;

    /// Ball defaults (velocities in pixels per frame)
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_SPEED_X: f32 = 5.0;
    pub const BALL_SPEED_Y: f32 = -5.0;
    pub const BALL_MAX_SPEED: f32 = 12.0;

    /// Brick grid defaults
    pub const BRICK_WIDTH: f32 = 75.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_MARGIN: f32 = 5.0;
    pub const BRICK_ROWS: u32 = 5;
    pub const BRICK_COLS: u32 = 10;
    pub const BRICK_TOP_MARGIN: f32 = 100.0;

    /// Falling power-up items
    pub const ITEM_SIZE: f32 = 20.0;
    pub const ITEM_SPEED: f32 = 3.0;

    pub const STARTING_LIVES: u32 = 3;
}

/// Axis-aligned rectangle overlap (strict, touching edges do not overlap)
#[inline]
pub fn rects_overlap(a_min: Vec2, a_size: Vec2, b_min: Vec2, b_size: Vec2) -> bool {
    a_min.x < b_min.x + b_size.x
        && a_min.x + a_size.x > b_min.x
        && a_min.y < b_min.y + b_size.y
        && a_min.y + a_size.y > b_min.y
}

/// Unit direction for an angle measured from straight up (screen space, y down)
///
/// Positive angles lean right, negative lean left.
#[inline]
pub fn direction_from_vertical(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}
