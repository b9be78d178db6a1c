//! Game tunables
//!
//! A static set of values injected at session construction. Loaded from JSON or
//! taken from the defaults; the simulation never mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::ItemKind;

/// Errors raised while loading or validating a [`Config`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Drop probability for one item type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub kind: ItemKind,
    pub probability: f32,
}

/// Per-effect durations in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDurations {
    pub extend_ms: u64,
    pub slow_ms: u64,
    pub fast_ms: u64,
    pub laser_ms: u64,
    /// Delay between clearing a level and the next one starting
    pub level_transition_ms: u64,
    /// Shorter transition used by the warp item
    pub warp_transition_ms: u64,
}

impl Default for EffectDurations {
    fn default() -> Self {
        Self {
            extend_ms: 10_000,
            slow_ms: 15_000,
            fast_ms: 15_000,
            laser_ms: 10_000,
            level_transition_ms: 3_000,
            warp_transition_ms: 1_000,
        }
    }
}

/// Complete set of simulation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for item drops and randomized level patterns
    pub seed: u64,

    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub paddle_bottom_margin: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_speed_x: f32,
    pub ball_speed_y: f32,
    pub ball_max_speed: f32,

    // === Brick grid ===
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_margin: f32,
    pub brick_rows: u32,
    pub brick_cols: u32,
    pub brick_top_margin: f32,

    // === Items ===
    pub item_size: f32,
    pub item_speed: f32,
    /// Chance that a destroyed breakable brick rolls for an item at all
    pub brick_drop_chance: f32,
    pub item_drops: Vec<ItemDrop>,

    // === Effects ===
    pub extend_factor: f32,
    pub slow_factor: f32,
    pub fast_factor: f32,
    /// Multi-ball only fires while fewer balls than this are live
    pub max_balls: usize,
    /// Spread of the extra balls from vertical, in degrees
    pub multi_ball_angle: f32,
    pub durations: EffectDurations,

    // === Session ===
    pub starting_lives: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0x5EED,

            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            paddle_bottom_margin: PADDLE_BOTTOM_MARGIN,

            ball_radius: BALL_RADIUS,
            ball_speed_x: BALL_SPEED_X,
            ball_speed_y: BALL_SPEED_Y,
            ball_max_speed: BALL_MAX_SPEED,

            brick_width: BRICK_WIDTH,
            brick_height: BRICK_HEIGHT,
            brick_margin: BRICK_MARGIN,
            brick_rows: BRICK_ROWS,
            brick_cols: BRICK_COLS,
            brick_top_margin: BRICK_TOP_MARGIN,

            item_size: ITEM_SIZE,
            item_speed: ITEM_SPEED,
            brick_drop_chance: 0.2,
            item_drops: vec![
                ItemDrop {
                    kind: ItemKind::Extend,
                    probability: 0.1,
                },
                ItemDrop {
                    kind: ItemKind::Slow,
                    probability: 0.1,
                },
                ItemDrop {
                    kind: ItemKind::Multi,
                    probability: 0.05,
                },
                ItemDrop {
                    kind: ItemKind::Life,
                    probability: 0.03,
                },
                ItemDrop {
                    kind: ItemKind::Laser,
                    probability: 0.05,
                },
                ItemDrop {
                    kind: ItemKind::Fast,
                    probability: 0.05,
                },
                ItemDrop {
                    kind: ItemKind::Warp,
                    probability: 0.02,
                },
            ],

            extend_factor: 1.5,
            slow_factor: 0.7,
            fast_factor: 1.3,
            max_balls: 5,
            multi_ball_angle: 30.0,
            durations: EffectDurations::default(),

            starting_lives: STARTING_LIVES,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot clamp its way out of
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("ball_radius", self.ball_radius),
            ("ball_max_speed", self.ball_max_speed),
            ("brick_width", self.brick_width),
            ("brick_height", self.brick_height),
            ("item_size", self.item_size),
            ("extend_factor", self.extend_factor),
            ("slow_factor", self.slow_factor),
            ("fast_factor", self.fast_factor),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid("starting_lives must be at least 1".into()));
        }

        if self.paddle_width > self.screen_width {
            return Err(ConfigError::Invalid(format!(
                "paddle_width {} exceeds screen_width {}",
                self.paddle_width, self.screen_width
            )));
        }

        let probabilities = std::iter::once(("brick_drop_chance", self.brick_drop_chance))
            .chain(self.item_drops.iter().map(|d| (d.kind.as_str(), d.probability)));
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "probability for {name} must be within [0, 1], got {p}"
                )));
            }
        }

        Ok(())
    }

    /// Paddle top edge, fixed for the whole session
    pub fn paddle_y(&self) -> f32 {
        self.screen_height - self.paddle_bottom_margin - self.paddle_height
    }

    /// Launch speed magnitude
    pub fn ball_launch_speed(&self) -> f32 {
        glam::Vec2::new(self.ball_speed_x, self.ball_speed_y).length()
    }
}
