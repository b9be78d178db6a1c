//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per frame, velocities in pixels per frame
//! - Seeded RNG only
//! - Stable iteration order (insertion order everywhere)
//! - No rendering, input or platform dependencies

pub mod collision;
pub mod effects;
pub mod entity;
pub mod level;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{BrickCollision, Side, WallCollision};
pub use effects::{DeferredAction, apply_deferred, apply_item};
pub use entity::{Ball, Bounds, Brick, BrickKind, EntityKind, Item, ItemKind, Paddle, Rect, Rgb};
pub use level::{Pattern, generate_level};
pub use scheduler::{ScheduledEvent, Scheduler};
pub use snapshot::{EntityView, Snapshot};
pub use state::{ActiveEffects, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, autopilot_input, tick};
