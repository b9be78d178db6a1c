//! Read-only render feed
//!
//! A flat, serializable view of everything a renderer needs for one frame.
//! Inactive bricks and items are left out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Bounds, EntityKind, Rgb};
use super::state::{GamePhase, GameState};

const BALL_COLOR: Rgb = [255, 255, 255];
const PADDLE_COLOR: Rgb = [0, 255, 255];

/// One drawable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Rgb,
    /// Brick or item type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EntityView {
    fn from_entity<E: Bounds>(entity: &E, color: Rgb, label: Option<&str>) -> Self {
        let bounds = entity.bounds();
        Self {
            kind: entity.kind(),
            pos: bounds.min,
            size: bounds.size,
            color,
            label: label.map(str::to_owned),
        }
    }
}

/// Session status plus every active entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub level_progress: u32,
    pub laser_active: bool,
    pub high_score: Option<u64>,
    pub entities: Vec<EntityView>,
}

impl Snapshot {
    /// Capture the current frame; bricks first, then items, paddle and balls
    pub fn capture(state: &GameState) -> Self {
        let mut entities = Vec::with_capacity(
            state.bricks.len() + state.items.len() + state.balls.len() + 1,
        );

        entities.extend(
            state
                .bricks
                .iter()
                .filter(|b| b.is_active())
                .map(|b| EntityView::from_entity(b, b.color, Some(b.kind.as_str()))),
        );
        entities.extend(
            state
                .items
                .iter()
                .filter(|i| i.is_active())
                .map(|i| EntityView::from_entity(i, i.kind.color(), Some(i.kind.as_str()))),
        );
        entities.push(EntityView::from_entity(&state.paddle, PADDLE_COLOR, None));
        entities.extend(
            state
                .balls
                .iter()
                .map(|b| EntityView::from_entity(b, BALL_COLOR, None)),
        );

        Self {
            phase: state.phase,
            score: state.score,
            lives: state.lives,
            level: state.level,
            level_progress: state.level_progress(),
            laser_active: state.laser_active(),
            high_score: state.leaderboard.top_score(),
            entities,
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
