//! Procedural brick layouts
//!
//! `generate_level` is a pure function of the level index and the config. Any
//! randomness comes from an RNG seeded with both, so regenerating a level (reset,
//! replays) always yields the same field.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Brick, BrickKind, Rgb};
use crate::config::Config;

/// Row palette for the standard pattern
const ROW_COLORS: [Rgb; 5] = [
    [255, 0, 0],
    [255, 165, 0],
    [255, 255, 0],
    [0, 255, 0],
    [0, 0, 255],
];

const CHECKER_COLORS: [Rgb; 2] = [[0, 128, 255], [255, 0, 128]];

const PYRAMID_MAX_ROWS: u32 = 6;
const CHECKER_MAX_ROWS: u32 = 8;
const FORTRESS_ROWS: u32 = 8;

/// Mixed pattern template: `N` normal, `S` strong, `U` unbreakable, `-` empty
const MIXED_TEMPLATE: [&str; 6] = [
    "NNNNNNNNNN",
    "N--N--N--N",
    "NNNNNNNNNN",
    "N-NN--NN-N",
    "N--NNNN--N",
    "NNNNNNNNNN",
];
/// Replaces template row 1 on later levels
const MIXED_WALLED_ROW: &str = "N-UN-UN-UN";

/// Layout algorithms, cycled through by level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    Standard,
    Pyramid,
    Checkerboard,
    Mixed,
    Fortress,
}

impl Pattern {
    /// Pattern for a 1-based level index
    pub fn for_level(level: u32) -> Self {
        match level.saturating_sub(1) % 5 {
            0 => Pattern::Standard,
            1 => Pattern::Pyramid,
            2 => Pattern::Checkerboard,
            3 => Pattern::Mixed,
            _ => Pattern::Fortress,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Standard => "standard",
            Pattern::Pyramid => "pyramid",
            Pattern::Checkerboard => "checkerboard",
            Pattern::Mixed => "mixed",
            Pattern::Fortress => "fortress",
        }
    }
}

/// Top-left corner of the brick at (row, col)
#[inline]
pub fn brick_position(row: u32, col: u32, config: &Config) -> Vec2 {
    Vec2::new(
        col as f32 * (config.brick_width + config.brick_margin) + config.brick_margin,
        row as f32 * (config.brick_height + config.brick_margin) + config.brick_top_margin,
    )
}

/// RNG for a level's randomized cells, mixed from the session seed and level
pub fn level_rng(level: u32, seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed.wrapping_add((level as u64).wrapping_mul(2654435761)))
}

/// Build the brick field for a 1-based level index
pub fn generate_level(level: u32, config: &Config) -> Vec<Brick> {
    let pattern = Pattern::for_level(level);
    let mut rng = level_rng(level, config.seed);

    let bricks = match pattern {
        Pattern::Standard => standard(level, config),
        Pattern::Pyramid => pyramid(config),
        Pattern::Checkerboard => checkerboard(level, config, &mut rng),
        Pattern::Mixed => mixed(level, config, &mut rng),
        Pattern::Fortress => fortress(config, &mut rng),
    };

    log::debug!(
        "Level {} pattern {}: {} bricks ({} breakable)",
        level,
        pattern.as_str(),
        bricks.len(),
        bricks.iter().filter(|b| b.is_breakable()).count()
    );
    bricks
}

fn make_brick(row: u32, col: u32, kind: BrickKind, color: Rgb, config: &Config) -> Brick {
    Brick::new(
        brick_position(row, col, config),
        Vec2::new(config.brick_width, config.brick_height),
        kind,
        color,
    )
}

/// Full grid; rows grow with level, top row turns strong after level 3
fn standard(level: u32, config: &Config) -> Vec<Brick> {
    let rows = config.brick_rows.min(5 + level / 3);
    let mut bricks = Vec::with_capacity((rows * config.brick_cols) as usize);

    for row in 0..rows {
        for col in 0..config.brick_cols {
            let brick = if level > 3 && row == 0 {
                make_brick(row, col, BrickKind::Strong, BrickKind::Strong.color(), config)
            } else {
                let color = ROW_COLORS[row as usize % ROW_COLORS.len()];
                make_brick(row, col, BrickKind::Normal, color, config)
            };
            bricks.push(brick);
        }
    }
    bricks
}

/// Triangle with its apex on top: each row is two bricks wider than the one above
fn pyramid(config: &Config) -> Vec<Brick> {
    let cols = config.brick_cols;
    let rows = PYRAMID_MAX_ROWS.min(cols.div_ceil(2));
    let mut bricks = Vec::new();

    for row in 0..rows {
        let width = cols - 2 * (rows - 1 - row);
        let start = (cols - width) / 2;
        let end = start + width - 1;

        for col in start..=end {
            let brick = if row == 0 && (col == start || col == end) {
                make_brick(row, col, BrickKind::Strong, BrickKind::Strong.color(), config)
            } else {
                let red = 255u32.saturating_sub(row * 50) as u8;
                let blue = (row * 50).min(255) as u8;
                make_brick(row, col, BrickKind::Normal, [red, 0, blue], config)
            };
            bricks.push(brick);
        }
    }
    bricks
}

/// Every other cell; some cells turn strong after level 5
fn checkerboard(level: u32, config: &Config, rng: &mut Pcg32) -> Vec<Brick> {
    let rows = CHECKER_MAX_ROWS.min(5 + level / 2);
    let mut bricks = Vec::new();

    for row in 0..rows {
        for col in 0..config.brick_cols {
            if (row + col) % 2 == 0 {
                continue;
            }
            let brick = if level > 5 && rng.random::<f32>() < 0.2 {
                make_brick(row, col, BrickKind::Strong, BrickKind::Strong.color(), config)
            } else {
                let color = CHECKER_COLORS[((row + col) % 2) as usize];
                make_brick(row, col, BrickKind::Normal, color, config)
            };
            bricks.push(brick);
        }
    }
    bricks
}

/// Template cell code to brick kind; `None` leaves the cell empty
///
/// Codes other than the known ones fall back to a normal brick.
fn template_cell(code: char) -> Option<BrickKind> {
    match code {
        '-' => None,
        'U' => Some(BrickKind::Unbreakable),
        'S' => Some(BrickKind::Strong),
        'N' => Some(BrickKind::Normal),
        other => {
            log::warn!("Unknown template cell '{}', using a normal brick", other);
            Some(BrickKind::Normal)
        }
    }
}

/// Fixed template, walled on later levels, with strong upgrades after level 8
fn mixed(level: u32, config: &Config, rng: &mut Pcg32) -> Vec<Brick> {
    let mut bricks = Vec::new();

    for (row, line) in MIXED_TEMPLATE.iter().enumerate() {
        let line = if row == 1 && level > 6 { MIXED_WALLED_ROW } else { *line };
        let row = row as u32;

        for (col, code) in line.chars().take(config.brick_cols as usize).enumerate() {
            let col = col as u32;
            let Some(kind) = template_cell(code) else {
                continue;
            };

            let brick = match kind {
                BrickKind::Unbreakable | BrickKind::Strong => {
                    make_brick(row, col, kind, kind.color(), config)
                }
                BrickKind::Normal if level > 8 && rng.random::<f32>() < 0.3 => {
                    make_brick(row, col, BrickKind::Strong, BrickKind::Strong.color(), config)
                }
                BrickKind::Normal => {
                    let hue = (row * 30 + col * 20) % 360;
                    make_brick(row, col, kind, hue_color(hue), config)
                }
            };
            bricks.push(brick);
        }
    }
    bricks
}

/// Unbreakable outer ring around a randomized interior
fn fortress(config: &Config, rng: &mut Pcg32) -> Vec<Brick> {
    let rows = FORTRESS_ROWS;
    let cols = config.brick_cols;
    let mut bricks = Vec::with_capacity((rows * cols) as usize);

    for row in 0..rows {
        for col in 0..cols {
            let on_wall = row == 0 || row == rows - 1 || col == 0 || col + 1 == cols;
            let kind = if on_wall {
                BrickKind::Unbreakable
            } else if rng.random::<f32>() < 0.3 {
                BrickKind::Strong
            } else {
                BrickKind::Normal
            };
            bricks.push(make_brick(row, col, kind, kind.color(), config));
        }
    }
    bricks
}

/// Fully saturated color for a hue in degrees
fn hue_color(hue: u32) -> Rgb {
    let hue = hue % 360;
    let ramp = |t: u32| (255 * t / 60) as u8;
    match hue {
        0..60 => [255, ramp(hue), 0],
        60..120 => [ramp(120 - hue), 255, 0],
        120..180 => [0, 255, ramp(hue - 120)],
        180..240 => [0, ramp(240 - hue), 255],
        240..300 => [ramp(hue - 240), 0, 255],
        _ => [255, 0, ramp(360 - hue)],
    }
}
