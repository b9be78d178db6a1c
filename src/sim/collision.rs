//! Collision detection and response
//!
//! Ball against walls, paddle and bricks, plus item against paddle. Everything
//! is axis-aligned: circles and rectangles only. Each function mutates just the
//! entities it is handed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Ball, Bounds, Brick, Item, Paddle, Rect};

/// Maximum paddle deflection from vertical, in degrees
pub const MAX_BOUNCE_ANGLE: f32 = 60.0;

/// Outcome of a wall check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallCollision {
    None,
    Bounced,
    /// Leading edge crossed the bottom bound; the ball should be removed
    Lost,
}

/// Side of a rectangle a ball struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Result of resolving a ball against the brick field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrickCollision {
    /// Number of bricks hit (0 or 1)
    pub hits: u32,
    pub points: u32,
    /// Index of the brick destroyed by this hit
    pub destroyed: Option<usize>,
    pub side: Option<Side>,
}

impl BrickCollision {
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Check ball against the left, right and top walls and the bottom bound
///
/// Side and top contacts reflect the matching velocity component and clamp the
/// ball back inside. A ball whose bottom edge reaches `height` is reported lost.
pub fn wall_collision(ball: &mut Ball, width: f32, height: f32) -> WallCollision {
    let r = ball.radius;
    let mut result = WallCollision::None;

    if ball.pos.x - r <= 0.0 {
        ball.pos.x = r;
        ball.vel.x = ball.vel.x.abs();
        result = WallCollision::Bounced;
    } else if ball.pos.x + r >= width {
        ball.pos.x = width - r;
        ball.vel.x = -ball.vel.x.abs();
        result = WallCollision::Bounced;
    }

    if ball.pos.y - r <= 0.0 {
        ball.pos.y = r;
        ball.vel.y = ball.vel.y.abs();
        result = WallCollision::Bounced;
    }

    if ball.pos.y + r >= height {
        return WallCollision::Lost;
    }

    result
}

/// Signed hit position on the paddle: -1 at the left edge, 0 center, 1 right edge
#[inline]
pub fn paddle_hit_ratio(ball_x: f32, paddle: &Paddle) -> f32 {
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball_x - paddle.center_x()) / half).clamp(-1.0, 1.0)
}

/// Map a hit ratio to a bounce angle from vertical
#[inline]
pub fn paddle_bounce_angle(ratio: f32) -> f32 {
    ratio.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE
}

/// Check and resolve ball against paddle
///
/// On contact the ball leaves at an angle set by where it struck, keeps its
/// speed, always heads upward and sits flush on the paddle top.
pub fn paddle_collision(ball: &mut Ball, paddle: &Paddle) -> bool {
    // Broad phase
    let p_left = paddle.pos.x;
    let p_right = paddle.pos.x + paddle.width;
    if ball.pos.y + ball.radius < paddle.pos.y || ball.pos.x < p_left || ball.pos.x > p_right {
        return false;
    }

    if !ball.bounds().overlaps(&paddle.bounds()) {
        return false;
    }

    let angle = paddle_bounce_angle(paddle_hit_ratio(ball.pos.x, paddle));
    ball.set_direction(angle);
    if ball.vel.y > 0.0 {
        ball.vel.y = -ball.vel.y;
    }
    ball.pos.y = paddle.pos.y - ball.radius;

    true
}

/// Circle vs rectangle via the closest point on the rectangle
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Side of `rect` nearest to `center`; ties resolve left, right, top, bottom
pub fn collision_side(center: Vec2, rect: &Rect) -> Side {
    let max = rect.max();
    let candidates = [
        (Side::Left, (center.x - rect.min.x).abs()),
        (Side::Right, (center.x - max.x).abs()),
        (Side::Top, (center.y - rect.min.y).abs()),
        (Side::Bottom, (center.y - max.y).abs()),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1 < best.1 {
            best = *candidate;
        }
    }
    best.0
}

/// Check and resolve ball against the brick field
///
/// Walks active bricks in order and resolves only the first one touched, so a
/// ball bounces off at most one brick per frame.
pub fn brick_collision(ball: &mut Ball, bricks: &mut [Brick]) -> BrickCollision {
    for (index, brick) in bricks.iter_mut().enumerate() {
        if !brick.active {
            continue;
        }

        let rect = brick.bounds();
        if !circle_rect_overlap(ball.pos, ball.radius, &rect) {
            continue;
        }

        let (destroyed, points) = brick.hit();
        let side = collision_side(ball.pos, &rect);
        match side {
            Side::Top | Side::Bottom => ball.bounce_vertical(),
            Side::Left | Side::Right => ball.bounce_horizontal(),
        }

        return BrickCollision {
            hits: 1,
            points,
            destroyed: destroyed.then_some(index),
            side: Some(side),
        };
    }

    BrickCollision::miss()
}

/// Item against paddle (rectangle overlap)
#[inline]
pub fn item_paddle_collision(item: &Item, paddle: &Paddle) -> bool {
    item.overlaps(paddle)
}
