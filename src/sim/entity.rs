//! Entity model: balls, paddle, bricks and falling items
//!
//! Plain records with the small amount of behavior each one owns. The shared
//! capability set (position, bounds, active flag) is the [`Bounds`] trait; the
//! [`EntityKind`] tag replaces a class hierarchy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::direction_from_vertical;

/// RGB color carried through to the render feed (decorative)
pub type Rgb = [u8; 3];

/// Kind tag for anything the renderer may draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Ball,
    Paddle,
    Brick,
    Item,
}

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap; rectangles that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        crate::rects_overlap(self.min, self.size, other.min, other.size)
    }

    /// Closest point inside the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }
}

/// Common geometry + render capability shared by all entities
pub trait Bounds {
    fn kind(&self) -> EntityKind;
    fn bounds(&self) -> Rect;
    fn is_active(&self) -> bool;

    fn overlaps<B: Bounds>(&self, other: &B) -> bool
    where
        Self: Sized,
    {
        self.is_active() && other.is_active() && self.bounds().overlaps(&other.bounds())
    }
}

/// A ball entity (position is the center)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Session-unique id, used to match deferred actions to the balls they touched
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub max_speed: f32,
    /// False while the ball rides on the paddle waiting for launch
    pub launched: bool,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, max_speed: f32) -> Self {
        Self {
            id: 0,
            pos,
            vel,
            radius: radius.abs(),
            max_speed,
            launched: false,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Keep an unlaunched ball centered on top of the paddle
    pub fn attach_to(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.pos.y - self.radius);
    }

    /// Release from the paddle with the given velocity
    pub fn launch(&mut self, vel: Vec2) {
        if !self.launched {
            self.vel = vel;
            self.launched = true;
            self.clamp_speed();
        }
    }

    /// Advance one frame (unlaunched balls do not move on their own)
    pub fn advance(&mut self) {
        if self.launched {
            self.pos += self.vel;
        }
    }

    /// Redirect at `angle_deg` from vertical, keeping the current speed
    pub fn set_direction(&mut self, angle_deg: f32) {
        self.vel = direction_from_vertical(angle_deg) * self.speed();
    }

    /// Multiply speed by `factor`, never exceeding `max_speed`
    pub fn scale_speed(&mut self, factor: f32) {
        self.vel *= factor;
        self.clamp_speed();
    }

    fn clamp_speed(&mut self) {
        self.vel = self.vel.clamp_length_max(self.max_speed);
    }

    #[inline]
    pub fn bounce_horizontal(&mut self) {
        self.vel.x = -self.vel.x;
    }

    #[inline]
    pub fn bounce_vertical(&mut self) {
        self.vel.y = -self.vel.y;
    }
}

impl Bounds for Ball {
    fn kind(&self) -> EntityKind {
        EntityKind::Ball
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.pos - Vec2::splat(self.radius),
            Vec2::splat(self.radius * 2.0),
        )
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// The player's paddle (position is the top-left corner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal pixels per frame
    pub speed: f32,
    pub screen_width: f32,
    /// Width the paddle returns to when effects expire
    pub original_width: f32,
}

impl Paddle {
    pub fn new(pos: Vec2, width: f32, height: f32, speed: f32, screen_width: f32) -> Self {
        let mut paddle = Self {
            pos,
            width,
            height,
            speed,
            screen_width,
            original_width: width,
        };
        paddle.clamp_to_screen();
        paddle
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Move by `direction` (-1 left, +1 right, 0 still) and clamp
    pub fn steer(&mut self, direction: f32) {
        self.pos.x += direction * self.speed;
        self.clamp_to_screen();
    }

    /// Keep x within [0, screen_width - width]
    pub fn clamp_to_screen(&mut self) {
        self.width = self.width.max(0.0).min(self.screen_width);
        self.pos.x = self.pos.x.clamp(0.0, (self.screen_width - self.width).max(0.0));
    }

    /// Widen by `factor`, capped at half the screen
    pub fn extend(&mut self, factor: f32) {
        self.set_width((self.width * factor).min(self.screen_width / 2.0));
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.clamp_to_screen();
    }

    pub fn reset_width(&mut self) {
        self.set_width(self.original_width);
    }
}

impl Bounds for Paddle {
    fn kind(&self) -> EntityKind {
        EntityKind::Paddle
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.pos, Vec2::new(self.width, self.height))
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickKind {
    #[default]
    Normal,
    Strong,
    /// Cannot be destroyed, doesn't count for level clear
    Unbreakable,
}

impl BrickKind {
    /// Hits needed to destroy; `None` means never
    pub fn hits_required(&self) -> Option<u32> {
        match self {
            BrickKind::Normal => Some(1),
            BrickKind::Strong => Some(2),
            BrickKind::Unbreakable => None,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            BrickKind::Normal => 10,
            BrickKind::Strong => 20,
            BrickKind::Unbreakable => 0,
        }
    }

    pub fn is_breakable(&self) -> bool {
        *self != BrickKind::Unbreakable
    }

    pub fn color(&self) -> Rgb {
        match self {
            BrickKind::Normal => [255, 0, 0],
            BrickKind::Strong => [255, 165, 0],
            BrickKind::Unbreakable => [150, 150, 150],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrickKind::Normal => "normal",
            BrickKind::Strong => "strong",
            BrickKind::Unbreakable => "unbreakable",
        }
    }
}

/// A brick entity (position is the top-left corner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: BrickKind,
    /// Hits taken so far
    pub hits: u32,
    pub points: u32,
    pub active: bool,
    pub color: Rgb,
}

impl Brick {
    pub fn new(pos: Vec2, size: Vec2, kind: BrickKind, color: Rgb) -> Self {
        Self {
            pos,
            size: size.abs(),
            kind,
            hits: 0,
            points: kind.points(),
            active: true,
            color,
        }
    }

    /// Apply one hit. Returns `(destroyed, points_earned)`.
    ///
    /// Inactive and unbreakable bricks are unaffected and yield `(false, 0)`.
    pub fn hit(&mut self) -> (bool, u32) {
        if !self.active {
            return (false, 0);
        }
        let Some(required) = self.kind.hits_required() else {
            return (false, 0);
        };

        self.hits += 1;
        if self.hits >= required {
            self.active = false;
            return (true, self.points);
        }

        // Damaged strong bricks darken
        self.color = self.color.map(|c| (c as f32 * 0.7) as u8);
        (false, 0)
    }

    #[inline]
    pub fn is_breakable(&self) -> bool {
        self.kind.is_breakable()
    }
}

impl Bounds for Brick {
    fn kind(&self) -> EntityKind {
        EntityKind::Brick
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Extend,
    Slow,
    Multi,
    Life,
    Laser,
    Fast,
    Warp,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Extend => "extend",
            ItemKind::Slow => "slow",
            ItemKind::Multi => "multi",
            ItemKind::Life => "life",
            ItemKind::Laser => "laser",
            ItemKind::Fast => "fast",
            ItemKind::Warp => "warp",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            ItemKind::Extend => [0, 255, 0],
            ItemKind::Slow => [0, 0, 255],
            ItemKind::Multi => [255, 255, 0],
            ItemKind::Life => [255, 0, 0],
            ItemKind::Laser => [128, 0, 128],
            ItemKind::Fast => [255, 165, 0],
            ItemKind::Warp => [0, 255, 255],
        }
    }
}

/// A falling power-up (position is the top-left corner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub pos: Vec2,
    pub size: f32,
    pub kind: ItemKind,
    /// Downward pixels per frame
    pub fall_speed: f32,
    pub active: bool,
}

impl Item {
    /// Spawn centered horizontally on a destroyed brick, at its top edge
    pub fn from_brick(brick: &Brick, kind: ItemKind, size: f32, fall_speed: f32) -> Self {
        Self {
            pos: Vec2::new(brick.pos.x + brick.size.x / 2.0 - size / 2.0, brick.pos.y),
            size,
            kind,
            fall_speed: fall_speed.abs(),
            active: true,
        }
    }

    pub fn fall(&mut self) {
        if self.active {
            self.pos.y += self.fall_speed;
        }
    }

    pub fn is_below(&self, screen_height: f32) -> bool {
        self.pos.y > screen_height
    }

    /// Take the item's effect; only the first call yields it
    pub fn collect(&mut self) -> Option<ItemKind> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.kind)
    }
}

impl Bounds for Item {
    fn kind(&self) -> EntityKind {
        EntityKind::Item
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.pos, Vec2::splat(self.size))
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
