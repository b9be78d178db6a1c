//! Game session state
//!
//! `GameState` owns everything one session mutates: phase, score, entities,
//! the deferred action queue and the RNG. Subsystems borrow only the slices
//! they need.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::DeferredAction;
use super::entity::{Ball, Brick, Item, ItemKind, Paddle};
use super::level::generate_level;
use super::scheduler::Scheduler;
use crate::config::Config;
use crate::leaderboard::Leaderboard;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for the first launch
    Start,
    Playing,
    Paused,
    /// Field cleared, next level pending
    LevelCleared,
    /// Run ended (restart returns to Start)
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Start => "start",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::LevelCleared => "level_cleared",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// Things that happened during the last tick, for audio and UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PaddleHit,
    WallBounce,
    /// Brick struck but not destroyed
    BrickHit,
    BrickDestroyed { points: u32 },
    ItemSpawned(ItemKind),
    ItemCollected(ItemKind),
    BallLost,
    LifeLost,
    LevelCleared,
    LevelStarted(u32),
    GameOver,
    EffectExpired,
}

/// Timed effects that are flags rather than scheduled reversals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Clock time at which the laser window closes
    pub laser_until: Option<u64>,
}

impl ActiveEffects {
    pub fn laser_active(&self, now_ms: u64) -> bool {
        self.laser_until.is_some_and(|until| now_ms < until)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: Config,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// 1-based level index
    pub level: u32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub items: Vec<Item>,
    pub scheduler: Scheduler<DeferredAction>,
    pub effects: ActiveEffects,
    /// Cleared at the start of every tick
    pub events: Vec<GameEvent>,
    pub leaderboard: Leaderboard,
    pub quit_requested: bool,
    /// Ticks processed since construction
    pub frame: u64,
    /// Clock reading passed to the latest tick
    pub now_ms: u64,
    /// Id handed to the next ball; never reused within a session
    next_ball_id: u32,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// New session with the RNG seeded from `config.seed`
    pub fn new(config: Config) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }

    /// New session with an injected random source
    pub fn with_rng(config: Config, rng: Pcg32) -> Self {
        let paddle = Self::make_paddle(&config);
        let bricks = generate_level(1, &config);
        let lives = config.starting_lives.max(1);

        let mut state = Self {
            config,
            phase: GamePhase::Start,
            score: 0,
            lives,
            level: 1,
            paddle,
            balls: Vec::new(),
            bricks,
            items: Vec::new(),
            scheduler: Scheduler::new(),
            effects: ActiveEffects::default(),
            events: Vec::new(),
            leaderboard: Leaderboard::new(),
            quit_requested: false,
            frame: 0,
            now_ms: 0,
            next_ball_id: 0,
            rng,
        };
        state.spawn_ball_attached();
        state
    }

    fn make_paddle(config: &Config) -> Paddle {
        Paddle::new(
            Vec2::new((config.screen_width - config.paddle_width) / 2.0, config.paddle_y()),
            config.paddle_width,
            config.paddle_height,
            config.paddle_speed,
            config.screen_width,
        )
    }

    /// Unlaunched ball at `pos` carrying a fresh id
    pub fn make_ball(&mut self, pos: Vec2) -> Ball {
        let id = self.next_ball_id;
        self.next_ball_id = self.next_ball_id.wrapping_add(1);
        let radius = self.config.ball_radius;
        let ball = Ball::new(pos, Vec2::ZERO, radius, self.config.ball_max_speed);
        ball.with_id(id)
    }

    /// Spawn an unlaunched ball riding on the paddle
    pub fn spawn_ball_attached(&mut self) {
        let mut ball = self.make_ball(Vec2::ZERO);
        ball.attach_to(&self.paddle);
        self.balls.push(ball);
    }

    /// Launch velocity from the config
    pub fn launch_velocity(&self) -> Vec2 {
        Vec2::new(self.config.ball_speed_x, self.config.ball_speed_y)
    }

    /// Active bricks that still count toward clearing the level
    pub fn breakable_remaining(&self) -> usize {
        self.bricks.iter().filter(|b| b.active && b.is_breakable()).count()
    }

    /// Destroyed share of the level's breakable bricks, 0 to 100
    pub fn level_progress(&self) -> u32 {
        let total = self.bricks.iter().filter(|b| b.is_breakable()).count();
        if total == 0 {
            return 100;
        }
        let destroyed = total - self.breakable_remaining();
        (destroyed * 100 / total) as u32
    }

    pub fn laser_active(&self) -> bool {
        self.effects.laser_active(self.now_ms)
    }

    /// Start a fresh run; the leaderboard and RNG carry over
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.config.starting_lives.max(1);
        self.level = 1;
        self.paddle = Self::make_paddle(&self.config);
        self.bricks = generate_level(1, &self.config);
        self.balls.clear();
        self.spawn_ball_attached();
        self.items.clear();
        self.scheduler.clear();
        self.effects = ActiveEffects::default();
        self.phase = GamePhase::Start;
        log::info!("Session reset");
    }

    /// Move on to the next level and resume play
    pub fn advance_level(&mut self) {
        self.level += 1;
        self.bricks = generate_level(self.level, &self.config);
        self.paddle.reset_width();
        self.balls.clear();
        self.spawn_ball_attached();
        self.items.clear();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::LevelStarted(self.level));
        log::info!(
            "Level {} started ({} breakable bricks)",
            self.level,
            self.breakable_remaining()
        );
    }

    /// Record the final score and end the run
    pub fn enter_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver);
        let rank = self.leaderboard.add_score(self.score, self.level, self.now_ms);
        match rank {
            Some(rank) => log::info!(
                "Game over: score {} on level {} (rank {})",
                self.score,
                self.level,
                rank
            ),
            None => log::info!("Game over: score {} on level {}", self.score, self.level),
        }
    }
}
