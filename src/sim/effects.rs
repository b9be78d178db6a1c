//! Item effects and their deferred reversals
//!
//! Timed effects never capture state in closures. Each one schedules a
//! [`DeferredAction`] describing how to undo itself, and the orchestrator
//! applies due actions through [`apply_deferred`].

use serde::{Deserialize, Serialize};

use super::entity::ItemKind;
use super::state::{GameEvent, GamePhase, GameState};
use crate::direction_from_vertical;

/// A deferred state change, queued on the session scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Return the paddle to the width it had before an extend
    RestorePaddleWidth { width: f32 },
    /// Multiply the speed of the listed balls that are still in play
    /// (reversal of slow/fast)
    ScaleBallSpeed { factor: f32, balls: Vec<u32> },
    /// Close the laser window if it has run out
    EndLaser,
    /// Leave `LevelCleared` for the next level
    AdvanceLevel,
}

/// Apply a caught item's effect
pub fn apply_item(state: &mut GameState, kind: ItemKind, now_ms: u64) {
    let durations = state.config.durations.clone();

    match kind {
        ItemKind::Extend => {
            let width = state.paddle.original_width;
            state.paddle.extend(state.config.extend_factor);
            state.scheduler.schedule(
                now_ms,
                durations.extend_ms,
                DeferredAction::RestorePaddleWidth { width },
            );
        }
        ItemKind::Slow => {
            let factor = state.config.slow_factor;
            scale_with_reversal(state, factor, durations.slow_ms, now_ms);
        }
        ItemKind::Fast => {
            let factor = state.config.fast_factor;
            scale_with_reversal(state, factor, durations.fast_ms, now_ms);
        }
        ItemKind::Multi => spawn_multi_balls(state),
        ItemKind::Life => {
            state.lives = state.lives.saturating_add(1);
        }
        ItemKind::Laser => {
            state.effects.laser_until = Some(now_ms.saturating_add(durations.laser_ms));
            state
                .scheduler
                .schedule(now_ms, durations.laser_ms, DeferredAction::EndLaser);
        }
        ItemKind::Warp => {
            state.phase = GamePhase::LevelCleared;
            state.events.push(GameEvent::LevelCleared);
            state.scheduler.schedule(
                now_ms,
                durations.warp_transition_ms,
                DeferredAction::AdvanceLevel,
            );
        }
    }

    log::info!("Item effect: {} (level {})", kind.as_str(), state.level);
}

/// Scale launched balls now and queue the inverse scale for those same balls
fn scale_with_reversal(state: &mut GameState, factor: f32, duration_ms: u64, now_ms: u64) {
    let mut balls = Vec::new();
    for ball in state.balls.iter_mut().filter(|b| b.launched) {
        ball.scale_speed(factor);
        balls.push(ball.id);
    }
    if balls.is_empty() {
        return;
    }
    state.scheduler.schedule(
        now_ms,
        duration_ms,
        DeferredAction::ScaleBallSpeed {
            factor: 1.0 / factor,
            balls,
        },
    );
}

/// Two extra launched balls fanned out from the first ball
fn spawn_multi_balls(state: &mut GameState) {
    if state.balls.len() >= state.config.max_balls {
        log::debug!("Multi-ball skipped: {} balls live", state.balls.len());
        return;
    }
    let Some(source) = state.balls.first() else {
        return;
    };

    // Riding balls have no speed of their own yet
    let inherits_speed = source.launched && source.speed() > 0.0;
    let speed = if inherits_speed {
        source.speed()
    } else {
        state.config.ball_launch_speed()
    };
    let source_id = source.id;
    let pos = source.pos;
    let spread = state.config.multi_ball_angle;

    let mut spawned = Vec::with_capacity(2);
    for angle in [-spread, spread] {
        let mut ball = state.make_ball(pos);
        ball.launch(direction_from_vertical(angle) * speed);
        spawned.push(ball.id);
        state.balls.push(ball);
    }

    // Clones carry the source's scaled speed, so they share its pending reversals
    if inherits_speed {
        for event in state.scheduler.pending_mut() {
            if let DeferredAction::ScaleBallSpeed { balls, .. } = &mut event.action
                && balls.contains(&source_id)
            {
                balls.extend_from_slice(&spawned);
            }
        }
    }
}

/// Apply a due deferred action; stale actions are skipped
pub fn apply_deferred(state: &mut GameState, action: DeferredAction, now_ms: u64) {
    match action {
        DeferredAction::RestorePaddleWidth { width } => {
            state.paddle.set_width(width);
            state.events.push(GameEvent::EffectExpired);
            log::debug!("Paddle width restored to {}", width);
        }
        DeferredAction::ScaleBallSpeed { factor, balls } => {
            let mut rescaled = 0;
            for ball in state.balls.iter_mut().filter(|b| balls.contains(&b.id)) {
                ball.scale_speed(factor);
                rescaled += 1;
            }
            if rescaled == 0 {
                log::debug!("Speed reversal skipped, affected balls are gone");
                return;
            }
            state.events.push(GameEvent::EffectExpired);
            log::debug!("Speed of {} balls scaled by {:.3}", rescaled, factor);
        }
        DeferredAction::EndLaser => match state.effects.laser_until {
            Some(until) if now_ms >= until => {
                state.effects.laser_until = None;
                state.events.push(GameEvent::EffectExpired);
                log::debug!("Laser ended");
            }
            // Re-collected laser pushed the window out
            Some(_) => log::debug!("Laser end skipped, window extended"),
            None => {}
        },
        DeferredAction::AdvanceLevel => {
            if state.phase == GamePhase::LevelCleared {
                state.advance_level();
            } else {
                log::warn!("Level advance skipped in phase {}", state.phase.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use glam::Vec2;

    fn playing_state() -> GameState {
        let mut state = GameState::new(Config::default());
        state.phase = GamePhase::Playing;
        let vel = state.launch_velocity();
        state.balls[0].launch(vel);
        state
    }

    fn drain(state: &mut GameState, now_ms: u64) {
        for action in state.scheduler.drain_due(now_ms) {
            apply_deferred(state, action, now_ms);
        }
    }

    #[test]
    fn test_extend_and_restore() {
        let mut state = playing_state();
        apply_item(&mut state, ItemKind::Extend, 1_000);
        assert_eq!(state.paddle.width, 150.0);

        drain(&mut state, 10_999);
        assert_eq!(state.paddle.width, 150.0);
        drain(&mut state, 11_000);
        assert_eq!(state.paddle.width, 100.0);
        assert!(state.events.contains(&GameEvent::EffectExpired));
    }

    #[test]
    fn test_slow_and_reverse() {
        let mut state = playing_state();
        let speed = state.balls[0].speed();
        apply_item(&mut state, ItemKind::Slow, 0);
        assert!((state.balls[0].speed() - speed * 0.7).abs() < 1e-4);

        drain(&mut state, 15_000);
        assert!((state.balls[0].speed() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_fast_reversal_clamped_then_restored() {
        let mut state = playing_state();
        state.balls[0].vel = Vec2::new(0.0, -11.0);
        apply_item(&mut state, ItemKind::Fast, 0);
        assert!((state.balls[0].speed() - 12.0).abs() < 1e-4);

        drain(&mut state, 15_000);
        assert!((state.balls[0].speed() - 12.0 / 1.3).abs() < 1e-3);
    }

    #[test]
    fn test_multi_spawns_two_fanned_balls() {
        let mut state = playing_state();
        let speed = state.balls[0].speed();
        let pos = state.balls[0].pos;
        apply_item(&mut state, ItemKind::Multi, 0);

        assert_eq!(state.balls.len(), 3);
        for ball in &state.balls[1..] {
            assert!(ball.launched);
            assert_eq!(ball.pos, pos);
            assert!((ball.speed() - speed).abs() < 1e-4);
            assert!(ball.vel.y < 0.0);
        }
        assert!(state.balls[1].vel.x < 0.0);
        assert!(state.balls[2].vel.x > 0.0);
    }

    #[test]
    fn test_multi_respects_ball_cap() {
        let mut state = playing_state();
        for _ in 0..4 {
            state.spawn_ball_attached();
        }
        apply_item(&mut state, ItemKind::Multi, 0);
        assert_eq!(state.balls.len(), 5);
    }

    #[test]
    fn test_life_adds_one() {
        let mut state = playing_state();
        apply_item(&mut state, ItemKind::Life, 0);
        assert_eq!(state.lives, 4);
    }

    #[test]
    fn test_laser_window_and_extension() {
        let mut state = playing_state();
        apply_item(&mut state, ItemKind::Laser, 0);
        assert_eq!(state.effects.laser_until, Some(10_000));

        apply_item(&mut state, ItemKind::Laser, 5_000);
        drain(&mut state, 10_000);
        assert_eq!(state.effects.laser_until, Some(15_000));
        drain(&mut state, 15_000);
        assert_eq!(state.effects.laser_until, None);
    }

    #[test]
    fn test_warp_advances_after_short_delay() {
        let mut state = playing_state();
        apply_item(&mut state, ItemKind::Warp, 2_000);
        assert_eq!(state.phase, GamePhase::LevelCleared);

        drain(&mut state, 2_999);
        assert_eq!(state.level, 1);
        drain(&mut state, 3_000);
        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_stale_advance_is_noop() {
        let mut state = playing_state();
        apply_deferred(&mut state, DeferredAction::AdvanceLevel, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_speed_reversal_skips_balls_it_never_scaled() {
        let mut state = playing_state();
        let vel = state.balls[0].vel;
        let action = DeferredAction::ScaleBallSpeed {
            factor: 2.0,
            balls: vec![99],
        };
        apply_deferred(&mut state, action, 0);
        assert_eq!(state.balls[0].vel, vel);
        assert!(!state.events.contains(&GameEvent::EffectExpired));
    }

    #[test]
    fn test_slow_with_only_riding_balls_schedules_nothing() {
        let mut state = GameState::new(Config::default());
        state.phase = GamePhase::Playing;
        apply_item(&mut state, ItemKind::Slow, 0);
        assert_eq!(state.balls[0].vel, Vec2::ZERO);
        assert!(state.scheduler.is_empty());
    }

    #[test]
    fn test_multi_clones_share_pending_reversal() {
        let mut state = playing_state();
        let speed = state.balls[0].speed();
        apply_item(&mut state, ItemKind::Slow, 0);
        apply_item(&mut state, ItemKind::Multi, 1_000);
        assert_eq!(state.balls.len(), 3);
        for ball in &state.balls {
            assert!((ball.speed() - speed * 0.7).abs() < 1e-4);
        }

        drain(&mut state, 15_000);
        for ball in &state.balls {
            assert!((ball.speed() - speed).abs() < 1e-3);
        }
    }
}
