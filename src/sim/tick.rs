//! Per-frame simulation step
//!
//! Core game loop that advances the run by one clamped frame step.

use glam::Vec2;
use rand::Rng;

use super::collision::{self, ObstacleOutcome};
use super::particles::{self, COLOR_REWARD};
use super::player::sanitize_axis;
use super::state::{GameEvent, GameMode, RunState, RunSummary};
use super::{boss, spawner};
use crate::consts::*;

/// Axis magnitude above which a dash follows the held direction
const DASH_AXIS_THRESHOLD: f32 = 0.01;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Combined horizontal axis in [-1, 1] (held keys + touch impulse)
    pub axis: f32,
    /// Start a run (title or game-over screen)
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Trigger the dash ability
    pub ability: bool,
}

/// Advance the run state by one frame of `dt` seconds.
///
/// Survive time and score accumulate the full-precision step; entity motion
/// and timers run on `f32`.
pub fn tick<R: Rng + ?Sized>(state: &mut RunState, input: &TickInput, dt: f64, rng: &mut R) {
    let step = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
    let dt = step as f32;

    // Shake keeps fading on the game-over screen
    state.shake.time = (state.shake.time - dt).max(0.0);

    if input.start && matches!(state.mode, GameMode::Start | GameMode::GameOver) {
        start_run(state, rng);
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.mode {
            GameMode::Playing => {
                state.mode = GameMode::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GameMode::Paused => {
                state.mode = GameMode::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if state.mode != GameMode::Playing {
        return;
    }

    if input.ability {
        activate_ability(state, input.axis);
    }

    state.survive_time += step;
    state.score += step * SCORE_PER_SECOND;
    state.update_difficulty();

    collision::decay_combo(state, dt);
    state.magnet_time = (state.magnet_time - dt).max(0.0);
    state.ability_active_time = (state.ability_active_time - dt).max(0.0);
    state.ability_cooldown = (state.ability_cooldown - dt).max(0.0);

    // The player keeps full-speed controls during slow motion
    let world_dt = dt * state.world_time_scale();

    if let Some(dir) = state.player.integrate(input.axis, dt) {
        state.last_move_dir = dir;
    }

    spawner::update(state, rng, dt);
    boss::update(state, rng, dt);

    if collision::update_obstacles(state, rng, world_dt) == ObstacleOutcome::Hit {
        end_run(state);
        return;
    }
    collision::update_collectibles(state, rng, world_dt);
    particles::update(&mut state.particles, dt);

    check_challenge(state, rng);

    state.high_score = state.high_score.max(state.display_score());
    state.clamp_invariants();
}

/// Reset the run and enter Playing
pub fn start_run<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R) {
    state.reset(rng);
    state.mode = GameMode::Playing;
    state.events.push(GameEvent::RunStarted);
    log::info!(
        "Run started (high score {}, challenge: {})",
        state.high_score,
        state.challenge.kind.id()
    );
}

/// Dash: velocity impulse plus world slow-motion, gated by cooldown
pub fn activate_ability(state: &mut RunState, axis: f32) -> bool {
    if state.mode != GameMode::Playing || !state.ability_ready() {
        return false;
    }

    let axis = sanitize_axis(axis);
    let dir = if axis.abs() > DASH_AXIS_THRESHOLD {
        axis.signum()
    } else {
        state.last_move_dir
    };

    state.player.vx += dir * DASH_IMPULSE;
    state.ability_active_time = ABILITY_DURATION;
    state.ability_cooldown = ABILITY_COOLDOWN;
    state.events.push(GameEvent::AbilityUsed);
    true
}

/// Terminal transition after an unshielded hit
fn end_run(state: &mut RunState) {
    state.mode = GameMode::GameOver;
    state.shake.time = SHAKE_DURATION;
    state.shake.magnitude = SHAKE_MAGNITUDE;

    let score = state.display_score();
    let new_high = score > state.best_before_run;
    state.high_score = state.high_score.max(score);

    state.summary = Some(RunSummary {
        score,
        high_score: state.high_score,
        coins: state.coins,
        new_high,
        bonus_text: state.bonus_text.clone(),
    });
    state.events.push(GameEvent::GameOver {
        score,
        coins: state.coins,
    });
    log::info!(
        "Run ended: score {} (level {}, {} dodges, {} coins){}",
        score,
        state.level,
        state.dodges,
        state.coins,
        if new_high { " - new high score!" } else { "" }
    );
}

/// Update daily challenge progress and pay the reward on first completion
fn check_challenge<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R) {
    let stats = state.run_stats();
    if !state.challenge.update(stats) {
        return;
    }

    let kind = state.challenge.kind;
    state.score += f64::from(kind.reward_score());
    state.coins += kind.reward_coins();
    state.bonus_text = Some(state.challenge.bonus_text());

    let p = state.player.rect;
    particles::emit(
        state,
        rng,
        Vec2::new(p.center().x, p.y),
        COLOR_REWARD,
        12,
    );
    state.events.push(GameEvent::ChallengeComplete {
        date_key: state.challenge.date_key.clone(),
    });
    log::info!("Daily challenge '{}' complete", kind.id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::DailyChallenge;
    use crate::sim::rect::Rect;
    use crate::sim::state::{CollectibleKind, Obstacle};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f64 = 1.0 / 30.0;

    fn playing_state(date: &str) -> (RunState, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut state = RunState::new(DailyChallenge::for_date(date, None), 0, &mut rng);
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT, &mut rng);
        (state, rng)
    }

    fn obstacle_on_player(state: &RunState) -> Obstacle {
        let p = state.player.rect;
        Obstacle {
            rect: Rect::new(p.x - 2.0, p.y - 2.0, p.width + 4.0, p.height + 4.0),
            speed: 0.0,
            vx: 0.0,
            scored: false,
            boss: false,
        }
    }

    #[test]
    fn test_start_to_playing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = RunState::new(DailyChallenge::for_date("2024-01-01", None), 0, &mut rng);
        assert_eq!(state.mode, GameMode::Start);

        // No simulation on the title screen
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.survive_time, 0.0);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT, &mut rng);
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.events, vec![GameEvent::RunStarted]);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT, &mut rng);
        assert_eq!(state.mode, GameMode::Paused);

        let frozen = state.survive_time;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), DT, &mut rng);
        }
        assert_eq!(state.survive_time, frozen);

        tick(&mut state, &pause, DT, &mut rng);
        assert_eq!(state.mode, GameMode::Playing);
        assert!(state.survive_time > frozen);
    }

    #[test]
    fn test_twelve_second_scenario() {
        let (mut state, mut rng) = playing_state("2024-01-03");
        let mut saw_obstacle = false;
        for _ in 0..360 {
            state.shield_charges = MAX_SHIELDS;
            tick(&mut state, &TickInput::default(), DT, &mut rng);
            saw_obstacle |= !state.obstacles.is_empty();
        }

        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.level, 1);
        assert!(saw_obstacle, "spawn delay is at most 1.2 s");
        assert!(state.survive_time < LEVEL_INTERVAL);
        let accrued = state.survive_time * SCORE_PER_SECOND;
        assert!((accrued - 96.0).abs() < 1e-6);
        assert!(state.score >= accrued - 1e-6);
    }

    #[test]
    fn test_continuous_accrual_alone() {
        let (mut state, mut rng) = playing_state("2024-01-03");
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), DT, &mut rng);
            state.obstacles.clear();
            state.collectibles.clear();
        }
        assert!((state.score - 80.0).abs() < 0.05);
    }

    #[test]
    fn test_unshielded_hit_ends_run() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        state.score = 42.7;
        let hazard = obstacle_on_player(&state);
        state.obstacles.push(hazard);

        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.mode, GameMode::GameOver);
        assert_eq!(state.shake.time, SHAKE_DURATION);

        let summary = state.summary.clone().expect("summary recorded");
        assert!(summary.new_high);
        assert_eq!(summary.score, state.display_score());

        let frozen = state.score;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT, &mut rng);
        }
        assert_eq!(state.score, frozen);
        assert!(state.shake.time < SHAKE_DURATION);
    }

    #[test]
    fn test_new_high_badge_survives_live_updates() {
        let (mut state, mut rng) = playing_state("2024-01-03");
        state.best_before_run = 10;
        state.high_score = 10;
        state.score = 30.0;
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.high_score, 30, "tracked live");

        let hazard = obstacle_on_player(&state);
        state.obstacles.push(hazard);
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        let summary = state.summary.clone().expect("summary recorded");
        assert!(summary.new_high);
        assert_eq!(summary.high_score, 30);
    }

    #[test]
    fn test_shielded_hit_survives() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        state.shield_charges = 1;
        let hazard = obstacle_on_player(&state);
        state.obstacles.push(hazard);

        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.shield_charges, 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        let hazard = obstacle_on_player(&state);
        state.obstacles.push(hazard);
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.mode, GameMode::GameOver);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT, &mut rng);
        assert_eq!(state.mode, GameMode::Playing);
        assert!(state.obstacles.is_empty());
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_dash_uses_last_direction_and_cooldown() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        let left = TickInput {
            axis: -1.0,
            ..Default::default()
        };
        tick(&mut state, &left, DT, &mut rng);
        assert_eq!(state.last_move_dir, -1.0);

        state.player.vx = 0.0;
        assert!(activate_ability(&mut state, 0.0));
        assert_eq!(state.player.vx, -DASH_IMPULSE);
        assert_eq!(state.world_time_scale(), SLOW_TIME_SCALE);
        assert!(!activate_ability(&mut state, 1.0), "on cooldown");

        // Slow motion wears off before the cooldown does
        for _ in 0..60 {
            state.obstacles.clear();
            tick(&mut state, &TickInput::default(), DT, &mut rng);
        }
        assert_eq!(state.world_time_scale(), 1.0);
        assert!(!state.ability_ready());

        for _ in 0..200 {
            state.obstacles.clear();
            tick(&mut state, &TickInput::default(), DT, &mut rng);
        }
        assert!(state.ability_ready());
    }

    #[test]
    fn test_dash_only_while_playing() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = RunState::new(DailyChallenge::for_date("2024-01-01", None), 0, &mut rng);
        assert!(!activate_ability(&mut state, 1.0));
    }

    #[test]
    fn test_slow_motion_scales_world_not_player() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        state.obstacles.push(Obstacle {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            speed: 100.0,
            vx: 0.0,
            scored: false,
            boss: false,
        });
        state.ability_active_time = 1.0;
        tick(&mut state, &TickInput::default(), DT, &mut rng);

        let moved = state.obstacles[0].rect.y;
        assert!((moved - 100.0 * DT as f32 * SLOW_TIME_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_challenge_reward_paid_once() {
        // 2024-01-02 selects the coin challenge
        let (mut state, mut rng) = playing_state("2024-01-02");
        assert_eq!(state.challenge.kind.target(), 20.0);
        state.coins = 20;
        tick(&mut state, &TickInput::default(), DT, &mut rng);

        assert!(state.challenge.reward_given);
        assert_eq!(state.coins, 20 + state.challenge.kind.reward_coins());
        assert!(state.bonus_text.is_some());
        let completions = |s: &RunState| {
            s.events
                .iter()
                .filter(|e| matches!(e, GameEvent::ChallengeComplete { .. }))
                .count()
        };
        assert_eq!(completions(&state), 1);

        // End this run, then a fresh run on the same day cannot claim again
        let hazard = obstacle_on_player(&state);
        state.shield_charges = 0;
        state.obstacles.push(hazard);
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(state.mode, GameMode::GameOver);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT, &mut rng);
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.events, vec![GameEvent::RunStarted]);
        assert!(state.challenge.reward_given);
        state.coins = 50;
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        assert_eq!(completions(&state), 0);
        assert_eq!(state.coins, 50);
        assert!(state.bonus_text.is_none());
    }

    #[test]
    fn test_magnet_pickup_through_tick() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        let p = state.player.rect;
        state.magnet_time = 1.5;
        state.collectibles.push(crate::sim::state::Collectible {
            kind: CollectibleKind::Magnet,
            rect: Rect::new(p.x + 10.0, p.y, 18.0, 18.0),
            speed: 0.0,
            vx: 0.0,
            value: 1,
        });
        tick(&mut state, &TickInput::default(), DT, &mut rng);
        // Refreshed to the full duration this frame (decay already applied)
        assert_eq!(state.magnet_time, MAGNET_DURATION);
    }

    #[test]
    fn test_boss_wave_replaces_normal_spawning() {
        let (mut state, mut rng) = playing_state("2024-01-01");
        state.survive_time = LEVEL_INTERVAL * f64::from(BOSS_EVERY_LEVELS - 1);
        for _ in 0..10 {
            state.shield_charges = MAX_SHIELDS;
            tick(&mut state, &TickInput::default(), DT, &mut rng);
        }
        assert!(state.boss.active);
        assert_eq!(state.boss.level, BOSS_EVERY_LEVELS);
        assert!(state.events.contains(&GameEvent::BossWaveStarted {
            level: BOSS_EVERY_LEVELS
        }));
    }
}
