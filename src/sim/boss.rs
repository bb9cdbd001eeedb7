//! Boss wave director
//!
//! Inactive → Active when the level reaches the next trigger. While active,
//! one pattern step fires every [`BOSS_PATTERN_INTERVAL`], cycling through:
//! a single fast obstacle, a pair, and a full-width volley with one safe lane.
//! The wave ends only when its timer runs out.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::spawner::spawn_obstacle;
use super::state::{GameEvent, Obstacle, RunState};
use crate::consts::*;

const VOLLEY_HEIGHT: f32 = 30.0;
const VOLLEY_LANE_PADDING: f32 = 5.0;

/// Boss wave sub-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub active: bool,
    /// Level at which the current (or last) wave started
    pub level: u32,
    pub time_left: f32,
    pub spawn_timer: f32,
    /// Pattern step counter; `phase % 3` selects the pattern
    pub phase: u32,
    /// Level that triggers the next wave
    pub next_level_trigger: u32,
}

impl Default for BossState {
    fn default() -> Self {
        Self {
            active: false,
            level: 0,
            time_left: 0.0,
            spawn_timer: 0.0,
            phase: 0,
            next_level_trigger: BOSS_EVERY_LEVELS,
        }
    }
}

/// Boss attack pattern for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPattern {
    Single,
    Double,
    SafeLane,
}

impl BossPattern {
    pub fn for_phase(phase: u32) -> Self {
        match phase % 3 {
            0 => BossPattern::Single,
            1 => BossPattern::Double,
            _ => BossPattern::SafeLane,
        }
    }
}

/// Trigger, advance and end boss waves
pub fn update<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, dt: f32) {
    if !state.boss.active && state.level >= state.boss.next_level_trigger {
        start_wave(state);
    }

    if !state.boss.active {
        return;
    }

    state.boss.time_left -= dt;
    state.boss.spawn_timer += dt;
    if state.boss.spawn_timer >= BOSS_PATTERN_INTERVAL {
        state.boss.spawn_timer = 0.0;
        spawn_pattern(state, rng);
    }

    if state.boss.time_left <= 0.0 {
        state.boss.active = false;
        state.events.push(GameEvent::BossWaveEnded {
            level: state.boss.level,
        });
        log::info!("Boss wave {} survived", state.boss.level);
    }
}

fn start_wave(state: &mut RunState) {
    let boss = &mut state.boss;
    boss.active = true;
    boss.level = state.level;
    boss.time_left = BOSS_WAVE_DURATION;
    boss.spawn_timer = 0.0;
    boss.phase = 0;
    boss.next_level_trigger += BOSS_EVERY_LEVELS;

    state.events.push(GameEvent::BossWaveStarted { level: state.level });
    log::info!(
        "Boss wave incoming at level {} (next at {})",
        state.level,
        state.boss.next_level_trigger
    );
}

/// Emit the pattern for the current phase and advance the phase counter
pub fn spawn_pattern<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R) {
    let pattern = BossPattern::for_phase(state.boss.phase);
    state.boss.phase += 1;
    let now = state.survive_time;

    match pattern {
        BossPattern::Single => spawn_obstacle(state, rng, now, true),
        BossPattern::Double => {
            spawn_obstacle(state, rng, now, true);
            spawn_obstacle(state, rng, now + 0.01, true);
        }
        BossPattern::SafeLane => {
            let safe_lane = rng.random_range(0..BOSS_LANES);
            spawn_volley(state, safe_lane);
        }
    }
}

/// Fill every lane except `safe_lane` with a boss obstacle
pub fn spawn_volley(state: &mut RunState, safe_lane: usize) {
    let lane_width = WORLD_WIDTH / BOSS_LANES as f32;
    let speed = (BASE_SCROLL_SPEED + state.level as f32 * 25.0) * 1.22;

    for lane in (0..BOSS_LANES).filter(|&lane| lane != safe_lane) {
        state.obstacles.push(Obstacle {
            rect: Rect::new(
                lane as f32 * lane_width + VOLLEY_LANE_PADDING,
                -VOLLEY_HEIGHT,
                lane_width - 2.0 * VOLLEY_LANE_PADDING,
                VOLLEY_HEIGHT,
            ),
            speed,
            vx: 0.0,
            scored: false,
            boss: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::DailyChallenge;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 30.0;

    fn new_state(rng: &mut Pcg32) -> RunState {
        RunState::new(DailyChallenge::for_date("2024-01-01", None), 0, rng)
    }

    #[test]
    fn test_wave_starts_once_per_threshold() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = new_state(&mut rng);
        state.level = BOSS_EVERY_LEVELS;

        update(&mut state, &mut rng, DT);
        assert!(state.boss.active);
        assert_eq!(state.boss.level, BOSS_EVERY_LEVELS);
        assert_eq!(state.boss.next_level_trigger, 2 * BOSS_EVERY_LEVELS);

        // Run the wave out at the same level: no second wave
        for _ in 0..400 {
            update(&mut state, &mut rng, DT);
        }
        assert!(!state.boss.active);
        let starts = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossWaveStarted { .. }))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_wave_lasts_full_duration() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = new_state(&mut rng);
        state.level = BOSS_EVERY_LEVELS;

        let mut elapsed = 0.0;
        update(&mut state, &mut rng, DT);
        elapsed += DT;
        while state.boss.active {
            update(&mut state, &mut rng, DT);
            elapsed += DT;
        }
        assert!(elapsed >= BOSS_WAVE_DURATION - 1e-3);
        assert!(elapsed < BOSS_WAVE_DURATION + 2.0 * DT);
    }

    #[test]
    fn test_no_wave_below_threshold() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = new_state(&mut rng);
        state.level = BOSS_EVERY_LEVELS - 1;
        update(&mut state, &mut rng, DT);
        assert!(!state.boss.active);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_pattern_cycle() {
        assert_eq!(BossPattern::for_phase(0), BossPattern::Single);
        assert_eq!(BossPattern::for_phase(1), BossPattern::Double);
        assert_eq!(BossPattern::for_phase(2), BossPattern::SafeLane);
        assert_eq!(BossPattern::for_phase(3), BossPattern::Single);

        let mut rng = Pcg32::seed_from_u64(4);
        let mut state = new_state(&mut rng);
        spawn_pattern(&mut state, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        spawn_pattern(&mut state, &mut rng);
        assert_eq!(state.obstacles.len(), 3);
        spawn_pattern(&mut state, &mut rng);
        assert_eq!(state.obstacles.len(), 3 + BOSS_LANES - 1);
        assert_eq!(state.boss.phase, 3);
    }

    #[test]
    fn test_volley_leaves_safe_lane_open() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = new_state(&mut rng);
        spawn_volley(&mut state, 2);

        let lane_width = WORLD_WIDTH / BOSS_LANES as f32;
        let gap_start = 2.0 * lane_width;
        let gap_end = 3.0 * lane_width;
        assert_eq!(state.obstacles.len(), BOSS_LANES - 1);
        for o in &state.obstacles {
            assert!(o.boss);
            assert!(o.rect.right() <= gap_start || o.rect.x >= gap_end);
        }
    }
}
