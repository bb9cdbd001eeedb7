//! Obstacle, coin and power-up spawning
//!
//! Two independent polling timers: obstacles (paced by level, suspended while
//! a boss wave is active) and power-ups (always running).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{Collectible, CollectibleKind, Obstacle, RunState};
use crate::consts::*;
use crate::rand_range;

/// Initial obstacle delay bounds at the start of a run
const INITIAL_SPAWN_DELAY: (f32, f32) = (0.76, 1.2);
const COIN_SIZE: f32 = 14.0;
const POWERUP_SIZE: f32 = 18.0;
const POWERUP_MARGIN: f32 = 14.0;

/// Spawn timers and anti-streak memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerState {
    pub spawn_timer: f32,
    pub next_spawn_delay: f32,
    /// x of the previous non-boss obstacle, if any
    pub last_spawn_x: Option<f32>,
    /// Run time (s) of the previous obstacle spawn
    pub last_spawn_at: f64,
    pub powerup_timer: f32,
    pub next_powerup_delay: f32,
}

impl SpawnerState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            spawn_timer: 0.0,
            next_spawn_delay: rand_range(rng, INITIAL_SPAWN_DELAY.0, INITIAL_SPAWN_DELAY.1),
            last_spawn_x: None,
            last_spawn_at: f64::NEG_INFINITY,
            powerup_timer: 0.0,
            next_powerup_delay: rand_range(rng, POWERUP_MIN_GAP, POWERUP_MAX_GAP),
        }
    }
}

/// Obstacle delay bounds for a level; both shrink and are floor-clamped
pub fn spawn_delay_bounds(level: u32) -> (f32, f32) {
    let level = level as f32;
    let min = (0.64 - level * 0.02).clamp(0.28, 0.64);
    let max = (1.18 - level * 0.03).clamp(0.44, 1.18);
    (min, max)
}

/// Push `x` at least [`MIN_SPAWN_GAP`] away from `last_x`, toward open space.
/// Positions already far enough apart are returned unchanged.
pub fn separate_from_last(x: f32, last_x: f32, max_x: f32) -> f32 {
    if (x - last_x).abs() >= MIN_SPAWN_GAP {
        return x;
    }
    if x < WORLD_WIDTH * 0.5 {
        (last_x + MIN_SPAWN_GAP).min(max_x)
    } else {
        (last_x - MIN_SPAWN_GAP).max(SPAWN_MARGIN)
    }
}

/// Advance spawn timers; emits obstacles and power-ups when they elapse
pub fn update<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, dt: f32) {
    if !state.boss.active {
        state.spawner.spawn_timer += dt;
        if state.spawner.spawn_timer >= state.spawner.next_spawn_delay {
            state.spawner.spawn_timer = 0.0;
            let now = state.survive_time;
            spawn_obstacle(state, rng, now, false);
        }
    }

    state.spawner.powerup_timer += dt;
    if state.spawner.powerup_timer >= state.spawner.next_powerup_delay {
        state.spawner.powerup_timer = 0.0;
        spawn_powerup(state, rng);
        state.spawner.next_powerup_delay = rand_range(rng, POWERUP_MIN_GAP, POWERUP_MAX_GAP);
    }
}

/// Spawn one obstacle above the world. `now` is the run time used by the
/// anti-streak rule; boss obstacles skip that rule and the coin roll.
pub fn spawn_obstacle<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, now: f64, boss: bool) {
    let small = rng.random_bool(SMALL_OBSTACLE_CHANCE);
    let (width, height) = if boss {
        (rand_range(rng, 58.0, 92.0), rand_range(rng, 22.0, 34.0))
    } else if small {
        (rand_range(rng, 26.0, 36.0), rand_range(rng, 24.0, 34.0))
    } else {
        (rand_range(rng, 40.0, 56.0), rand_range(rng, 32.0, 46.0))
    };

    let max_x = WORLD_WIDTH - width - SPAWN_MARGIN;
    let mut x = rand_range(rng, SPAWN_MARGIN, max_x);

    if !boss && now - state.spawner.last_spawn_at < ANTI_STREAK_WINDOW {
        if let Some(last_x) = state.spawner.last_spawn_x {
            x = separate_from_last(x, last_x, max_x);
        }
    }

    let level = state.level as f32;
    let mut speed =
        (BASE_SCROLL_SPEED + level * 21.0 + rand_range(rng, -10.0, 18.0)) * state.speed_mul;
    let mut vx = 0.0;
    if boss {
        speed *= 1.18;
        vx = rand_range(rng, -85.0, 85.0);
    }

    state.obstacles.push(Obstacle {
        rect: Rect::new(x, -height - 2.0, width, height),
        speed,
        vx,
        scored: false,
        boss,
    });
    state.spawner.last_spawn_x = Some(x);
    state.spawner.last_spawn_at = now;

    if !boss {
        let (min_delay, max_delay) = spawn_delay_bounds(state.level);
        state.spawner.next_spawn_delay = rand_range(rng, min_delay, max_delay);

        if rng.random_bool(COIN_WITH_OBSTACLE_CHANCE) {
            let coin_speed = speed * rand_range(rng, 0.88, 1.04);
            spawn_coin(state, x + width * 0.5 - COIN_SIZE * 0.5, -18.0, coin_speed);
        }
    }
}

/// Spawn a single coin at (x, y)
pub fn spawn_coin(state: &mut RunState, x: f32, y: f32, speed: f32) {
    state.collectibles.push(Collectible {
        kind: CollectibleKind::Coin,
        rect: Rect::new(x, y, COIN_SIZE, COIN_SIZE),
        speed,
        vx: 0.0,
        value: 1,
    });
}

/// Spawn a shield or magnet power-up at a random x
pub fn spawn_powerup<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R) {
    let kind = if rng.random_bool(0.5) {
        CollectibleKind::Shield
    } else {
        CollectibleKind::Magnet
    };
    let x = rand_range(
        rng,
        POWERUP_MARGIN,
        WORLD_WIDTH - POWERUP_SIZE - POWERUP_MARGIN,
    );
    let speed = (BASE_SCROLL_SPEED + state.level as f32 * 10.0) * rand_range(rng, 0.75, 0.95);

    state.collectibles.push(Collectible {
        kind,
        rect: Rect::new(x, -28.0, POWERUP_SIZE, POWERUP_SIZE),
        speed,
        vx: rand_range(rng, -20.0, 20.0),
        value: 1,
    });
    log::debug!("Spawned {:?} power-up at x={:.0}", kind, x);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::DailyChallenge;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_state(rng: &mut Pcg32) -> RunState {
        RunState::new(DailyChallenge::for_date("2024-01-01", None), 0, rng)
    }

    #[test]
    fn test_delay_bounds_shrink_and_floor() {
        let (min1, max1) = spawn_delay_bounds(1);
        let (min10, max10) = spawn_delay_bounds(10);
        assert!(min10 < min1 && max10 < max1);
        assert_eq!(spawn_delay_bounds(30), (0.28, 0.44));
    }

    #[test]
    fn test_obstacle_spawns_when_timer_elapses() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = new_state(&mut rng);
        state.spawner.next_spawn_delay = 0.5;

        update(&mut state, &mut rng, 0.4);
        assert!(state.obstacles.is_empty());
        update(&mut state, &mut rng, 0.2);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawner.spawn_timer, 0.0);

        let o = &state.obstacles[0];
        assert!(o.rect.bottom() < 0.0, "spawned above the world");
        assert!(o.rect.x >= SPAWN_MARGIN && o.rect.right() <= WORLD_WIDTH - SPAWN_MARGIN);
        assert!(!o.scored && !o.boss);
    }

    #[test]
    fn test_no_normal_obstacles_during_boss_wave() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut state = new_state(&mut rng);
        state.boss.active = true;
        for _ in 0..300 {
            update(&mut state, &mut rng, 1.0 / 30.0);
        }
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_powerups_spawn_regardless_of_boss() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = new_state(&mut rng);
        state.boss.active = true;
        state.spawner.next_powerup_delay = 1.0;
        update(&mut state, &mut rng, 1.0);

        assert_eq!(state.collectibles.len(), 1);
        let item = &state.collectibles[0];
        assert_ne!(item.kind, CollectibleKind::Coin);
        let delay = state.spawner.next_powerup_delay;
        assert!((POWERUP_MIN_GAP..=POWERUP_MAX_GAP).contains(&delay));
    }

    #[test]
    fn test_rapid_spawns_are_separated() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut state = new_state(&mut rng);
        for i in 0..200 {
            state.obstacles.clear();
            let now = i as f64;
            spawn_obstacle(&mut state, &mut rng, now, false);
            let first = state.obstacles[0].rect.x;
            spawn_obstacle(&mut state, &mut rng, now + 0.1, false);
            let second = state.obstacles[1].rect.x;
            assert!(
                (second - first).abs() >= MIN_SPAWN_GAP - 1e-3,
                "spawns {first} and {second} too close"
            );
        }
    }

    #[test]
    fn test_boss_obstacles_skip_coin_and_drift() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut state = new_state(&mut rng);
        for _ in 0..50 {
            spawn_obstacle(&mut state, &mut rng, 0.0, true);
        }
        assert!(state.collectibles.is_empty());
        assert!(state.obstacles.iter().all(|o| o.boss && o.vx.abs() <= 85.0));
    }

    proptest! {
        #[test]
        fn prop_separation_guarantees_gap(
            last_x in SPAWN_MARGIN..(WORLD_WIDTH - 56.0 - SPAWN_MARGIN),
            offset in -(MIN_SPAWN_GAP - 0.01)..(MIN_SPAWN_GAP - 0.01),
            width in 26.0f32..56.0,
        ) {
            let max_x = WORLD_WIDTH - width - SPAWN_MARGIN;
            let x = (last_x + offset).clamp(SPAWN_MARGIN, max_x);
            let separated = separate_from_last(x, last_x, max_x);
            prop_assert!((separated - last_x).abs() >= MIN_SPAWN_GAP - 1e-3);
            prop_assert!(separated >= SPAWN_MARGIN && separated <= max_x);
        }
    }
}
