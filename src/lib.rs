//! Dodge Run - A falling-obstacle arcade game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (player, spawning, boss waves, collisions, scoring)
//! - `challenge`: Daily challenge selection and progress
//! - `game`: Host that wires the simulation to storage, audio and leaderboards
//! - `persistence`: Key/value storage (LocalStorage on web, in-memory natively)
//! - `leaderboard`: Remote leaderboard with local fallback
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod challenge;
pub mod error;
pub mod game;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use challenge::{ChallengeKind, DailyChallenge};
pub use error::{LeaderboardError, StorageError};
pub use game::Game;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical world size (simulation units, independent of display scaling)
    pub const WORLD_WIDTH: f32 = 360.0;
    pub const WORLD_HEIGHT: f32 = 640.0;

    /// Largest simulation step; longer frames (tab backgrounding) are clamped
    pub const MAX_DT: f64 = 1.0 / 30.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 44.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;
    /// Distance from world bottom to player top edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 72.0;
    /// Side margin of the playable band
    pub const PLAYER_MARGIN: f32 = 8.0;
    pub const PLAYER_ACCEL: f32 = 2900.0;
    pub const PLAYER_MAX_SPEED: f32 = 380.0;
    /// Exponential drag rate when no input is held
    pub const PLAYER_FRICTION: f32 = 8.5;
    /// Velocity below this snaps to zero while coasting
    pub const PLAYER_STOP_SPEED: f32 = 4.0;

    /// Obstacle fall speed at level 0 before multipliers
    pub const BASE_SCROLL_SPEED: f32 = 115.0;

    /// Difficulty progression
    pub const LEVEL_INTERVAL: f64 = 12.0;
    pub const MAX_LEVEL: u32 = 30;
    pub const SPEED_PER_LEVEL: f32 = 0.085;

    /// Scoring
    pub const SCORE_PER_SECOND: f64 = 8.0;
    pub const DODGE_SCORE: f64 = 10.0;
    pub const COIN_SCORE: f64 = 5.0;
    pub const COMBO_WINDOW: f32 = 2.2;
    pub const MAX_COMBO: u32 = 5;

    /// Spawning
    pub const SPAWN_MARGIN: f32 = 8.0;
    pub const ANTI_STREAK_WINDOW: f64 = 0.42;
    pub const MIN_SPAWN_GAP: f32 = 44.0;
    pub const SMALL_OBSTACLE_CHANCE: f64 = 0.56;
    pub const COIN_WITH_OBSTACLE_CHANCE: f64 = 0.35;
    pub const POWERUP_MIN_GAP: f32 = 8.0;
    pub const POWERUP_MAX_GAP: f32 = 14.0;

    /// Power-ups
    pub const MAX_SHIELDS: u8 = 2;
    pub const MAGNET_DURATION: f32 = 7.0;
    pub const MAGNET_RADIUS: f32 = 180.0;

    /// Boss waves
    pub const BOSS_EVERY_LEVELS: u32 = 5;
    pub const BOSS_WAVE_DURATION: f32 = 8.4;
    pub const BOSS_PATTERN_INTERVAL: f32 = 0.55;
    pub const BOSS_LANES: usize = 5;

    /// Dash ability
    pub const ABILITY_COOLDOWN: f32 = 7.5;
    pub const ABILITY_DURATION: f32 = 1.8;
    pub const DASH_IMPULSE: f32 = 260.0;
    /// World time scale while the dash slow-motion is active
    pub const SLOW_TIME_SCALE: f32 = 0.55;

    /// Despawn margins below the world bottom
    pub const OBSTACLE_EXIT_MARGIN: f32 = 130.0;
    pub const COLLECTIBLE_EXIT_MARGIN: f32 = 40.0;

    /// Cosmetics
    pub const PARTICLE_GRAVITY: f32 = 170.0;
    pub const SHAKE_DURATION: f32 = 0.38;
    pub const SHAKE_MAGNITUDE: f32 = 8.0;
}

/// Uniform sample in `[min, max)`; degenerate ranges return `min`
#[inline]
pub fn rand_range<R: rand::Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}
