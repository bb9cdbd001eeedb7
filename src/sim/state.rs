//! Run state and core simulation types
//!
//! Everything the frame step mutates lives in [`RunState`]. It is created at
//! startup, reset at the start of every run and read by the renderer/HUD.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::rect::Rect;
use super::spawner::SpawnerState;
use crate::challenge::{DailyChallenge, RunStats};
use crate::consts::*;

/// Current mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Title screen, waiting for start input
    Start,
    /// Active gameplay
    Playing,
    /// Simulation frozen
    Paused,
    /// Run ended on an unshielded hit
    GameOver,
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Horizontal velocity (units/s)
    pub vx: f32,
    /// Horizontal acceleration from input (units/s²)
    pub ax: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            rect: Rect::new(
                WORLD_WIDTH * 0.5 - PLAYER_WIDTH * 0.5,
                WORLD_HEIGHT - PLAYER_BOTTOM_OFFSET,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            vx: 0.0,
            ax: 0.0,
        }
    }
}

impl Player {
    /// Leftmost allowed x
    pub fn min_x(&self) -> f32 {
        PLAYER_MARGIN
    }

    /// Rightmost allowed x
    pub fn max_x(&self) -> f32 {
        WORLD_WIDTH - self.rect.width - PLAYER_MARGIN
    }
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    /// Fall speed (units/s)
    pub speed: f32,
    /// Horizontal drift, reflected at the side walls
    pub vx: f32,
    /// Dodge credit already awarded
    pub scored: bool,
    /// Spawned by the boss director (bigger, faster, boss palette)
    pub boss: bool,
}

/// Collectible variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Shield,
    Magnet,
}

/// A falling coin or power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub rect: Rect,
    pub speed: f32,
    pub vx: f32,
    /// Coins awarded on pickup (coins only)
    pub value: u32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    /// Initial life, for fade alpha
    pub max_life: f32,
    pub radius: f32,
    /// RGB hex color
    pub color: u32,
}

impl Particle {
    /// Fade alpha in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Screen shake parameters (consumed by the renderer)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Shake {
    pub time: f32,
    pub magnitude: f32,
}

impl Shake {
    /// Current intensity, fading linearly over the shake duration
    pub fn intensity(&self) -> f32 {
        if self.time <= 0.0 {
            0.0
        } else {
            self.magnitude * (self.time / SHAKE_DURATION)
        }
    }
}

/// Discrete cues emitted during a frame for audio/haptics/persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    RunStarted,
    Dodge { combo: u32 },
    CoinCollected { value: u32 },
    ShieldGained { charges: u8 },
    MagnetActivated,
    ShieldBlocked { charges_left: u8 },
    BossWaveStarted { level: u32 },
    BossWaveEnded { level: u32 },
    AbilityUsed,
    Paused,
    Resumed,
    ChallengeComplete { date_key: String },
    GameOver { score: u64, coins: u32 },
}

/// Game-over summary shown on the results screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub high_score: u64,
    pub coins: u32,
    pub new_high: bool,
    /// Daily reward line, if the challenge paid out this run
    pub bonus_text: Option<String>,
}

/// Complete simulation state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub mode: GameMode,
    /// Fractional score (continuous accrual); displayed floored
    pub score: f64,
    /// Best floored score seen, including previous sessions
    pub high_score: u64,
    /// High score when this run started; beating it earns the badge
    pub best_before_run: u64,
    /// Seconds survived this run
    pub survive_time: f64,
    pub coins: u32,
    pub level: u32,
    pub speed_mul: f32,
    pub dodges: u32,
    /// Combo multiplier in [1, MAX_COMBO]
    pub combo: u32,
    /// Seconds left to extend the combo
    pub combo_timer: f32,
    pub shield_charges: u8,
    pub magnet_time: f32,
    pub ability_cooldown: f32,
    pub ability_active_time: f32,
    /// Last nonzero movement direction (-1 or 1)
    pub last_move_dir: f32,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub spawner: SpawnerState,
    pub boss: BossState,
    pub challenge: DailyChallenge,
    pub shake: Shake,
    /// Cut particle emission (accessibility)
    pub reduced_motion: bool,
    /// Set when the daily reward paid out this run
    pub bonus_text: Option<String>,
    pub summary: Option<RunSummary>,
    /// Cues produced this frame; drained by the host
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl RunState {
    /// Fresh state on the start screen
    pub fn new<R: Rng + ?Sized>(challenge: DailyChallenge, high_score: u64, rng: &mut R) -> Self {
        Self {
            mode: GameMode::Start,
            score: 0.0,
            high_score,
            best_before_run: high_score,
            survive_time: 0.0,
            coins: 0,
            level: 1,
            speed_mul: 1.0,
            dodges: 0,
            combo: 1,
            combo_timer: 0.0,
            shield_charges: 0,
            magnet_time: 0.0,
            ability_cooldown: 0.0,
            ability_active_time: 0.0,
            last_move_dir: 1.0,
            player: Player::default(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            particles: Vec::new(),
            spawner: SpawnerState::new(rng),
            boss: BossState::default(),
            challenge,
            shake: Shake::default(),
            reduced_motion: false,
            bonus_text: None,
            summary: None,
            events: Vec::new(),
        }
    }

    /// Reset every per-run field; high score, challenge reward flags and
    /// accessibility flags carry over
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut challenge = self.challenge.clone();
        challenge.restart();
        let reduced_motion = self.reduced_motion;

        *self = Self::new(challenge, self.high_score, rng);
        self.reduced_motion = reduced_motion;
    }

    /// Score as displayed and persisted
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// World time scale: slowed while the dash effect is active
    pub fn world_time_scale(&self) -> f32 {
        if self.ability_active_time > 0.0 {
            SLOW_TIME_SCALE
        } else {
            1.0
        }
    }

    pub fn ability_ready(&self) -> bool {
        self.ability_cooldown <= 0.0
    }

    /// Statistics the daily challenge can track
    pub fn run_stats(&self) -> RunStats {
        RunStats {
            survive_time: self.survive_time,
            dodges: self.dodges,
            coins: self.coins,
        }
    }

    /// Recompute level and speed from survive time
    pub fn update_difficulty(&mut self) {
        let level = (self.survive_time / LEVEL_INTERVAL).floor() as u32 + 1;
        self.level = level.min(MAX_LEVEL);
        self.speed_mul = 1.0 + (self.level - 1) as f32 * SPEED_PER_LEVEL;
    }

    /// Clamp counters back into their valid ranges
    pub fn clamp_invariants(&mut self) {
        self.combo = self.combo.clamp(1, MAX_COMBO);
        self.shield_charges = self.shield_charges.min(MAX_SHIELDS);
        self.magnet_time = self.magnet_time.clamp(0.0, MAGNET_DURATION);
        self.ability_cooldown = self.ability_cooldown.max(0.0);
        self.ability_active_time = self.ability_active_time.max(0.0);
        self.combo_timer = self.combo_timer.max(0.0);
    }
}
