//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame step supplied by the caller
//! - Injected, seedable RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, storage or platform dependencies

pub mod boss;
pub mod clock;
pub mod collision;
pub mod particles;
pub mod player;
pub mod rect;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use boss::{BossPattern, BossState};
pub use clock::FrameClock;
pub use collision::ObstacleOutcome;
pub use rect::Rect;
pub use snapshot::{HudSnapshot, RenderView, build_hud};
pub use spawner::SpawnerState;
pub use state::{
    Collectible, CollectibleKind, GameEvent, GameMode, Obstacle, Particle, Player, RunState,
    RunSummary, Shake,
};
pub use tick::{TickInput, activate_ability, start_run, tick};
