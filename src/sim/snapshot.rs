//! Read-only views of the run for the HUD and renderer
//!
//! Builders here never mutate [`RunState`].

use serde::{Deserialize, Serialize};

use super::state::{Collectible, GameMode, Obstacle, Particle, Player, RunState, RunSummary};
use crate::challenge::reset_countdown_text;
use crate::consts::ABILITY_COOLDOWN;

/// Everything the HUD overlay displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub mode: GameMode,
    pub score: u64,
    pub high_score: u64,
    pub coins: u32,
    pub level: u32,
    pub speed_mul: f32,
    pub combo: u32,
    pub shield_charges: u8,
    /// Seconds of magnet left, 0 when inactive
    pub magnet_time: f32,
    /// Seconds until the dash recharges
    pub ability_cooldown: f32,
    /// Dash recharge in [0, 1]; 1 means ready
    pub ability_meter: f32,
    pub ability_ready: bool,
    pub slow_motion: bool,
    pub boss_active: bool,
    /// Level the current or last boss wave triggered at
    pub boss_level: u32,
    pub boss_time_left: f32,
    pub challenge_text: String,
    pub challenge_status: String,
    /// Time until the daily challenge rolls over, e.g. `5h 12m`
    pub challenge_reset: Option<String>,
    pub summary: Option<RunSummary>,
}

/// Build the HUD snapshot. `seconds_until_midnight` comes from the platform
/// clock; `None` hides the countdown.
pub fn build_hud(state: &RunState, seconds_until_midnight: Option<u64>) -> HudSnapshot {
    HudSnapshot {
        mode: state.mode,
        score: state.display_score(),
        high_score: state.high_score,
        coins: state.coins,
        level: state.level,
        speed_mul: state.speed_mul,
        combo: state.combo,
        shield_charges: state.shield_charges,
        magnet_time: state.magnet_time,
        ability_cooldown: state.ability_cooldown.max(0.0),
        ability_meter: ability_meter(state.ability_cooldown),
        ability_ready: state.ability_ready(),
        slow_motion: state.ability_active_time > 0.0,
        boss_active: state.boss.active,
        boss_level: state.boss.level,
        boss_time_left: if state.boss.active {
            state.boss.time_left.max(0.0)
        } else {
            0.0
        },
        challenge_text: state.challenge.progress_text(),
        challenge_status: state.challenge.status_text(),
        challenge_reset: seconds_until_midnight.map(reset_countdown_text),
        summary: state.summary.clone(),
    }
}

/// Dash recharge fraction for a remaining cooldown
pub fn ability_meter(cooldown: f32) -> f32 {
    (1.0 - cooldown / ABILITY_COOLDOWN).clamp(0.0, 1.0)
}

/// Borrowed view of the drawable entities for one frame
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub collectibles: &'a [Collectible],
    pub particles: &'a [Particle],
    pub shield_charges: u8,
    pub magnet_active: bool,
    pub slow_motion: bool,
    pub boss_active: bool,
    /// Current shake amplitude in world units
    pub shake: f32,
}

impl<'a> RenderView<'a> {
    pub fn new(state: &'a RunState) -> Self {
        Self {
            player: &state.player,
            obstacles: &state.obstacles,
            collectibles: &state.collectibles,
            particles: &state.particles,
            shield_charges: state.shield_charges,
            magnet_active: state.magnet_time > 0.0,
            slow_motion: state.ability_active_time > 0.0,
            boss_active: state.boss.active,
            shake: state.shake.intensity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::DailyChallenge;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_state() -> RunState {
        let mut rng = Pcg32::seed_from_u64(3);
        RunState::new(DailyChallenge::for_date("2024-01-01", None), 77, &mut rng)
    }

    #[test]
    fn test_ability_meter() {
        assert_eq!(ability_meter(0.0), 1.0);
        assert_eq!(ability_meter(ABILITY_COOLDOWN), 0.0);
        assert!((ability_meter(ABILITY_COOLDOWN / 2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hud_reflects_state() {
        let mut state = new_state();
        state.score = 12.9;
        state.ability_cooldown = ABILITY_COOLDOWN;
        state.ability_active_time = 1.0;

        let hud = build_hud(&state, Some(3600 + 120));
        assert_eq!(hud.score, 12);
        assert_eq!(hud.high_score, 77);
        assert_eq!(hud.level, 1);
        assert_eq!(hud.speed_mul, 1.0);
        assert_eq!(hud.ability_cooldown, ABILITY_COOLDOWN);
        assert!(!hud.ability_ready);
        assert!(hud.slow_motion);
        assert_eq!(hud.challenge_text, "Dodge 25 obstacles (0/25)");
        assert_eq!(hud.challenge_reset.as_deref(), Some("1h 2m"));
        assert!(build_hud(&state, None).challenge_reset.is_none());
    }

    #[test]
    fn test_render_view_borrows_entities() {
        let state = new_state();
        let view = RenderView::new(&state);
        assert!(view.obstacles.is_empty());
        assert_eq!(view.shake, 0.0);
        assert!(!view.magnet_active);
    }
}
