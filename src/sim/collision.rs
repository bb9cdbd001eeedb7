//! Collision detection and scoring
//!
//! Moves obstacles and collectibles by the (possibly slowed) world step,
//! awards dodge credit and combos, resolves pickups and shield blocks.
//! Removal during iteration walks indices in reverse so `Vec::remove` never
//! skips an element and survivors keep their spawn order.

use glam::Vec2;
use rand::Rng;

use super::particles::{self, COLOR_COIN, COLOR_DODGE, COLOR_MAGNET, COLOR_SHIELD};
use super::rect::Rect;
use super::state::{CollectibleKind, GameEvent, RunState};
use crate::consts::*;

/// Margin at which collectibles bounce off the side walls
const COLLECTIBLE_SIDE_MARGIN: f32 = 6.0;
/// Magnet attraction strength (per frame, scaled by inverse distance)
const MAGNET_PULL: f32 = 220.0;
const MAGNET_MIN_DIST: f32 = 80.0;
const MAGNET_STEP: f32 = 0.02;

/// Outcome of moving obstacles for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleOutcome {
    /// Player survived the frame (possibly thanks to a shield)
    Clear,
    /// An unshielded obstacle hit the player
    Hit,
}

/// Combo multiplier after a dodge: extend inside the window, else restart
#[inline]
pub fn next_combo(combo: u32, combo_timer: f32) -> u32 {
    if combo_timer > 0.0 {
        (combo + 1).min(MAX_COMBO)
    } else {
        1
    }
}

/// Decay the combo window; expiry drops the multiplier back to 1
pub fn decay_combo(state: &mut RunState, dt: f32) {
    if state.combo_timer > 0.0 {
        state.combo_timer -= dt;
        if state.combo_timer <= 0.0 {
            state.combo_timer = 0.0;
            state.combo = 1;
        }
    }
}

/// Reflect horizontal velocity so it points back inside `[min, max]`
#[inline]
fn bounce(rect: &Rect, vx: f32, min: f32, max: f32) -> Option<f32> {
    if rect.x < min {
        Some(vx.abs())
    } else if rect.right() > max {
        Some(-vx.abs())
    } else {
        None
    }
}

/// Award dodge credit for an obstacle that just left the world
fn score_dodge<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, x_center: f32) {
    state.dodges += 1;
    state.combo = next_combo(state.combo, state.combo_timer);
    state.combo_timer = COMBO_WINDOW;
    state.score += DODGE_SCORE * f64::from(state.combo);

    particles::emit(
        state,
        rng,
        Vec2::new(x_center, WORLD_HEIGHT - 7.0),
        COLOR_DODGE,
        5,
    );
    state.events.push(GameEvent::Dodge { combo: state.combo });
}

/// Advance obstacles, score dodges and test them against the player
pub fn update_obstacles<R: Rng + ?Sized>(
    state: &mut RunState,
    rng: &mut R,
    world_dt: f32,
) -> ObstacleOutcome {
    for i in (0..state.obstacles.len()).rev() {
        let o = &mut state.obstacles[i];
        o.rect.translate(Vec2::new(o.vx, o.speed) * world_dt);

        if let Some(vx) = bounce(&o.rect, o.vx, 0.0, WORLD_WIDTH) {
            o.vx = vx;
            o.rect.x = o.rect.x.clamp(0.0, (WORLD_WIDTH - o.rect.width).max(0.0));
        }

        if !o.scored && o.rect.y > WORLD_HEIGHT {
            o.scored = true;
            let x_center = o.rect.center().x;
            score_dodge(state, rng, x_center);
        }

        let o = &state.obstacles[i];
        if o.rect.y > WORLD_HEIGHT + OBSTACLE_EXIT_MARGIN {
            state.obstacles.remove(i);
            continue;
        }

        if state.player.rect.overlaps(&o.rect) {
            if state.shield_charges == 0 {
                return ObstacleOutcome::Hit;
            }

            state.shield_charges -= 1;
            let center = o.rect.center();
            state.obstacles.remove(i);
            particles::emit(state, rng, center, COLOR_SHIELD, 10);
            state.events.push(GameEvent::ShieldBlocked {
                charges_left: state.shield_charges,
            });
            log::debug!("Shield absorbed a hit ({} left)", state.shield_charges);
        }
    }

    ObstacleOutcome::Clear
}

/// Magnet displacement for a coin centred at `item` toward `target`
pub fn magnet_pull(item: Vec2, target: Vec2) -> Vec2 {
    let d = target - item;
    let dist = d.length();
    if dist >= MAGNET_RADIUS {
        return Vec2::ZERO;
    }
    d * MAGNET_STEP * (MAGNET_PULL / dist.max(MAGNET_MIN_DIST))
}

/// Advance collectibles, apply magnet attraction and resolve pickups
pub fn update_collectibles<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, world_dt: f32) {
    let player_center = state.player.rect.center();
    let magnet_active = state.magnet_time > 0.0;

    for i in (0..state.collectibles.len()).rev() {
        let item = &mut state.collectibles[i];
        item.rect.translate(Vec2::new(item.vx, item.speed) * world_dt);

        if let Some(vx) = bounce(
            &item.rect,
            item.vx,
            COLLECTIBLE_SIDE_MARGIN,
            WORLD_WIDTH - COLLECTIBLE_SIDE_MARGIN,
        ) {
            item.vx = vx;
        }

        if magnet_active && item.kind == CollectibleKind::Coin {
            let pull = magnet_pull(item.rect.center(), player_center);
            item.rect.translate(pull);
        }

        if item.rect.y > WORLD_HEIGHT + COLLECTIBLE_EXIT_MARGIN {
            state.collectibles.remove(i);
            continue;
        }

        if !state.player.rect.overlaps(&item.rect) {
            continue;
        }

        let item = state.collectibles.remove(i);
        let at = item.rect.center();
        match item.kind {
            CollectibleKind::Coin => {
                state.coins += item.value;
                state.score += COIN_SCORE;
                particles::emit(state, rng, at, COLOR_COIN, 4);
                state.events.push(GameEvent::CoinCollected { value: item.value });
            }
            CollectibleKind::Shield => {
                state.shield_charges = (state.shield_charges + 1).min(MAX_SHIELDS);
                particles::emit(state, rng, at, COLOR_SHIELD, 8);
                state.events.push(GameEvent::ShieldGained {
                    charges: state.shield_charges,
                });
            }
            CollectibleKind::Magnet => {
                state.magnet_time = state.magnet_time.max(MAGNET_DURATION);
                particles::emit(state, rng, at, COLOR_MAGNET, 8);
                state.events.push(GameEvent::MagnetActivated);
            }
        }
    }
}
