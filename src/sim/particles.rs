//! Cosmetic particles
//!
//! Emission timing is a gameplay decision (dodge, pickup, block), so the
//! simulation owns them, but they never feed back into gameplay.

use glam::Vec2;
use rand::Rng;

use super::state::{Particle, RunState};
use crate::consts::PARTICLE_GRAVITY;
use crate::rand_range;

/// Palette
pub const COLOR_DODGE: u32 = 0x77ffd6;
pub const COLOR_COIN: u32 = 0xffd166;
pub const COLOR_SHIELD: u32 = 0xa7f3d0;
pub const COLOR_MAGNET: u32 = 0x9fd8ff;
pub const COLOR_REWARD: u32 = 0xffd166;

/// Fraction of particles kept with reduced motion enabled
const REDUCED_MOTION_FACTOR: f32 = 0.35;

/// Number of particles actually emitted for a requested burst
pub fn burst_count(count: usize, reduced_motion: bool) -> usize {
    if reduced_motion {
        ((count as f32 * REDUCED_MOTION_FACTOR).floor() as usize).max(1)
    } else {
        count
    }
}

/// Emit a small upward burst at `pos`
pub fn emit<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R, pos: Vec2, color: u32, count: usize) {
    for _ in 0..burst_count(count, state.reduced_motion) {
        let life = rand_range(rng, 0.24, 0.46);
        state.particles.push(Particle {
            pos,
            vel: Vec2::new(rand_range(rng, -70.0, 70.0), rand_range(rng, -110.0, -30.0)),
            life,
            max_life: life,
            radius: rand_range(rng, 1.4, 3.2),
            color,
        });
    }
}

/// Age and move particles; expired ones are dropped
pub fn update(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.life -= dt;
        p.pos += p.vel * dt;
        p.vel.y += PARTICLE_GRAVITY * dt;
    }
    particles.retain(|p| p.life > 0.0);
}
