//! Player kinematics
//!
//! Horizontal-only motion: input axis drives acceleration, friction brings
//! the paddle to rest when no input is held, and the side walls stop it dead.

use super::state::Player;
use crate::consts::*;

/// Axis magnitude treated as "no input"
const AXIS_DEADZONE: f32 = 0.001;

/// Clamp an input axis to [-1, 1]; NaN becomes 0
#[inline]
pub fn sanitize_axis(axis: f32) -> f32 {
    if axis.is_nan() { 0.0 } else { axis.clamp(-1.0, 1.0) }
}

impl Player {
    /// Integrate one step. Returns the held direction (-1 or 1) when input
    /// is active, so the caller can remember it for the dash ability.
    pub fn integrate(&mut self, axis: f32, dt: f32) -> Option<f32> {
        let axis = sanitize_axis(axis);
        self.ax = axis * PLAYER_ACCEL;
        self.vx += self.ax * dt;

        let held = if axis.abs() < AXIS_DEADZONE {
            self.vx *= (-PLAYER_FRICTION * dt).exp();
            if self.vx.abs() < PLAYER_STOP_SPEED {
                self.vx = 0.0;
            }
            None
        } else {
            Some(axis.signum())
        };

        self.vx = self.vx.clamp(-PLAYER_MAX_SPEED, PLAYER_MAX_SPEED);
        self.rect.x += self.vx * dt;

        let (min_x, max_x) = (self.min_x(), self.max_x());
        if self.rect.x < min_x {
            self.rect.x = min_x;
            self.vx = 0.0;
        }
        if self.rect.x > max_x {
            self.rect.x = max_x;
            self.vx = 0.0;
        }
        // NaN velocity from a corrupted impulse would otherwise poison x
        if !self.rect.x.is_finite() {
            self.rect.x = (min_x + max_x) * 0.5;
            self.vx = 0.0;
        }

        held
    }
}
