//! Player state and kinematics.

use glam::DVec3;

use crate::aabb::Aabb;
use crate::sweep::{resolve_movement, MoveReport};

/// Bounding box width along x, in blocks.
pub const PLAYER_WIDTH: f64 = 0.6;
/// Bounding box height, in blocks.
pub const PLAYER_HEIGHT: f64 = 1.8;
/// Bounding box depth along z, in blocks.
pub const PLAYER_DEPTH: f64 = 0.6;

/// Horizontal walk speed, blocks per second.
pub const WALK_SPEED: f64 = 6.0;
/// Initial upward velocity of a jump, blocks per second.
pub const JUMP_SPEED: f64 = 10.0;
/// Downward acceleration, blocks per second squared.
pub const GRAVITY: f64 = 30.0;

/// A player body moving through the voxel field.
///
/// `position` is the feet point: the bounding box is centered on it
/// horizontally and extends [`PLAYER_HEIGHT`] upward from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Feet position in world space.
    pub position: DVec3,
    /// Velocity in blocks per second.
    pub velocity: DVec3,
    /// YXZ Euler rotation in radians; `rotation.y` is the yaw.
    pub rotation: DVec3,
    /// Whether the last resolve ended in ground contact.
    pub can_jump: bool,
}

impl PlayerState {
    /// A player standing still at `position`, facing -z.
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            rotation: DVec3::ZERO,
            can_jump: false,
        }
    }

    /// The bounding box at the current position.
    pub fn aabb(&self) -> Aabb {
        let half = DVec3::new(PLAYER_WIDTH / 2.0, 0.0, PLAYER_DEPTH / 2.0);
        let min = self.position - half;
        Aabb::new(min, min + DVec3::new(PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_DEPTH))
    }

    /// Set the horizontal velocity from movement input.
    ///
    /// `forward` and `strafe` are input weights, usually in [-1, 1]; yaw 0
    /// walks toward -z and positive strafe steps to the player's right
    /// (+x at yaw 0). The combined direction is normalized, so diagonal
    /// input is no faster than straight. Vertical velocity is untouched.
    pub fn walk(&mut self, forward: f64, strafe: f64) {
        let yaw = self.rotation.y;
        let dir = DVec3::new(
            -yaw.sin() * forward + yaw.cos() * strafe,
            0.0,
            -yaw.cos() * forward - yaw.sin() * strafe,
        )
        .normalize_or_zero();
        self.velocity.x = dir.x * WALK_SPEED;
        self.velocity.z = dir.z * WALK_SPEED;
    }

    /// Jump if standing on ground. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.can_jump {
            return false;
        }
        self.velocity.y = JUMP_SPEED;
        self.can_jump = false;
        true
    }

    /// Advance one tick: apply gravity, then move by `velocity * dt` with
    /// collision resolution against `is_solid`.
    pub fn step(&mut self, dt: f64, is_solid: impl Fn(i32, i32, i32) -> bool) -> MoveReport {
        self.velocity.y -= GRAVITY * dt;
        let delta = self.velocity * dt;
        resolve_movement(self, delta, is_solid)
    }
}
