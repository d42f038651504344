//! Swept axis-separated collision resolution.
//!
//! Movement resolves one axis at a time in the fixed order y, x, z; each
//! sub-move translates the box, then pushes it back out of the first
//! overlapping voxel (ascending x, y, z scan) until the pass is clean.
//! Resolving axes independently lets the player slide along walls instead
//! of sticking to them.

use glam::DVec3;

use crate::aabb::Aabb;
use crate::player::PlayerState;

/// Correction margin keeping resolved boxes strictly outside solids.
const CORRECTION_EPSILON: f64 = 1e-6;

/// Which sub-moves of a resolve were corrected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// The vertical sub-move hit something.
    pub blocked_y: bool,
    /// The x sub-move hit something.
    pub blocked_x: bool,
    /// The z sub-move hit something.
    pub blocked_z: bool,
    /// The vertical correction was downward: the player landed.
    pub landed: bool,
}

impl MoveReport {
    /// Whether any axis was corrected.
    pub fn any_blocked(&self) -> bool {
        self.blocked_y || self.blocked_x || self.blocked_z
    }

    /// Number of axes corrected.
    pub fn corrections(&self) -> usize {
        usize::from(self.blocked_y) + usize::from(self.blocked_x) + usize::from(self.blocked_z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

fn component(v: DVec3, axis: Axis) -> f64 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
        Axis::Z => v.z,
    }
}

fn component_mut(v: &mut DVec3, axis: Axis) -> &mut f64 {
    match axis {
        Axis::X => &mut v.x,
        Axis::Y => &mut v.y,
        Axis::Z => &mut v.z,
    }
}

/// Move `player` by `delta`, resolving collisions against `is_solid`.
///
/// Sub-moves apply in the order Δy, Δx, Δz, each fully resolved before the
/// next; a zero-length sub-move skips its scan. Every y correction zeroes
/// the vertical velocity; a downward one also sets `can_jump`. The flag is
/// cleared on entry, so it reflects this resolve's ground contact only.
pub fn resolve_movement(
    player: &mut PlayerState,
    delta: DVec3,
    is_solid: impl Fn(i32, i32, i32) -> bool,
) -> MoveReport {
    let mut report = MoveReport::default();
    player.can_jump = false;

    for axis in [Axis::Y, Axis::X, Axis::Z] {
        let amount = component(delta, axis);
        if amount == 0.0 {
            continue;
        }
        if !sub_move(player, axis, amount, &is_solid) {
            continue;
        }
        match axis {
            Axis::Y => {
                report.blocked_y = true;
                player.velocity.y = 0.0;
                if amount < 0.0 {
                    report.landed = true;
                    player.can_jump = true;
                }
            }
            Axis::X => report.blocked_x = true,
            Axis::Z => report.blocked_z = true,
        }
    }
    report
}

/// Translate one axis, then push back out of overlapping voxels until a
/// scan comes up clean. Returns whether any correction was applied.
///
/// Terminates because every correction moves the box against the travel
/// direction, strictly shrinking the overlap along the axis.
fn sub_move(
    player: &mut PlayerState,
    axis: Axis,
    amount: f64,
    is_solid: &impl Fn(i32, i32, i32) -> bool,
) -> bool {
    *component_mut(&mut player.position, axis) += amount;

    let mut corrected = false;
    loop {
        let aabb = player.aabb();
        let Some(hit) = first_overlap(&aabb, is_solid) else {
            return corrected;
        };
        corrected = true;
        let correction = if amount > 0.0 {
            -(component(aabb.max, axis) - component(hit.min, axis) + CORRECTION_EPSILON)
        } else {
            component(hit.max, axis) - component(aabb.min, axis) + CORRECTION_EPSILON
        };
        *component_mut(&mut player.position, axis) += correction;
    }
}

/// First solid voxel overlapping `aabb`, scanning ascending x, then y,
/// then z.
fn first_overlap(aabb: &Aabb, is_solid: &impl Fn(i32, i32, i32) -> bool) -> Option<Aabb> {
    let x0 = aabb.min.x.floor() as i32;
    let x1 = aabb.max.x.ceil() as i32;
    let y0 = aabb.min.y.floor() as i32;
    let y1 = aabb.max.y.ceil() as i32;
    let z0 = aabb.min.z.floor() as i32;
    let z1 = aabb.max.z.ceil() as i32;

    for x in x0..x1 {
        for y in y0..y1 {
            for z in z0..z1 {
                if !is_solid(x, y, z) {
                    continue;
                }
                let voxel = Aabb::voxel(x, y, z);
                if aabb.intersects(&voxel) {
                    return Some(voxel);
                }
            }
        }
    }
    None
}
