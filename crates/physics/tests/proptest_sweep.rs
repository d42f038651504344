//! Property-based tests for swept collision resolution
//!
//! Runs arbitrary motion against closed analytic voxel fields:
//! - A body sealed inside a room never escapes and never overlaps a wall
//! - Any drop onto a flat floor ends resting on it with a jump available
//! - Resting contact is a fixed point under further downward pushes

use glam::DVec3;
use proptest::prelude::*;
use voxelforge_physics::{resolve_movement, Aabb, PlayerState};

const DT: f64 = 1.0 / 60.0;

/// Everything outside the open cell box [1, 7)³ is solid.
fn room(x: i32, y: i32, z: i32) -> bool {
    !(1..7).contains(&x) || !(1..7).contains(&y) || !(1..7).contains(&z)
}

/// Flat ground: every voxel below y = 1 is solid.
fn floor(_: i32, y: i32, _: i32) -> bool {
    y < 1
}

/// Whether the box overlaps any solid voxel under `is_solid`.
fn overlaps_solid(aabb: &Aabb, is_solid: impl Fn(i32, i32, i32) -> bool) -> bool {
    for x in aabb.min.x.floor() as i32..aabb.max.x.ceil() as i32 {
        for y in aabb.min.y.floor() as i32..aabb.max.y.ceil() as i32 {
            for z in aabb.min.z.floor() as i32..aabb.max.z.ceil() as i32 {
                if is_solid(x, y, z) && aabb.intersects(&Aabb::voxel(x, y, z)) {
                    return true;
                }
            }
        }
    }
    false
}

fn delta_strategy() -> impl Strategy<Value = DVec3> {
    (-3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    /// Property: a sealed room never leaks
    ///
    /// The walls are infinitely thick, so however the body is shoved it
    /// must end each resolve strictly inside the room interior and clear
    /// of every wall voxel. This covers tunneling, corner wedging, and
    /// multi-voxel pushouts in one sweep.
    #[test]
    fn sealed_room_never_leaks(deltas in prop::collection::vec(delta_strategy(), 1..40)) {
        let mut player = PlayerState::new(DVec3::new(4.0, 3.0, 4.0));

        for delta in deltas {
            resolve_movement(&mut player, delta, room);

            let aabb = player.aabb();
            prop_assert!(
                aabb.min.x >= 1.0 - 1e-9 && aabb.max.x <= 7.0 + 1e-9,
                "escaped on x: {:?}", aabb
            );
            prop_assert!(
                aabb.min.y >= 1.0 - 1e-9 && aabb.max.y <= 7.0 + 1e-9,
                "escaped on y: {:?}", aabb
            );
            prop_assert!(
                aabb.min.z >= 1.0 - 1e-9 && aabb.max.z <= 7.0 + 1e-9,
                "escaped on z: {:?}", aabb
            );
            prop_assert!(!overlaps_solid(&aabb, room), "wall overlap at {:?}", aabb);
        }
    }

    /// Property: every drop lands with a jump available
    ///
    /// Wherever the body starts above a flat floor, stepping it under
    /// gravity must end in resting contact: feet a hair above the floor
    /// plane, vertical speed zeroed, and the jump granted.
    #[test]
    fn every_drop_lands_with_a_jump(
        x in -50.0f64..50.0,
        z in -50.0f64..50.0,
        height in 1.0f64..20.0,
    ) {
        let mut player = PlayerState::new(DVec3::new(x, height, z));

        let mut landed = false;
        for _ in 0..600 {
            if player.step(DT, floor).landed {
                landed = true;
                break;
            }
        }

        prop_assert!(landed, "never reached the floor from y = {}", height);
        prop_assert!(player.can_jump);
        prop_assert_eq!(player.velocity.y, 0.0);
        prop_assert!(player.position.y >= 1.0, "sank to {}", player.position.y);
        prop_assert!(player.position.y - 1.0 < 1e-4, "rests high at {}", player.position.y);
    }

    /// Property: resting contact is a fixed point
    ///
    /// Once settled on the floor, any further downward push of any size
    /// must resolve back to exactly the same resting position and report
    /// a landing again.
    #[test]
    fn resting_is_a_fixed_point(push in 0.001f64..5.0) {
        let mut player = PlayerState::new(DVec3::new(0.5, 3.0, 0.5));
        for _ in 0..600 {
            if player.step(DT, floor).landed {
                break;
            }
        }
        let rest = player.position;

        let report = resolve_movement(&mut player, DVec3::new(0.0, -push, 0.0), floor);

        prop_assert!(report.landed);
        prop_assert!(player.can_jump);
        prop_assert_eq!(player.position.x, rest.x);
        prop_assert_eq!(player.position.z, rest.z);
        // The pushout lands at floor plane + margin; the last bit may
        // round differently for different penetration depths.
        prop_assert!((player.position.y - rest.y).abs() < 1e-12);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn corner_wedge_blocks_both_horizontal_axes() {
        let walls = |x: i32, _: i32, z: i32| x == 3 || z == 3;
        let mut player = PlayerState::new(DVec3::new(2.0, 10.0, 2.0));

        let report = resolve_movement(&mut player, DVec3::new(1.0, 0.0, 1.0), walls);

        assert!(report.blocked_x);
        assert!(report.blocked_z);
        assert!(!report.blocked_y);
        assert!(player.position.x < 2.7);
        assert!(player.position.z < 2.7);
        assert!(!overlaps_solid(&player.aabb(), walls));
    }

    #[test]
    fn standing_still_stays_grounded_every_tick() {
        let mut player = PlayerState::new(DVec3::new(0.5, 5.0, 0.5));
        for _ in 0..600 {
            if player.step(DT, floor).landed {
                break;
            }
        }
        let rest = player.position;

        // Gravity keeps nudging the body into the floor; every tick must
        // re-resolve to the same spot with the jump still available.
        for _ in 0..60 {
            let report = player.step(DT, floor);
            assert!(report.landed);
            assert!(player.can_jump);
            assert_eq!(player.position.x, rest.x);
            assert_eq!(player.position.z, rest.z);
            assert!((player.position.y - rest.y).abs() < 1e-12);
        }
    }

    #[test]
    fn room_spawn_point_is_clear() {
        let player = PlayerState::new(DVec3::new(4.0, 3.0, 4.0));
        assert!(!overlaps_solid(&player.aabb(), room));
    }
}
