//! Collision Resolution Worldtest
//!
//! Drives the swept resolver against real generated terrain.
//! Focus areas:
//! - A body dropped under gravity comes to rest with zero penetration
//! - Resting contact grants exactly one jump
//! - Jump arc height matches the integrated kinematics
//! - Walking across terrain never enters a solid voxel
//! - A batch of bodies settles everywhere on the map

use std::time::Instant;

use glam::DVec3;
use voxelforge_core::BlockRegistry;
use voxelforge_physics::{Aabb, PlayerState, GRAVITY, JUMP_SPEED, WALK_SPEED};
use voxelforge_testkit::{
    MetricsReportBuilder, MetricsSink, PhysicsMetrics, TestExecutionMetrics, TestResult,
};
use voxelforge_world::{ChunkPos, World};

const SEED_TEXT: &str = "9182736";
const CHUNK_RADIUS: i32 = 2; // 5×5 grid around the origin chunk
const DT: f64 = 1.0 / 60.0;

/// Running tally across every phase.
#[derive(Default)]
struct SimTally {
    steps: usize,
    corrections: usize,
    landings: usize,
    step_time_us: u128,
    penetration_checks: usize,
}

impl SimTally {
    fn step(&mut self, player: &mut PlayerState, world: &World) -> voxelforge_physics::MoveReport {
        let start = Instant::now();
        let report = player.step(DT, |x, y, z| world.is_solid(x, y, z));
        self.step_time_us += start.elapsed().as_micros();
        self.steps += 1;
        self.corrections += report.corrections();
        self.landings += usize::from(report.landed);
        self.penetration_checks += assert_free_of_solids(player, world);
        report
    }

    fn avg_step_time_us(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.step_time_us as f64 / self.steps as f64
        }
    }
}

/// Panic if the player's box overlaps any solid voxel. Returns the number
/// of voxel cells inspected.
fn assert_free_of_solids(player: &PlayerState, world: &World) -> usize {
    let aabb = player.aabb();
    let mut checked = 0;
    for x in aabb.min.x.floor() as i32..aabb.max.x.ceil() as i32 {
        for y in aabb.min.y.floor() as i32..aabb.max.y.ceil() as i32 {
            for z in aabb.min.z.floor() as i32..aabb.max.z.ceil() as i32 {
                checked += 1;
                assert!(
                    !(world.is_solid(x, y, z) && aabb.intersects(&Aabb::voxel(x, y, z))),
                    "player box {:?} penetrates solid voxel ({}, {}, {})",
                    aabb,
                    x,
                    y,
                    z
                );
            }
        }
    }
    checked
}

/// Find a column near (x0, z0) whose surface block survived cave carving
/// and whose airspace is clear for the whole drop path, including any
/// overhanging canopy from neighboring trees. Returns (x, z, first air y).
fn find_landing_column(world: &World, x0: i32, z0: i32, radius: i32) -> Option<(i32, i32, i32)> {
    let biomes = world.generator().biomes();
    for x in x0 - radius..=x0 + radius {
        for z in z0 - radius..=z0 + radius {
            let height = biomes.terrain_height_at(f64::from(x), f64::from(z));
            let clear = world.is_solid(x, height - 1, z)
                && (height..height + 14).all(|y| !world.is_solid(x, y, z));
            if clear {
                return Some((x, z, height));
            }
        }
    }
    None
}

/// Settle a falling body until it lands, panicking if it never does.
fn settle(tally: &mut SimTally, player: &mut PlayerState, world: &World, max_ticks: usize) {
    for _ in 0..max_ticks {
        if tally.step(player, world).landed {
            return;
        }
    }
    panic!(
        "body at {:?} failed to land within {} ticks",
        player.position, max_ticks
    );
}

#[test]
fn collision_worldtest() {
    let test_start = Instant::now();

    println!("\n=== Collision Resolution Worldtest ===");
    println!("Configuration:");
    println!("  World seed: {:?}", SEED_TEXT);
    println!("  Tick rate: {} Hz", (1.0 / DT).round());
    println!();

    let registry = BlockRegistry::default();
    let mut world = World::from_seed_text(SEED_TEXT, &registry);
    for cx in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for cz in -CHUNK_RADIUS..=CHUNK_RADIUS {
            world.ensure_chunk(ChunkPos::new(cx, cz));
        }
    }

    let mut tally = SimTally::default();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 1: Pick a landing site on real terrain
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 1: Picking a landing site...");
    let (cx, cz, surface_y) =
        find_landing_column(&world, 8, 8, 12).expect("no clear column near the origin chunk");
    let surface_plane = f64::from(surface_y);
    println!(
        "  Column ({}, {}), surface block top at y = {}",
        cx, cz, surface_plane
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 2: Drop onto the surface
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 2: Dropping from six blocks up...");
    let spawn = DVec3::new(f64::from(cx) + 0.5, surface_plane + 6.0, f64::from(cz) + 0.5);
    let mut player = PlayerState::new(spawn);
    settle(&mut tally, &mut player, &world, 600);

    assert!(player.can_jump, "resting contact must grant a jump");
    assert_eq!(player.velocity.y, 0.0, "landing must zero vertical speed");
    assert!(
        player.position.y >= surface_plane,
        "feet sank below the surface: {} < {}",
        player.position.y,
        surface_plane
    );
    assert!(
        player.position.y - surface_plane < 1e-4,
        "feet rest too far above the surface: {}",
        player.position.y - surface_plane
    );
    let rest_y = player.position.y;
    println!("  Landed at y = {:.7} ({} steps so far)", rest_y, tally.steps);

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 3: Jump and re-land
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 3: Jumping...");
    assert!(player.jump());
    assert_eq!(player.velocity.y, JUMP_SPEED);
    assert!(!player.can_jump, "the jump consumes ground contact");
    assert!(!player.jump(), "no double jumps off one contact");

    let mut apex = rest_y;
    let mut air_ticks = 0;
    loop {
        let report = tally.step(&mut player, &world);
        apex = apex.max(player.position.y);
        air_ticks += 1;
        if report.landed {
            break;
        }
        assert!(air_ticks < 300, "jump arc never came back down");
    }

    // Discrete integration at 60 Hz peaks just under the analytic
    // JUMP_SPEED^2 / (2 * GRAVITY).
    let analytic_apex = JUMP_SPEED * JUMP_SPEED / (2.0 * GRAVITY);
    let gain = apex - rest_y;
    assert!(
        gain > analytic_apex - 0.3 && gain <= analytic_apex,
        "jump apex gain {:.3} out of range (analytic {:.3})",
        gain,
        analytic_apex
    );
    assert!(player.can_jump, "re-landing must grant the jump again");
    assert!((player.position.y - rest_y).abs() < 1e-4);
    println!(
        "  Apex gain {:.3} blocks over {} airborne ticks",
        gain, air_ticks
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 4: Walk across the terrain
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 4: Walking for 4 seconds...");
    // Head back toward the area center so 24 blocks of travel stays well
    // inside the generated 5×5 chunk grid.
    let to_center = DVec3::new(8.5 - player.position.x, 0.0, 8.5 - player.position.z);
    player.rotation.y = f64::atan2(-to_center.x, -to_center.z);

    let walk_start = player.position;
    let mut wall_hits = 0;
    for _ in 0..240 {
        player.walk(1.0, 0.0);
        let report = tally.step(&mut player, &world);
        if report.blocked_x || report.blocked_z {
            wall_hits += 1;
        }
        assert!(
            player.position.y > 0.0,
            "walker fell out of the world at {:?}",
            player.position
        );
    }
    let flat = player.position - walk_start;
    let travelled = (flat.x * flat.x + flat.z * flat.z).sqrt();
    assert!(
        travelled <= 240.0 * DT * WALK_SPEED + 1e-6,
        "walker outran its speed: {:.3} blocks",
        travelled
    );
    println!(
        "  Travelled {:.1} blocks, {} ticks touched a wall",
        travelled, wall_hits
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 5: Settle a batch of bodies across the map
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 5: Settling a batch of drops...");
    let mut settled = 0;
    for i in 0..20 {
        let x0 = -28 + (i % 5) * 14;
        let z0 = -28 + (i / 5) * 14;
        let Some((bx, bz, by)) = find_landing_column(&world, x0, z0, 6) else {
            continue;
        };
        let drop = 3.0 + f64::from(i % 5);
        let mut body = PlayerState::new(DVec3::new(
            f64::from(bx) + 0.5,
            f64::from(by) + drop,
            f64::from(bz) + 0.5,
        ));
        settle(&mut tally, &mut body, &world, 600);
        assert!(body.can_jump);
        assert!(body.position.y >= f64::from(by));
        assert!(body.position.y - f64::from(by) < 1e-4);
        settled += 1;
    }
    assert!(settled >= 15, "only {} of 20 drop sites were clear", settled);
    println!("  {} bodies settled cleanly", settled);

    // ═══════════════════════════════════════════════════════════════════════
    // Metrics Export
    // ═══════════════════════════════════════════════════════════════════════

    let test_duration = test_start.elapsed().as_secs_f64();
    let metrics = MetricsReportBuilder::new("collision_worldtest")
        .result(TestResult::Pass)
        .physics(PhysicsMetrics {
            steps: tally.steps,
            corrections: tally.corrections,
            landings: tally.landings,
            avg_step_time_us: tally.avg_step_time_us(),
        })
        .execution(TestExecutionMetrics {
            duration_seconds: test_duration,
            peak_memory_mb: None,
            assertions_checked: Some(tally.penetration_checks),
            validations_passed: Some(tally.penetration_checks),
        })
        .build();

    let metrics_path = std::env::current_dir()
        .expect("cwd")
        .join("target/metrics/collision_worldtest.json");
    let sink = MetricsSink::create(&metrics_path).expect("Failed to create metrics sink");
    sink.write(&metrics).expect("Failed to write metrics");

    // ═══════════════════════════════════════════════════════════════════════
    // Final Results
    // ═══════════════════════════════════════════════════════════════════════

    println!("\n=== Final Results ===");
    println!("Test result: {:?}", metrics.result);
    println!("Simulation steps: {}", tally.steps);
    println!("Axis corrections: {}", tally.corrections);
    println!("Landings: {}", tally.landings);
    println!("Penetration cells checked: {}", tally.penetration_checks);
    println!("Avg step time: {:.2} µs", tally.avg_step_time_us());
    println!("Duration: {:.2}s", test_duration);

    assert!(tally.landings >= 17, "expected every phase to land bodies");
    assert!(tally.corrections >= tally.landings);
}
