//! Determinism Validation Worldtest
//!
//! This test validates that world generation is completely deterministic.
//! Focus areas:
//! - Same seed produces identical chunks
//! - Chunk generation order independence
//! - Noise field double-evaluation consistency
//! - Biome assignment and height reproducibility
//! - Voxel data exact matching
//! - Idempotent residency (no regeneration of live chunks)

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use voxelforge_core::{blocks, BlockRegistry, WorldSeed};
use voxelforge_testkit::{
    MetricsReportBuilder, MetricsSink, TerrainMetrics, TestExecutionMetrics, TestResult,
};
use voxelforge_world::{
    ChunkPos, EnsureOutcome, MutationSource, TerrainGenerator, World, CHUNK_VOLUME,
};

const SEED_TEXT: &str = "11223344556677";
const CHUNK_RADIUS: i32 = 4; // 9×9 grid = 81 chunks

#[test]
fn determinism_worldtest() {
    let test_start = Instant::now();

    println!("\n=== Determinism Validation Worldtest ===");
    println!("Configuration:");
    println!("  World seed: {:?}", SEED_TEXT);
    println!(
        "  Chunk radius: {} ({}×{} grid)",
        CHUNK_RADIUS,
        CHUNK_RADIUS * 2 + 1,
        CHUNK_RADIUS * 2 + 1
    );
    println!();

    let registry = BlockRegistry::default();
    let seed = WorldSeed::from_str_seed(SEED_TEXT);

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 1: Initial Generation (Sequential)
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 1: Initial generation (sequential order)...");
    let phase1_start = Instant::now();

    let generator = TerrainGenerator::new(seed, &registry);
    let mut chunks_sequential = Vec::new();
    let mut positions = Vec::new();
    let mut generation_times = Vec::new();

    for chunk_z in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for chunk_x in -CHUNK_RADIUS..=CHUNK_RADIUS {
            let pos = ChunkPos::new(chunk_x, chunk_z);
            positions.push(pos);

            let gen_start = Instant::now();
            let chunk = generator.generate_chunk(pos);
            generation_times.push(gen_start.elapsed().as_micros());

            chunks_sequential.push(chunk);
        }
    }

    let chunks_generated = chunks_sequential.len();
    let blocks_generated = chunks_generated * CHUNK_VOLUME;
    let avg_gen_time_us = generation_times.iter().sum::<u128>() as f64 / chunks_generated as f64;

    println!("  Completed in {:.2}s", phase1_start.elapsed().as_secs_f64());
    println!("  Chunks: {}", chunks_generated);
    println!("  Avg: {:.2}ms/chunk", avg_gen_time_us / 1000.0);
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 2: Regeneration (Fresh Generator, Randomized Order)
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 2: Regeneration (fresh generator, randomized order)...");
    let phase2_start = Instant::now();

    // Different generator instance and different order: neither may matter.
    let mut randomized_positions = positions.clone();
    let mix = 6364136223846793005u64;
    for i in 0..randomized_positions.len() {
        let j = ((i as u64).wrapping_mul(mix) % randomized_positions.len() as u64) as usize;
        randomized_positions.swap(i, j);
    }

    let regen = TerrainGenerator::new(WorldSeed::from_str_seed(SEED_TEXT), &registry);
    let mut chunks_randomized = HashMap::new();
    for pos in &randomized_positions {
        chunks_randomized.insert(*pos, regen.generate_chunk(*pos));
    }

    println!("  Completed in {:.2}s", phase2_start.elapsed().as_secs_f64());
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 3: Voxel-Level Comparison
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 3: Voxel-level comparison...");
    let phase3_start = Instant::now();

    let mut voxel_mismatches = 0usize;
    let mut total_voxels_checked = 0usize;
    let mut chunks_with_mismatches = 0usize;

    for (idx, original) in chunks_sequential.iter().enumerate() {
        let pos = positions[idx];
        let regenerated = chunks_randomized.get(&pos).unwrap();

        assert_eq!(
            original.position(),
            regenerated.position(),
            "Chunk positions must match"
        );
        assert_eq!(original.raw_voxels().len(), CHUNK_VOLUME);

        let mismatches = original
            .raw_voxels()
            .iter()
            .zip(regenerated.raw_voxels())
            .filter(|(a, b)| a != b)
            .count();

        total_voxels_checked += CHUNK_VOLUME;
        voxel_mismatches += mismatches;
        if mismatches > 0 {
            chunks_with_mismatches += 1;
        }
    }

    let fidelity_rate =
        (total_voxels_checked - voxel_mismatches) as f64 / total_voxels_checked as f64 * 100.0;

    println!("  Completed in {:.2}s", phase3_start.elapsed().as_secs_f64());
    println!("  Total voxels checked: {}", total_voxels_checked);
    println!("  Mismatches: {}", voxel_mismatches);
    println!("  Fidelity: {:.12}%", fidelity_rate);
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 4: Noise Field Double-Evaluation
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 4: Noise field double-evaluation...");
    let phase4_start = Instant::now();

    let gen_a = TerrainGenerator::new(WorldSeed::from_str_seed(SEED_TEXT), &registry);
    let gen_b = TerrainGenerator::new(WorldSeed::from_str_seed(SEED_TEXT), &registry);

    let mut noise_mismatches = 0usize;
    let mut noise_samples = 0usize;
    for wx in (-200..200).step_by(13) {
        for wz in (-200..200).step_by(13) {
            let (x, z) = (wx as f64, wz as f64);
            noise_samples += 3;
            if gen_a.biomes().temperature(x, z) != gen_b.biomes().temperature(x, z) {
                noise_mismatches += 1;
            }
            if gen_a.biomes().terrain_height_at(x, z) != gen_b.biomes().terrain_height_at(x, z) {
                noise_mismatches += 1;
            }
            if gen_a.caves().is_cave(wx, 40, wz) != gen_b.caves().is_cave(wx, 40, wz) {
                noise_mismatches += 1;
            }
        }
    }

    println!("  Completed in {:.2}s", phase4_start.elapsed().as_secs_f64());
    println!("  Samples: {}", noise_samples);
    println!("  Mismatches: {}", noise_mismatches);
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 5: Biome & Height Consistency
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 5: Biome and height consistency...");
    let phase5_start = Instant::now();

    let mut biome_mismatches = 0usize;
    let mut height_violations = 0usize;
    let mut biome_samples = 0usize;
    let mut seen_biomes = HashSet::new();

    for wx in (-400..400).step_by(17) {
        for wz in (-400..400).step_by(17) {
            let (x, z) = (wx as f64, wz as f64);
            biome_samples += 1;

            let name_a = gen_a.biomes().biome_at(x, z).name.clone();
            let name_b = gen_b.biomes().biome_at(x, z).name.clone();
            if name_a != name_b {
                biome_mismatches += 1;
            }
            seen_biomes.insert(name_a);

            let height = gen_a.biomes().terrain_height_at(x, z);
            if !(1..=256).contains(&height) {
                height_violations += 1;
            }
        }
    }

    println!("  Completed in {:.2}s", phase5_start.elapsed().as_secs_f64());
    println!("  Samples: {}", biome_samples);
    println!("  Distinct biomes: {}", seen_biomes.len());
    println!("  Mismatches: {}", biome_mismatches);
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Phase 6: Idempotent Residency (Seed "42")
    // ═══════════════════════════════════════════════════════════════════════

    println!("Phase 6: Idempotent residency...");
    let phase6_start = Instant::now();

    let mut world = World::from_seed_text("42", &registry);
    let origin = ChunkPos::new(0, 0);
    assert_eq!(world.ensure_chunk(origin), EnsureOutcome::Generated);

    let baseline_solids = world.chunk(origin).unwrap().solid_count();
    assert!(world.place(blocks::WOOD, 3, 250, 3, MutationSource::Player));

    // A live chunk must never be regenerated underneath its edits.
    assert_eq!(world.ensure_chunk(origin), EnsureOutcome::Resident);
    assert_eq!(world.chunk(origin).unwrap().solid_count(), baseline_solids + 1);
    assert_eq!(world.block_at(3, 250, 3), Some(blocks::WOOD));
    assert_eq!(world.chunk_count(), 1);

    println!("  Completed in {:.2}s", phase6_start.elapsed().as_secs_f64());
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Build Metrics Report
    // ═══════════════════════════════════════════════════════════════════════

    let test_duration = test_start.elapsed().as_secs_f64();
    let test_passed = voxel_mismatches == 0
        && noise_mismatches == 0
        && biome_mismatches == 0
        && height_violations == 0;

    let metrics = MetricsReportBuilder::new("determinism_worldtest")
        .result(if test_passed {
            TestResult::Pass
        } else {
            TestResult::Fail
        })
        .terrain(TerrainMetrics {
            chunks_generated: chunks_generated * 2,
            blocks_generated,
            avg_gen_time_us,
            min_gen_time_us: *generation_times.iter().min().unwrap(),
            max_gen_time_us: *generation_times.iter().max().unwrap(),
            total_gen_time_ms: generation_times.iter().sum::<u128>() as f64 / 1000.0,
            chunks_per_second: chunks_generated as f64
                / (generation_times.iter().sum::<u128>() as f64 / 1_000_000.0),
            unique_biomes: seen_biomes.len(),
            seam_validation: None,
        })
        .execution(TestExecutionMetrics {
            duration_seconds: test_duration,
            peak_memory_mb: None,
            assertions_checked: Some(total_voxels_checked + noise_samples + biome_samples),
            validations_passed: Some(total_voxels_checked - voxel_mismatches),
        })
        .build();

    let metrics_path = std::env::current_dir()
        .unwrap()
        .join("target/metrics/determinism_worldtest.json");
    let sink = MetricsSink::create(&metrics_path).expect("Failed to create metrics sink");
    sink.write(&metrics).expect("Failed to write metrics");

    // ═══════════════════════════════════════════════════════════════════════
    // Final Results
    // ═══════════════════════════════════════════════════════════════════════

    println!("=== Final Results ===");
    println!("Test result: {:?}", metrics.result);
    println!("Total duration: {:.2}s", test_duration);
    println!(
        "Voxel fidelity: {:.12}% ({}/{} voxels)",
        fidelity_rate,
        total_voxels_checked - voxel_mismatches,
        total_voxels_checked
    );
    println!("Metrics: {:?}", metrics_path);
    println!();

    // ═══════════════════════════════════════════════════════════════════════
    // Assertions
    // ═══════════════════════════════════════════════════════════════════════

    assert_eq!(
        voxel_mismatches, 0,
        "All voxels must match exactly between generations"
    );
    assert_eq!(chunks_with_mismatches, 0, "No chunks should have any mismatches");
    assert_eq!(noise_mismatches, 0, "Noise fields must double-evaluate identically");
    assert_eq!(biome_mismatches, 0, "Biome assignment must be deterministic");
    assert_eq!(height_violations, 0, "All heights must lie in [1, 256]");
    assert!(test_passed, "All determinism checks must pass");
}
