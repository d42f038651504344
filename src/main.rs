//! voxelforge - a deterministic, headless voxel world engine
//!
//! Command-line driver: survey generated terrain, run a fixed-tick player
//! session, or push a world through the save pipeline and back.

mod config;
mod container;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::DVec3;
use tracing::info;

use config::EngineConfig;
use voxelforge_core::{BlockRegistry, WorldSeed};
use voxelforge_mesh::{service_step, SceneCache};
use voxelforge_physics::PlayerState;
use voxelforge_world::{
    chunk_of_position, decode_save, encode_save, BiomeSet, ChunkPos, ChunkStreamer, PlayerRecord,
    StreamConfig, TerrainGenerator, World, MAX_HEIGHT,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic, headless voxel world engine", long_about = None)]
struct Cli {
    /// Engine config file (TOML); missing keys fall back to defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and mesh the view around the origin, then print a survey
    Generate {
        /// Seed text (overrides the config file)
        #[arg(long)]
        seed: Option<String>,

        /// Chunk radius to generate (overrides the config file)
        #[arg(long)]
        radius: Option<i32>,
    },
    /// Run a fixed-tick walking session over streamed terrain
    Simulate {
        /// Seed text (overrides the config file)
        #[arg(long)]
        seed: Option<String>,

        /// Session length in ticks
        #[arg(long, default_value_t = 600)]
        ticks: u32,

        /// Write the session's end state to this save file
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
    /// Checkpoint a fresh world to a save file
    Save {
        /// Seed text (overrides the config file)
        #[arg(long)]
        seed: Option<String>,

        /// Save file path (overrides the config file)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Restore a save file and stream the view around the saved player
    Load {
        /// Save file path (overrides the config file)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // WARN by default; override via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting voxelforge v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_path(path),
        None => EngineConfig::load(),
    };

    match cli.command {
        Command::Generate { seed, radius } => generate(&config, seed, radius),
        Command::Simulate {
            seed,
            ticks,
            save_to,
        } => simulate(&config, seed, ticks, save_to),
        Command::Save { seed, path } => save(&config, seed, path),
        Command::Load { path } => load(&config, path),
    }
}

/// World from the configured seed and biome roster.
fn build_world(
    config: &EngineConfig,
    seed_text: String,
    registry: &BlockRegistry,
) -> Result<World> {
    match config::load_biome_overrides(std::path::Path::new(&config.biomes_path)) {
        Some(overrides) => {
            let seed = WorldSeed::from_str_seed(&seed_text);
            let biomes = BiomeSet::from_configs(&overrides, seed, registry)?;
            info!(
                "Loaded {} biome overrides from {}",
                overrides.len(),
                config.biomes_path
            );
            Ok(World::from_seed_text_with_generator(
                seed_text,
                TerrainGenerator::with_biomes(seed, biomes),
            ))
        }
        None => Ok(World::from_seed_text(seed_text, registry)),
    }
}

/// Step the streamer until the view around `center` is generated and every
/// mesh job has been served.
fn settle_view(
    world: &mut World,
    streamer: &mut ChunkStreamer,
    scene: &mut SceneCache,
    registry: &BlockRegistry,
    center: ChunkPos,
) -> Result<()> {
    let mut steps = 0usize;
    loop {
        let report = streamer.step(world, center);
        service_step(world, &report, registry, scene);
        if report.is_idle() {
            return Ok(());
        }
        steps += 1;
        anyhow::ensure!(steps < 1_000_000, "streaming failed to settle");
    }
}

/// Topmost solid block in a column, if the column is resident.
fn surface_height(world: &World, x: i32, z: i32) -> Option<i32> {
    (0..=MAX_HEIGHT)
        .rev()
        .find(|&y| world.block_at(x, y, z).is_some())
}

fn generate(config: &EngineConfig, seed: Option<String>, radius: Option<i32>) -> Result<()> {
    let seed_text = seed.unwrap_or_else(|| config.seed.clone());
    let radius = radius.unwrap_or(config.view_radius);

    let registry = BlockRegistry::default();
    let mut world = build_world(config, seed_text, &registry)?;
    let mut streamer = ChunkStreamer::new(StreamConfig {
        view_radius: radius,
        work_budget: config.work_budget,
    });
    let mut scene = SceneCache::new();

    info!("Generating radius {} around the origin", radius);
    settle_view(
        &mut world,
        &mut streamer,
        &mut scene,
        &registry,
        ChunkPos::new(0, 0),
    )?;

    let solid: usize = world.chunks().map(|c| c.solid_count()).sum();
    let groups: usize = scene.iter_visible().map(|(_, m)| m.groups.len()).sum();
    let surface = surface_height(&world, 0, 0).context("origin column never generated")?;

    println!("Seed: {:?}", world.seed_text());
    println!("Chunks generated: {}", world.chunk_count());
    println!("Solid voxels: {}", solid);
    println!("Surface at origin: y={}", surface);
    println!(
        "Meshes: {} ({} triangles, {} draw ranges)",
        scene.visible_count(),
        scene.visible_triangles(),
        groups
    );
    Ok(())
}

fn simulate(
    config: &EngineConfig,
    seed: Option<String>,
    ticks: u32,
    save_to: Option<PathBuf>,
) -> Result<()> {
    let seed_text = seed.unwrap_or_else(|| config.seed.clone());
    let dt = config.tick_seconds();

    let registry = BlockRegistry::default();
    let mut world = build_world(config, seed_text, &registry)?;
    let mut streamer = ChunkStreamer::new(StreamConfig {
        view_radius: config.view_radius,
        work_budget: config.work_budget,
    });
    let mut scene = SceneCache::new();

    settle_view(
        &mut world,
        &mut streamer,
        &mut scene,
        &registry,
        ChunkPos::new(0, 0),
    )?;

    let surface = surface_height(&world, 8, 8).context("spawn column never generated")?;
    let spawn = DVec3::new(8.5, f64::from(surface) + 3.0, 8.5);
    let mut player = PlayerState::new(spawn);
    info!(
        "Spawning at ({:.1}, {:.1}, {:.1}) over surface y={}",
        spawn.x, spawn.y, spawn.z, surface
    );

    let mut landings = 0usize;
    let mut corrections = 0usize;
    let mut jumps = 0usize;
    for tick in 0..ticks {
        let center = chunk_of_position(player.position.x, player.position.z);
        let report = streamer.step(&mut world, center);
        service_step(&mut world, &report, &registry, &mut scene);

        if tick % 180 == 0 && player.jump() {
            jumps += 1;
        }
        player.walk(1.0, 0.0);
        let moved = player.step(dt, |x, y, z| world.is_solid(x, y, z));
        corrections += moved.corrections();
        if moved.landed {
            landings += 1;
        }
    }

    let flat = player.position - spawn;
    let walked = (flat.x * flat.x + flat.z * flat.z).sqrt();
    println!("Seed: {:?}", world.seed_text());
    println!("Ticks simulated: {} at {} Hz", ticks, config.tick_rate);
    println!(
        "Final position: ({:.2}, {:.2}, {:.2})",
        player.position.x, player.position.y, player.position.z
    );
    println!("Distance walked: {:.1} blocks", walked);
    println!(
        "Contacts: {} landings, {} corrections, {} jumps",
        landings, corrections, jumps
    );
    println!(
        "Scene: {} meshes, {} triangles",
        scene.visible_count(),
        scene.visible_triangles()
    );

    if let Some(save_to) = save_to {
        let record = PlayerRecord {
            position: player.position.to_array(),
            velocity: player.velocity.to_array(),
            rotation: player.rotation.to_array(),
            can_jump: player.can_jump,
            inventory: None,
        };
        let blob = encode_save(&world, &record)?;
        container::write_save(&save_to, &blob)?;
        println!("Session saved to {}", save_to.display());
    }
    Ok(())
}

fn save(config: &EngineConfig, seed: Option<String>, path: Option<PathBuf>) -> Result<()> {
    let seed_text = seed.unwrap_or_else(|| config.seed.clone());
    let path = path.unwrap_or_else(|| PathBuf::from(&config.save_path));

    let registry = BlockRegistry::default();
    let mut world = build_world(config, seed_text, &registry)?;
    let mut streamer = ChunkStreamer::new(StreamConfig {
        view_radius: config.view_radius,
        work_budget: config.work_budget,
    });
    let mut scene = SceneCache::new();
    settle_view(
        &mut world,
        &mut streamer,
        &mut scene,
        &registry,
        ChunkPos::new(0, 0),
    )?;

    let surface = surface_height(&world, 8, 8).context("spawn column never generated")?;
    let record = PlayerRecord {
        position: [8.5, f64::from(surface) + 1.0, 8.5],
        velocity: [0.0; 3],
        rotation: [0.0; 3],
        can_jump: true,
        inventory: None,
    };

    let blob = encode_save(&world, &record)?;
    container::write_save(&path, &blob)?;
    let written = std::fs::metadata(&path)
        .context("save file missing after write")?
        .len();

    println!("Seed: {:?}", world.seed_text());
    println!(
        "Saved {} modified chunks ({} blob chars, {} bytes on disk)",
        world.modified_chunks().count(),
        blob.len(),
        written
    );
    println!("Save file: {}", path.display());
    Ok(())
}

fn load(config: &EngineConfig, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(&config.save_path));

    let registry = BlockRegistry::default();
    let text = container::read_save(&path)?;
    let restored = decode_save(&text, &registry)?.context("save decoded to an empty world")?;
    let mut world = restored.world;
    let record = restored.player;

    // A stable blob re-encodes to the same bytes it was decoded from.
    let again = encode_save(&world, &record)?;
    anyhow::ensure!(again == text, "save blob is not a fixed point");

    let restored_chunks = world.modified_chunks().count();
    let mut streamer = ChunkStreamer::new(StreamConfig {
        view_radius: config.view_radius,
        work_budget: config.work_budget,
    });
    let mut scene = SceneCache::new();
    let center = chunk_of_position(record.position[0], record.position[2]);
    settle_view(&mut world, &mut streamer, &mut scene, &registry, center)?;

    println!("Seed: {:?}", world.seed_text());
    println!("Restored {} modified chunks", restored_chunks);
    println!(
        "Player at ({:.2}, {:.2}, {:.2})",
        record.position[0], record.position[1], record.position[2]
    );
    println!(
        "Scene: {} meshes, {} triangles",
        scene.visible_count(),
        scene.visible_triangles()
    );
    println!("Round trip stable: load -> save is byte-identical");
    Ok(())
}
