//! Worldtest metrics schema and JSON sinks.
//!
//! Every worldtest ends by assembling one [`MetricsReport`] and writing it
//! under `target/metrics/`, so throughput and determinism numbers can be
//! diffed between runs instead of vanishing into test output.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One worldtest run, with a section per subsystem it exercised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Which worldtest produced this report.
    pub test_name: String,

    /// When the run finished, RFC 3339.
    pub timestamp: String,

    /// Pass/fail verdict the assertions reached.
    pub result: TestResult,

    /// Generation numbers, when the test generated terrain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Mesh build numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meshing: Option<MeshingMetrics>,

    /// Streaming driver numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<StreamingMetrics>,

    /// Collision resolution numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physics: Option<PhysicsMetrics>,

    /// Save/load numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceMetrics>,

    /// Wall-clock and assertion bookkeeping for the run itself.
    pub test_execution: TestExecutionMetrics,
}

/// Verdict recorded in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Every assertion held.
    Pass,
    /// At least one check failed.
    Fail,
    /// The run was skipped.
    Skip,
}

/// Terrain generation throughput and coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Chunks generated during the run.
    pub chunks_generated: usize,

    /// Voxel cells visited (air included).
    pub blocks_generated: usize,

    /// Mean generation time per chunk, microseconds.
    pub avg_gen_time_us: f64,

    /// Fastest chunk, microseconds.
    pub min_gen_time_us: u128,

    /// Slowest chunk, microseconds.
    pub max_gen_time_us: u128,

    /// Time spent generating, milliseconds.
    pub total_gen_time_ms: f64,

    /// Generation throughput.
    pub chunks_per_second: f64,

    /// Distinct biomes the run touched.
    pub unique_biomes: usize,

    /// Boundary continuity checks, when the test walked seams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_validation: Option<SeamValidation>,
}

/// Height continuity across chunk boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeamValidation {
    /// Boundary column pairs compared.
    pub total_seams: usize,

    /// Pairs within the allowed step.
    pub seams_valid: usize,

    /// Pairs that jumped too far.
    pub seams_failed: usize,

    /// Largest height step seen at a boundary.
    pub max_seam_diff: i32,

    /// Mean height step across all pairs.
    pub avg_seam_diff: f64,
}

/// Mesh builder throughput and output size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshingMetrics {
    /// Meshes built during the run.
    pub chunks_meshed: usize,

    /// Mean build time per mesh, microseconds.
    pub avg_mesh_time_us: f64,

    /// Triangles across every built mesh.
    pub total_triangles: usize,

    /// Mean triangles per chunk.
    pub avg_triangles_per_chunk: f64,

    /// Vertices across every built mesh.
    pub total_vertices: usize,

    /// Draw ranges across every built mesh.
    pub total_material_groups: usize,
}

/// Streaming driver activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingMetrics {
    /// Driver steps taken.
    pub steps: usize,

    /// Chunks the driver generated.
    pub chunks_generated: usize,

    /// Chunks re-entering the view with data intact.
    pub chunks_reattached: usize,

    /// Chunks detached after leaving the view.
    pub chunks_unloaded: usize,

    /// Mesh rebuild requests handed to the caller.
    pub mesh_jobs_issued: usize,

    /// Mean step time, microseconds.
    pub avg_step_time_us: f64,
}

/// Collision resolver activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsMetrics {
    /// Simulation ticks stepped.
    pub steps: usize,

    /// Axis push-outs applied.
    pub corrections: usize,

    /// Ground contacts gained.
    pub landings: usize,

    /// Mean tick time, microseconds.
    pub avg_step_time_us: f64,
}

/// Save codec throughput.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetrics {
    /// Chunks encoded into the blob.
    pub chunks_saved: usize,

    /// Chunks decoded back out.
    pub chunks_loaded: usize,

    /// Mean encode time per chunk, microseconds.
    pub avg_save_time_us: f64,

    /// Mean decode time per chunk, microseconds.
    pub avg_load_time_us: f64,

    /// Blob bytes produced.
    pub bytes_written: u64,

    /// Blob bytes consumed.
    pub bytes_read: u64,

    /// Raw voxel bytes over blob bytes.
    pub compression_ratio: f64,
}

/// Run-level bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration, seconds.
    pub duration_seconds: f64,

    /// Peak resident memory, when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_mb: Option<f64>,

    /// Assertions the run evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Assertions that held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Assembles a [`MetricsReport`] section by section.
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a report for `test_name`, stamped now, with no sections.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                terrain: None,
                meshing: None,
                streaming: None,
                physics: None,
                persistence: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    peak_memory_mb: None,
                    assertions_checked: None,
                    validations_passed: None,
                },
            },
        }
    }

    /// Record the verdict.
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Attach the terrain section.
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Attach the meshing section.
    pub fn meshing(mut self, metrics: MeshingMetrics) -> Self {
        self.report.meshing = Some(metrics);
        self
    }

    /// Attach the streaming section.
    pub fn streaming(mut self, metrics: StreamingMetrics) -> Self {
        self.report.streaming = Some(metrics);
        self
    }

    /// Attach the physics section.
    pub fn physics(mut self, metrics: PhysicsMetrics) -> Self {
        self.report.physics = Some(metrics);
        self
    }

    /// Attach the persistence section.
    pub fn persistence(mut self, metrics: PersistenceMetrics) -> Self {
        self.report.persistence = Some(metrics);
        self
    }

    /// Attach the run bookkeeping.
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Finish the report.
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Writes one report as pretty JSON.
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Point a sink at `path`, creating missing parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Serialize `report` over whatever the path held before.
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(report)?)?;
        Ok(())
    }
}

/// Per-chunk mesh fingerprint, for cross-run comparison.
#[derive(Debug, Serialize)]
pub struct ChunkMeshMetric {
    /// Chunk coordinate, `[cx, cz]`.
    pub chunk: [i32; 2],
    /// Triangles in the chunk's mesh.
    pub triangles: usize,
    /// Mesh content hash, hex.
    pub hash: String,
}

/// Streams a list of [`ChunkMeshMetric`] entries to one JSON file.
pub struct MeshMetricSink {
    file: File,
}

impl MeshMetricSink {
    /// Open the output file at `path`, creating missing parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: File::create(path)?,
        })
    }

    /// Serialize the batch as pretty JSON.
    pub fn write(&mut self, metrics: &[ChunkMeshMetric]) -> Result<()> {
        self.file
            .write_all(serde_json::to_string_pretty(metrics)?.as_bytes())?;
        Ok(())
    }
}
