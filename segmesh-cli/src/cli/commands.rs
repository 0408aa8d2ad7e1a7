//! Command implementations and argument parsing for the segmesh CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use segmesh_core::{
    GroupId, MeshError, MeshSource, Rgba, SegmentationError, SegmenterBuilder, Segmentation,
    Termination, assign_colors,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::mesh_file::load_mesh;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "segmesh", about = "Segment mesh triangles by greedy region merging.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Segment the selected triangles of a JSON mesh document.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to the JSON mesh document.
    pub path: PathBuf,

    /// Override name for the mesh (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,

    /// Segmentation parameters; omitted values keep the library defaults.
    #[command(flatten)]
    pub params: ParamArgs,

    /// Seed for shuffling the segment palette (`0` keeps its canonical order).
    #[arg(long = "color-seed", default_value_t = 0)]
    pub color_seed: u64,

    /// Output format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Segmentation parameters exposed as flags.
#[derive(Debug, Args, Clone, Default)]
pub struct ParamArgs {
    /// Highest normalized contact cost that may still be merged.
    #[arg(long, allow_negative_numbers = true)]
    pub cost_threshold: Option<f64>,

    /// Combined-area ceiling for merges whose source exceeds the minimum.
    #[arg(long)]
    pub maximum_area_threshold: Option<f64>,

    /// Sources at or below this area may always be absorbed.
    #[arg(long)]
    pub minimum_area_threshold: Option<f64>,

    /// Scale of the shared-length divisor (`0` disables normalisation).
    #[arg(long)]
    pub contact_length_factor: Option<f64>,

    /// Weight of the elongation penalty.
    #[arg(long)]
    pub perimeter_cost_factor: Option<f64>,

    /// Weight of vertex-group weight differences.
    #[arg(long)]
    pub vertex_group_weight_factor: Option<f64>,

    /// Weight of heaviest-group changes.
    #[arg(long)]
    pub vertex_group_change_factor: Option<f64>,

    /// Weight of the dihedral angle between faces.
    #[arg(long)]
    pub face_angle_factor: Option<f64>,

    /// Weight of material changes.
    #[arg(long)]
    pub material_change_factor: Option<f64>,

    /// Weight of sharp edge markings.
    #[arg(long)]
    pub edge_sharp_factor: Option<f64>,

    /// Weight of seam edge markings.
    #[arg(long)]
    pub edge_seam_factor: Option<f64>,

    /// Vertex group to exclude from weight costs; may be repeated.
    #[arg(long = "ignore-group", value_name = "GROUP")]
    pub ignore_groups: Vec<u32>,

    /// Stop after this many merges.
    #[arg(long)]
    pub max_merges: Option<usize>,
}

type Setter = fn(SegmenterBuilder, f64) -> SegmenterBuilder;

impl ParamArgs {
    /// Applies every supplied flag on top of the library defaults.
    #[must_use]
    pub fn to_builder(&self) -> SegmenterBuilder {
        let settings: [(Option<f64>, Setter); 11] = [
            (self.cost_threshold, SegmenterBuilder::with_cost_threshold),
            (self.maximum_area_threshold, SegmenterBuilder::with_maximum_area_threshold),
            (self.minimum_area_threshold, SegmenterBuilder::with_minimum_area_threshold),
            (self.contact_length_factor, SegmenterBuilder::with_contact_length_factor),
            (self.perimeter_cost_factor, SegmenterBuilder::with_perimeter_cost_factor),
            (self.vertex_group_weight_factor, SegmenterBuilder::with_vertex_group_weight_factor),
            (self.vertex_group_change_factor, SegmenterBuilder::with_vertex_group_change_factor),
            (self.face_angle_factor, SegmenterBuilder::with_face_angle_factor),
            (self.material_change_factor, SegmenterBuilder::with_material_change_factor),
            (self.edge_sharp_factor, SegmenterBuilder::with_edge_sharp_factor),
            (self.edge_seam_factor, SegmenterBuilder::with_edge_seam_factor),
        ];
        let builder = settings
            .into_iter()
            .fold(SegmenterBuilder::new(), |builder, (value, set)| match value {
                Some(value) => set(builder, value),
                None => builder,
            })
            .with_ignored_vertex_groups(self.ignore_groups.iter().copied().map(GroupId::new));
        match self.max_merges {
            Some(merges) => builder.with_max_merges(merges),
            None => builder,
        }
    }
}

/// Output formats supported by [`render_summary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text for terminals.
    #[default]
    Human,
    /// A single JSON object.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The mesh document could not be read.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The mesh document is not valid JSON or does not match the schema.
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The mesh geometry failed validation.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// Configuration or segmentation failed.
    #[error(transparent)]
    Core(#[from] SegmentationError),
}

impl CliError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CLI_IO",
            Self::Parse { .. } => "CLI_PARSE",
            Self::Mesh(error) => error.code().as_str(),
            Self::Core(error) => error.code().as_str(),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported by the mesh.
    pub mesh: String,
    /// Partition produced by the segmenter.
    pub segmentation: Segmentation,
    /// One color per segment, in segment order.
    pub colors: Vec<Rgba>,
    /// Requested output format.
    pub format: OutputFormat,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, configuration, or segmentation fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use segmesh_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     r#"{"vertices": [{"position": [0, 0, 0]}, {"position": [1, 0, 0]}, {"position": [0, 1, 0]}],
///         "triangles": [{"id": 0, "vertices": [0, 1, 2]}]}"#,
/// )?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from(["segmesh", "run", path.as_str()])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.segmentation.segments().len(), 1);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(path = field::Empty, format = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let segmenter = command.params.to_builder().build()?;

    let span = Span::current();
    span.record("path", field::display(command.path.display()));
    span.record("format", field::debug(command.format));

    let name = derive_mesh_name(&command.path, command.name.as_deref());
    let mesh = load_mesh(&command.path, name)?;
    let segmentation = segmenter.segment(&mesh)?;
    let colors = assign_colors(&segmentation, command.color_seed);

    info!(
        mesh = mesh.name(),
        segments = segmentation.segments().len(),
        "command completed"
    );
    Ok(ExecutionSummary {
        mesh: mesh.name().to_owned(),
        segmentation,
        colors,
        format: command.format,
    })
}

pub(super) fn derive_mesh_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "mesh".to_owned())
}

const fn termination_label(termination: Termination) -> &'static str {
    match termination {
        Termination::FixedPoint => "fixed-point",
        Termination::Cancelled => "cancelled",
        Termination::BudgetExhausted => "budget-exhausted",
    }
}

#[derive(Serialize)]
struct Report<'a> {
    mesh: &'a str,
    termination: &'static str,
    merge_count: usize,
    rejected_merge_checks: usize,
    last_merged_cost: f64,
    remaining_contacts: usize,
    segments: Vec<SegmentReport>,
}

#[derive(Serialize)]
struct SegmentReport {
    triangles: Vec<u64>,
    area: f64,
    perimeter: f64,
    color: [f32; 4],
}

impl<'a> Report<'a> {
    fn new(summary: &'a ExecutionSummary) -> Self {
        let segmentation = &summary.segmentation;
        let segments = segmentation
            .segments()
            .iter()
            .zip(&summary.colors)
            .map(|(segment, color)| SegmentReport {
                triangles: segment.triangles().iter().map(|id| id.get()).collect(),
                area: segment.area(),
                perimeter: segment.perimeter(),
                color: [color.red, color.green, color.blue, color.alpha],
            })
            .collect();
        Self {
            mesh: &summary.mesh,
            termination: termination_label(segmentation.termination()),
            merge_count: segmentation.merge_count(),
            rejected_merge_checks: segmentation.rejected_merge_checks(),
            last_merged_cost: segmentation.last_merged_cost(),
            remaining_contacts: segmentation.remaining_contacts().len(),
            segments,
        }
    }
}

/// Renders `summary` to `writer` in the requested format.
///
/// The human format prints a header followed by one tab-separated line per
/// segment: index, triangle count, area, and comma-separated triangle ids.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary.format {
        OutputFormat::Human => render_human(summary, writer),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &Report::new(summary))?;
            writeln!(writer)
        }
    }
}

fn render_human(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let segmentation = &summary.segmentation;
    writeln!(writer, "mesh: {}", summary.mesh)?;
    writeln!(writer, "segments: {}", segmentation.segments().len())?;
    writeln!(writer, "merges: {}", segmentation.merge_count())?;
    writeln!(writer, "remaining contacts: {}", segmentation.remaining_contacts().len())?;
    writeln!(writer, "termination: {}", termination_label(segmentation.termination()))?;
    for (index, segment) in segmentation.segments().iter().enumerate() {
        let ids: Vec<String> = segment.triangles().iter().map(ToString::to_string).collect();
        writeln!(
            writer,
            "{index}\t{}\t{:.6}\t{}",
            segment.triangles().len(),
            segment.area(),
            ids.join(",")
        )?;
    }
    Ok(())
}
