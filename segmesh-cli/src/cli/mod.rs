//! Command-line interface orchestration for segmesh.
//!
//! The CLI offers a `run` command that loads a JSON mesh document, segments
//! its selected triangles, and prints the partition.

mod commands;
mod mesh_file;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, OutputFormat, ParamArgs, RunCommand, render_summary,
    run_cli,
};
pub use mesh_file::{MeshDocument, TriangleRecord, VertexRecord, load_mesh};

#[cfg(test)]
mod test_helpers;
