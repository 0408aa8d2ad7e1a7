//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests write temporary mesh documents and assert error
//! handling behaviour. These helpers keep the test cases concise.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::commands::run_command;
use super::{CliError, ParamArgs, RunCommand};

/// Unit square split along its diagonal; both triangles share material `0`.
pub(super) const UNIT_SQUARE: &str = r#"{
    "vertices": [
        {"position": [0, 0, 0]},
        {"position": [1, 0, 0]},
        {"position": [1, 1, 0]},
        {"position": [0, 1, 0]}
    ],
    "triangles": [
        {"id": 10, "vertices": [0, 1, 2]},
        {"id": 11, "vertices": [0, 2, 3]}
    ]
}"#;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_mesh_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

pub(super) fn run_command_for(path: PathBuf, params: ParamArgs) -> RunCommand {
    RunCommand {
        path,
        name: None,
        params,
        color_seed: 0,
        format: super::OutputFormat::Human,
    }
}

pub(super) fn run_command_expecting_error(cmd: RunCommand, panic_msg: &str) -> CliError {
    match run_command(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
