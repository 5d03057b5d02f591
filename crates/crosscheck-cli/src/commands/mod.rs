// Dweve Crosscheck - Correctness and benchmark harness for concurrent programs
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command implementations for the Crosscheck CLI.
//!
//! Each command prints its report to stdout and returns a [`CliError`] when
//! the run should exit with a failure status. Logs go to stderr.

mod check;
mod parse;
mod reference;
mod sweep;

use crate::error::CliError;
use clap::ValueEnum;
use crosscheck_core::read_bounded;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use check::check;
pub use parse::parse_output;
pub use reference::reference;
pub use sweep::{list_sweeps, sweep, SweepSource};

/// Extension of input files picked up by directory discovery.
pub const INPUT_EXTENSION: &str = "txt";

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Reads a file, refusing files above `CROSSCHECK_MAX_OUTPUT_SIZE` bytes.
pub fn read_file(path: &Path) -> Result<String, CliError> {
    Ok(read_bounded(path)?)
}

/// Lists the `*.txt` files of `dir` in name order.
///
/// # Errors
///
/// Returns [`CliError::NoInputs`] if the directory holds no input files.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(dir).map_err(|e| CliError::io_error(dir, e))?;
    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CliError::io_error(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == INPUT_EXTENSION) {
            inputs.push(path);
        }
    }
    if inputs.is_empty() {
        return Err(CliError::NoInputs {
            dir: dir.to_path_buf(),
        });
    }
    inputs.sort();
    Ok(inputs)
}

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::json)?;
    println!("{}", json);
    Ok(())
}
