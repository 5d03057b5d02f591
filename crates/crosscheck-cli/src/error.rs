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

//! Structured error types for the Crosscheck CLI.
//!
//! Library errors from the harness and sweep crates convert into
//! [`CliError`] with `?`; command handlers render it to a message for
//! `main`.

use crosscheck_bench::BenchError;
use crosscheck_core::HarnessError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Crosscheck CLI operations.
///
/// # Examples
///
/// ```rust,no_run
/// use crosscheck_cli::error::CliError;
///
/// fn read_config(path: &str) -> Result<String, CliError> {
///     std::fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// I/O operation failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// The configuration file could not be parsed.
    #[error("Invalid config file '{path}': {message}")]
    Config {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Harness error (parsing, comparison, process execution, answers).
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Sweep engine error.
    #[error(transparent)]
    Bench(#[from] BenchError),

    /// No inputs were given and none were found.
    #[error("No inputs found in '{dir}' (expected *.txt files)")]
    NoInputs {
        /// Directory searched
        dir: PathBuf,
    },

    /// One or more suite cases failed.
    #[error("{failed} of {total} cases failed")]
    SuiteFailed {
        /// Failed or errored cases
        failed: usize,
        /// Cases run
        total: usize,
    },

    /// One or more sweep points produced no row.
    #[error("Sweep '{name}' skipped {skipped} point(s)")]
    SweepIncomplete {
        /// Sweep name
        name: String,
        /// Points without a row
        skipped: usize,
    },

    /// Neither a sweep name nor a definition file was given.
    #[error("No sweep given (pass a NAME or --definition FILE)")]
    MissingSweep,

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(String),
}

impl CliError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a JSON error.
    pub fn json(source: serde_json::Error) -> Self {
        Self::Json(source.to_string())
    }
}
