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

//! Error types for benchmark sweeps.
//!
//! Sweep-level errors stop a sweep before or while it writes its table.
//! Point-level errors ([`BenchError::MetricNotFound`] and wrapped harness
//! errors from a run) only abort the grid point they occurred in.

use crosscheck_core::{FailureKind, HarnessError};
use std::fmt;
use std::path::PathBuf;

/// Result type for benchmarking operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur during benchmarking operations
#[derive(Debug, Clone)]
pub enum BenchError {
    /// A repetition's output does not contain the metric label
    MetricNotFound {
        /// Label searched for
        label: String,
        /// Start of the output that was searched
        excerpt: String,
    },

    /// The grid cannot be expanded for an input
    InvalidGrid {
        /// Sweep name
        sweep: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid configuration parameter
    InvalidConfig {
        /// Parameter name
        parameter: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The results table could not be written
    Table {
        /// Table path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Running or reading the program under test failed
    Harness(HarnessError),
}

impl BenchError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a table error with path context.
    pub fn table(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Table {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns the failure kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            BenchError::MetricNotFound { .. } => FailureKind::MetricNotFound,
            BenchError::InvalidGrid { .. } | BenchError::InvalidConfig { .. } => {
                FailureKind::InvalidConfig
            }
            BenchError::Table { .. } => FailureKind::Io,
            BenchError::Harness(err) => err.kind(),
        }
    }
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::MetricNotFound { label, excerpt } => {
                write!(f, "Metric '{}' not found in output: {}", label, excerpt)
            }
            BenchError::InvalidGrid { sweep, reason } => {
                write!(f, "Invalid grid for sweep '{}': {}", sweep, reason)
            }
            BenchError::InvalidConfig { parameter, reason } => {
                write!(
                    f,
                    "Invalid configuration parameter '{}': {}",
                    parameter, reason
                )
            }
            BenchError::Table { path, message } => {
                write!(f, "Failed to write table '{}': {}", path.display(), message)
            }
            BenchError::Harness(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Harness(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HarnessError> for BenchError {
    fn from(err: HarnessError) -> Self {
        BenchError::Harness(err)
    }
}
