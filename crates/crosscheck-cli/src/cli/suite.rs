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

//! Correctness commands.

use crate::commands::{self, OutputFormat};
use crate::config::HarnessConfig;
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;

/// Correctness commands.
#[derive(Subcommand, Debug)]
pub enum SuiteCommands {
    /// Run the declared correctness cases against canonical answers
    ///
    /// Every case runs the program once and compares its output with the
    /// answer of the canonical configuration, generating missing answers
    /// first. Failures are reported and the remaining cases still run.
    Check {
        /// Input files (defaults to every *.txt in the input directory)
        #[arg(value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        /// Hash workers for the file hasher cases
        #[arg(long, value_name = "N")]
        hash_workers: Option<usize>,

        /// Accepted difference between simulator state tokens
        #[arg(long, value_name = "TOL")]
        tolerance: Option<String>,

        /// Skip the phase-sequence format cases
        #[arg(long)]
        no_format_checks: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl SuiteCommands {
    /// Execute the correctness command.
    pub fn execute(self, config: &HarnessConfig) -> Result<(), CliError> {
        match self {
            SuiteCommands::Check {
                inputs,
                hash_workers,
                tolerance,
                no_format_checks,
                format,
            } => {
                let mut config = config.clone();
                if let Some(n) = hash_workers {
                    config.suite.hash_workers = n;
                }
                if tolerance.is_some() {
                    config.tolerance = tolerance;
                }
                if no_format_checks {
                    config.suite.format_checks = false;
                }
                commands::check(&config, inputs, format)
            }
        }
    }
}
