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

//! Benchmark commands.

use crate::commands::{self, OutputFormat, SweepSource};
use crate::config::HarnessConfig;
use crate::error::CliError;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Benchmark commands.
#[derive(Subcommand, Debug)]
pub enum BenchCommands {
    /// Run a benchmark sweep and write its timings table
    ///
    /// Each grid point runs the program repeatedly and records the mean and
    /// sample standard deviation of the sweep's metric.
    Sweep {
        #[command(flatten)]
        target: SweepTarget,

        /// Replace the sweep's inputs
        #[arg(long = "input", value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Repetitions per grid point
        #[arg(short, long, value_name = "N")]
        repetitions: Option<usize>,

        /// Summary format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the built-in sweeps
    Sweeps {
        /// Print each definition as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Exactly one of a built-in sweep name or a definition file.
#[derive(Args, Debug, Default, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct SweepTarget {
    /// Built-in sweep name (see `crosscheck sweeps`)
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Load the sweep from a JSON definition instead
    #[arg(long, value_name = "FILE")]
    pub definition: Option<PathBuf>,
}

impl TryFrom<SweepTarget> for SweepSource {
    type Error = CliError;

    fn try_from(target: SweepTarget) -> Result<Self, CliError> {
        match (target.definition, target.name) {
            (Some(path), None) => Ok(SweepSource::Definition(path)),
            (None, Some(name)) => Ok(SweepSource::Builtin(name)),
            _ => Err(CliError::MissingSweep),
        }
    }
}

impl BenchCommands {
    /// Execute the benchmark command.
    pub fn execute(self, config: &HarnessConfig) -> Result<(), CliError> {
        match self {
            BenchCommands::Sweep {
                target,
                inputs,
                repetitions,
                format,
            } => {
                let source = SweepSource::try_from(target)?;
                commands::sweep(config, source, inputs, repetitions, format)
            }
            BenchCommands::Sweeps { json } => commands::list_sweeps(config, json),
        }
    }
}
