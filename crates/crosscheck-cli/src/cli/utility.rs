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

//! Utility commands for inspecting program output and stored answers.

use crate::commands::{self, OutputFormat};
use crate::config::HarnessConfig;
use crate::error::CliError;
use clap::Subcommand;
use crosscheck_core::model::{DEFAULT_DELTA, DEFAULT_STEPS, DEFAULT_THETA};
use std::path::PathBuf;

/// Utility commands.
#[derive(Subcommand, Debug)]
pub enum UtilityCommands {
    /// Parse a saved program output and summarize it
    Parse {
        /// Output file (stdout capture, or simulator state file)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Reject lines after the last recognized section
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the canonical answer for an input, generating it if missing
    Reference {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Simulation steps
        #[arg(long, default_value_t = DEFAULT_STEPS)]
        steps: u64,

        /// Opening-angle threshold
        #[arg(long, default_value_t = DEFAULT_THETA)]
        theta: f64,

        /// Time step
        #[arg(long, default_value_t = DEFAULT_DELTA)]
        delta: f64,

        /// Print the answer text
        #[arg(long)]
        show: bool,
    },
}

impl UtilityCommands {
    /// Execute the utility command.
    pub fn execute(self, config: &HarnessConfig) -> Result<(), CliError> {
        match self {
            UtilityCommands::Parse {
                file,
                strict,
                format,
            } => commands::parse_output(config.program, &file, strict, format),
            UtilityCommands::Reference {
                input,
                steps,
                theta,
                delta,
                show,
            } => commands::reference(config, &input, steps, theta, delta, show),
        }
    }
}
