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

//! CLI command definitions and argument parsing.
//!
//! Commands are grouped by what they do:
//!
//! - [`suite`]: correctness checking (check)
//! - [`bench`]: benchmark sweeps (sweep, sweeps)
//! - [`utility`]: inspecting outputs and answers (parse, reference)

mod bench;
mod suite;
mod utility;

use crate::config::HarnessConfig;
use clap::{Args, Subcommand};
use crosscheck_core::ProgramKind;
use std::path::PathBuf;

pub use bench::BenchCommands;
pub use suite::SuiteCommands;
pub use utility::UtilityCommands;

/// Options shared by every command. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Program under test (file-hasher or nbody)
    #[arg(long, global = true, value_name = "KIND")]
    pub program: Option<ProgramKind>,

    /// Command line of the program under test, split on whitespace
    #[arg(long, global = true, value_name = "COMMAND")]
    pub command: Option<String>,

    /// File hasher flag preset (basic, legacy or per-phase)
    #[arg(long, global = true, value_name = "PRESET")]
    pub capabilities: Option<String>,

    /// Directory canonical answers are stored in
    #[arg(long, global = true, value_name = "DIR")]
    pub answers_dir: Option<PathBuf>,

    /// Directory inputs are discovered in
    #[arg(long, global = true, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory results tables are written to
    #[arg(long, global = true, value_name = "DIR")]
    pub timings_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `crosscheck_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Top-level CLI commands.
///
/// ```text
/// Commands
/// ├── Suite (check)
/// ├── Bench (sweep, sweeps)
/// └── Utility (parse, reference)
/// ```
#[derive(Subcommand, Debug)]
pub enum Commands {
    // Correctness commands - flattened to appear at top level
    #[command(flatten)]
    Suite(SuiteCommands),

    // Benchmark commands - flattened to appear at top level
    #[command(flatten)]
    Bench(BenchCommands),

    // Utility commands - flattened to appear at top level
    #[command(flatten)]
    Utility(UtilityCommands),
}

impl Commands {
    /// Resolves the configuration and runs the command.
    ///
    /// # Errors
    ///
    /// Returns the error message if the configuration is invalid or the
    /// command fails.
    pub fn execute(self, global: &GlobalArgs) -> Result<(), String> {
        let config = HarnessConfig::resolve(global).map_err(|e| e.to_string())?;
        let result = match self {
            Commands::Suite(cmd) => cmd.execute(&config),
            Commands::Bench(cmd) => cmd.execute(&config),
            Commands::Utility(cmd) => cmd.execute(&config),
        };
        result.map_err(|e| e.to_string())
    }
}
