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

//! Crosscheck Command Line Interface

use clap::Parser;
use crosscheck_cli::cli::{Commands, GlobalArgs};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Log directive used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_DIRECTIVE: &str = "crosscheck=info";

/// Crosscheck - correctness and benchmark harness for concurrent programs
///
/// # Examples
///
/// ```bash
/// # Check the file hasher on every input in ./input
/// crosscheck check --command "go run ./src"
///
/// # Check the simulator at a looser tolerance
/// crosscheck --program nbody check input/nb-10.txt --tolerance 0.0001
///
/// # Measure hashing time over a doubling grid of workers
/// crosscheck sweep hash-times --repetitions 20
/// ```
#[derive(Parser)]
#[command(name = "crosscheck")]
#[command(author, version, about = "Crosscheck - correctness and benchmark harness for concurrent programs", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(level: Option<&str>) -> Result<(), String> {
    let directive = match level {
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("crosscheck={}", level),
        None => std::env::var(EnvFilter::DEFAULT_ENV)
            .unwrap_or_else(|_| DEFAULT_LOG_DIRECTIVE.to_string()),
    };
    let filter =
        EnvFilter::try_new(&directive).map_err(|e| format!("invalid log filter '{}': {}", directive, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Cli { global, command } = cli;
    let result =
        init_tracing(global.log_level.as_deref()).and_then(|()| command.execute(&global));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
