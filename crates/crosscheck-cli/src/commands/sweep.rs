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

//! Sweep commands - run benchmark sweeps and list the built-in ones

use super::{print_json, read_file, OutputFormat};
use crate::config::HarnessConfig;
use crate::error::CliError;
use colored::Colorize;
use crosscheck_bench::{catalog, SweepDefinition, SweepEngine, SweepInput, SweepSummary};
use std::path::PathBuf;

/// Where a sweep definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepSource {
    /// A built-in sweep by name.
    Builtin(String),
    /// A JSON definition file.
    Definition(PathBuf),
}

/// Runs one sweep and prints where its table was written.
///
/// Built-in sweeps read their default inputs from the configured input
/// directory; `inputs` replaces them. A sweep written for the other program
/// switches to that program when no command is configured.
///
/// # Errors
///
/// Returns an error if the definition cannot be loaded or run, and
/// [`CliError::SweepIncomplete`] if any grid point produced no row.
pub fn sweep(
    config: &HarnessConfig,
    source: SweepSource,
    inputs: Vec<PathBuf>,
    repetitions: Option<usize>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut definition = match source {
        SweepSource::Builtin(name) => {
            catalog::builtin(&name, &config.input_dir, config.suite.hash_workers)?
        }
        SweepSource::Definition(path) => SweepDefinition::from_json(&read_file(&path)?)?,
    };
    if !inputs.is_empty() {
        definition.inputs = inputs.into_iter().map(SweepInput::new).collect();
    }
    if repetitions.is_some() {
        definition.repetitions = repetitions;
    }

    let mut config = config.clone();
    if config.program != definition.program && config.command.is_empty() {
        config.program = definition.program;
    }
    let program = config.program_under_test()?;
    let runner = config.runner();
    let engine = SweepEngine::new(&program, &runner, config.sweep_settings());

    let summary = engine.run_sweep(&definition)?;

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => print_summary(&summary),
    }

    if summary.is_complete() {
        Ok(())
    } else {
        Err(CliError::SweepIncomplete {
            name: summary.name,
            skipped: summary.failures.len(),
        })
    }
}

fn print_summary(summary: &SweepSummary) {
    for row in &summary.rows {
        println!(
            "{} {} [{}] {:.3} ± {:.3}",
            "✓".green().bold(),
            row.input,
            row.columns.join(", "),
            row.mean,
            row.std_dev
        );
    }
    for failure in &summary.failures {
        println!(
            "{} {} [{}] repetition {}: {}",
            "✗".red().bold(),
            failure.input.display(),
            failure.point,
            failure.repetition,
            failure.message
        );
    }
    for speedup in &summary.speedups {
        println!(
            "{} {} [{}] speedup {:.2}x",
            "→".cyan(),
            speedup.input.display(),
            speedup.point,
            speedup.speedup
        );
    }
    println!();
    println!(
        "{}: {} row(s) written to {}",
        summary.name,
        summary.rows.len(),
        summary.table.display()
    );
}

/// Prints the built-in sweep names, or their full definitions as JSON.
pub fn list_sweeps(config: &HarnessConfig, json: bool) -> Result<(), CliError> {
    for name in catalog::NAMES {
        let definition = catalog::builtin(name, &config.input_dir, config.suite.hash_workers)?;
        if json {
            println!("{}", definition.to_json()?);
        } else {
            println!(
                "{:<20} {:<12} {:<16} {}",
                name.bold(),
                definition.program.as_str(),
                definition.metric,
                definition.table_file()
            );
        }
    }
    Ok(())
}
