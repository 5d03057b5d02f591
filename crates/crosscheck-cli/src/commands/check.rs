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

//! Check command - run the correctness suite

use super::{discover_inputs, print_json, OutputFormat};
use crate::config::HarnessConfig;
use crate::error::CliError;
use colored::Colorize;
use crosscheck_core::{run_suite, CaseResult, PhaseLabel, SuiteReport};
use std::path::PathBuf;

/// Mismatches printed per failed case.
const MAX_MISMATCHES_SHOWN: usize = 10;

/// Runs every declared case on every input and prints the report.
///
/// With no inputs given, every `*.txt` file of the configured input
/// directory is checked.
///
/// # Errors
///
/// Returns [`CliError::SuiteFailed`] if any case failed or errored, and a
/// configuration error if the program or tolerance is invalid.
pub fn check(
    config: &HarnessConfig,
    inputs: Vec<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let inputs = if inputs.is_empty() {
        discover_inputs(&config.input_dir)?
    } else {
        inputs
    };
    let settings = config.suite_settings()?;
    let mut oracle = config.oracle()?;
    let runner = config.runner();

    let report = run_suite(&mut oracle, &runner, &inputs, &settings);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report),
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::SuiteFailed {
            failed: report.failed(),
            total: report.outcomes.len(),
        })
    }
}

fn phase_list(phases: &[PhaseLabel]) -> String {
    phases
        .iter()
        .map(PhaseLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(report: &SuiteReport) {
    for outcome in &report.outcomes {
        let label = format!("{} {}", outcome.input.display(), outcome.case);
        match &outcome.result {
            CaseResult::Passed => println!("{} {}", "✓".green().bold(), label),
            CaseResult::Failed { phases, mismatches } => {
                println!("{} {}", "✗".red().bold(), label);
                if let Some(phases) = phases {
                    println!(
                        "  phases: expected [{}], found [{}]",
                        phase_list(&phases.expected),
                        phase_list(&phases.actual)
                    );
                }
                for mismatch in mismatches.iter().take(MAX_MISMATCHES_SHOWN) {
                    println!("  {}", mismatch);
                }
                if mismatches.len() > MAX_MISMATCHES_SHOWN {
                    println!("  ... and {} more", mismatches.len() - MAX_MISMATCHES_SHOWN);
                }
            }
            CaseResult::Errored { message, .. } => {
                println!("{} {}", "✗".red().bold(), label);
                println!("  {}", message);
            }
            CaseResult::Skipped { reason } => {
                println!("{} {} ({})", "-".yellow().bold(), label, reason)
            }
        }
    }

    println!();
    let passed = format!("{} passed", report.passed());
    let failed = format!("{} failed", report.failed());
    println!(
        "{}, {}, {} skipped",
        passed.green(),
        if report.failed() > 0 {
            failed.red().bold()
        } else {
            failed.normal()
        },
        report.skipped()
    );
}
