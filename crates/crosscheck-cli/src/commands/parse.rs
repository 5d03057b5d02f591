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

//! Parse command - structural view of a saved program output

use super::{print_json, read_file, OutputFormat};
use crate::error::CliError;
use colored::Colorize;
use crosscheck_core::{parse, parse_strict, Observation, ProgramKind, StateTable};
use std::path::Path;

/// Parses a saved output of `kind` and prints its structure.
///
/// File hasher output is parsed as phase timings, hash entries and group
/// entries; simulator output as a numeric state table. In strict mode any
/// line after the recognized sections is an error.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn parse_output(
    kind: ProgramKind,
    file: &Path,
    strict: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let text = read_file(file)?;
    let parsed = match kind {
        ProgramKind::FileHasher if strict => parse_strict(&text).map(Observation::Structured),
        ProgramKind::FileHasher => parse(&text).map(Observation::Structured),
        ProgramKind::NBody => StateTable::parse(&text).map(Observation::State),
    };

    let observation = match parsed {
        Ok(observation) => observation,
        Err(e) => {
            if format == OutputFormat::Text {
                println!("{} {}", "✗".red().bold(), file.display());
            }
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Json => print_json(&observation),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), file.display());
            print_observation(&observation);
            Ok(())
        }
    }
}

/// Prints a short summary of an observation, indented under a header line.
pub(crate) fn print_observation(observation: &Observation) {
    match observation {
        Observation::Structured(parsed) => {
            for timing in &parsed.timings {
                println!("  {}: {}{}", timing.label.as_str(), timing.value, timing.unit);
            }
            println!("  Hash entries: {}", parsed.hash_entries.len());
            println!("  Group entries: {}", parsed.group_entries.len());
            if !parsed.trailing.is_empty() {
                println!("  Trailing lines: {}", parsed.trailing.len());
            }
        }
        Observation::State(table) => {
            let tokens: usize = table.lines.iter().map(Vec::len).sum();
            println!("  Lines: {}", table.len());
            println!("  Tokens: {}", tokens);
        }
    }
}
