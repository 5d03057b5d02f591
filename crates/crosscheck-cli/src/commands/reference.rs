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

//! Reference command - show or generate a canonical answer

use super::parse::print_observation;
use super::read_file;
use crate::config::HarnessConfig;
use crate::error::CliError;
use colored::Colorize;
use crosscheck_core::RunConfiguration;
use std::path::Path;

/// Ensures the canonical answer for `input` exists and summarizes it.
///
/// The simulation parameters only matter for the simulator; they select
/// which answer file is used. A missing answer is generated with the
/// canonical configuration.
///
/// # Errors
///
/// Returns an error if the answer cannot be read or generated.
pub fn reference(
    config: &HarnessConfig,
    input: &Path,
    steps: u64,
    theta: f64,
    delta: f64,
    show: bool,
) -> Result<(), CliError> {
    let mut oracle = config.oracle()?;
    let runner = config.runner();
    let run = RunConfiguration::new(input)
        .with_steps(steps)
        .with_theta(theta)
        .with_delta(delta);
    let path = oracle.store().path_for(oracle.program().kind(), &run);

    let observation = oracle.get_reference(&runner, &run)?.clone();
    let origin = if oracle.generated() > 0 {
        "generated"
    } else {
        "stored"
    };

    println!("{} {} ({})", "✓".green().bold(), path.display(), origin);
    print_observation(&observation);
    if show {
        println!();
        print!("{}", read_file(&path)?);
    }
    Ok(())
}
