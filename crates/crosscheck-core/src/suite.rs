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

//! Correctness suite: declared candidate configurations run against the
//! reference answer for every input.
//!
//! A failing case never stops the suite. Each case ends in a [`CaseResult`]
//! and the driver decides the exit status from the [`SuiteReport`].

use crate::compare::compare;
use crate::error::{FailureKind, HarnessError, Mismatch, Result, Section};
use crate::model::{Algorithm, Observation, ParsedOutput, PhaseLabel, RunConfiguration};
use crate::numeric::Tolerance;
use crate::oracle::{input_stem, ReferenceOracle};
use crate::program::{ProgramKind, ProgramUnderTest};
use crate::runner::ProcessRunner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default hash worker count for correctness cases and sweeps.
pub const DEFAULT_HASH_WORKERS: usize = 32;

/// Knobs for the declared case list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteSettings {
    /// Hash workers used by every file hasher correctness case.
    pub hash_workers: usize,
    /// Also run the phase-sequence format cases.
    pub format_checks: bool,
    /// Accepted difference between state tokens.
    #[serde(skip)]
    pub tolerance: Tolerance,
    /// Simulation step counts to check.
    pub nbody_steps: Vec<u64>,
    /// Opening-angle thresholds to check.
    pub nbody_thetas: Vec<f64>,
    /// Time steps to check.
    pub nbody_deltas: Vec<f64>,
    /// Processes for distributed simulation runs.
    pub process_count: usize,
    /// Simulation grids replacing the default one for specific inputs,
    /// keyed by input stem.
    pub nbody_input_grids: BTreeMap<String, SimulationGrid>,
}

/// Step counts, opening angles and time steps crossed into simulation cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationGrid {
    /// Step counts.
    pub steps: Vec<u64>,
    /// Opening-angle thresholds.
    pub thetas: Vec<f64>,
    /// Time steps.
    pub deltas: Vec<f64>,
}

impl SuiteSettings {
    /// The simulation grid checked on `input`.
    pub fn simulation_grid(&self, input: &Path) -> SimulationGrid {
        match self.nbody_input_grids.get(&input_stem(input)) {
            Some(grid) => grid.clone(),
            None => SimulationGrid {
                steps: self.nbody_steps.clone(),
                thetas: self.nbody_thetas.clone(),
                deltas: self.nbody_deltas.clone(),
            },
        }
    }
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            hash_workers: DEFAULT_HASH_WORKERS,
            format_checks: true,
            tolerance: Tolerance::default(),
            nbody_steps: vec![1_000, 5_000],
            nbody_thetas: vec![0.0, 0.5],
            nbody_deltas: vec![0.005, 0.05],
            process_count: crate::model::DEFAULT_PROCESS_COUNT,
            // The largest body set only runs a short distributed check.
            nbody_input_grids: BTreeMap::from([(
                "nb-100000".to_string(),
                SimulationGrid {
                    steps: vec![100],
                    thetas: vec![0.5],
                    deltas: vec![0.05],
                },
            )]),
        }
    }
}

/// What a case checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseCheck {
    /// Output must match the reference answer.
    Correctness,
    /// Timing lines must name exactly these phases, in order, and the entry
    /// sections that the configuration enables must have the reference's size.
    Format(Vec<PhaseLabel>),
}

/// One declared candidate configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteCase {
    /// Short identifier, unique per input.
    pub name: String,
    /// What is checked.
    pub check: CaseCheck,
    /// Candidate configuration.
    pub config: RunConfiguration,
}

/// Expected and observed phase sequence of a failed format case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseMismatch {
    /// Phases the configuration must print.
    pub expected: Vec<PhaseLabel>,
    /// Phases it printed.
    pub actual: Vec<PhaseLabel>,
}

/// How a case ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseResult {
    /// Output matched.
    Passed,
    /// Output was produced but did not match.
    Failed {
        /// Phase sequence problem, format cases only.
        phases: Option<PhaseMismatch>,
        /// Entry or state mismatches.
        mismatches: Vec<Mismatch>,
    },
    /// The case could not be evaluated.
    Errored {
        /// Failure classification.
        kind: FailureKind,
        /// Error description.
        message: String,
    },
    /// The program version cannot run this case.
    Skipped {
        /// Why.
        reason: String,
    },
}

impl CaseResult {
    /// Returns true for failed and errored cases.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Errored { .. })
    }
}

impl From<HarnessError> for CaseResult {
    fn from(err: HarnessError) -> Self {
        match err {
            HarnessError::Mismatch(mismatch) => Self::Failed {
                phases: None,
                mismatches: vec![mismatch],
            },
            other => Self::Errored {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

/// Result of one case on one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    /// Input file.
    pub input: PathBuf,
    /// Case identifier.
    pub case: String,
    /// Result.
    pub result: CaseResult,
}

/// All outcomes of a suite run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Outcomes.
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    /// Number of passed cases.
    pub fn passed(&self) -> usize {
        self.count(|r| matches!(r, CaseResult::Passed))
    }

    /// Number of failed or errored cases.
    pub fn failed(&self) -> usize {
        self.count(CaseResult::is_failure)
    }

    /// Number of skipped cases.
    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, CaseResult::Skipped { .. }))
    }

    /// Returns true if no case failed or errored.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&CaseResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }
}

fn hasher_case(name: impl Into<String>, check: CaseCheck, config: RunConfiguration) -> SuiteCase {
    SuiteCase {
        name: name.into(),
        check,
        config,
    }
}

/// Returns the declared cases for one input.
pub fn cases_for(program: &ProgramUnderTest, input: &Path, settings: &SuiteSettings) -> Vec<SuiteCase> {
    match program.kind() {
        ProgramKind::FileHasher => hasher_cases(program, input, settings),
        ProgramKind::NBody => nbody_cases(input, settings),
    }
}

fn hasher_cases(program: &ProgramUnderTest, input: &Path, settings: &SuiteSettings) -> Vec<SuiteCase> {
    let h = settings.hash_workers;
    let base = || RunConfiguration::new(input).with_hash_workers(h);

    let mut cases = vec![
        hasher_case(
            format!("h{}-d1-c1", h),
            CaseCheck::Correctness,
            base().with_data_workers(1).with_comp_workers(1),
        ),
        hasher_case(
            format!("h{}-d{}-c1", h, h),
            CaseCheck::Correctness,
            base().with_data_workers(h).with_comp_workers(1),
        ),
        hasher_case(
            format!("h{}-d{}-c1", h, h / 2),
            CaseCheck::Correctness,
            base().with_data_workers(h / 2).with_comp_workers(1),
        ),
        hasher_case(
            format!("h{}-d{}-c1-channels", h, h / 2),
            CaseCheck::Correctness,
            base()
                .with_data_workers(h / 2)
                .with_comp_workers(1)
                .with_data_use_channels(true),
        ),
        hasher_case(
            format!("h{}-d1-c4", h),
            CaseCheck::Correctness,
            base().with_data_workers(1).with_comp_workers(4),
        ),
        hasher_case(
            format!("h{}-d1-c4-comp-buffered", h),
            CaseCheck::Correctness,
            base()
                .with_data_workers(1)
                .with_comp_workers(4)
                .with_comp_buffered(true),
        ),
    ];

    if settings.format_checks {
        for (hash, data, comp) in [(1, 0, 0), (2, 0, 0), (1, 1, 0), (2, 2, 0), (1, 1, 1), (2, 2, 2)] {
            let config = RunConfiguration::new(input)
                .with_hash_workers(hash)
                .with_data_workers(data)
                .with_comp_workers(comp);
            let phases = program.expected_phases(&config);
            cases.push(hasher_case(
                format!("format-h{}-d{}-c{}", hash, data, comp),
                CaseCheck::Format(phases),
                config,
            ));
        }
    }
    cases
}

fn nbody_cases(input: &Path, settings: &SuiteSettings) -> Vec<SuiteCase> {
    let grid = settings.simulation_grid(input);
    let mut cases = Vec::new();
    for &steps in &grid.steps {
        for &theta in &grid.thetas {
            for &delta in &grid.deltas {
                cases.push(SuiteCase {
                    name: format!("s{}-t{:?}-d{:?}", steps, theta, delta),
                    check: CaseCheck::Correctness,
                    config: RunConfiguration::new(input)
                        .with_algorithm(Algorithm::Parallel)
                        .with_process_count(settings.process_count)
                        .with_steps(steps)
                        .with_theta(theta)
                        .with_delta(delta),
                });
            }
        }
    }
    cases
}

/// Runs one case against the oracle's program and reference.
pub fn run_case<R: ProcessRunner + ?Sized>(
    oracle: &mut ReferenceOracle,
    runner: &R,
    case: &SuiteCase,
    tolerance: &Tolerance,
) -> CaseResult {
    let program = oracle.program().clone();
    if !program.supports(&case.config) {
        return CaseResult::Skipped {
            reason: format!(
                "'{}' capability set lacks a flag this case sets",
                program.capabilities().name()
            ),
        };
    }
    evaluate(oracle, &program, runner, case, tolerance).unwrap_or_else(CaseResult::from)
}

fn evaluate<R: ProcessRunner + ?Sized>(
    oracle: &mut ReferenceOracle,
    program: &ProgramUnderTest,
    runner: &R,
    case: &SuiteCase,
    tolerance: &Tolerance,
) -> Result<CaseResult> {
    let reference = oracle.get_reference(runner, &case.config)?;
    let execution = program.execute(runner, &case.config)?;
    let candidate = program.observe(execution.answer_text())?;

    match &case.check {
        CaseCheck::Correctness => {
            let comparison = compare(&candidate, reference, &program.comparison_policy(tolerance))?;
            Ok(if comparison.is_match() {
                CaseResult::Passed
            } else {
                CaseResult::Failed {
                    phases: None,
                    mismatches: comparison.mismatches,
                }
            })
        }
        CaseCheck::Format(expected) => match (&candidate, reference) {
            (Observation::Structured(c), Observation::Structured(r)) => {
                Ok(check_format(c, r, expected, &case.config))
            }
            _ => Err(HarnessError::invalid_config(
                "check",
                "format cases apply to structured output only",
            )),
        },
    }
}

fn check_format(
    candidate: &ParsedOutput,
    reference: &ParsedOutput,
    expected: &[PhaseLabel],
    config: &RunConfiguration,
) -> CaseResult {
    let actual = candidate.phase_labels();
    let phases = (actual != expected).then(|| PhaseMismatch {
        expected: expected.to_vec(),
        actual,
    });

    let expected_hashes = if config.data_workers() > 0 {
        reference.hash_entries.len()
    } else {
        0
    };
    let expected_groups = if config.data_workers() > 0 && config.comp_workers() > 0 {
        reference.group_entries.len()
    } else {
        0
    };

    let mut mismatches = Vec::new();
    for (section, expected, actual) in [
        (Section::HashEntries, expected_hashes, candidate.hash_entries.len()),
        (Section::GroupEntries, expected_groups, candidate.group_entries.len()),
    ] {
        if expected != actual {
            mismatches.push(Mismatch::CountMismatch {
                section,
                expected,
                actual,
            });
        }
    }

    if phases.is_none() && mismatches.is_empty() {
        CaseResult::Passed
    } else {
        CaseResult::Failed { phases, mismatches }
    }
}

/// Runs every declared case on every input, continuing past failures.
pub fn run_suite<R: ProcessRunner + ?Sized>(
    oracle: &mut ReferenceOracle,
    runner: &R,
    inputs: &[PathBuf],
    settings: &SuiteSettings,
) -> SuiteReport {
    let mut report = SuiteReport::default();
    for input in inputs {
        let cases = cases_for(oracle.program(), input, settings);
        for case in cases {
            let result = run_case(oracle, runner, &case, &settings.tolerance);
            match &result {
                CaseResult::Passed => info!(input = %input.display(), case = %case.name, "passed"),
                CaseResult::Skipped { reason } => {
                    info!(input = %input.display(), case = %case.name, %reason, "skipped")
                }
                CaseResult::Failed { phases, mismatches } => {
                    if let Some(p) = phases {
                        warn!(input = %input.display(), case = %case.name, expected = ?p.expected, actual = ?p.actual, "phase sequence differs");
                    }
                    for mismatch in mismatches {
                        warn!(input = %input.display(), case = %case.name, %mismatch, "mismatch");
                    }
                }
                CaseResult::Errored { kind, message } => {
                    warn!(input = %input.display(), case = %case.name, %kind, %message, "errored")
                }
            }
            report.outcomes.push(CaseOutcome {
                input: input.clone(),
                case: case.name,
                result,
            });
        }
    }
    report
}
