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

//! The sweep engine.
//!
//! For every input and every grid point, in definition order, the program is
//! run a fixed number of times back to back. One metric value is extracted
//! from each run's stdout; mean and sample standard deviation become one row
//! of the results table. A point whose runs fail is skipped and recorded in
//! the [`SweepSummary`]; the sweep moves on to the next point.
//!
//! A definition may name a baseline point. Once all points ran, every other
//! measured point of an input gets a speedup: the baseline's mean over its own.

use crate::error::{BenchError, Result};
use crate::grid::{Grid, Parameter, ParameterTuple, SweepInput};
use crate::metric::MetricExtractor;
use crate::stats::compute_statistics;
use crate::table::{BenchmarkResultRow, ResultsTable};
use crosscheck_core::{FailureKind, ProcessRunner, ProgramKind, ProgramUnderTest, RunConfiguration};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default repetitions per grid point.
pub const DEFAULT_REPETITIONS: usize = 20;

/// Default directory for results tables.
pub const DEFAULT_TIMINGS_DIR: &str = "timings";

/// How a row's input identifier is derived from the input path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum RowLabelRule {
    /// The input path as given.
    #[default]
    Plain,
    /// Append `suffix` when `parameter` is explicitly false.
    SuffixWhenFalse {
        /// Boolean flag inspected.
        parameter: Parameter,
        /// Text appended to the input path.
        suffix: String,
    },
}

impl RowLabelRule {
    /// Returns the row label for an input under a configuration.
    pub fn label(&self, input: &Path, config: &RunConfiguration) -> String {
        let base = input.display().to_string();
        match self {
            RowLabelRule::Plain => base,
            RowLabelRule::SuffixWhenFalse { parameter, suffix } => {
                if parameter.flag_value(config) == Some(false) {
                    format!("{}{}", base, suffix)
                } else {
                    base
                }
            }
        }
    }
}

/// A complete sweep description.
///
/// # Example
///
/// ```
/// use crosscheck_bench::SweepDefinition;
///
/// let definition = SweepDefinition::from_json(r#"{
///     "name": "data-workers",
///     "inputs": [{"path": "input/coarse.txt"}],
///     "base": {"hash-workers": 32},
///     "grid": {"kind": "explicit", "points": [{"data-workers": 1}, {"data-workers": 8}]},
///     "columns": ["data-workers"],
///     "metric": "hashGroupTime",
///     "table": "data_workers"
/// }"#).unwrap();
/// assert_eq!(definition.columns.len(), 1);
/// assert_eq!(definition.repetitions, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    /// Sweep name.
    pub name: String,
    /// Program the sweep is written for.
    #[serde(default = "default_program")]
    pub program: ProgramKind,
    /// Inputs, in row order.
    pub inputs: Vec<SweepInput>,
    /// Assignments applied before every grid point.
    #[serde(default, skip_serializing_if = "ParameterTuple::is_empty")]
    pub base: ParameterTuple,
    /// Grid points.
    pub grid: Grid,
    /// Parameter columns written after the input identifier.
    pub columns: Vec<Parameter>,
    /// Repetitions per point; the engine default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<usize>,
    /// Label whose value is measured.
    pub metric: String,
    /// Input identifier rule.
    #[serde(default)]
    pub row_label: RowLabelRule,
    /// Table file name, without directory or extension.
    pub table: String,
    /// Grid point other points are compared against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<ParameterTuple>,
}

fn default_program() -> ProgramKind {
    ProgramKind::FileHasher
}

impl SweepDefinition {
    /// Parses a definition from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| BenchError::invalid_config("sweep definition", e.to_string()))
    }

    /// Serializes the definition as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::invalid_config("sweep definition", e.to_string()))
    }

    /// Table file name with extension.
    pub fn table_file(&self) -> String {
        format!("{}.csv", self.table)
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    /// Repetitions for definitions that do not set their own.
    pub repetitions: usize,
    /// Directory results tables are written to.
    pub timings_dir: PathBuf,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            repetitions: DEFAULT_REPETITIONS,
            timings_dir: PathBuf::from(DEFAULT_TIMINGS_DIR),
        }
    }
}

impl SweepSettings {
    /// Sets the default repetition count.
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Sets the timings directory.
    pub fn with_timings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.timings_dir = dir.into();
        self
    }
}

/// A grid point that produced no row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFailure {
    /// Input file.
    pub input: PathBuf,
    /// Grid point description.
    pub point: String,
    /// Repetition that failed (1-based).
    pub repetition: usize,
    /// Failure classification.
    pub kind: FailureKind,
    /// Error description.
    pub message: String,
}

/// Baseline mean over a point's mean, for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Speedup {
    /// Input file.
    pub input: PathBuf,
    /// Grid point description.
    pub point: String,
    /// Speedup factor.
    pub speedup: f64,
}

/// What a sweep produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Sweep name.
    pub name: String,
    /// Results table path.
    pub table: PathBuf,
    /// Rows written, in order.
    pub rows: Vec<BenchmarkResultRow>,
    /// Points skipped.
    pub failures: Vec<PointFailure>,
    /// Speedups against the baseline point, in row order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speedups: Vec<Speedup>,
}

impl SweepSummary {
    /// Returns true if every point produced a row.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Point {
    input: SweepInput,
    tuple: ParameterTuple,
    config: RunConfiguration,
}

/// Relates each measured point to the baseline point of the same input.
/// Inputs whose baseline produced no row, and zero means, get no speedup.
fn speedups(
    means: &[(PathBuf, ParameterTuple, f64)],
    baseline: &ParameterTuple,
) -> Vec<Speedup> {
    let mut speedups = Vec::new();
    for (input, tuple, mean) in means {
        if tuple == baseline || *mean <= 0.0 {
            continue;
        }
        let base = means
            .iter()
            .find(|(i, t, _)| i == input && t == baseline)
            .map(|(_, _, m)| *m);
        if let Some(base) = base.filter(|&m| m > 0.0) {
            let speedup = base / mean;
            info!(input = %input.display(), point = %tuple, speedup, "speedup");
            speedups.push(Speedup {
                input: input.clone(),
                point: tuple.to_string(),
                speedup,
            });
        }
    }
    speedups
}

/// Runs sweep definitions against one program.
pub struct SweepEngine<'a, R: ProcessRunner + ?Sized> {
    program: &'a ProgramUnderTest,
    runner: &'a R,
    settings: SweepSettings,
}

impl<'a, R: ProcessRunner + ?Sized> SweepEngine<'a, R> {
    /// Creates an engine.
    pub fn new(program: &'a ProgramUnderTest, runner: &'a R, settings: SweepSettings) -> Self {
        Self {
            program,
            runner,
            settings,
        }
    }

    /// Engine settings.
    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Runs a sweep and writes its table.
    ///
    /// The grid is expanded for every input before the table is opened, so
    /// an invalid grid leaves an existing table untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is invalid, the grid cannot be
    /// expanded, or the table cannot be written. Failures of individual
    /// points are reported in the summary instead.
    pub fn run_sweep(&self, definition: &SweepDefinition) -> Result<SweepSummary> {
        if definition.program != self.program.kind() {
            return Err(BenchError::invalid_config(
                "program",
                format!(
                    "sweep '{}' is for {}, not {}",
                    definition.name,
                    definition.program,
                    self.program.kind()
                ),
            ));
        }
        let repetitions = definition.repetitions.unwrap_or(self.settings.repetitions);
        if repetitions == 0 {
            return Err(BenchError::invalid_config(
                "repetitions",
                "must be at least 1",
            ));
        }
        let metric = MetricExtractor::new(definition.metric.as_str())?;
        let points = self.expand(definition)?;

        let mut table =
            ResultsTable::create(self.settings.timings_dir.join(definition.table_file()))?;
        let mut summary = SweepSummary {
            name: definition.name.clone(),
            table: table.path().to_path_buf(),
            rows: Vec::new(),
            failures: Vec::new(),
            speedups: Vec::new(),
        };
        let mut means = Vec::new();

        info!(
            sweep = %definition.name,
            points = points.len(),
            repetitions,
            table = %summary.table.display(),
            "starting sweep"
        );

        for point in points {
            match self.measure(&point.config, &metric, repetitions) {
                Ok(samples) => {
                    let stats = compute_statistics(&samples);
                    let row = BenchmarkResultRow {
                        input: definition.row_label.label(&point.input.path, &point.config),
                        columns: definition
                            .columns
                            .iter()
                            .map(|c| c.render(&point.config))
                            .collect(),
                        mean: stats.mean,
                        std_dev: stats.std_dev,
                    };
                    table.append(&row)?;
                    info!(
                        input = %row.input,
                        point = %point.tuple,
                        mean = stats.mean,
                        std_dev = stats.std_dev,
                        samples = stats.count,
                        "point measured"
                    );
                    summary.rows.push(row);
                    means.push((point.input.path, point.tuple, stats.mean));
                }
                Err((repetition, err)) => {
                    warn!(
                        input = %point.input.path.display(),
                        point = %point.tuple,
                        repetition,
                        error = %err,
                        "point skipped"
                    );
                    summary.failures.push(PointFailure {
                        input: point.input.path.clone(),
                        point: point.tuple.to_string(),
                        repetition,
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                }
            }
        }

        if let Some(baseline) = &definition.baseline {
            summary.speedups = speedups(&means, baseline);
        }
        Ok(summary)
    }

    fn expand(&self, definition: &SweepDefinition) -> Result<Vec<Point>> {
        let mut points = Vec::new();
        for input in &definition.inputs {
            for tuple in definition.grid.points(&definition.name, &input.path)? {
                let assignments = definition.base.merged(&tuple).merged(&input.overrides);
                let config = assignments.apply(RunConfiguration::new(&input.path))?;
                points.push(Point {
                    input: input.clone(),
                    tuple,
                    config,
                });
            }
        }
        Ok(points)
    }

    /// Runs the repetitions of one point. On failure returns the 1-based
    /// repetition and its error.
    fn measure(
        &self,
        config: &RunConfiguration,
        metric: &MetricExtractor,
        repetitions: usize,
    ) -> std::result::Result<Vec<f64>, (usize, BenchError)> {
        let mut samples = Vec::with_capacity(repetitions);
        for repetition in 1..=repetitions {
            let value = self
                .program
                .execute(self.runner, config)
                .map_err(BenchError::from)
                .and_then(|run| metric.extract(&run.raw.stdout))
                .map_err(|err| (repetition, err))?;
            debug!(repetition, value, "sample");
            samples.push(value);
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_rule() {
        let rule = RowLabelRule::SuffixWhenFalse {
            parameter: Parameter::DataBuffered,
            suffix: "-unbuffered".to_string(),
        };
        let input = Path::new("input/fine.txt");
        let unbuffered = RunConfiguration::new(input).with_data_buffered(false);
        let buffered = RunConfiguration::new(input).with_data_buffered(true);
        let unset = RunConfiguration::new(input);
        assert_eq!(rule.label(input, &unbuffered), "input/fine.txt-unbuffered");
        assert_eq!(rule.label(input, &buffered), "input/fine.txt");
        assert_eq!(rule.label(input, &unset), "input/fine.txt");
    }

    #[test]
    fn test_definition_defaults() {
        let definition = SweepDefinition::from_json(
            r#"{"name": "n", "inputs": [], "grid": {"kind": "doubling", "parameter": "hash-workers"},
                "columns": [], "metric": "hashTime", "table": "t"}"#,
        )
        .unwrap();
        assert_eq!(definition.program, ProgramKind::FileHasher);
        assert_eq!(definition.row_label, RowLabelRule::Plain);
        assert!(definition.base.is_empty());
        assert_eq!(definition.table_file(), "t.csv");
    }

    #[test]
    fn test_definition_json_roundtrip_keeps_rule() {
        let json = r#"{"name": "n", "inputs": [{"path": "a.txt", "overrides": {"steps": 100}}],
            "grid": {"kind": "explicit", "points": [{"comp-workers": 2, "comp-buffered": false}]},
            "columns": ["comp-workers"], "metric": "compareTreeTime", "table": "t",
            "row_label": {"rule": "suffix-when-false", "parameter": "comp-buffered", "suffix": "-unbuffered"}}"#;
        let definition = SweepDefinition::from_json(json).unwrap();
        let again = SweepDefinition::from_json(&definition.to_json().unwrap()).unwrap();
        assert_eq!(definition, again);
    }

    #[test]
    fn test_malformed_definition() {
        let err = SweepDefinition::from_json("{\"name\": 3}").unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidConfig);
    }
}
