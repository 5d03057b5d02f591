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

//! Data model shared by the parser, oracle, comparator and sweep engine.

use crate::numeric::StateTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default opening-angle threshold for simulation runs.
pub const DEFAULT_THETA: f64 = 0.35;

/// Default simulation step count.
pub const DEFAULT_STEPS: u64 = 1_000;

/// Default simulation time step.
pub const DEFAULT_DELTA: f64 = 0.005;

/// Default process count for distributed simulation runs.
pub const DEFAULT_PROCESS_COUNT: usize = 4;

/// Pipeline phase named by a timing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseLabel {
    /// Hashing only (`hashTime`).
    Hash,
    /// Hashing plus grouping by hash (`hashGroupTime`).
    HashGroup,
    /// Tree comparison within hash groups (`compareTreeTime`).
    CompareTree,
    /// Whole run (`overall`).
    Overall,
}

impl PhaseLabel {
    /// All known phases.
    pub const ALL: [PhaseLabel; 4] = [
        PhaseLabel::Hash,
        PhaseLabel::HashGroup,
        PhaseLabel::CompareTree,
        PhaseLabel::Overall,
    ];

    /// Returns the label as printed by the program under test.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "hashTime",
            Self::HashGroup => "hashGroupTime",
            Self::CompareTree => "compareTreeTime",
            Self::Overall => "overall",
        }
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or(())
    }
}

/// One `<label>: <value><unit>` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingLine {
    /// Phase the measurement belongs to.
    pub label: PhaseLabel,
    /// Elapsed time as printed (microseconds for the file hasher).
    pub value: f64,
    /// Unit suffix as printed, possibly empty.
    pub unit: String,
}

/// One `<id>: <tags...>` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashEntry {
    /// Hash value.
    pub id: u32,
    /// Items sharing the hash, in printed order.
    pub tags: Vec<String>,
}

impl HashEntry {
    /// Creates a hash entry.
    pub fn new<I, S>(id: u32, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// One `group <index> <tags...>` line. The keyword and index are not tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    /// Index assigned by the program. Never used for comparison.
    pub index: u32,
    /// Members of the group, in printed order.
    pub tags: Vec<String>,
}

impl GroupEntry {
    /// Creates a group entry.
    pub fn new<I, S>(index: u32, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Typed view of one run's standard output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedOutput {
    /// Timing lines in printed (phase) order.
    pub timings: Vec<TimingLine>,
    /// Hash entries, order not significant.
    pub hash_entries: Vec<HashEntry>,
    /// Group entries, order not significant.
    pub group_entries: Vec<GroupEntry>,
    /// Non-blank lines after the grammar ended, kept for diagnostics.
    pub trailing: Vec<String>,
}

impl ParsedOutput {
    /// Returns the first timing line for a phase.
    pub fn timing(&self, label: PhaseLabel) -> Option<&TimingLine> {
        self.timings.iter().find(|t| t.label == label)
    }

    /// Returns the phase labels in printed order.
    pub fn phase_labels(&self) -> Vec<PhaseLabel> {
        self.timings.iter().map(|t| t.label).collect()
    }

    /// Returns true if the phases both outputs report occur in the same
    /// relative order.
    pub fn is_shape_compatible(&self, other: &ParsedOutput) -> bool {
        let ours = self.phase_labels();
        let theirs = other.phase_labels();
        let shared = |labels: &[PhaseLabel], other: &[PhaseLabel]| -> Vec<PhaseLabel> {
            labels.iter().copied().filter(|l| other.contains(l)).collect()
        };
        shared(&ours, &theirs) == shared(&theirs, &ours)
    }
}

/// Captured result of one process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// Complete standard output.
    pub stdout: String,
    /// Complete standard error. Never parsed.
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
}

impl RawOutput {
    /// Creates a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Returns true if the process exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// What a program run is judged on: structured stdout for the file hasher,
/// a numeric state table for the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Observation {
    /// Parsed file-hasher output.
    Structured(ParsedOutput),
    /// Simulator output file.
    State(StateTable),
}

impl Observation {
    /// Returns the structured output, if this is one.
    pub fn as_structured(&self) -> Option<&ParsedOutput> {
        match self {
            Self::Structured(parsed) => Some(parsed),
            Self::State(_) => None,
        }
    }

    /// Returns the state table, if this is one.
    pub fn as_state(&self) -> Option<&StateTable> {
        match self {
            Self::State(table) => Some(table),
            Self::Structured(_) => None,
        }
    }
}

/// Which implementation the simulator should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// The program's default (parallel/distributed) implementation.
    #[default]
    Parallel,
    /// The single-worker reference implementation.
    Sequential,
}

/// Physical simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Opening-angle threshold.
    pub theta: f64,
    /// Number of simulation steps.
    pub steps: u64,
    /// Time step.
    pub delta: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            theta: DEFAULT_THETA,
            steps: DEFAULT_STEPS,
            delta: DEFAULT_DELTA,
        }
    }
}

/// Every knob a single run of a program under test can be given.
///
/// Immutable once built: the `with_*` methods consume and return the
/// configuration.
///
/// # Example
///
/// ```
/// use crosscheck_core::RunConfiguration;
///
/// let config = RunConfiguration::new("input/coarse.txt")
///     .with_hash_workers(32)
///     .with_data_workers(16)
///     .with_data_use_channels(true);
/// assert_eq!(config.hash_workers(), 32);
/// assert_eq!(config.data_use_channels(), Some(true));
/// assert_eq!(config.comp_workers(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    input: PathBuf,
    hash_workers: usize,
    data_workers: usize,
    comp_workers: usize,
    process_count: usize,
    buffered: Option<bool>,
    data_buffered: Option<bool>,
    comp_buffered: Option<bool>,
    data_use_channels: Option<bool>,
    algorithm: Algorithm,
    simulation: SimulationParams,
    output: Option<PathBuf>,
}

impl RunConfiguration {
    /// Creates a configuration with the programs' own defaults: one hash
    /// worker, grouping and comparison disabled.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            hash_workers: 1,
            data_workers: 0,
            comp_workers: 0,
            process_count: DEFAULT_PROCESS_COUNT,
            buffered: None,
            data_buffered: None,
            comp_buffered: None,
            data_use_channels: None,
            algorithm: Algorithm::default(),
            simulation: SimulationParams::default(),
            output: None,
        }
    }

    /// Sets the hash worker count.
    pub fn with_hash_workers(mut self, workers: usize) -> Self {
        self.hash_workers = workers;
        self
    }

    /// Sets the data (grouping) worker count. Zero disables grouping.
    pub fn with_data_workers(mut self, workers: usize) -> Self {
        self.data_workers = workers;
        self
    }

    /// Sets the comparison worker count. Zero disables tree comparison.
    pub fn with_comp_workers(mut self, workers: usize) -> Self {
        self.comp_workers = workers;
        self
    }

    /// Sets the process count for distributed runs.
    pub fn with_process_count(mut self, processes: usize) -> Self {
        self.process_count = processes;
        self
    }

    /// Sets the single buffering flag of older program versions.
    pub fn with_buffered(mut self, buffered: bool) -> Self {
        self.buffered = Some(buffered);
        self
    }

    /// Sets buffering of data-worker writes.
    pub fn with_data_buffered(mut self, buffered: bool) -> Self {
        self.data_buffered = Some(buffered);
        self
    }

    /// Sets buffering of comparison-worker writes.
    pub fn with_comp_buffered(mut self, buffered: bool) -> Self {
        self.comp_buffered = Some(buffered);
        self
    }

    /// Selects channel-style data passing between hash and data workers.
    pub fn with_data_use_channels(mut self, channels: bool) -> Self {
        self.data_use_channels = Some(channels);
        self
    }

    /// Selects the algorithm variant.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets all simulation parameters.
    pub fn with_simulation(mut self, simulation: SimulationParams) -> Self {
        self.simulation = simulation;
        self
    }

    /// Sets the opening-angle threshold.
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.simulation.theta = theta;
        self
    }

    /// Sets the simulation step count.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.simulation.steps = steps;
        self
    }

    /// Sets the simulation time step.
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.simulation.delta = delta;
        self
    }

    /// Sets the file the program should write its state to.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Input file.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Hash worker count.
    pub fn hash_workers(&self) -> usize {
        self.hash_workers
    }

    /// Data worker count.
    pub fn data_workers(&self) -> usize {
        self.data_workers
    }

    /// Comparison worker count.
    pub fn comp_workers(&self) -> usize {
        self.comp_workers
    }

    /// Process count.
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Legacy single buffering flag.
    pub fn buffered(&self) -> Option<bool> {
        self.buffered
    }

    /// Data-worker buffering flag.
    pub fn data_buffered(&self) -> Option<bool> {
        self.data_buffered
    }

    /// Comparison-worker buffering flag.
    pub fn comp_buffered(&self) -> Option<bool> {
        self.comp_buffered
    }

    /// Channel-style data passing flag.
    pub fn data_use_channels(&self) -> Option<bool> {
        self.data_use_channels
    }

    /// Algorithm variant.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Simulation parameters.
    pub fn simulation(&self) -> SimulationParams {
        self.simulation
    }

    /// State output file, if set.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(label: PhaseLabel) -> TimingLine {
        TimingLine {
            label,
            value: 1.0,
            unit: "µs".to_string(),
        }
    }

    fn with_phases(labels: &[PhaseLabel]) -> ParsedOutput {
        ParsedOutput {
            timings: labels.iter().copied().map(timing).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_phase_label_round_trip() {
        for label in PhaseLabel::ALL {
            assert_eq!(label.as_str().parse::<PhaseLabel>(), Ok(label));
        }
        assert!("hashtime".parse::<PhaseLabel>().is_err());
    }

    #[test]
    fn test_shape_compatible_same_order() {
        let a = with_phases(&[PhaseLabel::HashGroup, PhaseLabel::CompareTree]);
        let b = with_phases(&[PhaseLabel::HashGroup]);
        assert!(a.is_shape_compatible(&b));
        assert!(b.is_shape_compatible(&a));
    }

    #[test]
    fn test_shape_incompatible_swapped_order() {
        let a = with_phases(&[PhaseLabel::HashGroup, PhaseLabel::CompareTree]);
        let b = with_phases(&[PhaseLabel::CompareTree, PhaseLabel::HashGroup]);
        assert!(!a.is_shape_compatible(&b));
    }

    #[test]
    fn test_configuration_defaults() {
        let config = RunConfiguration::new("input/simple.txt");
        assert_eq!(config.hash_workers(), 1);
        assert_eq!(config.data_workers(), 0);
        assert_eq!(config.comp_workers(), 0);
        assert_eq!(config.buffered(), None);
        assert_eq!(config.algorithm(), Algorithm::Parallel);
        assert_eq!(config.simulation(), SimulationParams::default());
        assert!(config.output().is_none());
    }

    #[test]
    fn test_configuration_builder_does_not_touch_original() {
        let base = RunConfiguration::new("input/nb-10.txt");
        let derived = base.clone().with_steps(5_000).with_theta(0.5);
        assert_eq!(base.simulation().steps, DEFAULT_STEPS);
        assert_eq!(derived.simulation().steps, 5_000);
        assert_eq!(derived.simulation().theta, 0.5);
    }

    #[test]
    fn test_raw_output_success() {
        let raw = RawOutput::success("hashTime: 1µs\n");
        assert!(raw.succeeded());
        let failed = RawOutput {
            exit_code: Some(2),
            ..raw
        };
        assert!(!failed.succeeded());
    }
}
