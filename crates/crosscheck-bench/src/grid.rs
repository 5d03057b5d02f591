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

//! Parameter grids.
//!
//! A grid point is a [`ParameterTuple`]: a set of parameter assignments
//! applied on top of a base [`RunConfiguration`]. Grids are either an
//! explicit list of tuples or the doubling grid, which sweeps one worker
//! count through powers of two capped at the input's line count.

use crate::error::{BenchError, Result};
use crosscheck_core::{read_bounded, Algorithm, RunConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A configurable knob of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Parameter {
    /// Hash worker count.
    HashWorkers,
    /// Data (grouping) worker count.
    DataWorkers,
    /// Comparison worker count.
    CompWorkers,
    /// Simulation process count.
    ProcessCount,
    /// Legacy single buffering flag.
    Buffered,
    /// Buffered data passing.
    DataBuffered,
    /// Buffered comparison work queue.
    CompBuffered,
    /// Channel-based data passing.
    DataUseChannels,
    /// Simulation algorithm (`parallel` or `sequential`).
    Algorithm,
    /// Simulation step count.
    Steps,
    /// Opening-angle threshold.
    Theta,
    /// Simulation time step.
    Delta,
}

impl Parameter {
    /// Name used in definitions and point descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HashWorkers => "hash-workers",
            Self::DataWorkers => "data-workers",
            Self::CompWorkers => "comp-workers",
            Self::ProcessCount => "process-count",
            Self::Buffered => "buffered",
            Self::DataBuffered => "data-buffered",
            Self::CompBuffered => "comp-buffered",
            Self::DataUseChannels => "data-use-channels",
            Self::Algorithm => "algorithm",
            Self::Steps => "steps",
            Self::Theta => "theta",
            Self::Delta => "delta",
        }
    }

    /// Renders this parameter's value in a configuration as a table cell.
    /// Flags the configuration leaves unset render as an empty cell.
    pub fn render(&self, config: &RunConfiguration) -> String {
        let flag = |value: Option<bool>| value.map(|v| v.to_string()).unwrap_or_default();
        match self {
            Self::HashWorkers => config.hash_workers().to_string(),
            Self::DataWorkers => config.data_workers().to_string(),
            Self::CompWorkers => config.comp_workers().to_string(),
            Self::ProcessCount => config.process_count().to_string(),
            Self::Buffered => flag(config.buffered()),
            Self::DataBuffered => flag(config.data_buffered()),
            Self::CompBuffered => flag(config.comp_buffered()),
            Self::DataUseChannels => flag(config.data_use_channels()),
            Self::Algorithm => match config.algorithm() {
                Algorithm::Parallel => "parallel".to_string(),
                Algorithm::Sequential => "sequential".to_string(),
            },
            Self::Steps => config.simulation().steps.to_string(),
            Self::Theta => format!("{:?}", config.simulation().theta),
            Self::Delta => format!("{:?}", config.simulation().delta),
        }
    }

    /// Reads a boolean flag's value from a configuration.
    pub fn flag_value(&self, config: &RunConfiguration) -> Option<bool> {
        match self {
            Self::Buffered => config.buffered(),
            Self::DataBuffered => config.data_buffered(),
            Self::CompBuffered => config.comp_buffered(),
            Self::DataUseChannels => config.data_use_channels(),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter value as written in a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Flag value.
    Bool(bool),
    /// Counts.
    Int(u64),
    /// Simulation reals.
    Float(f64),
    /// Named choices such as the algorithm.
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{:?}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as u64)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<Algorithm> for ParamValue {
    fn from(v: Algorithm) -> Self {
        ParamValue::Text(
            match v {
                Algorithm::Parallel => "parallel",
                Algorithm::Sequential => "sequential",
            }
            .to_string(),
        )
    }
}

fn mismatch(parameter: Parameter, value: &ParamValue, wanted: &str) -> BenchError {
    BenchError::invalid_config(
        parameter.as_str(),
        format!("expected {}, found '{}'", wanted, value),
    )
}

fn as_count(parameter: Parameter, value: &ParamValue) -> Result<usize> {
    match value {
        ParamValue::Int(v) => usize::try_from(*v).map_err(|_| mismatch(parameter, value, "a count")),
        _ => Err(mismatch(parameter, value, "a count")),
    }
}

fn as_flag(parameter: Parameter, value: &ParamValue) -> Result<bool> {
    match value {
        ParamValue::Bool(v) => Ok(*v),
        _ => Err(mismatch(parameter, value, "true or false")),
    }
}

fn as_real(parameter: Parameter, value: &ParamValue) -> Result<f64> {
    match value {
        ParamValue::Float(v) => Ok(*v),
        ParamValue::Int(v) => Ok(*v as f64),
        _ => Err(mismatch(parameter, value, "a number")),
    }
}

/// One grid point: parameter assignments, applied in parameter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTuple(BTreeMap<Parameter, ParamValue>);

impl ParameterTuple {
    /// Creates an empty tuple.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an assignment.
    pub fn with(mut self, parameter: Parameter, value: impl Into<ParamValue>) -> Self {
        self.0.insert(parameter, value.into());
        self
    }

    /// Returns the value assigned to a parameter.
    pub fn get(&self, parameter: Parameter) -> Option<&ParamValue> {
        self.0.get(&parameter)
    }

    /// Returns true if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies every assignment to a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidConfig`] if a value has the wrong type
    /// for its parameter.
    pub fn apply(&self, mut config: RunConfiguration) -> Result<RunConfiguration> {
        for (&parameter, value) in &self.0 {
            config = match parameter {
                Parameter::HashWorkers => config.with_hash_workers(as_count(parameter, value)?),
                Parameter::DataWorkers => config.with_data_workers(as_count(parameter, value)?),
                Parameter::CompWorkers => config.with_comp_workers(as_count(parameter, value)?),
                Parameter::ProcessCount => config.with_process_count(as_count(parameter, value)?),
                Parameter::Buffered => config.with_buffered(as_flag(parameter, value)?),
                Parameter::DataBuffered => config.with_data_buffered(as_flag(parameter, value)?),
                Parameter::CompBuffered => config.with_comp_buffered(as_flag(parameter, value)?),
                Parameter::DataUseChannels => {
                    config.with_data_use_channels(as_flag(parameter, value)?)
                }
                Parameter::Algorithm => match value {
                    ParamValue::Text(name) if name == "parallel" => {
                        config.with_algorithm(Algorithm::Parallel)
                    }
                    ParamValue::Text(name) if name == "sequential" => {
                        config.with_algorithm(Algorithm::Sequential)
                    }
                    _ => return Err(mismatch(parameter, value, "parallel or sequential")),
                },
                Parameter::Steps => {
                    config.with_steps(as_count(parameter, value)? as u64)
                }
                Parameter::Theta => config.with_theta(as_real(parameter, value)?),
                Parameter::Delta => config.with_delta(as_real(parameter, value)?),
            };
        }
        Ok(config)
    }

    /// Merges `other` over `self`; `other` wins on shared parameters.
    pub fn merged(&self, other: &ParameterTuple) -> ParameterTuple {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (*k, v.clone())));
        ParameterTuple(merged)
    }
}

impl fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (parameter, value) in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", parameter, value)?;
            first = false;
        }
        Ok(())
    }
}

/// How grid points are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Grid {
    /// A fixed list of tuples, run in order.
    Explicit {
        /// Grid points.
        points: Vec<ParameterTuple>,
    },
    /// `min(2^i, lines)` for `i` in `0..=ceil(log2(lines))` on one parameter.
    Doubling {
        /// Parameter receiving the worker count.
        parameter: Parameter,
    },
}

impl Grid {
    /// Expands the grid for one input.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidGrid`] for a doubling grid over an empty
    /// input, and a harness error if the input cannot be read.
    pub fn points(&self, sweep: &str, input: &Path) -> Result<Vec<ParameterTuple>> {
        match self {
            Grid::Explicit { points } => Ok(points.clone()),
            Grid::Doubling { parameter } => {
                let lines = count_lines(input)?;
                let counts = doubling_worker_counts(lines).ok_or_else(|| BenchError::InvalidGrid {
                    sweep: sweep.to_string(),
                    reason: format!("input '{}' has no lines", input.display()),
                })?;
                Ok(counts
                    .into_iter()
                    .map(|n| ParameterTuple::new().with(*parameter, n))
                    .collect())
            }
        }
    }
}

/// Worker counts of the doubling grid, `None` for zero lines.
///
/// # Examples
///
/// ```
/// use crosscheck_bench::doubling_worker_counts;
///
/// assert_eq!(doubling_worker_counts(5), Some(vec![1, 2, 4, 5]));
/// assert_eq!(doubling_worker_counts(8), Some(vec![1, 2, 4, 8]));
/// assert_eq!(doubling_worker_counts(0), None);
/// ```
pub fn doubling_worker_counts(line_count: usize) -> Option<Vec<usize>> {
    if line_count == 0 {
        return None;
    }
    let ceil_log2 = usize::BITS - (line_count - 1).leading_zeros();
    Some(
        (0..=ceil_log2)
            .map(|i| 1usize.checked_shl(i).unwrap_or(usize::MAX).min(line_count))
            .collect(),
    )
}

/// Counts newline-terminated lines, like `wc -l`.
pub fn count_lines(path: &Path) -> Result<usize> {
    let text = read_bounded(path)?;
    Ok(text.bytes().filter(|&b| b == b'\n').count())
}

/// One input of a sweep, with parameters that apply only to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepInput {
    /// Input file, as it appears in the table.
    pub path: PathBuf,
    /// Assignments applied after the grid point's.
    #[serde(default, skip_serializing_if = "ParameterTuple::is_empty")]
    pub overrides: ParameterTuple,
}

impl SweepInput {
    /// An input without overrides.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overrides: ParameterTuple::new(),
        }
    }

    /// Sets the input's overrides.
    pub fn with_overrides(mut self, overrides: ParameterTuple) -> Self {
        self.overrides = overrides;
        self
    }
}
