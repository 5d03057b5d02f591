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

//! Built-in sweeps.
//!
//! | name                 | program     | grid                                   | metric            |
//! |----------------------|-------------|----------------------------------------|-------------------|
//! | `hash-times`         | file hasher | doubling hash workers                  | `hashTime`        |
//! | `hash-group-times`   | file hasher | hash/data workers, buffering, channels | `hashGroupTime`   |
//! | `compare-tree-times` | file hasher | comparison workers, buffering          | `compareTreeTime` |
//! | `nbody-times`        | simulator   | sequential, then 1 to 4 processes      | `overall`         |

use crate::error::{BenchError, Result};
use crate::grid::{Grid, Parameter, ParameterTuple, SweepInput};
use crate::sweep::{RowLabelRule, SweepDefinition};
use crosscheck_core::{Algorithm, ProgramKind};
use std::path::Path;

/// Names of the built-in sweeps.
pub const NAMES: [&str; 4] = [
    "hash-times",
    "hash-group-times",
    "compare-tree-times",
    "nbody-times",
];

/// Suffix for rows measured with buffering disabled.
pub const UNBUFFERED_SUFFIX: &str = "-unbuffered";

/// Returns a built-in sweep over its default inputs in `input_dir`.
///
/// `hash_workers` is the fixed hash worker count used by the sweeps that do
/// not vary it.
pub fn builtin(name: &str, input_dir: &Path, hash_workers: usize) -> Result<SweepDefinition> {
    let definition = match name {
        "hash-times" => hash_times(hasher_inputs(input_dir)),
        "hash-group-times" => hash_group_times(hasher_inputs(input_dir), hash_workers),
        "compare-tree-times" => compare_tree_times(hasher_inputs(input_dir), hash_workers),
        "nbody-times" => nbody_times(nbody_inputs(input_dir)),
        other => {
            return Err(BenchError::invalid_config(
                "sweep",
                format!("unknown sweep '{}' (available: {})", other, NAMES.join(", ")),
            ))
        }
    };
    Ok(definition)
}

/// The coarse and fine tree inputs.
pub fn hasher_inputs(input_dir: &Path) -> Vec<SweepInput> {
    ["coarse.txt", "fine.txt"]
        .iter()
        .map(|name| SweepInput::new(input_dir.join(name)))
        .collect()
}

/// The three body-count inputs, each with a step count that keeps runs short.
pub fn nbody_inputs(input_dir: &Path) -> Vec<SweepInput> {
    [
        ("nb-10.txt", 1_000_000u64),
        ("nb-100.txt", 100_000),
        ("nb-100000.txt", 100),
    ]
    .iter()
    .map(|(name, steps)| {
        SweepInput::new(input_dir.join(name))
            .with_overrides(ParameterTuple::new().with(Parameter::Steps, *steps))
    })
    .collect()
}

/// Hashing time over a doubling grid of hash workers.
pub fn hash_times(inputs: Vec<SweepInput>) -> SweepDefinition {
    SweepDefinition {
        name: "hash-times".to_string(),
        program: ProgramKind::FileHasher,
        inputs,
        base: ParameterTuple::new(),
        grid: Grid::Doubling {
            parameter: Parameter::HashWorkers,
        },
        columns: vec![Parameter::HashWorkers],
        repetitions: None,
        metric: "hashTime".to_string(),
        row_label: RowLabelRule::Plain,
        table: "hash_times".to_string(),
        baseline: None,
    }
}

/// Hash-and-group time across worker counts, buffering and channel use.
pub fn hash_group_times(inputs: Vec<SweepInput>, hash_workers: usize) -> SweepDefinition {
    let h = hash_workers;
    let points = [
        (1, 1, true, false),
        (h, 1, false, true),
        (h, 1, true, true),
        (h, 4, true, true),
        (h, 16, true, true),
        (h, 4, true, false),
        (h, 16, true, false),
        (h, h, true, false),
    ]
    .iter()
    .map(|&(hash, data, buffered, channels)| {
        ParameterTuple::new()
            .with(Parameter::HashWorkers, hash)
            .with(Parameter::DataWorkers, data)
            .with(Parameter::DataBuffered, buffered)
            .with(Parameter::DataUseChannels, channels)
    })
    .collect();

    SweepDefinition {
        name: "hash-group-times".to_string(),
        program: ProgramKind::FileHasher,
        inputs,
        base: ParameterTuple::new(),
        grid: Grid::Explicit { points },
        columns: vec![
            Parameter::HashWorkers,
            Parameter::DataWorkers,
            Parameter::DataUseChannels,
        ],
        repetitions: None,
        metric: "hashGroupTime".to_string(),
        row_label: RowLabelRule::SuffixWhenFalse {
            parameter: Parameter::DataBuffered,
            suffix: UNBUFFERED_SUFFIX.to_string(),
        },
        table: "hash_group_times".to_string(),
        baseline: None,
    }
}

/// Tree comparison time across comparison worker counts.
pub fn compare_tree_times(inputs: Vec<SweepInput>, hash_workers: usize) -> SweepDefinition {
    let points = [(1, true), (2, true), (2, false), (4, true), (8, true), (16, true)]
        .iter()
        .map(|&(comp, buffered)| {
            ParameterTuple::new()
                .with(Parameter::CompWorkers, comp as usize)
                .with(Parameter::CompBuffered, buffered)
        })
        .collect();

    SweepDefinition {
        name: "compare-tree-times".to_string(),
        program: ProgramKind::FileHasher,
        inputs,
        base: ParameterTuple::new()
            .with(Parameter::HashWorkers, hash_workers)
            .with(Parameter::DataWorkers, 1usize),
        grid: Grid::Explicit { points },
        columns: vec![Parameter::CompWorkers],
        repetitions: None,
        metric: "compareTreeTime".to_string(),
        row_label: RowLabelRule::SuffixWhenFalse {
            parameter: Parameter::CompBuffered,
            suffix: UNBUFFERED_SUFFIX.to_string(),
        },
        table: "compare_tree_times".to_string(),
        baseline: None,
    }
}

/// Whole-run simulation time: sequential, then 1 to 4 processes, with
/// speedups over the sequential run.
pub fn nbody_times(inputs: Vec<SweepInput>) -> SweepDefinition {
    let sequential = ParameterTuple::new()
        .with(Parameter::Algorithm, Algorithm::Sequential)
        .with(Parameter::ProcessCount, 1usize);
    let mut points = vec![sequential.clone()];
    points.extend((1..=4usize).map(|n| {
        ParameterTuple::new()
            .with(Parameter::Algorithm, Algorithm::Parallel)
            .with(Parameter::ProcessCount, n)
    }));

    SweepDefinition {
        name: "nbody-times".to_string(),
        program: ProgramKind::NBody,
        inputs,
        base: ParameterTuple::new().with(Parameter::Theta, crosscheck_core::model::DEFAULT_THETA),
        grid: Grid::Explicit { points },
        columns: vec![Parameter::Algorithm, Parameter::ProcessCount],
        repetitions: None,
        metric: "overall".to_string(),
        row_label: RowLabelRule::Plain,
        table: "nbody_times".to_string(),
        baseline: Some(sequential),
    }
}
