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

//! Crosscheck benchmark sweeps
//!
//! Runs a program under test over a grid of parameter tuples and inputs,
//! measures one timing metric per run, and writes mean and sample standard
//! deviation rows to a CSV table.
//!
//! ## Features
//!
//! - **Grids**: explicit tuples or a doubling grid capped at the input size
//! - **Catalog**: the built-in file hasher and simulator sweeps
//! - **Definitions**: user sweeps loaded from JSON
//!
//! ## Usage
//!
//! ```no_run
//! use crosscheck_bench::{catalog, SweepEngine, SweepSettings};
//! use crosscheck_core::{ProgramUnderTest, SystemRunner};
//! use std::path::Path;
//!
//! let program = ProgramUnderTest::file_hasher(["go", "run", "src/main.go"]);
//! let runner = SystemRunner::new();
//! let engine = SweepEngine::new(&program, &runner, SweepSettings::default());
//! let definition = catalog::builtin("hash-times", Path::new("input"), 32).unwrap();
//! let summary = engine.run_sweep(&definition).unwrap();
//! println!("{} rows written to {}", summary.rows.len(), summary.table.display());
//! ```

pub mod catalog;
pub mod error;
pub mod grid;
pub mod metric;
pub mod stats;
pub mod sweep;
pub mod table;

pub use error::{BenchError, Result};
pub use grid::{
    count_lines, doubling_worker_counts, Grid, ParamValue, Parameter, ParameterTuple, SweepInput,
};
pub use metric::MetricExtractor;
pub use stats::{compute_statistics, Statistics};
pub use sweep::{
    PointFailure, RowLabelRule, Speedup, SweepDefinition, SweepEngine, SweepSettings, SweepSummary,
    DEFAULT_REPETITIONS, DEFAULT_TIMINGS_DIR,
};
pub use table::{BenchmarkResultRow, ResultsTable};
