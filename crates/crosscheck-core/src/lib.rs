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

//! Crosscheck core
//!
//! Correctness checking for concurrent programs judged by their text output.
//!
//! ## Components
//!
//! - **Parser**: phase timing lines, hash entries and group entries from the
//!   file hasher's stdout ([`parse`], [`parse_strict`])
//! - **Numeric state**: positional decimal tables from the simulator's output
//!   file ([`StateTable`], [`Tolerance`])
//! - **Comparator**: order-insensitive hash/group policy and positional
//!   numeric policy ([`compare`])
//! - **Oracle**: canonical reference answers, generated once and stored
//!   ([`ReferenceOracle`])
//! - **Suite**: the declared candidate configurations ([`run_suite`])
//!
//! Programs are launched through [`ProcessRunner`], so everything above can
//! be driven by scripted output in tests.

pub mod compare;
pub mod error;
pub mod model;
pub mod numeric;
pub mod oracle;
pub mod parser;
pub mod program;
pub mod runner;
pub mod suite;

pub use compare::{
    compare, compare_group_entries, compare_hash_entries, compare_state, compare_structured,
    Comparison, ComparisonPolicy,
};
pub use error::{FailureKind, HarnessError, Mismatch, Result, Section};
pub use model::{
    Algorithm, GroupEntry, HashEntry, Observation, ParsedOutput, PhaseLabel, RawOutput,
    RunConfiguration, SimulationParams, TimingLine,
};
pub use numeric::{DecimalToken, StateTable, Tolerance, DEFAULT_TOLERANCE};
pub use oracle::{read_bounded, AnswerStore, ReferenceOracle};
pub use parser::{parse, parse_group_line, parse_hash_line, parse_strict, parse_timing_line};
pub use program::{Capabilities, Execution, ProgramKind, ProgramUnderTest};
pub use runner::{Invocation, ProcessRunner, SystemRunner};
pub use suite::{
    cases_for, run_case, run_suite, CaseCheck, CaseOutcome, CaseResult, SuiteCase, SuiteReport,
    SimulationGrid, SuiteSettings, DEFAULT_HASH_WORKERS,
};
