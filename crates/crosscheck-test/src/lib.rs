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

//! Shared test fixtures and utilities for Crosscheck.
//!
//! - **Fixtures**: canned file hasher stdout and simulator state files,
//!   including reordered, wrong and malformed variants
//! - **ScriptedRunner**: a [`ProcessRunner`](crosscheck_core::ProcessRunner)
//!   that replays outputs and records every invocation
//!
//! # Quick Start
//!
//! ```rust
//! use crosscheck_core::{ProgramUnderTest, RunConfiguration};
//! use crosscheck_test::{fixtures, ScriptedRunner};
//!
//! let runner = ScriptedRunner::new().push_stdout(fixtures::SIMPLE_REFERENCE);
//! let program = ProgramUnderTest::file_hasher(["hasher"]);
//! let run = program.execute(&runner, &RunConfiguration::new("simple.txt")).unwrap();
//! assert_eq!(run.raw.stdout, fixtures::SIMPLE_REFERENCE);
//! assert_eq!(runner.invocation_count(), 1);
//! ```

pub mod fixtures;
mod runner;

pub use runner::{Response, ScriptedRunner};
