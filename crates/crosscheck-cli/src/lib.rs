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

//! Crosscheck CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! ## Correctness
//!
//! - **check**: run the declared cases against canonical answers
//!
//! ## Benchmarks
//!
//! - **sweep**: run a built-in or JSON-defined sweep, writing a timings table
//! - **sweeps**: list the built-in sweeps
//!
//! ## Utilities
//!
//! - **parse**: summarize a saved program output
//! - **reference**: show or generate the canonical answer for an input
//!
//! # Examples
//!
//! ```no_run
//! use crosscheck_cli::commands::{check, OutputFormat};
//! use crosscheck_cli::config::HarnessConfig;
//!
//! # fn main() -> Result<(), crosscheck_cli::error::CliError> {
//! let config = HarnessConfig::default();
//! check(&config, vec!["input/simple.txt".into()], OutputFormat::Text)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Limits
//!
//! Answer and output files larger than `CROSSCHECK_MAX_OUTPUT_SIZE` bytes
//! (1 GB by default) are refused before they are read.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
