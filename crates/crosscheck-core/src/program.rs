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

//! Programs under test and how to invoke them.
//!
//! A [`ProgramUnderTest`] pairs the kind of program with the command that
//! launches it and, for the file hasher, a [`Capabilities`] descriptor of the
//! flags that version accepts. One harness covers every version: a
//! configuration that sets a flag the descriptor lacks is rejected instead of
//! being passed along.

use crate::compare::ComparisonPolicy;
use crate::error::{HarnessError, Result};
use crate::model::{Algorithm, Observation, PhaseLabel, RawOutput, RunConfiguration};
use crate::numeric::{StateTable, Tolerance};
use crate::parser::parse;
use crate::runner::{Invocation, ProcessRunner};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default launcher for distributed simulation runs.
pub const DEFAULT_MPI_LAUNCHER: &str = "mpiexec";

/// The two supported programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramKind {
    /// Concurrent tree hashing, grouping and comparison tool.
    FileHasher,
    /// Barnes-Hut N-body simulator.
    #[serde(rename = "nbody")]
    NBody,
}

impl ProgramKind {
    /// Name used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileHasher => "file-hasher",
            Self::NBody => "nbody",
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file-hasher" | "hasher" => Ok(Self::FileHasher),
            "nbody" | "n-body" => Ok(Self::NBody),
            other => Err(HarnessError::invalid_config(
                "program",
                format!("unknown program '{}' (expected file-hasher or nbody)", other),
            )),
        }
    }
}

/// Flags a file hasher version understands beyond the worker counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Single `--buffered` flag.
    pub buffered: bool,
    /// `--data-buffered`.
    pub data_buffered: bool,
    /// `--comp-buffered`.
    pub comp_buffered: bool,
    /// `--data-use-channels`.
    pub data_use_channels: bool,
}

impl Capabilities {
    /// Worker counts only.
    pub const BASIC: Self = Self {
        buffered: false,
        data_buffered: false,
        comp_buffered: false,
        data_use_channels: false,
    };

    /// One buffering flag shared by every phase.
    pub const LEGACY: Self = Self {
        buffered: true,
        ..Self::BASIC
    };

    /// Per-phase buffering plus channel-style data passing.
    pub const PER_PHASE: Self = Self {
        buffered: false,
        data_buffered: true,
        comp_buffered: true,
        data_use_channels: true,
    };

    /// Name of the matching preset, or `custom`.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::BASIC => "basic",
            Self::LEGACY => "legacy",
            Self::PER_PHASE => "per-phase",
            _ => "custom",
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::PER_PHASE
    }
}

impl FromStr for Capabilities {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(Self::BASIC),
            "legacy" => Ok(Self::LEGACY),
            "per-phase" => Ok(Self::PER_PHASE),
            other => Err(HarnessError::invalid_config(
                "capabilities",
                format!("unknown preset '{}' (expected basic, legacy or per-phase)", other),
            )),
        }
    }
}

/// Result of running a program once.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Captured process output.
    pub raw: RawOutput,
    /// Contents of the state output file, for programs that write one.
    pub state: Option<String>,
}

impl Execution {
    /// The text correctness is judged on: the state file if there is one,
    /// standard output otherwise.
    pub fn answer_text(&self) -> &str {
        self.state.as_deref().unwrap_or(&self.raw.stdout)
    }
}

/// A program under test plus everything needed to launch it.
///
/// # Example
///
/// ```
/// use crosscheck_core::{Capabilities, ProgramUnderTest, RunConfiguration};
///
/// let program = ProgramUnderTest::file_hasher(["bin/hasher"]).with_capabilities(Capabilities::PER_PHASE);
/// let config = RunConfiguration::new("input/simple.txt")
///     .with_hash_workers(4)
///     .with_data_workers(2)
///     .with_data_buffered(false);
/// let invocation = program.invocation(&config).unwrap();
/// assert_eq!(invocation.program, "bin/hasher");
/// assert!(invocation.args.contains(&"--data-buffered=false".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramUnderTest {
    kind: ProgramKind,
    command: Vec<String>,
    capabilities: Capabilities,
    mpi_launcher: String,
}

impl ProgramUnderTest {
    /// Creates a program descriptor. `command` is the executable followed by
    /// any leading arguments (e.g. `go run main.go`).
    pub fn new<I, S>(kind: ProgramKind, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            command: command.into_iter().map(Into::into).collect(),
            capabilities: Capabilities::default(),
            mpi_launcher: DEFAULT_MPI_LAUNCHER.to_string(),
        }
    }

    /// Shorthand for a file hasher descriptor.
    pub fn file_hasher<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ProgramKind::FileHasher, command)
    }

    /// Shorthand for a simulator descriptor.
    pub fn nbody<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ProgramKind::NBody, command)
    }

    /// Sets the capability descriptor.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the launcher used for distributed simulation runs.
    pub fn with_mpi_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.mpi_launcher = launcher.into();
        self
    }

    /// Program kind.
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Capability descriptor.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Returns the configuration that produces trustworthy reference output
    /// for `config`'s input: a single worker everywhere.
    pub fn canonical(&self, config: &RunConfiguration) -> RunConfiguration {
        let base = RunConfiguration::new(config.input());
        match self.kind {
            ProgramKind::FileHasher => base
                .with_hash_workers(1)
                .with_data_workers(1)
                .with_comp_workers(1),
            ProgramKind::NBody => base
                .with_simulation(config.simulation())
                .with_algorithm(Algorithm::Sequential)
                .with_process_count(1),
        }
    }

    /// Phase timing labels a file hasher run with `config` must print, in order.
    pub fn expected_phases(&self, config: &RunConfiguration) -> Vec<PhaseLabel> {
        match self.kind {
            ProgramKind::FileHasher => {
                let mut phases = vec![if config.data_workers() == 0 {
                    PhaseLabel::Hash
                } else {
                    PhaseLabel::HashGroup
                }];
                if config.comp_workers() > 0 {
                    phases.push(PhaseLabel::CompareTree);
                }
                phases
            }
            ProgramKind::NBody => vec![PhaseLabel::Overall],
        }
    }

    /// Builds the typed invocation for a configuration.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::UnsupportedFlag`] if the configuration sets a flag
    ///   the capability descriptor lacks.
    /// - [`HarnessError::InvalidConfig`] if the command is empty, or a
    ///   simulation run has no output file.
    pub fn invocation(&self, config: &RunConfiguration) -> Result<Invocation> {
        let (program, leading) = self
            .command
            .split_first()
            .ok_or_else(|| HarnessError::invalid_config("command", "program command is empty"))?;

        match self.kind {
            ProgramKind::FileHasher => {
                let mut args = leading.to_vec();
                args.extend(self.hasher_args(config)?);
                Ok(Invocation::new(program.clone(), args))
            }
            ProgramKind::NBody => {
                let mut args = leading.to_vec();
                args.extend(nbody_args(config)?);
                if config.algorithm() == Algorithm::Sequential {
                    Ok(Invocation::new(program.clone(), args))
                } else {
                    let mut launched = vec![
                        "-n".to_string(),
                        config.process_count().to_string(),
                        program.clone(),
                    ];
                    launched.extend(args);
                    Ok(Invocation::new(self.mpi_launcher.clone(), launched))
                }
            }
        }
    }

    fn hasher_args(&self, config: &RunConfiguration) -> Result<Vec<String>> {
        let mut args = vec![
            format!("--input={}", config.input().display()),
            format!("--hash-workers={}", config.hash_workers()),
            format!("--data-workers={}", config.data_workers()),
            format!("--comp-workers={}", config.comp_workers()),
        ];

        let flags = [
            ("buffered", config.buffered(), self.capabilities.buffered),
            ("data-buffered", config.data_buffered(), self.capabilities.data_buffered),
            ("data-use-channels", config.data_use_channels(), self.capabilities.data_use_channels),
            ("comp-buffered", config.comp_buffered(), self.capabilities.comp_buffered),
        ];
        for (flag, value, supported) in flags {
            let Some(value) = value else { continue };
            if !supported {
                return Err(HarnessError::UnsupportedFlag {
                    flag,
                    capabilities: self.capabilities.name().to_string(),
                });
            }
            args.push(format!("--{}={}", flag, value));
        }
        Ok(args)
    }

    /// Returns true if every optional flag `config` sets is supported.
    pub fn supports(&self, config: &RunConfiguration) -> bool {
        match self.kind {
            ProgramKind::FileHasher => self.hasher_args(config).is_ok(),
            ProgramKind::NBody => true,
        }
    }

    /// Runs the program once and collects what correctness is judged on.
    ///
    /// Simulator runs without an output file write to a temporary file that
    /// is read back and removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be launched, exits non-zero,
    /// or its state file cannot be read.
    pub fn execute<R: ProcessRunner + ?Sized>(
        &self,
        runner: &R,
        config: &RunConfiguration,
    ) -> Result<Execution> {
        if self.kind == ProgramKind::NBody && config.output().is_none() {
            let scratch = tempfile::Builder::new()
                .prefix("crosscheck-state-")
                .suffix(".txt")
                .tempfile()
                .map_err(|e| HarnessError::io_error(std::env::temp_dir(), e))?;
            let config = config.clone().with_output(scratch.path());
            return self.execute(runner, &config);
        }

        let invocation = self.invocation(config)?;
        let raw = runner.invoke(&invocation)?;
        invocation.ensure_success(&raw)?;

        let state = match (self.kind, config.output()) {
            (ProgramKind::NBody, Some(path)) => Some(read_state(path)?),
            _ => None,
        };
        Ok(Execution { raw, state })
    }

    /// Interprets answer text the way this program's output is judged.
    pub fn observe(&self, text: &str) -> Result<Observation> {
        match self.kind {
            ProgramKind::FileHasher => parse(text).map(Observation::Structured),
            ProgramKind::NBody => StateTable::parse(text).map(Observation::State),
        }
    }

    /// The comparison policy for this program's output.
    pub fn comparison_policy(&self, tolerance: &Tolerance) -> ComparisonPolicy {
        match self.kind {
            ProgramKind::FileHasher => ComparisonPolicy::HashGroup,
            ProgramKind::NBody => ComparisonPolicy::NumericState(tolerance.clone()),
        }
    }
}

fn nbody_args(config: &RunConfiguration) -> Result<Vec<String>> {
    let output = config.output().ok_or_else(|| {
        HarnessError::invalid_config("output", "simulation runs need an output file")
    })?;
    let sim = config.simulation();
    let mut args = vec![
        "-i".to_string(),
        config.input().display().to_string(),
        "-o".to_string(),
        output.display().to_string(),
        "-d".to_string(),
        sim.delta.to_string(),
        "-t".to_string(),
        sim.theta.to_string(),
        "-s".to_string(),
        sim.steps.to_string(),
    ];
    if config.algorithm() == Algorithm::Sequential {
        args.push("-1".to_string());
    }
    Ok(args)
}

fn read_state(path: &Path) -> Result<String> {
    crate::oracle::read_bounded(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn args(invocation: &Invocation) -> Vec<&str> {
        invocation.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_hasher_invocation_defaults() {
        let program = ProgramUnderTest::file_hasher(["go", "run", "src/main.go"]);
        let inv = program
            .invocation(&RunConfiguration::new("input/simple.txt"))
            .unwrap();
        assert_eq!(inv.program, "go");
        assert_eq!(
            args(&inv),
            vec![
                "run",
                "src/main.go",
                "--input=input/simple.txt",
                "--hash-workers=1",
                "--data-workers=0",
                "--comp-workers=0",
            ]
        );
    }

    #[test]
    fn test_hasher_flags_follow_capabilities() {
        let config = RunConfiguration::new("in.txt").with_comp_buffered(true);

        let per_phase = ProgramUnderTest::file_hasher(["h"]);
        assert!(args(&per_phase.invocation(&config).unwrap()).contains(&"--comp-buffered=true"));

        let legacy = ProgramUnderTest::file_hasher(["h"]).with_capabilities(Capabilities::LEGACY);
        let err = legacy.invocation(&config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidConfig);
        assert!(err.to_string().contains("comp-buffered"));
        assert!(err.to_string().contains("legacy"));
        assert!(!legacy.supports(&config));

        let legacy_config = RunConfiguration::new("in.txt").with_buffered(false);
        assert!(args(&legacy.invocation(&legacy_config).unwrap()).contains(&"--buffered=false"));
    }

    #[test]
    fn test_nbody_sequential_invocation() {
        let program = ProgramUnderTest::nbody(["bin/nbody"]);
        let config = RunConfiguration::new("input/nb-10.txt")
            .with_output("out.txt")
            .with_steps(5_000)
            .with_theta(0.5)
            .with_delta(0.05)
            .with_algorithm(Algorithm::Sequential);
        let inv = program.invocation(&config).unwrap();
        assert_eq!(inv.program, "bin/nbody");
        assert_eq!(
            args(&inv),
            vec![
                "-i", "input/nb-10.txt", "-o", "out.txt", "-d", "0.05", "-t", "0.5", "-s", "5000",
                "-1"
            ]
        );
    }

    #[test]
    fn test_nbody_parallel_uses_mpi_launcher() {
        let program = ProgramUnderTest::nbody(["bin/nbody"]).with_mpi_launcher("mpirun");
        let config = RunConfiguration::new("in.txt")
            .with_output("/dev/null")
            .with_process_count(3);
        let inv = program.invocation(&config).unwrap();
        assert_eq!(inv.program, "mpirun");
        assert_eq!(&args(&inv)[..3], &["-n", "3", "bin/nbody"]);
        assert!(!inv.args.contains(&"-1".to_string()));
    }

    #[test]
    fn test_nbody_requires_output() {
        let program = ProgramUnderTest::nbody(["bin/nbody"]);
        assert!(program.invocation(&RunConfiguration::new("in.txt")).is_err());
    }

    #[test]
    fn test_empty_command_rejected() {
        let program = ProgramUnderTest::file_hasher(Vec::<String>::new());
        assert!(program.invocation(&RunConfiguration::new("in.txt")).is_err());
    }

    #[test]
    fn test_canonical_configurations() {
        let hasher = ProgramUnderTest::file_hasher(["h"]);
        let config = RunConfiguration::new("in.txt")
            .with_hash_workers(32)
            .with_data_workers(16)
            .with_data_use_channels(true);
        let canonical = hasher.canonical(&config);
        assert_eq!(canonical.hash_workers(), 1);
        assert_eq!(canonical.data_workers(), 1);
        assert_eq!(canonical.comp_workers(), 1);
        assert_eq!(canonical.data_use_channels(), None);

        let nbody = ProgramUnderTest::nbody(["n"]);
        let config = RunConfiguration::new("nb.txt").with_steps(42).with_process_count(4);
        let canonical = nbody.canonical(&config);
        assert_eq!(canonical.algorithm(), Algorithm::Sequential);
        assert_eq!(canonical.simulation().steps, 42);
        assert_eq!(canonical.process_count(), 1);
    }

    #[test]
    fn test_expected_phases() {
        let hasher = ProgramUnderTest::file_hasher(["h"]);
        let base = RunConfiguration::new("in.txt");
        assert_eq!(hasher.expected_phases(&base), vec![PhaseLabel::Hash]);
        assert_eq!(
            hasher.expected_phases(&base.clone().with_data_workers(2)),
            vec![PhaseLabel::HashGroup]
        );
        assert_eq!(
            hasher.expected_phases(&base.with_data_workers(1).with_comp_workers(1)),
            vec![PhaseLabel::HashGroup, PhaseLabel::CompareTree]
        );
    }

    #[test]
    fn test_program_kind_parsing() {
        assert_eq!("file-hasher".parse::<ProgramKind>().unwrap(), ProgramKind::FileHasher);
        assert_eq!("nbody".parse::<ProgramKind>().unwrap(), ProgramKind::NBody);
        assert!("prefix-scan".parse::<ProgramKind>().is_err());
    }

    #[test]
    fn test_capability_presets() {
        assert_eq!("legacy".parse::<Capabilities>().unwrap(), Capabilities::LEGACY);
        assert_eq!(Capabilities::default().name(), "per-phase");
        let custom = Capabilities {
            data_use_channels: false,
            ..Capabilities::PER_PHASE
        };
        assert_eq!(custom.name(), "custom");
    }
}
