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

//! Harness configuration.
//!
//! Settings come from three layers: built-in defaults, an optional YAML file
//! given with `--config`, and command-line flags, each overriding the one
//! before.
//!
//! ```yaml
//! program: nbody
//! command: [bin/nbody]
//! mpi_launcher: mpirun
//! answers_dir: answers
//! input_dir: input
//! repetitions: 5
//! tolerance: "0.000001"
//! suite:
//!   nbody_steps: [1000]
//!   process_count: 2
//!   nbody_input_grids:
//!     nb-100000: {steps: [100], thetas: [0.5], deltas: [0.05]}
//! ```

use crate::cli::GlobalArgs;
use crate::error::CliError;
use crosscheck_bench::{SweepSettings, DEFAULT_REPETITIONS, DEFAULT_TIMINGS_DIR};
use crosscheck_core::{
    AnswerStore, Capabilities, ProgramKind, ProgramUnderTest, ReferenceOracle, SuiteSettings,
    SystemRunner, Tolerance,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default answers directory.
pub const DEFAULT_ANSWERS_DIR: &str = "answers";

/// Default inputs directory.
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Resolved harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Program under test.
    pub program: ProgramKind,
    /// Command line of the program; the default for `program` when empty.
    pub command: Vec<String>,
    /// File hasher flag preset (`basic`, `legacy` or `per-phase`).
    pub capabilities: Option<String>,
    /// Launcher for distributed simulation runs.
    pub mpi_launcher: Option<String>,
    /// Directory program processes run in.
    pub working_dir: Option<PathBuf>,
    /// File every run's stderr is appended to.
    pub stderr_log: Option<PathBuf>,
    /// Canonical answers directory.
    pub answers_dir: PathBuf,
    /// Directory inputs are discovered in.
    pub input_dir: PathBuf,
    /// Results tables directory.
    pub timings_dir: PathBuf,
    /// Default repetitions per sweep point.
    pub repetitions: usize,
    /// Accepted difference between state tokens.
    pub tolerance: Option<String>,
    /// Declared case list settings.
    pub suite: SuiteSettings,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            program: ProgramKind::FileHasher,
            command: Vec::new(),
            capabilities: None,
            mpi_launcher: None,
            working_dir: None,
            stderr_log: None,
            answers_dir: PathBuf::from(DEFAULT_ANSWERS_DIR),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            timings_dir: PathBuf::from(DEFAULT_TIMINGS_DIR),
            repetitions: DEFAULT_REPETITIONS,
            tolerance: None,
            suite: SuiteSettings::default(),
        }
    }
}

/// Command used when none is configured.
pub fn default_command(kind: ProgramKind) -> Vec<String> {
    let command: &[&str] = match kind {
        ProgramKind::FileHasher => &["go", "run", "./src"],
        ProgramKind::NBody => &["bin/nbody"],
    };
    command.iter().map(|s| s.to_string()).collect()
}

impl HarnessConfig {
    /// Parses a YAML config.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, CliError> {
        serde_yaml::from_str(text).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reads a YAML config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))?;
        Self::from_yaml(path, &text)
    }

    /// Loads the file named by `--config`, if any, then applies the flags.
    pub fn resolve(args: &GlobalArgs) -> Result<Self, CliError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        debug!(
            program = %config.program,
            answers = %config.answers_dir.display(),
            timings = %config.timings_dir.display(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Applies command-line overrides.
    ///
    /// Selecting a different program without a command drops the configured
    /// command, since it belongs to the other program.
    pub fn apply(&mut self, args: &GlobalArgs) {
        if let Some(kind) = args.program {
            if kind != self.program && args.command.is_none() {
                self.command.clear();
            }
            self.program = kind;
        }
        if let Some(command) = &args.command {
            self.command = command.split_whitespace().map(str::to_string).collect();
        }
        if let Some(preset) = &args.capabilities {
            self.capabilities = Some(preset.clone());
        }
        if let Some(dir) = &args.answers_dir {
            self.answers_dir = dir.clone();
        }
        if let Some(dir) = &args.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &args.timings_dir {
            self.timings_dir = dir.clone();
        }
    }

    /// Builds the program under test.
    pub fn program_under_test(&self) -> Result<ProgramUnderTest, CliError> {
        let command = if self.command.is_empty() {
            default_command(self.program)
        } else {
            self.command.clone()
        };
        let mut program = ProgramUnderTest::new(self.program, command);
        if let Some(preset) = &self.capabilities {
            program = program.with_capabilities(preset.parse::<Capabilities>()?);
        }
        if let Some(launcher) = &self.mpi_launcher {
            program = program.with_mpi_launcher(launcher.clone());
        }
        Ok(program)
    }

    /// Builds the process runner.
    pub fn runner(&self) -> SystemRunner {
        let mut runner = SystemRunner::new();
        if let Some(dir) = &self.working_dir {
            runner = runner.with_working_dir(dir);
        }
        if let Some(log) = &self.stderr_log {
            runner = runner.with_stderr_log(log);
        }
        runner
    }

    /// Builds a reference oracle over the answers directory.
    pub fn oracle(&self) -> Result<ReferenceOracle, CliError> {
        Ok(ReferenceOracle::new(
            AnswerStore::new(&self.answers_dir),
            self.program_under_test()?,
        ))
    }

    /// The configured tolerance, or the default.
    pub fn tolerance(&self) -> Result<Tolerance, CliError> {
        match &self.tolerance {
            Some(text) => Ok(text.parse()?),
            None => Ok(Tolerance::default()),
        }
    }

    /// Suite settings with the configured tolerance.
    pub fn suite_settings(&self) -> Result<SuiteSettings, CliError> {
        Ok(SuiteSettings {
            tolerance: self.tolerance()?,
            ..self.suite.clone()
        })
    }

    /// Sweep engine settings.
    pub fn sweep_settings(&self) -> SweepSettings {
        SweepSettings::default()
            .with_repetitions(self.repetitions)
            .with_timings_dir(&self.timings_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> HarnessConfig {
        HarnessConfig::from_yaml(Path::new("crosscheck.yaml"), text).unwrap()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(yaml("{}"), HarnessConfig::default());
    }

    #[test]
    fn test_yaml_fields() {
        let config = yaml(
            "program: nbody\ncommand: [bin/nbody]\nmpi_launcher: mpirun\nrepetitions: 5\n\
             tolerance: \"0.001\"\nsuite:\n  nbody_steps: [10]\n  process_count: 2\n",
        );
        assert_eq!(config.program, ProgramKind::NBody);
        assert_eq!(config.repetitions, 5);
        assert_eq!(config.suite.nbody_steps, vec![10]);
        assert_eq!(config.suite.process_count, 2);
        assert_eq!(config.suite.hash_workers, SuiteSettings::default().hash_workers);
        assert_eq!(config.suite_settings().unwrap().tolerance.as_str(), "0.001");
    }

    #[test]
    fn test_input_grid_from_yaml() {
        let config = yaml(
            "suite:\n  nbody_input_grids:\n    nb-1000: {steps: [50], thetas: [0.0], deltas: [0.5]}\n",
        );
        let grid = &config.suite.nbody_input_grids["nb-1000"];
        assert_eq!(grid.steps, vec![50]);
        assert_eq!(grid.deltas, vec![0.5]);
        assert!(!config.suite.nbody_input_grids.contains_key("nb-100000"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = HarnessConfig::from_yaml(Path::new("c.yaml"), "progam: nbody\n").unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = yaml("command: [./hasher]\nanswers_dir: old\n");
        config.apply(&GlobalArgs {
            answers_dir: Some(PathBuf::from("new")),
            command: Some("go run ./cmd".to_string()),
            ..GlobalArgs::default()
        });
        assert_eq!(config.answers_dir, PathBuf::from("new"));
        assert_eq!(config.command, vec!["go", "run", "./cmd"]);
    }

    #[test]
    fn test_switching_program_drops_command() {
        let mut config = yaml("command: [./hasher]\n");
        config.apply(&GlobalArgs {
            program: Some(ProgramKind::NBody),
            ..GlobalArgs::default()
        });
        let program = config.program_under_test().unwrap();
        assert_eq!(program.kind(), ProgramKind::NBody);
        assert!(config.command.is_empty());
    }

    #[test]
    fn test_bad_capabilities_preset() {
        let config = yaml("capabilities: v9\n");
        assert!(config.program_under_test().is_err());
    }

    #[test]
    fn test_bad_tolerance() {
        let config = yaml("tolerance: \"-1\"\n");
        assert!(config.suite_settings().is_err());
    }
}
