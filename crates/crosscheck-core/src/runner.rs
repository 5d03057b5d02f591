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

//! Process invocation.
//!
//! Programs under test are launched through the [`ProcessRunner`] trait so
//! drivers can be exercised against scripted output. [`SystemRunner`] is the
//! real implementation: a blocking `std::process::Command` with a typed
//! argument vector. There is no timeout; a hung program blocks the caller.

use crate::error::{HarnessError, Result};
use crate::model::RawOutput;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Number of stderr lines kept in a [`HarnessError::ProcessFailed`].
const STDERR_TAIL_LINES: usize = 10;

/// A fully resolved command: program plus argument vector. Never passed
/// through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to launch.
    pub program: String,
    /// Arguments, one element per argv entry.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Fails with [`HarnessError::ProcessFailed`] unless `raw` reports success.
    pub fn ensure_success(&self, raw: &RawOutput) -> Result<()> {
        if raw.succeeded() {
            return Ok(());
        }
        let lines: Vec<&str> = raw.stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        Err(HarnessError::ProcessFailed {
            command: self.to_string(),
            status: match raw.exit_code {
                Some(code) => format!("exit code {}", code),
                None => "a signal".to_string(),
            },
            stderr_tail: tail,
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs a program to completion and captures its output.
pub trait ProcessRunner {
    /// Launches the invocation and blocks until it exits.
    fn invoke(&self, invocation: &Invocation) -> Result<RawOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn invoke(&self, invocation: &Invocation) -> Result<RawOutput> {
        (**self).invoke(invocation)
    }
}

/// Launches real processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    working_dir: Option<PathBuf>,
    stderr_log: Option<PathBuf>,
}

impl SystemRunner {
    /// Creates a runner using the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs programs from the given directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Appends each program's stderr to this file.
    pub fn with_stderr_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_log = Some(path.into());
        self
    }

    fn log_stderr(&self, invocation: &Invocation, stderr: &str) {
        if stderr.is_empty() {
            return;
        }
        debug!(command = %invocation, "stderr:\n{}", stderr);

        let Some(path) = &self.stderr_log else {
            return;
        };
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "$ {}\n{}", invocation, stderr));
        if let Err(e) = appended {
            warn!(path = %path.display(), "failed to append stderr log: {}", e);
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn invoke(&self, invocation: &Invocation) -> Result<RawOutput> {
        debug!(command = %invocation, "invoking program under test");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| HarnessError::Spawn {
            program: invocation.program.clone(),
            message: e.to_string(),
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        self.log_stderr(invocation, &stderr);

        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
            exit_code: output.status.code(),
        })
    }
}
