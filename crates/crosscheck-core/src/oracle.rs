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

//! Reference oracle: stored answers keyed by input and parameters.
//!
//! The first time an answer is needed it is generated by running the program
//! in its canonical single-worker configuration, validated, and written to
//! `<answers>/<key>.ref`. Later requests read the file. Writes go through a
//! temporary file in the same directory and are never allowed to replace an
//! existing answer, so concurrent harness processes end up agreeing on one.

use crate::error::{HarnessError, Result};
use crate::model::{Observation, RunConfiguration};
use crate::program::{ProgramKind, ProgramUnderTest};
use crate::runner::ProcessRunner;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the maximum size of files read back.
pub const MAX_OUTPUT_SIZE_ENV: &str = "CROSSCHECK_MAX_OUTPUT_SIZE";

/// Default maximum size of a stored answer or state file (1 GB).
pub const DEFAULT_MAX_OUTPUT_SIZE: u64 = 1024 * 1024 * 1024;

/// Extension of stored answer files.
pub const ANSWER_EXTENSION: &str = "ref";

fn max_output_size() -> u64 {
    std::env::var(MAX_OUTPUT_SIZE_ENV)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_OUTPUT_SIZE)
}

/// Reads a text file, refusing files larger than the configured maximum.
///
/// # Errors
///
/// Returns [`HarnessError::OutputTooLarge`] if the file exceeds
/// `CROSSCHECK_MAX_OUTPUT_SIZE` bytes, or [`HarnessError::Io`] if it cannot
/// be read.
pub fn read_bounded(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| HarnessError::io_error(path, e))?;
    let max = max_output_size();
    if metadata.len() > max {
        return Err(HarnessError::OutputTooLarge {
            path: path.to_path_buf(),
            actual: metadata.len(),
            max,
        });
    }
    fs::read_to_string(path).map_err(|e| HarnessError::io_error(path, e))
}

/// Directory of stored reference answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerStore {
    dir: PathBuf,
}

impl AnswerStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The answers directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the answer key for a run.
    ///
    /// The key is the input's base name up to its first `.`. Simulator keys
    /// append the step count, threshold and time step, since the same input
    /// has a different answer for each.
    ///
    /// # Examples
    ///
    /// ```
    /// use crosscheck_core::{AnswerStore, ProgramKind, RunConfiguration};
    ///
    /// let config = RunConfiguration::new("input/nb-10.txt").with_steps(5000).with_theta(0.0);
    /// assert_eq!(AnswerStore::key_for(ProgramKind::NBody, &config), "nb-10-5000-0.0-0.005");
    ///
    /// let config = RunConfiguration::new("input/coarse.tree.txt");
    /// assert_eq!(AnswerStore::key_for(ProgramKind::FileHasher, &config), "coarse");
    /// ```
    pub fn key_for(kind: ProgramKind, config: &RunConfiguration) -> String {
        let stem = input_stem(config.input());
        match kind {
            ProgramKind::FileHasher => stem,
            ProgramKind::NBody => {
                let sim = config.simulation();
                format!("{}-{:?}-{:?}-{:?}", stem, sim.steps, sim.theta, sim.delta)
            }
        }
    }

    /// Path of the stored answer for a run.
    pub fn path_for(&self, kind: ProgramKind, config: &RunConfiguration) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::key_for(kind, config), ANSWER_EXTENSION))
    }

    /// Loads a stored answer, `None` if there is none yet.
    pub fn load(&self, path: &Path) -> Result<Option<String>> {
        match read_bounded(path) {
            Ok(text) => Ok(Some(text)),
            Err(HarnessError::Io { .. }) if !path.exists() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persists an answer without replacing an existing one.
    ///
    /// Returns the text that is stored afterwards: `text` itself, or the
    /// answer another writer persisted first.
    pub fn store(&self, path: &Path, text: &str) -> Result<String> {
        fs::create_dir_all(&self.dir).map_err(|e| HarnessError::io_error(&self.dir, e))?;

        let mut staged =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| HarnessError::io_error(&self.dir, e))?;
        staged
            .write_all(text.as_bytes())
            .and_then(|_| staged.flush())
            .map_err(|e| HarnessError::io_error(staged.path(), e))?;

        match staged.persist_noclobber(path) {
            Ok(_) => Ok(text.to_string()),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "answer written concurrently, keeping existing");
                read_bounded(path)
            }
            Err(e) => Err(HarnessError::io_error(path, e.error)),
        }
    }
}

pub(crate) fn input_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string()),
    }
}

/// Produces and caches canonical answers for one program.
pub struct ReferenceOracle {
    store: AnswerStore,
    program: ProgramUnderTest,
    cache: HashMap<PathBuf, Observation>,
    generated: usize,
}

impl ReferenceOracle {
    /// Creates an oracle for `program` backed by `store`.
    pub fn new(store: AnswerStore, program: ProgramUnderTest) -> Self {
        Self {
            store,
            program,
            cache: HashMap::new(),
            generated: 0,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    /// The program answers are generated with.
    pub fn program(&self) -> &ProgramUnderTest {
        &self.program
    }

    /// Number of answers generated (not loaded) by this oracle.
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// Returns the canonical answer for the input and parameters of `config`.
    ///
    /// Only the input and, for the simulator, the simulation parameters of
    /// `config` matter; worker counts and flags are replaced by the canonical
    /// configuration before generating.
    ///
    /// # Errors
    ///
    /// Returns an error if the canonical run fails, its output does not
    /// parse, or the answers directory cannot be read or written.
    pub fn get_reference<R: ProcessRunner + ?Sized>(
        &mut self,
        runner: &R,
        config: &RunConfiguration,
    ) -> Result<&Observation> {
        let path = self.store.path_for(self.program.kind(), config);
        if !self.cache.contains_key(&path) {
            let observation = self.load_or_generate(runner, config, &path)?;
            self.cache.insert(path.clone(), observation);
        }
        self.cache
            .get(&path)
            .ok_or_else(|| HarnessError::io_error(&path, io::ErrorKind::NotFound.into()))
    }

    fn load_or_generate<R: ProcessRunner + ?Sized>(
        &mut self,
        runner: &R,
        config: &RunConfiguration,
        path: &Path,
    ) -> Result<Observation> {
        if let Some(text) = self.store.load(path)? {
            debug!(answer = %path.display(), "using stored answer");
            return self.program.observe(&text);
        }

        let canonical = self.program.canonical(config);
        info!(
            input = %config.input().display(),
            answer = %path.display(),
            "generating reference answer"
        );
        let execution = self.program.execute(runner, &canonical)?;
        let text = execution.answer_text();
        let observation = self.program.observe(text)?;
        self.generated += 1;

        let stored = self.store.store(path, text)?;
        if stored == text {
            Ok(observation)
        } else {
            self.program.observe(&stored)
        }
    }
}
