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

//! Results tables: headerless CSV under the timings directory.

use crate::error::{BenchError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// One row of a results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResultRow {
    /// Input identifier, with the row-label rule applied.
    pub input: String,
    /// Declared parameter columns, in declaration order.
    pub columns: Vec<String>,
    /// Mean of the repetitions.
    pub mean: f64,
    /// Sample standard deviation of the repetitions.
    pub std_dev: f64,
}

impl BenchmarkResultRow {
    /// The row as CSV fields.
    pub fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(self.columns.len() + 3);
        record.push(self.input.clone());
        record.extend(self.columns.iter().cloned());
        record.push(self.mean.to_string());
        record.push(self.std_dev.to_string());
        record
    }
}

/// An open results table. Every appended row is flushed immediately.
pub struct ResultsTable {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ResultsTable {
    /// Creates (or truncates) the table at `path`, creating parent
    /// directories as needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BenchError::table(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| BenchError::table(&path, e))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        Ok(Self { path, writer })
    }

    /// The table's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a row and flushes it to disk.
    pub fn append(&mut self, row: &BenchmarkResultRow) -> Result<()> {
        self.writer
            .write_record(row.record())
            .map_err(|e| BenchError::table(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| BenchError::table(&self.path, e))
    }
}
