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

//! Error types for the Crosscheck harness.
//!
//! Two families of errors live here:
//!
//! - [`Mismatch`]: a correctness failure reported by the comparator. These are
//!   values, not aborts; one comparison call can yield several of them.
//! - [`HarnessError`]: anything that stops a single run from producing a
//!   comparable result (malformed output, a process that failed to launch or
//!   exited non-zero, unreadable answers, invalid configuration).
//!
//! Both carry the full context needed to report a failing case without
//! re-running it: line numbers, both observed values, the offending text.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Coarse classification of every failure the harness can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    /// Output text did not fit the expected grammar.
    MalformedOutput,
    /// Two collections or lines differ in length.
    CountMismatch,
    /// Sorted hash entries disagree on their id.
    KeyMismatch,
    /// Tag multisets differ.
    TagSetMismatch,
    /// A numeric token is outside the tolerance.
    ToleranceExceeded,
    /// A benchmark metric label was not found in the output.
    MetricNotFound,
    /// The program under test could not be launched or exited non-zero.
    ProcessFailed,
    /// File system error.
    Io,
    /// The configuration asks for something the harness cannot do.
    InvalidConfig,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedOutput => write!(f, "MalformedOutput"),
            Self::CountMismatch => write!(f, "CountMismatch"),
            Self::KeyMismatch => write!(f, "KeyMismatch"),
            Self::TagSetMismatch => write!(f, "TagSetMismatch"),
            Self::ToleranceExceeded => write!(f, "ToleranceExceeded"),
            Self::MetricNotFound => write!(f, "MetricNotFound"),
            Self::ProcessFailed => write!(f, "ProcessFailed"),
            Self::Io => write!(f, "IoError"),
            Self::InvalidConfig => write!(f, "InvalidConfig"),
        }
    }
}

/// The part of an output a mismatch was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    /// `<id>: <tags>` lines.
    HashEntries,
    /// `group <index> <tags>` lines.
    GroupEntries,
    /// Lines of a numeric state table.
    StateLines,
    /// Tokens within one line (1-based) of a numeric state table.
    StateTokens {
        /// Line number (1-based).
        line: usize,
    },
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashEntries => write!(f, "hash entries"),
            Self::GroupEntries => write!(f, "group entries"),
            Self::StateLines => write!(f, "state lines"),
            Self::StateTokens { line } => write!(f, "tokens on line {}", line),
        }
    }
}

/// A correctness failure found by the comparator.
///
/// # Examples
///
/// ```
/// use crosscheck_core::{Mismatch, Section};
///
/// let m = Mismatch::TagSetMismatch {
///     section: Section::HashEntries,
///     key: 2,
///     expected: vec!["b.txt".into(), "c.txt".into()],
///     actual: vec!["b.txt".into()],
/// };
/// assert_eq!(
///     m.to_string(),
///     "hash entries entry 2: expected tags [b.txt c.txt], found [b.txt]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Mismatch {
    /// Collections or lines differ in length.
    #[error("{section}: expected {expected} item(s), found {actual}")]
    CountMismatch {
        /// Where the counts were taken.
        section: Section,
        /// Count on the reference side.
        expected: usize,
        /// Count on the candidate side.
        actual: usize,
    },

    /// Hash entry ids differ at the same sorted position.
    #[error("hash entries: key mismatch at sorted position {position}: expected {expected}, found {actual}")]
    KeyMismatch {
        /// Position in the id-sorted collections (0-based).
        position: usize,
        /// Reference id.
        expected: u32,
        /// Candidate id.
        actual: u32,
    },

    /// Tag multisets differ. `key` is the hash id for hash entries and the
    /// sorted position for group entries.
    #[error("{section} entry {key}: expected tags [{}], found [{}]", .expected.join(" "), .actual.join(" "))]
    TagSetMismatch {
        /// Hash or group section.
        section: Section,
        /// Entry identity within the section.
        key: u32,
        /// Sorted reference tags.
        expected: Vec<String>,
        /// Sorted candidate tags.
        actual: Vec<String>,
    },

    /// A numeric token differs from the target by more than the tolerance.
    #[error("line {line}, token {token}: expected {expected}, found {actual} (tolerance {tolerance})")]
    ToleranceExceeded {
        /// Line number (1-based).
        line: usize,
        /// Token position within the line (1-based).
        token: usize,
        /// Target token as printed.
        expected: String,
        /// Output token as printed.
        actual: String,
        /// Tolerance applied.
        tolerance: String,
    },
}

impl Mismatch {
    /// Returns the failure kind of this mismatch.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::CountMismatch { .. } => FailureKind::CountMismatch,
            Self::KeyMismatch { .. } => FailureKind::KeyMismatch,
            Self::TagSetMismatch { .. } => FailureKind::TagSetMismatch,
            Self::ToleranceExceeded { .. } => FailureKind::ToleranceExceeded,
        }
    }
}

/// The main error type for harness operations.
///
/// Implements `Clone` so outcomes can be copied into reports.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// A non-blank line could not be placed in the output grammar.
    #[error("malformed output at line {line}: expected {expected}, found '{content}'")]
    MalformedOutput {
        /// Line number (1-based).
        line: usize,
        /// The offending line.
        content: String,
        /// What the grammar expected at this position.
        expected: &'static str,
    },

    /// A correctness failure promoted to an error.
    #[error(transparent)]
    Mismatch(#[from] Mismatch),

    /// The program under test could not be started.
    #[error("failed to launch '{program}': {message}")]
    Spawn {
        /// Launched program.
        program: String,
        /// OS error message.
        message: String,
    },

    /// The program under test exited unsuccessfully.
    #[error("'{command}' exited with {status}: {stderr_tail}")]
    ProcessFailed {
        /// Full command line, for reproduction.
        command: String,
        /// Exit status description.
        status: String,
        /// Last lines of standard error.
        stderr_tail: String,
    },

    /// I/O operation failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The error message.
        message: String,
    },

    /// A stored answer exceeds the configured read limit.
    #[error("'{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes")]
    OutputTooLarge {
        /// The oversized file.
        path: PathBuf,
        /// Its size in bytes.
        actual: u64,
        /// The limit in bytes.
        max: u64,
    },

    /// The configuration requests a flag the program version does not accept.
    #[error("flag '{flag}' is not supported by the '{capabilities}' capability set")]
    UnsupportedFlag {
        /// Command-line flag name.
        flag: &'static str,
        /// Capability descriptor name.
        capabilities: String,
    },

    /// Invalid configuration parameter.
    #[error("invalid configuration parameter '{parameter}': {reason}")]
    InvalidConfig {
        /// Parameter name.
        parameter: String,
        /// Reason for invalidity.
        reason: String,
    },
}

impl HarnessError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a malformed-output error.
    pub fn malformed(line: usize, content: impl Into<String>, expected: &'static str) -> Self {
        Self::MalformedOutput {
            line,
            content: content.into(),
            expected,
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns the failure kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MalformedOutput { .. } => FailureKind::MalformedOutput,
            Self::Mismatch(m) => m.kind(),
            Self::Spawn { .. } | Self::ProcessFailed { .. } => FailureKind::ProcessFailed,
            Self::Io { .. } | Self::OutputTooLarge { .. } => FailureKind::Io,
            Self::UnsupportedFlag { .. } | Self::InvalidConfig { .. } => FailureKind::InvalidConfig,
        }
    }
}
