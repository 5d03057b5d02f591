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

//! Structural parser for the file hasher's standard output.
//!
//! The output is consumed strictly top to bottom:
//!
//! ```text
//! hashGroupTime: 1532.7µs          one or more phase timing lines
//! 12: 0 3                          zero or more hash entries
//! 47: 1 2 5
//!                                  optional blank separator
//! compareTreeTime: 88.1µs          zero or more further timing lines
//! group 0: 2 5                     zero or more group entries
//! ```
//!
//! Each section ends at the first line that does not fit it. Lines left over
//! once the group section ends are not interpreted; non-blank ones are kept
//! in [`ParsedOutput::trailing`]. [`parse_strict`] rejects them instead.

use crate::error::{HarnessError, Result};
use crate::model::{GroupEntry, HashEntry, ParsedOutput, PhaseLabel, TimingLine};
use once_cell::sync::Lazy;
use regex::Regex;

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>[A-Za-z][A-Za-z ]*): (?P<value>\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)(?P<unit>\S*)\s*$")
        .expect("valid timing line pattern")
});

static HASH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>\d{1,3}):(?P<tags>(?:\s.*)?)$").expect("valid hash line pattern")
});

static GROUP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^group\s+(?P<index>\d+):?(?P<tags>(?:\s.*)?)$").expect("valid group line pattern")
});

/// Parses file hasher output, keeping unparsed trailing lines as diagnostics.
///
/// # Errors
///
/// Returns [`HarnessError::MalformedOutput`] if the output does not start
/// with at least one phase timing line.
///
/// # Examples
///
/// ```
/// use crosscheck_core::{parse, PhaseLabel};
///
/// let parsed = parse("hashGroupTime: 12.5µs\n1: a.txt\n2: b.txt c.txt\n").unwrap();
/// assert_eq!(parsed.timings[0].label, PhaseLabel::HashGroup);
/// assert_eq!(parsed.hash_entries.len(), 2);
/// assert!(parsed.group_entries.is_empty());
/// ```
pub fn parse(text: &str) -> Result<ParsedOutput> {
    Cursor::new(text).parse(false)
}

/// Parses file hasher output, failing on any non-blank line after the group
/// section.
pub fn parse_strict(text: &str) -> Result<ParsedOutput> {
    Cursor::new(text).parse(true)
}

/// Parses a single timing line.
pub fn parse_timing_line(line: &str) -> Option<TimingLine> {
    let caps = TIMING_LINE.captures(line)?;
    let label = caps["label"].parse::<PhaseLabel>().ok()?;
    let value = caps["value"].parse::<f64>().ok()?;
    Some(TimingLine {
        label,
        value,
        unit: caps["unit"].to_string(),
    })
}

/// Parses a single hash entry line.
pub fn parse_hash_line(line: &str) -> Option<HashEntry> {
    let caps = HASH_LINE.captures(line)?;
    let id = caps["id"].parse::<u32>().ok()?;
    Some(HashEntry::new(id, caps["tags"].split_whitespace()))
}

/// Parses a single group entry line.
pub fn parse_group_line(line: &str) -> Option<GroupEntry> {
    let caps = GROUP_LINE.captures(line)?;
    let index = caps["index"].parse::<u32>().ok()?;
    Some(GroupEntry::new(index, caps["tags"].split_whitespace()))
}

struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Consumes lines while `f` accepts them.
    fn take_while<T>(&mut self, mut f: impl FnMut(&str) -> Option<T>) -> Vec<T> {
        let mut taken = Vec::new();
        while let Some(item) = self.peek().and_then(&mut f) {
            taken.push(item);
            self.pos += 1;
        }
        taken
    }

    fn parse(mut self, strict: bool) -> Result<ParsedOutput> {
        let mut output = ParsedOutput {
            timings: self.take_while(parse_timing_line),
            ..Default::default()
        };

        if output.timings.is_empty() {
            return Err(HarnessError::malformed(
                1,
                self.peek().unwrap_or_default(),
                "a phase timing line",
            ));
        }

        output.hash_entries = self.take_while(parse_hash_line);

        if self.peek().is_some_and(|line| line.trim().is_empty()) {
            self.pos += 1;
        }

        // The comparison phase reports its timing between the two entry blocks.
        let later_timings = self.take_while(parse_timing_line);
        output.timings.extend(later_timings);

        output.group_entries = self.take_while(parse_group_line);

        for (offset, line) in self.lines[self.pos..].iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if strict {
                return Err(HarnessError::malformed(
                    self.pos + offset + 1,
                    *line,
                    "a group entry or end of output",
                ));
            }
            output.trailing.push(line.to_string());
        }

        Ok(output)
    }
}
