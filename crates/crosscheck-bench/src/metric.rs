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

//! Scalar metric extraction from program output.

use crate::error::{BenchError, Result};
use crosscheck_core::PhaseLabel;
use regex::Regex;

/// Characters of output quoted in a [`BenchError::MetricNotFound`].
const EXCERPT_LEN: usize = 120;

/// Finds the first number following a label, e.g. `hashGroupTime: 1.2e+06µs`.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    label: String,
    pattern: Regex,
}

impl MetricExtractor {
    /// Creates an extractor for `label`. The label matches at the start of a
    /// line or after whitespace; an optional `:` may follow it.
    ///
    /// # Examples
    ///
    /// ```
    /// use crosscheck_bench::MetricExtractor;
    ///
    /// let metric = MetricExtractor::new("compareTreeTime").unwrap();
    /// let value = metric.extract("hashGroupTime: 12µs\n\ncompareTreeTime: 1.5e+03µs\n").unwrap();
    /// assert_eq!(value, 1500.0);
    /// ```
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let trimmed = label.trim().trim_end_matches(':');
        if trimmed.is_empty() {
            return Err(BenchError::invalid_config("metric", "metric label is empty"));
        }
        let pattern = Regex::new(&format!(
            r"(?m)(?:^|\s){}\s*:?\s*(?P<value>[+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)",
            regex::escape(trimmed)
        ))
        .map_err(|e| BenchError::invalid_config("metric", e.to_string()))?;
        Ok(Self {
            label: trimmed.to_string(),
            pattern,
        })
    }

    /// Creates an extractor for a phase timing label.
    pub fn for_phase(phase: PhaseLabel) -> Result<Self> {
        Self::new(phase.as_str())
    }

    /// The label searched for.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the first value following the label.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::MetricNotFound`] if the label does not occur with
    /// a number after it.
    pub fn extract(&self, output: &str) -> Result<f64> {
        self.pattern
            .captures(output)
            .and_then(|caps| caps["value"].parse::<f64>().ok())
            .ok_or_else(|| BenchError::MetricNotFound {
                label: self.label.clone(),
                excerpt: excerpt(output),
            })
    }
}

fn excerpt(output: &str) -> String {
    let flat = output.trim().replace('\n', " | ");
    match flat.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_wins() {
        let metric = MetricExtractor::new("overall").unwrap();
        assert_eq!(metric.extract("overall: 2.5\noverall: 9\n").unwrap(), 2.5);
    }

    #[test]
    fn test_label_with_colon_is_normalized() {
        let metric = MetricExtractor::new("hashTime:").unwrap();
        assert_eq!(metric.label(), "hashTime");
        assert_eq!(metric.extract("hashTime: 31.2µs").unwrap(), 31.2);
    }

    #[test]
    fn test_label_must_not_be_a_suffix() {
        let metric = MetricExtractor::new("Time").unwrap();
        let err = metric.extract("hashTime: 40µs\n").unwrap_err();
        assert!(matches!(err, BenchError::MetricNotFound { .. }));

        let metric = MetricExtractor::for_phase(PhaseLabel::Hash).unwrap();
        assert!(metric.extract("hashGroupTime: 40µs\n").is_err());
    }

    #[test]
    fn test_label_after_whitespace() {
        let metric = MetricExtractor::new("overall").unwrap();
        assert_eq!(metric.extract("rank 0 overall: 1.25e-01\n").unwrap(), 0.125);
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let metric = MetricExtractor::new("missing").unwrap();
        let long = "x".repeat(1000);
        match metric.extract(&long) {
            Err(BenchError::MetricNotFound { excerpt, .. }) => assert!(excerpt.len() < 200),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_label_rejected() {
        assert!(MetricExtractor::new(" : ").is_err());
    }
}
