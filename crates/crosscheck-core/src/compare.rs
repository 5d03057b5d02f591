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

//! Correctness comparison against a reference answer.
//!
//! Two policies, selected by the program under test:
//!
//! - **Hash/group** (file hasher): entry collections are compared as sets.
//!   Hash entries are matched by id; tag order within an entry is ignored.
//!   Group entries are matched purely by their sorted tag multisets, so the
//!   index a program assigns to a group never matters.
//! - **Numeric state** (simulator): strictly positional. Line `n`, token `k`
//!   of the output must be within tolerance of line `n`, token `k` of the
//!   target.
//!
//! Timing lines are never compared.
//!
//! Independent assertions are all evaluated: the hash and group sections of
//! a structured comparison, and each line of a state comparison. The first
//! failure of each is reported in the returned [`Comparison`].

use crate::error::{HarnessError, Mismatch, Result, Section};
use crate::model::{GroupEntry, HashEntry, Observation, ParsedOutput};
use crate::numeric::{StateTable, Tolerance};
use serde::Serialize;

/// Comparison policy, keyed on output kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonPolicy {
    /// Order-insensitive hash and group entry comparison.
    HashGroup,
    /// Positional numeric comparison with a tolerance.
    NumericState(Tolerance),
}

/// Outcome of one comparison call. Empty means equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    /// Mismatches found, in the order they were checked.
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    /// Returns true if no mismatch was found.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Returns the first mismatch, if any.
    pub fn first(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }

    /// Converts into a `Result`, failing with the first mismatch.
    pub fn into_result(self) -> Result<()> {
        match self.mismatches.into_iter().next() {
            None => Ok(()),
            Some(mismatch) => Err(mismatch.into()),
        }
    }

    fn record(&mut self, outcome: std::result::Result<(), Mismatch>) {
        if let Err(mismatch) = outcome {
            self.mismatches.push(mismatch);
        }
    }
}

fn sorted_tags(tags: &[String]) -> Vec<String> {
    let mut tags = tags.to_vec();
    tags.sort();
    tags
}

fn check_count(section: Section, actual: usize, expected: usize) -> std::result::Result<(), Mismatch> {
    if actual == expected {
        Ok(())
    } else {
        Err(Mismatch::CountMismatch {
            section,
            expected,
            actual,
        })
    }
}

/// Compares hash entries by id, ignoring entry order and tag order.
///
/// # Examples
///
/// ```
/// use crosscheck_core::{compare_hash_entries, HashEntry};
///
/// let reference = vec![HashEntry::new(1, ["a.txt"]), HashEntry::new(2, ["b.txt", "c.txt"])];
/// let candidate = vec![HashEntry::new(2, ["c.txt", "b.txt"]), HashEntry::new(1, ["a.txt"])];
/// assert!(compare_hash_entries(&candidate, &reference).is_ok());
/// ```
pub fn compare_hash_entries(
    candidate: &[HashEntry],
    reference: &[HashEntry],
) -> std::result::Result<(), Mismatch> {
    check_count(Section::HashEntries, candidate.len(), reference.len())?;

    let mut candidate: Vec<&HashEntry> = candidate.iter().collect();
    let mut reference: Vec<&HashEntry> = reference.iter().collect();
    candidate.sort_by_key(|e| e.id);
    reference.sort_by_key(|e| e.id);

    for (position, (actual, expected)) in candidate.iter().zip(&reference).enumerate() {
        if actual.id != expected.id {
            return Err(Mismatch::KeyMismatch {
                position,
                expected: expected.id,
                actual: actual.id,
            });
        }
        let actual_tags = sorted_tags(&actual.tags);
        let expected_tags = sorted_tags(&expected.tags);
        if actual_tags != expected_tags {
            return Err(Mismatch::TagSetMismatch {
                section: Section::HashEntries,
                key: expected.id,
                expected: expected_tags,
                actual: actual_tags,
            });
        }
    }
    Ok(())
}

/// Sorts tags within each group, then sorts the groups themselves.
fn canonical_groups(entries: &[GroupEntry]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = entries.iter().map(|g| sorted_tags(&g.tags)).collect();
    groups.sort();
    groups
}

/// Compares group entries by content only.
///
/// Group identity is inferred from the sorted tag multiset; the index the
/// program printed is ignored. On divergence the reported key is the
/// position in the canonical (sorted) order.
pub fn compare_group_entries(
    candidate: &[GroupEntry],
    reference: &[GroupEntry],
) -> std::result::Result<(), Mismatch> {
    check_count(Section::GroupEntries, candidate.len(), reference.len())?;

    let candidate = canonical_groups(candidate);
    let reference = canonical_groups(reference);

    match candidate
        .iter()
        .zip(&reference)
        .position(|(actual, expected)| actual != expected)
    {
        None => Ok(()),
        Some(position) => Err(Mismatch::TagSetMismatch {
            section: Section::GroupEntries,
            key: u32::try_from(position).unwrap_or(u32::MAX),
            expected: reference[position].clone(),
            actual: candidate[position].clone(),
        }),
    }
}

/// Compares file hasher outputs under the hash/group policy.
pub fn compare_structured(candidate: &ParsedOutput, reference: &ParsedOutput) -> Comparison {
    let mut comparison = Comparison::default();
    comparison.record(compare_hash_entries(
        &candidate.hash_entries,
        &reference.hash_entries,
    ));
    comparison.record(compare_group_entries(
        &candidate.group_entries,
        &reference.group_entries,
    ));
    comparison
}

/// Compares simulator state tables position by position.
pub fn compare_state(output: &StateTable, target: &StateTable, tolerance: &Tolerance) -> Comparison {
    let mut comparison = Comparison::default();
    comparison.record(check_count(Section::StateLines, output.len(), target.len()));

    for (idx, (out_line, target_line)) in output.lines.iter().zip(&target.lines).enumerate() {
        let line = idx + 1;
        comparison.record(check_count(
            Section::StateTokens { line },
            out_line.len(),
            target_line.len(),
        ));

        let failing = out_line
            .iter()
            .zip(target_line)
            .enumerate()
            .find(|(_, (out, target))| !out.within(target, tolerance));

        if let Some((token_idx, (out, target))) = failing {
            comparison.mismatches.push(Mismatch::ToleranceExceeded {
                line,
                token: token_idx + 1,
                expected: target.to_string(),
                actual: out.to_string(),
                tolerance: tolerance.to_string(),
            });
        }
    }
    comparison
}

/// Compares two observations under the given policy.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidConfig`] if the observations do not match
/// the kind the policy expects.
pub fn compare(
    candidate: &Observation,
    reference: &Observation,
    policy: &ComparisonPolicy,
) -> Result<Comparison> {
    match (policy, candidate, reference) {
        (ComparisonPolicy::HashGroup, Observation::Structured(c), Observation::Structured(r)) => {
            Ok(compare_structured(c, r))
        }
        (
            ComparisonPolicy::NumericState(tolerance),
            Observation::State(c),
            Observation::State(r),
        ) => Ok(compare_state(c, r, tolerance)),
        _ => Err(HarnessError::invalid_config(
            "policy",
            "comparison policy does not match the observed output kind",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn state(text: &str) -> StateTable {
        StateTable::parse(text).unwrap()
    }

    #[test]
    fn test_reordered_hash_entries_match() {
        let reference = vec![HashEntry::new(1, ["a.txt"]), HashEntry::new(2, ["b.txt", "c.txt"])];
        let candidate = vec![HashEntry::new(2, ["c.txt", "b.txt"]), HashEntry::new(1, ["a.txt"])];
        assert_eq!(compare_hash_entries(&candidate, &reference), Ok(()));
    }

    #[test]
    fn test_missing_tag_reports_entry() {
        let reference = vec![HashEntry::new(1, ["a.txt"]), HashEntry::new(2, ["b.txt", "c.txt"])];
        let candidate = vec![HashEntry::new(1, ["a.txt"]), HashEntry::new(2, ["b.txt"])];
        assert_eq!(
            compare_hash_entries(&candidate, &reference),
            Err(Mismatch::TagSetMismatch {
                section: Section::HashEntries,
                key: 2,
                expected: vec!["b.txt".into(), "c.txt".into()],
                actual: vec!["b.txt".into()],
            })
        );
    }

    #[test]
    fn test_duplicate_tags_are_a_multiset() {
        let reference = vec![HashEntry::new(4, ["x", "x", "y"])];
        let candidate = vec![HashEntry::new(4, ["x", "y", "y"])];
        assert!(compare_hash_entries(&candidate, &reference).is_err());
    }

    #[test]
    fn test_hash_key_mismatch() {
        let reference = vec![HashEntry::new(1, ["a"]), HashEntry::new(3, ["b"])];
        let candidate = vec![HashEntry::new(1, ["a"]), HashEntry::new(2, ["b"])];
        assert_eq!(
            compare_hash_entries(&candidate, &reference),
            Err(Mismatch::KeyMismatch {
                position: 1,
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_hash_count_mismatch() {
        let reference = vec![HashEntry::new(1, ["a"])];
        let err = compare_hash_entries(&[], &reference).unwrap_err();
        assert_eq!(err.kind(), FailureKind::CountMismatch);
    }

    #[test]
    fn test_groups_ignore_index_and_order() {
        let reference = vec![GroupEntry::new(0, ["1", "4"]), GroupEntry::new(1, ["2", "3", "5"])];
        let candidate = vec![GroupEntry::new(7, ["5", "2", "3"]), GroupEntry::new(3, ["4", "1"])];
        assert_eq!(compare_group_entries(&candidate, &reference), Ok(()));
    }

    #[test]
    fn test_group_divergence_reports_both_sides() {
        let reference = vec![GroupEntry::new(0, ["1", "4"])];
        let candidate = vec![GroupEntry::new(0, ["1", "5"])];
        match compare_group_entries(&candidate, &reference) {
            Err(Mismatch::TagSetMismatch {
                section,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(section, Section::GroupEntries);
                assert_eq!(expected, vec!["1", "4"]);
                assert_eq!(actual, vec!["1", "5"]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_structured_checks_both_sections() {
        let reference = ParsedOutput {
            hash_entries: vec![HashEntry::new(1, ["a"])],
            group_entries: vec![GroupEntry::new(0, ["a", "b"])],
            ..Default::default()
        };
        let candidate = ParsedOutput {
            hash_entries: vec![HashEntry::new(1, ["b"])],
            group_entries: vec![],
            ..Default::default()
        };
        let comparison = compare_structured(&candidate, &reference);
        assert_eq!(comparison.mismatches.len(), 2);
        assert_eq!(comparison.mismatches[0].kind(), FailureKind::TagSetMismatch);
        assert_eq!(comparison.mismatches[1].kind(), FailureKind::CountMismatch);
    }

    #[test]
    fn test_state_within_tolerance() {
        let comparison = compare_state(
            &state("2\n0 1.000001 2.5\n"),
            &state("2\n0 1.0 2.5\n"),
            &Tolerance::default(),
        );
        assert!(comparison.is_match());
    }

    #[test]
    fn test_state_swapped_lines_detected() {
        let target = state("0 1.0 1.0\n1 1.0000005 1.0\n");
        let output = state("1 1.0000005 1.0\n0 1.0 1.0\n");
        let comparison = compare_state(&output, &target, &Tolerance::default());
        assert_eq!(comparison.mismatches.len(), 2);
        assert!(matches!(
            comparison.first(),
            Some(Mismatch::ToleranceExceeded { line: 1, token: 1, .. })
        ));
    }

    #[test]
    fn test_state_reports_first_token_per_line() {
        let target = state("1 2 3\n4 5 6\n");
        let output = state("1 9 9\n4 5 7\n");
        let comparison = compare_state(&output, &target, &Tolerance::default());
        assert_eq!(
            comparison.mismatches,
            vec![
                Mismatch::ToleranceExceeded {
                    line: 1,
                    token: 2,
                    expected: "2".into(),
                    actual: "9".into(),
                    tolerance: "0.000001".into(),
                },
                Mismatch::ToleranceExceeded {
                    line: 2,
                    token: 3,
                    expected: "6".into(),
                    actual: "7".into(),
                    tolerance: "0.000001".into(),
                },
            ]
        );
    }

    #[test]
    fn test_state_line_and_token_counts() {
        let comparison = compare_state(&state("1 2\n3\n"), &state("1 2\n3 4\n5 6\n"), &Tolerance::default());
        assert_eq!(
            comparison.mismatches,
            vec![
                Mismatch::CountMismatch {
                    section: Section::StateLines,
                    expected: 3,
                    actual: 2,
                },
                Mismatch::CountMismatch {
                    section: Section::StateTokens { line: 2 },
                    expected: 2,
                    actual: 1,
                },
            ]
        );
    }

    #[test]
    fn test_policy_kind_mismatch_is_error() {
        let structured = Observation::Structured(ParsedOutput::default());
        let result = compare(
            &structured,
            &structured,
            &ComparisonPolicy::NumericState(Tolerance::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_result_returns_first() {
        let comparison = Comparison {
            mismatches: vec![Mismatch::KeyMismatch {
                position: 0,
                expected: 1,
                actual: 2,
            }],
        };
        let err = comparison.into_result().unwrap_err();
        assert_eq!(err.kind(), FailureKind::KeyMismatch);
    }
}
