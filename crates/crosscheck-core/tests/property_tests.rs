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

//! Property-based tests for parsing and comparison using proptest.
//!
//! - Order insensitivity: permuting entries and tags never changes the verdict
//! - Positional sensitivity: swapping two distinct state lines always fails
//! - Tolerance boundary: exactly one micro-unit apart passes, two fail

use crosscheck_core::{
    compare_state, compare_structured, parse, FailureKind, StateTable, Tolerance,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ===== Generators =====

/// Hash entries with unique ids and 1-4 tags each.
fn hash_entries() -> impl Strategy<Value = Vec<(u32, Vec<String>)>> {
    prop::collection::btree_map(
        0u32..1000,
        prop::collection::vec(prop::string::string_regex("[a-z0-9]{1,6}").expect("tag regex"), 1..5),
        1..12,
    )
    .prop_map(|map: BTreeMap<u32, Vec<String>>| map.into_iter().collect())
}

fn render(entries: &[(u32, Vec<String>)], groups: &[Vec<String>]) -> String {
    let mut out = String::from("hashGroupTime: 10.5µs\n");
    for (id, tags) in entries {
        out.push_str(&format!("{}: {}\n", id, tags.join(" ")));
    }
    out.push_str("\ncompareTreeTime: 3µs\n");
    for (idx, tags) in groups.iter().enumerate() {
        out.push_str(&format!("group {}: {}\n", idx, tags.join(" ")));
    }
    out
}

/// Rows whose first token is the row index, so no two rows are equal.
fn state_rows() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-1000i64..1000, 3), 2..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(idx, mut row)| {
                row.insert(0, idx as i64);
                row
            })
            .collect()
    })
}

fn render_rows(rows: &[Vec<i64>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn micro(units: u64) -> String {
    format!("{}.{:06}", units / 1_000_000, units % 1_000_000)
}

// ===== Properties =====

proptest! {
    #[test]
    fn permuted_output_matches_reference(
        (entries, shuffled) in hash_entries().prop_flat_map(|e| (Just(e.clone()), Just(e).prop_shuffle())),
    ) {
        let groups: Vec<Vec<String>> = entries.iter().map(|(_, tags)| tags.clone()).collect();
        let reversed_groups: Vec<Vec<String>> = groups
            .iter()
            .rev()
            .map(|tags| tags.iter().rev().cloned().collect())
            .collect();
        let shuffled: Vec<(u32, Vec<String>)> = shuffled
            .into_iter()
            .map(|(id, tags)| (id, tags.into_iter().rev().collect()))
            .collect();

        let reference = parse(&render(&entries, &groups)).unwrap();
        let candidate = parse(&render(&shuffled, &reversed_groups)).unwrap();
        prop_assert!(compare_structured(&candidate, &reference).is_match());
    }

    #[test]
    fn dropping_an_entry_is_a_count_mismatch(
        entries in hash_entries().prop_filter("need two entries", |e| e.len() >= 2),
    ) {
        let reference = parse(&render(&entries, &[])).unwrap();
        let candidate = parse(&render(&entries[1..], &[])).unwrap();
        let comparison = compare_structured(&candidate, &reference);
        prop_assert_eq!(comparison.first().map(|m| m.kind()), Some(FailureKind::CountMismatch));
    }

    #[test]
    fn swapping_state_lines_fails(rows in state_rows(), a in 0usize..10, b in 0usize..10) {
        let a = a % rows.len();
        let b = b % rows.len();
        prop_assume!(a != b);

        let mut swapped = rows.clone();
        swapped.swap(a, b);

        let target = StateTable::parse(&render_rows(&rows)).unwrap();
        let output = StateTable::parse(&render_rows(&swapped)).unwrap();
        let comparison = compare_state(&output, &target, &Tolerance::default());
        prop_assert_eq!(comparison.mismatches.len(), 2);
        prop_assert!(comparison
            .mismatches
            .iter()
            .all(|m| m.kind() == FailureKind::ToleranceExceeded));
    }

    #[test]
    fn identical_state_always_matches(rows in state_rows()) {
        let table = StateTable::parse(&render_rows(&rows)).unwrap();
        prop_assert!(compare_state(&table, &table, &Tolerance::default()).is_match());
    }

    #[test]
    fn tolerance_boundary_is_exact(units in 0u64..1_000_000_000_000) {
        let tol = Tolerance::default();
        let base = StateTable::parse(&micro(units)).unwrap();
        let one_off = StateTable::parse(&micro(units + 1)).unwrap();
        let two_off = StateTable::parse(&micro(units + 2)).unwrap();
        prop_assert!(compare_state(&one_off, &base, &tol).is_match());
        prop_assert!(compare_state(&base, &one_off, &tol).is_match());
        prop_assert!(!compare_state(&two_off, &base, &tol).is_match());
    }
}
