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

//! Outputs that must be rejected.

/// File hasher stdout that does not parse.
///
/// Each tuple contains (name, text, 1-based line the parser must report).
pub fn malformed_hasher_outputs() -> Vec<(&'static str, &'static str, usize)> {
    vec![
        ("empty", "", 1),
        ("blank_only", "\n\n", 1),
        ("no_timing", "3: 0 4\n", 1),
        ("unknown_phase", "walltime: 12µs\n", 1),
        ("negative_time", "hashTime: -4µs\n", 1),
        ("text_instead_of_time", "hashTime: fast\n", 1),
    ]
}

/// File hasher stdout that parses leniently but has trailing lines.
///
/// Each tuple contains (name, text, 1-based line of the first leftover).
pub fn trailing_hasher_outputs() -> Vec<(&'static str, &'static str, usize)> {
    vec![
        ("panic_after_groups", "hashGroupTime: 5µs\n1: 0\n\ngroup 0: 0\npanic: oops\n", 5),
        ("four_digit_hash", "hashGroupTime: 5µs\n1234: 0\n", 2),
        ("second_blank", "hashGroupTime: 5µs\n1: 0\n\n\ngroup 0: 0\n", 5),
    ]
}

/// Simulator state text with non-numeric tokens.
///
/// Each tuple contains (name, text, 1-based line of the bad token).
pub fn malformed_states() -> Vec<(&'static str, &'static str, usize)> {
    vec![
        ("word", "1\n0\tabc\t1.0\n", 2),
        ("header_word", "bodies\n0\t1.0\n", 1),
        ("comma_decimal", "1\n0\t1,5\n", 2),
    ]
}
