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

//! File hasher stdout fixtures.
//!
//! All fixtures describe the same small input: five trees, hashes 3, 12 and
//! 97, trees 1/2 and 0/4 identical.

/// Hashing only.
pub const SIMPLE_HASH_ONLY: &str = "hashTime: 31.2µs\n";

/// Hashing and grouping, no comparison.
pub const SIMPLE_HASH_GROUP: &str = "hashGroupTime: 412.5µs\n\
3: 0 4\n\
12: 1 2\n\
97: 3\n";

/// Full run as produced by the canonical single-worker configuration.
pub const SIMPLE_REFERENCE: &str = "hashGroupTime: 1532.7µs\n\
3: 0 4\n\
12: 1 2\n\
97: 3\n\
\n\
compareTreeTime: 88.1µs\n\
group 0: 1 2\n\
group 1: 0 4\n";

/// Same answer as [`SIMPLE_REFERENCE`]: entries, tags and group indices
/// permuted, different timings.
pub const SIMPLE_REORDERED: &str = "hashGroupTime: 1.2e+03µs\n\
97: 3\n\
12: 2 1\n\
3: 4 0\n\
\n\
compareTreeTime: 41µs\n\
group 7: 4 0\n\
group 2: 2 1\n";

/// Tree 4 placed in the wrong hash entry.
pub const SIMPLE_WRONG_TAGS: &str = "hashGroupTime: 900µs\n\
3: 0\n\
12: 1 2 4\n\
97: 3\n\
\n\
compareTreeTime: 50µs\n\
group 0: 1 2\n\
group 1: 0 4\n";

/// One group missing.
pub const SIMPLE_MISSING_GROUP: &str = "hashGroupTime: 900µs\n\
3: 0 4\n\
12: 1 2\n\
97: 3\n\
\n\
compareTreeTime: 50µs\n\
group 0: 1 2\n";

/// Stdout the file hasher prints for [`SIMPLE_REFERENCE`]'s input under the
/// given worker counts, with `elapsed` as every phase time.
pub fn simple_output(data_workers: usize, comp_workers: usize, elapsed: f64) -> String {
    if data_workers == 0 {
        return format!("hashTime: {}µs\n", elapsed);
    }
    let mut out = format!("hashGroupTime: {}µs\n3: 0 4\n12: 1 2\n97: 3\n", elapsed);
    if comp_workers > 0 {
        out.push_str(&format!(
            "\ncompareTreeTime: {}µs\ngroup 0: 1 2\ngroup 1: 0 4\n",
            elapsed
        ));
    }
    out
}
