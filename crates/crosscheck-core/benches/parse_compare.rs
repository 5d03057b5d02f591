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

//! Parsing and comparison throughput.
//!
//! Generates file hasher outputs and state tables of increasing size and
//! measures parse and compare time.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crosscheck_core::{compare_state, compare_structured, parse, StateTable, Tolerance};

const SIZES: [usize; 3] = [10, 100, 1_000];

/// Output with `hashes` entries of four tags and one group per entry.
fn hasher_output(hashes: usize, reversed: bool) -> String {
    let mut ids: Vec<usize> = (0..hashes).collect();
    if reversed {
        ids.reverse();
    }
    let mut out = String::from("hashGroupTime: 1532.7µs\n");
    for &id in &ids {
        let base = id * 4;
        out.push_str(&format!("{}: {} {} {} {}\n", id % 1000, base, base + 1, base + 2, base + 3));
    }
    out.push_str("\ncompareTreeTime: 88.1µs\n");
    for (idx, &id) in ids.iter().enumerate() {
        out.push_str(&format!("group {}: {} {}\n", idx, id * 4, id * 4 + 2));
    }
    out
}

fn state_output(bodies: usize, offset: f64) -> String {
    let mut out = format!("{}\n", bodies);
    for i in 0..bodies {
        let x = i as f64 * 0.5 + offset;
        out.push_str(&format!(
            "{}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\n",
            i,
            x,
            -x,
            1.0 + i as f64,
            x * 1e-3,
            -x * 1e-3
        ));
    }
    out
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_hasher_output");
    for size in SIZES {
        let text = hasher_output(size, false);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("parse_state_table");
    for size in SIZES {
        let text = state_output(size, 0.0);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| StateTable::parse(black_box(text)))
        });
    }
    group.finish();
}

// ============================================================================
// Comparison
// ============================================================================

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_structured");
    for size in SIZES {
        let reference = parse(&hasher_output(size, false)).expect("generated output parses");
        let candidate = parse(&hasher_output(size, true)).expect("generated output parses");
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| compare_structured(black_box(&candidate), black_box(&reference)))
        });
    }
    group.finish();

    let tolerance = Tolerance::default();
    let mut group = c.benchmark_group("compare_state");
    for size in SIZES {
        let target = StateTable::parse(&state_output(size, 0.0)).expect("generated state parses");
        let output = StateTable::parse(&state_output(size, 5e-7)).expect("generated state parses");
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| compare_state(black_box(&output), black_box(&target), &tolerance))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_compare);
criterion_main!(benches);
