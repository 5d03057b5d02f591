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

//! Simulator state file fixtures: particle count, then one tab-separated
//! row per body (index, x, y, mass, vx, vy).

/// Reference state for three bodies.
pub const STATE_REFERENCE: &str = "3\n\
0\t1.250000e+00\t-3.500000e-01\t1.000000e+01\t2.000000e-03\t0.000000e+00\n\
1\t4.000000e+00\t2.000000e+00\t5.000000e+00\t-1.000000e-03\t1.500000e-03\n\
2\t-7.500000e-01\t9.000000e-01\t2.500000e+00\t0.000000e+00\t-2.000000e-03\n";

/// Every token of [`STATE_REFERENCE`] moved by at most `1e-6`, printed
/// differently.
pub const STATE_WITHIN_TOLERANCE: &str = "3\n\
0\t1.250001\t-0.35\t10\t0.002\t0.000001\n\
1\t3.999999\t2.000000e+00\t5.000000e+00\t-1.000000e-03\t1.500000e-03\n\
2\t-7.500000e-01\t9.000000e-01\t2.500000e+00\t0.000000e+00\t-2.000001e-03\n";

/// [`STATE_REFERENCE`] with body 1's x off by `2e-6` and body 2's mass off
/// by `1e-3`.
pub const STATE_OUT_OF_TOLERANCE: &str = "3\n\
0\t1.250000e+00\t-3.500000e-01\t1.000000e+01\t2.000000e-03\t0.000000e+00\n\
1\t4.000002e+00\t2.000000e+00\t5.000000e+00\t-1.000000e-03\t1.500000e-03\n\
2\t-7.500000e-01\t9.000000e-01\t2.501000e+00\t0.000000e+00\t-2.000000e-03\n";

/// [`STATE_REFERENCE`] with bodies 1 and 2 swapped.
pub const STATE_SWAPPED: &str = "3\n\
0\t1.250000e+00\t-3.500000e-01\t1.000000e+01\t2.000000e-03\t0.000000e+00\n\
2\t-7.500000e-01\t9.000000e-01\t2.500000e+00\t0.000000e+00\t-2.000000e-03\n\
1\t4.000000e+00\t2.000000e+00\t5.000000e+00\t-1.000000e-03\t1.500000e-03\n";
