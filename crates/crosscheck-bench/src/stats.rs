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

//! Statistics over repetition samples.

use serde::Serialize;

/// Statistical summary of one grid point's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator), 0 below two samples.
    pub std_dev: f64,
    /// Total number of samples.
    pub count: usize,
}

/// Computes statistical summary from samples.
///
/// # Arguments
///
/// * `samples` - Metric values, one per repetition
///
/// # Returns
///
/// Statistical summary; all zero for an empty slice.
///
/// # Examples
///
/// ```
/// use crosscheck_bench::compute_statistics;
///
/// let stats = compute_statistics(&[10.0, 10.0, 10.0, 10.0]);
/// assert_eq!(stats.mean, 10.0);
/// assert_eq!(stats.std_dev, 0.0);
/// ```
pub fn compute_statistics(samples: &[f64]) -> Statistics {
    if samples.is_empty() {
        return Statistics {
            mean: 0.0,
            std_dev: 0.0,
            count: 0,
        };
    }

    let count = samples.len();
    let mean = samples.iter().sum::<f64>() / count as f64;

    let std_dev = if count < 2 {
        0.0
    } else {
        let variance = samples
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;
        variance.sqrt()
    };

    Statistics {
        mean,
        std_dev,
        count,
    }
}
