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

//! Numeric state tables and exact decimal tolerance checks.
//!
//! The simulator prints its final state as lines of whitespace-separated
//! numbers, one line per body in input order. Tokens are kept exactly as
//! printed and compared in decimal, so a difference of exactly the tolerance
//! is accepted and anything above it is not, independent of binary rounding.
//! Tokens whose magnitude does not fit the exact representation fall back to
//! `f64` arithmetic.

use crate::error::{HarnessError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default tolerance for simulator state comparison.
pub const DEFAULT_TOLERANCE: &str = "0.000001";

/// A numeric token as printed, with its exact decimal value when representable.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalToken {
    text: String,
    value: f64,
    exact: Option<Exact>,
}

/// `mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exact {
    mantissa: i128,
    exponent: i32,
}

impl DecimalToken {
    /// Parses a token. Accepts signed decimals with optional exponent, and
    /// the `nan`/`inf` spellings C's `printf` produces.
    pub fn parse(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        let value = if lower.trim_start_matches(['+', '-']) == "nan" {
            f64::NAN
        } else {
            lower.parse::<f64>().ok()?
        };
        Some(Self {
            text: text.to_string(),
            value,
            exact: parse_exact(text),
        })
    }

    /// The token as printed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The nearest `f64`.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns true if `|self - other| <= tolerance`.
    pub fn within(&self, other: &DecimalToken, tolerance: &Tolerance) -> bool {
        if let (Some(a), Some(b), Some(t)) = (self.exact, other.exact, tolerance.0.exact) {
            if let Some(ok) = exact_within(a, b, t) {
                return ok;
            }
        }
        (self.value - other.value).abs() <= tolerance.0.value
    }
}

impl fmt::Display for DecimalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for DecimalToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

fn parse_exact(text: &str) -> Option<Exact> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (significand, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], unsigned[pos + 1..].parse::<i32>().ok()?),
        None => (unsigned, 0),
    };
    let (integer, fraction) = significand.split_once('.').unwrap_or((significand, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut mantissa: i128 = 0;
    for b in integer.bytes().chain(fraction.bytes()) {
        mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }
    let exponent = exponent.checked_sub(i32::try_from(fraction.len()).ok()?)?;
    Some(Exact {
        mantissa: if negative { -mantissa } else { mantissa },
        exponent,
    })
}

/// Scales `value` down to `target` exponent (`target <= value.exponent`).
fn rescale(value: Exact, target: i32) -> Option<i128> {
    let shift = u32::try_from(value.exponent.checked_sub(target)?).ok()?;
    value.mantissa.checked_mul(10i128.checked_pow(shift)?)
}

/// `None` when the values cannot be brought to a common exponent exactly.
fn exact_within(a: Exact, b: Exact, tolerance: Exact) -> Option<bool> {
    let common = a.exponent.min(b.exponent).min(tolerance.exponent);
    let diff = rescale(a, common)?.checked_sub(rescale(b, common)?)?.checked_abs()?;
    Some(diff <= rescale(tolerance, common)?)
}

/// Maximum absolute difference accepted between two state tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerance(DecimalToken);

impl Tolerance {
    /// The tolerance as printed.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DecimalToken {
            text: DEFAULT_TOLERANCE.to_string(),
            value: 1e-6,
            exact: Some(Exact {
                mantissa: 1,
                exponent: -6,
            }),
        })
    }
}

impl FromStr for Tolerance {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let token = DecimalToken::parse(s.trim())
            .filter(|t| t.value.is_finite() && t.value >= 0.0)
            .ok_or_else(|| {
                HarnessError::invalid_config("tolerance", format!("'{}' is not a non-negative number", s))
            })?;
        Ok(Self(token))
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Tolerance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Simulator output: one row of numeric tokens per line, positional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateTable {
    /// Token rows in printed order. Blank lines are kept as empty rows.
    pub lines: Vec<Vec<DecimalToken>>,
}

impl StateTable {
    /// Parses simulator output text.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::MalformedOutput`] naming the first token that is
    /// not a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use crosscheck_core::StateTable;
    ///
    /// let table = StateTable::parse("2\n0\t1.5\t-2e-3\n1\t0.25\t4\n").unwrap();
    /// assert_eq!(table.lines.len(), 3);
    /// assert_eq!(table.lines[1][2].as_str(), "-2e-3");
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines: Vec<Vec<DecimalToken>> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| {
                line.split_whitespace()
                    .map(|token| {
                        DecimalToken::parse(token)
                            .ok_or_else(|| HarnessError::malformed(idx + 1, line, "numeric tokens"))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        while lines.last().is_some_and(|row| row.is_empty()) {
            lines.pop();
        }

        Ok(Self { lines })
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the table has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str) -> DecimalToken {
        DecimalToken::parse(text).unwrap()
    }

    #[test]
    fn test_parse_exact_forms() {
        assert_eq!(
            parse_exact("1.25"),
            Some(Exact {
                mantissa: 125,
                exponent: -2
            })
        );
        assert_eq!(
            parse_exact("-3e-2"),
            Some(Exact {
                mantissa: -3,
                exponent: -2
            })
        );
        assert_eq!(
            parse_exact("+.5"),
            Some(Exact {
                mantissa: 5,
                exponent: -1
            })
        );
        assert_eq!(parse_exact("."), None);
        assert_eq!(parse_exact("1.2.3"), None);
        assert_eq!(parse_exact("nan"), None);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let tol = Tolerance::default();
        assert!(token("1.000001").within(&token("1.0"), &tol));
        assert!(token("0.999999").within(&token("1"), &tol));
        assert!(!token("1.0000010000000001").within(&token("1.0"), &tol));
        assert!(!token("1.000002").within(&token("1.0"), &tol));
    }

    #[test]
    fn test_within_is_symmetric() {
        let tol = Tolerance::default();
        assert!(token("-4.5").within(&token("-4.499999"), &tol));
        assert!(token("-4.499999").within(&token("-4.5"), &tol));
    }

    #[test]
    fn test_huge_exponent_falls_back_to_float() {
        let tol = Tolerance::default();
        assert!(token("1e300").within(&token("1e300"), &tol));
        assert!(!token("1e300").within(&token("2e300"), &tol));
    }

    #[test]
    fn test_nan_never_within() {
        let tol = Tolerance::default();
        assert!(!token("nan").within(&token("nan"), &tol));
        assert!(!token("-nan").within(&token("0"), &tol));
    }

    #[test]
    fn test_default_tolerance_matches_constant() {
        assert_eq!(Tolerance::default(), DEFAULT_TOLERANCE.parse::<Tolerance>().unwrap());
    }

    #[test]
    fn test_tolerance_rejects_negative() {
        assert!("-1".parse::<Tolerance>().is_err());
        assert!("abc".parse::<Tolerance>().is_err());
        assert_eq!("1e-3".parse::<Tolerance>().unwrap().as_str(), "1e-3");
    }

    #[test]
    fn test_state_table_keeps_interior_blank_lines() {
        let table = StateTable::parse("1 2\n\n3 4\n\n").unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.lines[1].is_empty());
    }

    #[test]
    fn test_state_table_rejects_words() {
        let err = StateTable::parse("1 2\n3 four\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
