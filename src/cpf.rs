//! CPF (Cadastro de Pessoas Físicas) validation and formatting.
//!
//! A CPF is eleven digits: nine base digits followed by two check digits,
//! each computed with a mod-11 weighted sum over the digits before it.
//!
//! ```rust
//! use agenda::cpf;
//!
//! assert!(cpf::is_valid("529.982.247-25"));
//! assert!(cpf::is_valid("52998224725"));
//! assert!(!cpf::is_valid("111.111.111-11"));
//! assert_eq!(cpf::format("52998224725"), "529.982.247-25");
//! ```
//!
//! [`is_valid`] and [`format`] are independent: formatting never implies
//! validity. Code that stores a CPF should go through [`Cpf::parse`], which
//! validates once and keeps the canonical digits.

use std::fmt;

use serde::{Serialize, Serializer};

const LEN: usize = 11;

/// Strips every character that is not an ASCII digit.
pub fn normalize(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Returns `true` if `input` is a structurally valid CPF, punctuated or not.
pub fn is_valid(input: &str) -> bool {
    let digits = to_digits(&normalize(input));
    if digits.len() != LEN {
        return false;
    }

    // Repeated-digit sequences satisfy the checksum arithmetic but are not
    // issued numbers.
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    [9, 10].into_iter().all(|t| digits[t] == check_digit(&digits, t))
}

/// Renders `input` as `DDD.DDD.DDD-DD` when it holds exactly eleven digits.
///
/// Anything else comes back as its bare digit string, neither padded nor
/// truncated.
pub fn format(input: &str) -> String {
    let digits = normalize(input);
    if digits.len() != LEN {
        return digits;
    }
    format!("{}.{}.{}-{}", &digits[0..3], &digits[3..6], &digits[6..9], &digits[9..11])
}

/// Check digit for position `t`, weighing `digits[0..t]` from `t + 1` down to 2.
fn check_digit(digits: &[u32], t: usize) -> u32 {
    let sum: u32 = digits[..t]
        .iter()
        .enumerate()
        .map(|(c, &d)| d * (t as u32 + 1 - c as u32))
        .sum();
    ((10 * sum) % 11) % 10
}

fn to_digits(normalized: &str) -> Vec<u32> {
    normalized.chars().filter_map(|c| c.to_digit(10)).collect()
}

// ── Validated value ───────────────────────────────────────────────────────────

/// Returned by [`Cpf::parse`] when the input is not a valid CPF.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CPF `{0}`")]
pub struct InvalidCpf(pub String);

/// A CPF that passed [`is_valid`]. Holds the eleven bare digits.
///
/// Displays and serialises in canonical `DDD.DDD.DDD-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(input: &str) -> Result<Self, InvalidCpf> {
        if is_valid(input) {
            Ok(Self(normalize(input)))
        } else {
            Err(InvalidCpf(input.to_owned()))
        }
    }

    /// The eleven digits without punctuation.
    pub fn digits(&self) -> &str {
        &self.0
    }

    pub fn formatted(&self) -> String {
        format(&self.0)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for Cpf {
    type Err = InvalidCpf;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Cpf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.formatted())
    }
}
