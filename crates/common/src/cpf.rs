//! CPF — the Brazilian taxpayer ID used as the member identifier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from CPF parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpfError {
    /// The cleaned value is not exactly 11 digits.
    #[error("CPF deve ter 11 dígitos")]
    InvalidLength,

    /// The value fails the official check-digit algorithm
    /// (includes the well-known all-same-digit sequences).
    #[error("CPF inválido")]
    InvalidDigits,
}

/// A validated member CPF (11 digits, check digits verified).
///
/// Construction goes through [`Cpf::parse`], which accepts formatted input
/// (`123.456.789-09`) and stores only the digits, so two `Cpf` values compare
/// equal regardless of the formatting they were entered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Parses and validates a CPF, stripping any formatting characters.
    pub fn parse(input: &str) -> Result<Self, CpfError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != 11 {
            return Err(CpfError::InvalidLength);
        }

        let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

        // All-same-digit CPFs pass the checksum but are rejected by the registry.
        if d.iter().all(|&x| x == d[0]) {
            return Err(CpfError::InvalidDigits);
        }

        if d[9] != Self::check_digit(&d[..9], 10) || d[10] != Self::check_digit(&d[..10], 11) {
            return Err(CpfError::InvalidDigits);
        }

        Ok(Self(digits))
    }

    fn check_digit(digits: &[u32], start_weight: u32) -> u32 {
        let sum: u32 = digits
            .iter()
            .enumerate()
            .map(|(i, &digit)| digit * (start_weight - i as u32))
            .sum();
        match sum % 11 {
            rest if rest < 2 => 0,
            rest => 11 - rest,
        }
    }

    /// Returns the bare 11 digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the CPF in display form, `123.456.789-09`.
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.0[..3],
            &self.0[3..6],
            &self.0[6..9],
            &self.0[9..]
        )
    }
}

impl std::fmt::Display for Cpf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
