//! Money value object.

use serde::{Deserialize, Serialize};

/// Money amount represented in centavos to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in centavos (e.g., 2500 = R$ 25,00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from centavos.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole-real value.
    pub fn from_reais(reais: i64) -> Self {
        Self { cents: reais * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in centavos.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-real portion.
    pub fn reais(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the centavo portion (remainder after whole reais).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-R$ {},{:02}", self.reais().abs(), self.cents_part())
        } else {
            write!(f, "R$ {},{:02}", self.reais(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(2534);
        assert_eq!(money.cents(), 2534);
        assert_eq!(money.reais(), 25);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_from_reais() {
        let money = Money::from_reais(25);
        assert_eq!(money.cents(), 2500);
        assert_eq!(money.reais(), 25);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_money_display_brl() {
        assert_eq!(Money::from_cents(2500).to_string(), "R$ 25,00");
        assert_eq!(Money::from_cents(105).to_string(), "R$ 1,05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-R$ 12,34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);

        let mut c = a;
        c += b;
        assert_eq!(c.cents(), 1500);
    }

    #[test]
    fn test_money_comparison() {
        assert!(Money::from_cents(100).is_positive());
        assert!(Money::zero().is_zero());
    }
}
