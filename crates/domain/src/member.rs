//! Union member records.

use chrono::{DateTime, NaiveDate, Utc};
use common::Cpf;
use serde::{Deserialize, Serialize};

/// A member's dues-payment standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Dues are paid up; the member may reserve the facility.
    #[default]
    Current,

    /// Dues are overdue; reservations are refused until regularized.
    Delinquent,
}

impl Standing {
    /// Returns the standing name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Current => "current",
            Standing::Delinquent => "delinquent",
        }
    }
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Standing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Standing::Current),
            "delinquent" => Ok(Standing::Delinquent),
            other => Err(format!("situação desconhecida: {other}")),
        }
    }
}

/// A union member.
///
/// Members are never hard-deleted; `active` is flipped off instead so the
/// record stays available for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member's CPF, the unique identifier.
    pub cpf: Cpf,

    /// Full name.
    pub name: String,

    /// Contact email, unique across members.
    pub email: String,

    /// Contact phone, if given.
    pub phone: Option<String>,

    /// Dues-payment standing.
    pub standing: Standing,

    /// Date of the most recent dues payment.
    pub last_dues_payment: Option<NaiveDate>,

    /// When the member joined.
    pub joined_at: DateTime<Utc>,

    /// Whether the member is active in the system.
    pub active: bool,
}

impl Member {
    /// Creates an active member in current standing.
    pub fn new(cpf: Cpf, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            cpf,
            name: name.into(),
            email: email.into(),
            phone: None,
            standing: Standing::Current,
            last_dues_payment: None,
            joined_at: Utc::now(),
            active: true,
        }
    }

    /// Returns true if this member may create reservations.
    ///
    /// Requires both current standing and an active record.
    pub fn in_good_standing(&self) -> bool {
        self.active && self.standing == Standing::Current
    }

    /// Marks the member delinquent.
    pub fn mark_delinquent(&mut self) {
        self.standing = Standing::Delinquent;
    }

    /// Marks the member current, recording the payment date.
    pub fn mark_current(&mut self, paid_on: NaiveDate) {
        self.standing = Standing::Current;
        self.last_dues_payment = Some(paid_on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member::new(
            Cpf::parse("52998224725").unwrap(),
            "Maria Silva",
            "maria@example.com",
        )
    }

    #[test]
    fn test_new_member_in_good_standing() {
        let m = member();
        assert_eq!(m.standing, Standing::Current);
        assert!(m.active);
        assert!(m.in_good_standing());
    }

    #[test]
    fn test_delinquent_member_not_in_good_standing() {
        let mut m = member();
        m.mark_delinquent();
        assert!(!m.in_good_standing());
    }

    #[test]
    fn test_inactive_member_not_in_good_standing() {
        let mut m = member();
        m.active = false;
        assert!(!m.in_good_standing());
    }

    #[test]
    fn test_mark_current_records_payment_date() {
        let mut m = member();
        m.mark_delinquent();

        let paid_on = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        m.mark_current(paid_on);

        assert_eq!(m.standing, Standing::Current);
        assert_eq!(m.last_dues_payment, Some(paid_on));
    }

    #[test]
    fn test_standing_serialization() {
        assert_eq!(
            serde_json::to_string(&Standing::Delinquent).unwrap(),
            "\"delinquent\""
        );
    }
}
