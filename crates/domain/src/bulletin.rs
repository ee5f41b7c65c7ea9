//! Union bulletins.

use chrono::{DateTime, Utc};
use common::BulletinId;
use serde::{Deserialize, Serialize};

use crate::member::Standing;

/// What kind of announcement a bulletin carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BulletinKind {
    #[default]
    General,
    Urgent,
    Notice,
    Event,
}

impl BulletinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulletinKind::General => "general",
            BulletinKind::Urgent => "urgent",
            BulletinKind::Notice => "notice",
            BulletinKind::Event => "event",
        }
    }
}

impl std::str::FromStr for BulletinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(BulletinKind::General),
            "urgent" => Ok(BulletinKind::Urgent),
            "notice" => Ok(BulletinKind::Notice),
            "event" => Ok(BulletinKind::Event),
            other => Err(format!("tipo de boletim desconhecido: {other}")),
        }
    }
}

/// Display ordering weight for bulletins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(format!("prioridade desconhecida: {other}")),
        }
    }
}

/// Who a bulletin is shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Every member.
    #[default]
    All,

    /// Only members in current standing.
    Current,

    /// Only delinquent members (dues reminders).
    Delinquent,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Current => "current",
            Audience::Delinquent => "delinquent",
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Audience::All),
            "current" => Ok(Audience::Current),
            "delinquent" => Ok(Audience::Delinquent),
            other => Err(format!("público desconhecido: {other}")),
        }
    }
}

/// An announcement posted to the member bulletin board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulletin {
    /// Unique bulletin identifier.
    pub id: BulletinId,

    /// Headline.
    pub title: String,

    /// Full text.
    pub body: String,

    /// Kind of announcement.
    pub kind: BulletinKind,

    /// Display ordering weight.
    pub priority: Priority,

    /// Who sees it.
    pub audience: Audience,

    /// When it was posted.
    pub published_at: DateTime<Utc>,

    /// Optional automatic expiry.
    pub expires_at: Option<DateTime<Utc>>,

    /// Manually deactivated bulletins stay stored but hidden.
    pub active: bool,

    /// Who posted it, if recorded.
    pub author: Option<String>,
}

impl Bulletin {
    /// Posts a bulletin effective immediately.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        kind: BulletinKind,
        priority: Priority,
        audience: Audience,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BulletinId::new(),
            title: title.into(),
            body: body.into(),
            kind,
            priority,
            audience,
            published_at,
            expires_at: None,
            active: true,
            author: None,
        }
    }

    /// Active and not yet expired at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|e| now < e)
    }

    /// Whether a member with the given standing should see this bulletin.
    pub fn targets(&self, standing: Standing) -> bool {
        match self.audience {
            Audience::All => true,
            Audience::Current => standing == Standing::Current,
            Audience::Delinquent => standing == Standing::Delinquent,
        }
    }

    /// Urgent by kind or by priority.
    pub fn is_urgent(&self) -> bool {
        self.kind == BulletinKind::Urgent || self.priority >= Priority::High
    }

    /// Hides the bulletin without deleting it.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
