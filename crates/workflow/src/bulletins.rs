use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::BulletinId;
use domain::{Audience, Bulletin, BulletinKind, Priority, Standing};
use store::BulletinRepository;

use crate::clock::Clock;
use crate::{Result, WorkflowError};

/// Input for posting a bulletin.
#[derive(Debug, Clone)]
pub struct NewBulletin {
    pub title: String,
    pub body: String,
    pub kind: BulletinKind,
    pub priority: Priority,
    pub audience: Audience,
    pub expires_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

/// Board-wide bulletin counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletinStats {
    pub total: usize,
    pub active: usize,
    pub urgent: usize,
    pub inactive: usize,
}

/// Announcements targeted by member standing.
pub struct BulletinBoard<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: BulletinRepository> BulletinBoard<S> {
    /// Creates a board over the given store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Posts a bulletin. Title and body are required.
    #[tracing::instrument(skip(self, input), fields(title = %input.title))]
    pub async fn post(&self, input: NewBulletin) -> Result<Bulletin> {
        if input.title.trim().is_empty() {
            return Err(WorkflowError::MissingField("título"));
        }
        if input.body.trim().is_empty() {
            return Err(WorkflowError::MissingField("texto"));
        }

        let mut bulletin = Bulletin::new(
            input.title.trim(),
            input.body.trim(),
            input.kind,
            input.priority,
            input.audience,
            self.clock.now(),
        );
        bulletin.expires_at = input.expires_at;
        bulletin.author = input.author;

        self.store.insert_bulletin(&bulletin).await?;
        metrics::counter!("bulletins_posted_total").increment(1);
        tracing::info!(id = %bulletin.id, "bulletin posted");
        Ok(bulletin)
    }

    /// Live bulletins for a reader, highest priority first.
    ///
    /// Without a standing, only `all`-audience bulletins are returned.
    pub async fn list_for(&self, standing: Option<Standing>) -> Result<Vec<Bulletin>> {
        let now = self.clock.now();
        let mut live: Vec<_> = self
            .store
            .list_bulletins()
            .await?
            .into_iter()
            .filter(|b| b.is_live(now))
            .filter(|b| match standing {
                Some(standing) => b.targets(standing),
                None => b.audience == Audience::All,
            })
            .collect();
        live.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.published_at.cmp(&a.published_at))
        });
        Ok(live)
    }

    /// Live urgent bulletins, for every audience.
    pub async fn list_urgent(&self) -> Result<Vec<Bulletin>> {
        let now = self.clock.now();
        Ok(self
            .store
            .list_bulletins()
            .await?
            .into_iter()
            .filter(|b| b.is_live(now) && b.is_urgent())
            .collect())
    }

    /// Hides a bulletin without deleting it.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate(&self, id: BulletinId) -> Result<Bulletin> {
        let mut bulletin = self
            .store
            .get_bulletin(id)
            .await?
            .ok_or(WorkflowError::Store(store::StoreError::BulletinNotFound(
                id,
            )))?;
        bulletin.deactivate();
        self.store.update_bulletin(&bulletin).await?;
        Ok(bulletin)
    }

    /// Counts bulletins on the board, for the statistics endpoint.
    pub async fn statistics(&self) -> Result<BulletinStats> {
        let now = self.clock.now();
        let bulletins = self.store.list_bulletins().await?;
        let total = bulletins.len();
        let active = bulletins.iter().filter(|b| b.is_live(now)).count();
        let urgent = bulletins
            .iter()
            .filter(|b| b.is_live(now) && b.is_urgent())
            .count();
        Ok(BulletinStats {
            total,
            active,
            urgent,
            inactive: total - active,
        })
    }

    /// Deactivates bulletins whose expiry passed. Returns how many.
    #[tracing::instrument(skip(self))]
    pub async fn expire_old(&self) -> Result<usize> {
        let now = self.clock.now();
        let expired: Vec<_> = self
            .store
            .list_bulletins()
            .await?
            .into_iter()
            .filter(|b| b.active && !b.is_live(now))
            .collect();

        let count = expired.len();
        for mut bulletin in expired {
            bulletin.deactivate();
            self.store.update_bulletin(&bulletin).await?;
        }
        Ok(count)
    }
}
