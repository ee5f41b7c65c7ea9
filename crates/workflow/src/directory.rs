use std::sync::Arc;

use chrono::NaiveDate;
use common::Cpf;
use domain::{Member, Standing};
use store::MemberRepository;

use crate::{Result, WorkflowError};

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// CPF in any formatting; validated before registration.
    pub cpf: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Member registration and standing management.
pub struct MemberDirectory<S> {
    store: Arc<S>,
}

impl<S: MemberRepository> MemberDirectory<S> {
    /// Creates a directory over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a new member in current standing.
    ///
    /// The CPF is validated with the official check-digit algorithm and
    /// duplicate CPFs or emails are refused.
    #[tracing::instrument(skip(self, input), fields(cpf = %input.cpf))]
    pub async fn register(&self, input: NewMember) -> Result<Member> {
        let cpf = Cpf::parse(&input.cpf)?;
        if input.name.trim().is_empty() {
            return Err(WorkflowError::MissingField("nome"));
        }
        if input.email.trim().is_empty() {
            return Err(WorkflowError::MissingField("email"));
        }

        let mut member = Member::new(cpf, input.name.trim(), input.email.trim());
        member.phone = input.phone;
        self.store.insert_member(&member).await?;

        metrics::counter!("members_registered_total").increment(1);
        tracing::info!(cpf = %member.cpf, "member registered");
        Ok(member)
    }

    /// Looks a member up by CPF.
    pub async fn get(&self, cpf: &Cpf) -> Result<Member> {
        self.store
            .get_member(cpf)
            .await?
            .ok_or_else(|| WorkflowError::MemberNotFound(cpf.clone()))
    }

    /// Administrative standing update.
    ///
    /// Marking a member current records the dues payment date.
    #[tracing::instrument(skip(self))]
    pub async fn set_standing(
        &self,
        cpf: &Cpf,
        standing: Standing,
        paid_on: Option<NaiveDate>,
    ) -> Result<Member> {
        let mut member = self.get(cpf).await?;
        match standing {
            Standing::Current => {
                member.mark_current(paid_on.unwrap_or_else(|| chrono::Utc::now().date_naive()));
            }
            Standing::Delinquent => member.mark_delinquent(),
        }
        self.store.update_member(&member).await?;
        Ok(member)
    }

    /// Deactivates a member. The record stays stored.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate(&self, cpf: &Cpf) -> Result<Member> {
        let mut member = self.get(cpf).await?;
        member.active = false;
        self.store.update_member(&member).await?;
        Ok(member)
    }

    /// All active members currently delinquent.
    pub async fn list_delinquent(&self) -> Result<Vec<Member>> {
        Ok(self.store.list_delinquent_members().await?)
    }
}
