//! `SeaORM` implementation of the `TransactionService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, Set};
use std::time::Duration;

use crate::db::{Store, TransactionFilter};
use crate::entities::{member_transactions, members};
use crate::ledger::{self, AuditAction, AuditEntry, Cascade, Stamp};
use crate::services::transaction_service::{TransactionInput, TransactionService};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmTransactionService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmTransactionService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn fill(active: &mut member_transactions::ActiveModel, input: TransactionInput, amount_fils: i64) {
    active.member_id = Set(input.member_id);
    active.category = Set(input.category.trim().to_string());
    active.amount_fils = Set(amount_fils);
    active.date = Set(input.date.trim().to_string());
    active.remarks = Set(trimmed(input.remarks));
    active.slip_path = Set(trimmed(input.slip_path));
    active.card_printed_date = Set(trimmed(input.card_printed_date));
    active.card_expiry_date = Set(trimmed(input.card_expiry_date));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
}

/// Copy card dates onto the member and audit that change in the same transaction.
async fn sync_card_dates(
    txn: &DatabaseTransaction,
    actor: i64,
    transaction: &member_transactions::Model,
) -> Result<(), ServiceError> {
    if transaction.card_printed_date.is_none() && transaction.card_expiry_date.is_none() {
        return Ok(());
    }

    let member = members::Entity::find_by_id(transaction.member_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Member", transaction.member_id))?;

    let mut active: members::ActiveModel = member.into();
    if let Some(printed) = &transaction.card_printed_date {
        active.card_printed_date = Set(Some(printed.clone()));
    }
    if let Some(expiry) = &transaction.card_expiry_date {
        active.card_expiry_date = Set(Some(expiry.clone()));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let member = active.update(txn).await?;

    ledger::append::<members::Entity, _>(txn, &member, &Stamp::now(AuditAction::Modified, actor)).await
}

#[async_trait]
impl TransactionService for SeaOrmTransactionService {
    async fn create(
        &self,
        actor: i64,
        input: TransactionInput,
    ) -> Result<member_transactions::Model, ServiceError> {
        let amount_fils = input.validate()?;

        let created = with_deadline(
            self.timeout,
            ledger::commit::<member_transactions::Entity, _>(
                &self.store,
                AuditAction::Created,
                actor,
                move |txn| {
                    Box::pin(async move {
                        let mut active = member_transactions::ActiveModel {
                            created_at: Set(chrono::Utc::now().to_rfc3339()),
                            ..Default::default()
                        };
                        fill(&mut active, input, amount_fils);
                        let created = active.insert(txn).await?;
                        sync_card_dates(txn, actor, &created).await?;
                        Ok(created)
                    })
                },
            ),
        )
        .await?;

        tracing::info!(
            transaction_id = created.id,
            member_id = created.member_id,
            amount_fils = created.amount_fils,
            actor,
            "Member transaction recorded"
        );
        Ok(created)
    }

    async fn update(
        &self,
        actor: i64,
        id: i64,
        input: TransactionInput,
    ) -> Result<member_transactions::Model, ServiceError> {
        let amount_fils = input.validate()?;

        with_deadline(
            self.timeout,
            ledger::commit::<member_transactions::Entity, _>(
                &self.store,
                AuditAction::Modified,
                actor,
                move |txn| {
                    Box::pin(async move {
                        let existing = member_transactions::Entity::find_by_id(id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("Transaction", id))?;

                        let mut active: member_transactions::ActiveModel = existing.into();
                        fill(&mut active, input, amount_fils);
                        let updated = active.update(txn).await?;
                        sync_card_dates(txn, actor, &updated).await?;
                        Ok(updated)
                    })
                },
            ),
        )
        .await
    }

    async fn get(&self, id: i64) -> Result<member_transactions::Model, ServiceError> {
        self.store
            .transactions()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", id))
    }

    async fn list(&self, filter: TransactionFilter) -> Result<Vec<member_transactions::Model>, ServiceError> {
        Ok(self.store.transactions().list(&filter).await?)
    }

    async fn count(&self, filter: TransactionFilter) -> Result<u64, ServiceError> {
        Ok(self.store.transactions().count(&filter).await?)
    }

    async fn for_member(&self, member_id: i64) -> Result<Vec<member_transactions::Model>, ServiceError> {
        Ok(self.store.transactions().for_member(member_id).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        with_deadline(
            self.timeout,
            ledger::delete::<member_transactions::Entity>(&self.store, id, Cascade::AuditsFirst),
        )
        .await
    }

    async fn history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError> {
        self.get(id).await?;
        ledger::history::<member_transactions::Entity, _>(&self.store.conn, id).await
    }
}
