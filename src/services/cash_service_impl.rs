//! `SeaORM` implementation of the `CashService` trait.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::time::Duration;

use crate::db::{BoxFilter, BoxStats, Store};
use crate::entities::{box_collections, cash_boxes};
use crate::ledger::money::DenominationCounts;
use crate::ledger::{self, AuditAction, AuditEntry, Cascade};
use crate::services::cash_service::{
    BoxInput, CashService, CollectionInput, ImportFailure, ImportReport, ImportRow,
};
use crate::services::{ServiceError, with_deadline};

pub struct SeaOrmCashService {
    store: Store,
    timeout: Duration,
}

impl SeaOrmCashService {
    #[must_use]
    pub const fn new(store: Store, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn import_row(&self, actor: i64, row: serde_json::Value) -> Result<(), ServiceError> {
        let row: ImportRow = serde_json::from_value(row)
            .map_err(|e| ServiceError::invalid(format!("Unreadable row: {e}")))?;

        let cash_box = self
            .store
            .cash()
            .get_box_by_number(&row.box_number)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cash box", &row.box_number))?;

        self.create_collection(
            actor,
            CollectionInput {
                box_id: cash_box.id,
                date: row.date,
                counts: row.counts,
                remarks: row.remarks,
                slip_path: None,
            },
        )
        .await
        .map(|_| ())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn fill_box(active: &mut cash_boxes::ActiveModel, input: BoxInput) {
    active.number = Set(input.number.trim().to_string());
    active.member_id = Set(input.member_id);
    active.non_member_id = Set(input.non_member_id);
    active.referred_by = Set(input.referred_by);
    active.in_use = Set(input.in_use);
    active.date_issued = Set(trimmed(input.date_issued));
    active.remarks = Set(trimmed(input.remarks));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
}

fn set_counts(active: &mut box_collections::ActiveModel, counts: &DenominationCounts) {
    active.note_20 = Set(counts.note_20);
    active.note_10 = Set(counts.note_10);
    active.note_5 = Set(counts.note_5);
    active.note_1 = Set(counts.note_1);
    active.note_0_5 = Set(counts.note_0_5);
    active.note_0_25 = Set(counts.note_0_25);
    active.coin_100 = Set(counts.coin_100);
    active.coin_50 = Set(counts.coin_50);
    active.coin_20 = Set(counts.coin_20);
    active.coin_10 = Set(counts.coin_10);
    active.coin_5 = Set(counts.coin_5);
    active.total_fils = Set(counts.total_fils());
}

fn fill_collection(active: &mut box_collections::ActiveModel, input: CollectionInput) {
    active.box_id = Set(input.box_id);
    active.date = Set(input.date.trim().to_string());
    set_counts(active, &input.counts);
    active.remarks = Set(trimmed(input.remarks));
    active.slip_path = Set(trimmed(input.slip_path));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
}

#[async_trait]
impl CashService for SeaOrmCashService {
    async fn create_box(&self, actor: i64, input: BoxInput) -> Result<cash_boxes::Model, ServiceError> {
        input.validate()?;

        let created = with_deadline(
            self.timeout,
            ledger::commit::<cash_boxes::Entity, _>(&self.store, AuditAction::Created, actor, move |txn| {
                Box::pin(async move {
                    let mut active = cash_boxes::ActiveModel {
                        created_at: Set(chrono::Utc::now().to_rfc3339()),
                        ..Default::default()
                    };
                    fill_box(&mut active, input);
                    Ok(active.insert(txn).await?)
                })
            }),
        )
        .await?;

        tracing::info!(box_id = created.id, number = %created.number, actor, "Cash box created");
        Ok(created)
    }

    async fn update_box(
        &self,
        actor: i64,
        id: i64,
        input: BoxInput,
    ) -> Result<cash_boxes::Model, ServiceError> {
        input.validate()?;

        with_deadline(
            self.timeout,
            ledger::commit::<cash_boxes::Entity, _>(&self.store, AuditAction::Modified, actor, move |txn| {
                Box::pin(async move {
                    let existing = cash_boxes::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Cash box", id))?;

                    let mut active: cash_boxes::ActiveModel = existing.into();
                    fill_box(&mut active, input);
                    Ok(active.update(txn).await?)
                })
            }),
        )
        .await
    }

    async fn get_box(&self, id: i64) -> Result<cash_boxes::Model, ServiceError> {
        self.store
            .cash()
            .get_box(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Cash box", id))
    }

    async fn list_boxes(&self, filter: BoxFilter) -> Result<Vec<cash_boxes::Model>, ServiceError> {
        Ok(self.store.cash().list_boxes(&filter).await?)
    }

    async fn box_stats(&self) -> Result<BoxStats, ServiceError> {
        Ok(self.store.cash().box_stats().await?)
    }

    async fn delete_box(&self, id: i64) -> Result<(), ServiceError> {
        if self.store.cash().count_collections(id).await? > 0 {
            return Err(ServiceError::conflict(
                "Cash box still has collections; delete them first",
            ));
        }

        with_deadline(
            self.timeout,
            ledger::delete::<cash_boxes::Entity>(&self.store, id, Cascade::AuditsFirst),
        )
        .await
    }

    async fn box_history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError> {
        self.get_box(id).await?;
        ledger::history::<cash_boxes::Entity, _>(&self.store.conn, id).await
    }

    async fn create_collection(
        &self,
        actor: i64,
        input: CollectionInput,
    ) -> Result<box_collections::Model, ServiceError> {
        input.validate()?;
        self.get_box(input.box_id).await?;

        let created = with_deadline(
            self.timeout,
            ledger::commit::<box_collections::Entity, _>(&self.store, AuditAction::Created, actor, move |txn| {
                Box::pin(async move {
                    let mut active = box_collections::ActiveModel {
                        collected_by: Set(actor),
                        created_at: Set(chrono::Utc::now().to_rfc3339()),
                        ..Default::default()
                    };
                    fill_collection(&mut active, input);
                    Ok(active.insert(txn).await?)
                })
            }),
        )
        .await?;

        tracing::info!(
            collection_id = created.id,
            box_id = created.box_id,
            total_fils = created.total_fils,
            actor,
            "Box collection recorded"
        );
        Ok(created)
    }

    async fn update_collection(
        &self,
        actor: i64,
        id: i64,
        input: CollectionInput,
    ) -> Result<box_collections::Model, ServiceError> {
        input.validate()?;
        self.get_box(input.box_id).await?;

        with_deadline(
            self.timeout,
            ledger::commit::<box_collections::Entity, _>(&self.store, AuditAction::Modified, actor, move |txn| {
                Box::pin(async move {
                    let existing = box_collections::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("Box collection", id))?;

                    let mut active: box_collections::ActiveModel = existing.into();
                    fill_collection(&mut active, input);
                    Ok(active.update(txn).await?)
                })
            }),
        )
        .await
    }

    async fn get_collection(&self, id: i64) -> Result<box_collections::Model, ServiceError> {
        self.store
            .cash()
            .get_collection(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Box collection", id))
    }

    async fn list_collections(&self, box_id: Option<i64>) -> Result<Vec<box_collections::Model>, ServiceError> {
        Ok(self.store.cash().list_collections(box_id).await?)
    }

    async fn delete_collection(&self, id: i64) -> Result<(), ServiceError> {
        with_deadline(
            self.timeout,
            ledger::delete::<box_collections::Entity>(&self.store, id, Cascade::AuditsFirst),
        )
        .await
    }

    async fn collection_history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError> {
        self.get_collection(id).await?;
        ledger::history::<box_collections::Entity, _>(&self.store.conn, id).await
    }

    async fn import_collections(
        &self,
        actor: i64,
        rows: Vec<serde_json::Value>,
    ) -> Result<ImportReport, ServiceError> {
        if rows.is_empty() {
            return Err(ServiceError::invalid("No rows to import"));
        }

        let mut report = ImportReport::default();

        for (index, row) in rows.into_iter().enumerate() {
            match self.import_row(actor, row).await {
                Ok(()) => report.imported += 1,
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(ImportFailure {
                        row: index + 1,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            imported = report.imported,
            failed = report.failed,
            actor,
            "Box collection import finished"
        );
        Ok(report)
    }
}
