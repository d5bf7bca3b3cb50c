//! Domain service for cash boxes (sandouqcha) and their collections.

use serde::{Deserialize, Deserializer, Serialize};

use crate::db::{BoxFilter, BoxStats};
use crate::entities::{box_collections, cash_boxes};
use crate::ledger::AuditEntry;
use crate::ledger::money::DenominationCounts;
use crate::membership::patch::check_date;
use crate::services::{ServiceError, ids};

#[derive(Debug, Clone, Deserialize)]
pub struct BoxInput {
    pub number: String,
    #[serde(default, deserialize_with = "ids::opt_id")]
    pub member_id: Option<i64>,
    #[serde(default, deserialize_with = "ids::opt_id")]
    pub non_member_id: Option<i64>,
    #[serde(default, deserialize_with = "ids::opt_id")]
    pub referred_by: Option<i64>,
    #[serde(default)]
    pub in_use: bool,
    #[serde(default)]
    pub date_issued: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl BoxInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.number.trim().is_empty() {
            return Err(ServiceError::invalid("Box number is required"));
        }
        if self.member_id.is_some() && self.non_member_id.is_some() {
            return Err(ServiceError::invalid(
                "A box is held by a member or a non-member, not both",
            ));
        }
        if let Some(date) = self.date_issued.as_deref().filter(|d| !d.trim().is_empty()) {
            check_date("date_issued", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInput {
    #[serde(deserialize_with = "ids::id")]
    pub box_id: i64,
    pub date: String,
    #[serde(flatten)]
    pub counts: DenominationCounts,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub slip_path: Option<String>,
}

impl CollectionInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        check_date("date", &self.date)?;
        if let Some(denomination) = self.counts.first_negative() {
            return Err(ServiceError::invalid(format!(
                "{} cannot be negative",
                denomination.key()
            )));
        }
        Ok(())
    }
}

/// One spreadsheet row. Boxes are addressed by number, not id.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    #[serde(deserialize_with = "text_or_number")]
    pub box_number: String,
    pub date: String,
    #[serde(flatten)]
    pub counts: DenominationCounts,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s.trim().to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected text, got {other}"))),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportFailure {
    /// 1-based position in the submitted batch
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<ImportFailure>,
}

#[async_trait::async_trait]
pub trait CashService: Send + Sync {
    async fn create_box(&self, actor: i64, input: BoxInput) -> Result<cash_boxes::Model, ServiceError>;

    async fn update_box(
        &self,
        actor: i64,
        id: i64,
        input: BoxInput,
    ) -> Result<cash_boxes::Model, ServiceError>;

    async fn get_box(&self, id: i64) -> Result<cash_boxes::Model, ServiceError>;

    async fn list_boxes(&self, filter: BoxFilter) -> Result<Vec<cash_boxes::Model>, ServiceError>;

    async fn box_stats(&self) -> Result<BoxStats, ServiceError>;

    /// Removes the box after its audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] while collections still reference it.
    async fn delete_box(&self, id: i64) -> Result<(), ServiceError>;

    async fn box_history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError>;

    async fn create_collection(
        &self,
        actor: i64,
        input: CollectionInput,
    ) -> Result<box_collections::Model, ServiceError>;

    async fn update_collection(
        &self,
        actor: i64,
        id: i64,
        input: CollectionInput,
    ) -> Result<box_collections::Model, ServiceError>;

    async fn get_collection(&self, id: i64) -> Result<box_collections::Model, ServiceError>;

    async fn list_collections(&self, box_id: Option<i64>) -> Result<Vec<box_collections::Model>, ServiceError>;

    async fn delete_collection(&self, id: i64) -> Result<(), ServiceError>;

    async fn collection_history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError>;

    /// Imports each row independently; one bad row never aborts the batch.
    async fn import_collections(
        &self,
        actor: i64,
        rows: Vec<serde_json::Value>,
    ) -> Result<ImportReport, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_input_accepts_string_box_id_and_flat_counts() {
        let input: CollectionInput = serde_json::from_str(
            r#"{"box_id": "12", "date": "2026-02-01", "note_20": 1, "coin_100": 3}"#,
        )
        .unwrap();

        assert_eq!(input.box_id, 12);
        assert_eq!(input.counts.note_20, 1);
        assert_eq!(input.counts.coin_100, 3);
        assert_eq!(input.counts.note_5, 0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_collection_rejects_negative_counts() {
        let input: CollectionInput =
            serde_json::from_str(r#"{"box_id": 1, "date": "2026-02-01", "coin_5": -2}"#).unwrap();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("coin_5"));
    }

    #[test]
    fn test_import_row_numeric_box_number() {
        let row: ImportRow =
            serde_json::from_str(r#"{"box_number": 101, "date": "2026-02-01", "note_1": 4}"#).unwrap();
        assert_eq!(row.box_number, "101");
        assert_eq!(row.counts.note_1, 4);
    }

    #[test]
    fn test_box_input_single_holder() {
        let input: BoxInput =
            serde_json::from_str(r#"{"number": "B-1", "member_id": "3", "non_member_id": 4}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
