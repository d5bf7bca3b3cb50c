//! Domain service for member cash transactions.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::TransactionFilter;
use crate::entities::member_transactions;
use crate::ledger::AuditEntry;
use crate::ledger::money::to_fils;
use crate::membership::patch::check_date;
use crate::services::{ServiceError, ids};

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInput {
    #[serde(deserialize_with = "ids::id")]
    pub member_id: i64,
    pub category: String,
    /// KWD, at most 3 decimal places
    pub amount: Decimal,
    pub date: String,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub slip_path: Option<String>,
    #[serde(default)]
    pub card_printed_date: Option<String>,
    #[serde(default)]
    pub card_expiry_date: Option<String>,
}

impl TransactionInput {
    /// Validates the input and returns the amount in fils.
    pub fn validate(&self) -> Result<i64, ServiceError> {
        if self.category.trim().is_empty() {
            return Err(ServiceError::invalid("Category is required"));
        }
        check_date("date", &self.date)?;
        for (field, value) in [
            ("card_printed_date", &self.card_printed_date),
            ("card_expiry_date", &self.card_expiry_date),
        ] {
            if let Some(date) = value.as_deref().filter(|d| !d.trim().is_empty()) {
                check_date(field, date)?;
            }
        }
        if self.amount.is_sign_negative() {
            return Err(ServiceError::invalid("Amount cannot be negative"));
        }
        to_fils(self.amount)
            .ok_or_else(|| ServiceError::invalid("Amount must have at most 3 decimal places"))
    }
}

#[async_trait::async_trait]
pub trait TransactionService: Send + Sync {
    /// Records a transaction. Card dates, when given, are copied onto the
    /// member in the same database transaction.
    async fn create(
        &self,
        actor: i64,
        input: TransactionInput,
    ) -> Result<member_transactions::Model, ServiceError>;

    async fn update(
        &self,
        actor: i64,
        id: i64,
        input: TransactionInput,
    ) -> Result<member_transactions::Model, ServiceError>;

    async fn get(&self, id: i64) -> Result<member_transactions::Model, ServiceError>;

    async fn list(&self, filter: TransactionFilter) -> Result<Vec<member_transactions::Model>, ServiceError>;

    async fn count(&self, filter: TransactionFilter) -> Result<u64, ServiceError>;

    async fn for_member(&self, member_id: i64) -> Result<Vec<member_transactions::Model>, ServiceError>;

    async fn delete(&self, id: i64) -> Result<(), ServiceError>;

    async fn history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: &str) -> TransactionInput {
        serde_json::from_str(&format!(
            r#"{{"member_id": "5", "category": "Membership Fee", "amount": "{amount}", "date": "2026-01-15"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_amount_to_fils() {
        assert_eq!(input("12.5").validate().unwrap(), 12_500);
        assert_eq!(input("0.005").validate().unwrap(), 5);
    }

    #[test]
    fn test_amount_precision_and_sign() {
        assert!(input("1.0005").validate().is_err());
        assert!(input("-3").validate().is_err());
    }

    #[test]
    fn test_card_dates_checked() {
        let mut tx = input("2");
        tx.card_expiry_date = Some("31/12/2027".to_string());
        assert!(tx.validate().is_err());
    }
}
