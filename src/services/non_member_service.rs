//! Domain service for non-member box holders.

use serde::Deserialize;

use crate::db::NonMemberFilter;
use crate::entities::non_members;
use crate::ledger::AuditEntry;
use crate::membership::patch::is_valid_email;
use crate::services::ServiceError;

/// Full record as submitted by the admin form; edits replace every field.
#[derive(Debug, Clone, Deserialize)]
pub struct NonMemberInput {
    pub full_name: String,
    #[serde(default)]
    pub is_company: bool,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NonMemberInput {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.full_name.trim().is_empty() {
            return Err(ServiceError::invalid("Full name is required"));
        }
        if self.is_company && blank(self.company_name.as_deref()) {
            return Err(ServiceError::invalid("Company name is required for companies"));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty())
            && !is_valid_email(email)
        {
            return Err(ServiceError::invalid(format!("Invalid email address: {email}")));
        }
        Ok(())
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[async_trait::async_trait]
pub trait NonMemberService: Send + Sync {
    async fn create(&self, actor: i64, input: NonMemberInput) -> Result<non_members::Model, ServiceError>;

    async fn update(
        &self,
        actor: i64,
        id: i64,
        input: NonMemberInput,
    ) -> Result<non_members::Model, ServiceError>;

    async fn get(&self, id: i64) -> Result<non_members::Model, ServiceError>;

    async fn list(&self, filter: NonMemberFilter) -> Result<Vec<non_members::Model>, ServiceError>;

    /// Removes the non-member and its audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] while a cash box still names them as holder.
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;

    async fn history(&self, id: i64) -> Result<Vec<AuditEntry>, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NonMemberInput {
        serde_json::from_str(r#"{"full_name": "Gulf Traders"}"#).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(input().validate().is_ok());

        let mut company = input();
        company.is_company = true;
        assert!(company.validate().is_err());
        company.company_name = Some("Gulf Traders WLL".to_string());
        assert!(company.validate().is_ok());

        let mut bad = input();
        bad.full_name = " ".to_string();
        assert!(bad.validate().is_err());
    }
}
