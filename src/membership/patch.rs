//! Field-level changes to a member's profile.

use chrono::NaiveDate;
use regex::Regex;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::entities::members;
use crate::services::ServiceError;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email.trim()))
}

/// Dates travel as `YYYY-MM-DD`.
pub fn check_date(field: &str, value: &str) -> Result<(), ServiceError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ServiceError::invalid(format!("{field} must be a date in YYYY-MM-DD form")))
}

/// Every field is optional; absent fields are left untouched and blank
/// strings clear nullable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub blood_group: Option<String>,
    pub profession: Option<String>,
    pub kuwait_contact: Option<String>,
    pub whatsapp: Option<String>,
    pub zone: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub type_of_member: Option<String>,
    pub nominee_name: Option<String>,
    pub nominee_relation: Option<String>,
    pub percentage_1: Option<i32>,
    pub percentage_2: Option<i32>,
    pub percentage_3: Option<i32>,
    pub percentage_4: Option<i32>,
    pub profile_picture: Option<String>,
    pub form_scanned: Option<String>,
    pub transaction_slip: Option<String>,
    pub card_printed_date: Option<String>,
    pub card_expiry_date: Option<String>,
}

impl MemberPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ServiceError::invalid(format!("{field} cannot be empty")));
            }
        }

        if let Some(email) = non_blank(&self.email)
            && !is_valid_email(email)
        {
            return Err(ServiceError::invalid(format!("Invalid email address: {email}")));
        }

        for (field, value) in [
            ("dob", &self.dob),
            ("card_printed_date", &self.card_printed_date),
            ("card_expiry_date", &self.card_expiry_date),
        ] {
            if let Some(date) = non_blank(value) {
                check_date(field, date)?;
            }
        }

        let percentages = [
            self.percentage_1,
            self.percentage_2,
            self.percentage_3,
            self.percentage_4,
        ];
        if percentages.iter().flatten().any(|p| !(0..=100).contains(p)) {
            return Err(ServiceError::invalid("Nominee percentages must be between 0 and 100"));
        }
        if percentages.iter().flatten().sum::<i32>() > 100 {
            return Err(ServiceError::invalid("Nominee percentages cannot exceed 100 in total"));
        }

        Ok(())
    }

    /// Copy the present fields onto `active`.
    pub fn apply(&self, active: &mut members::ActiveModel) {
        if let Some(first_name) = &self.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = &self.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }

        set_text(&mut active.middle_name, &self.middle_name);
        set_text(&mut active.email, &self.email);
        set_text(&mut active.gender, &self.gender);
        set_text(&mut active.dob, &self.dob);
        set_text(&mut active.blood_group, &self.blood_group);
        set_text(&mut active.profession, &self.profession);
        set_text(&mut active.kuwait_contact, &self.kuwait_contact);
        set_text(&mut active.whatsapp, &self.whatsapp);
        set_text(&mut active.zone, &self.zone);
        set_text(&mut active.area, &self.area);
        set_text(&mut active.address, &self.address);
        set_text(&mut active.type_of_member, &self.type_of_member);
        set_text(&mut active.nominee_name, &self.nominee_name);
        set_text(&mut active.nominee_relation, &self.nominee_relation);
        set_text(&mut active.profile_picture, &self.profile_picture);
        set_text(&mut active.form_scanned, &self.form_scanned);
        set_text(&mut active.transaction_slip, &self.transaction_slip);
        set_text(&mut active.card_printed_date, &self.card_printed_date);
        set_text(&mut active.card_expiry_date, &self.card_expiry_date);

        for (slot, value) in [
            (&mut active.percentage_1, self.percentage_1),
            (&mut active.percentage_2, self.percentage_2),
            (&mut active.percentage_3, self.percentage_3),
            (&mut active.percentage_4, self.percentage_4),
        ] {
            if let Some(value) = value {
                *slot = Set(Some(value));
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn set_text(slot: &mut ActiveValue<Option<String>>, value: &Option<String>) {
    if value.is_some() {
        *slot = Set(non_blank(value).map(ToString::to_string));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<MemberPatch, _> =
            serde_json::from_str(r#"{"first_name": "Anu", "membership_id": "KWSKW09999"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_dates() {
        let patch = MemberPatch {
            card_expiry_date: Some("2026-13-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(ServiceError::InvalidArgument(_))));

        let patch = MemberPatch {
            card_expiry_date: Some("2027-01-31".to_string()),
            dob: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_validate_percentages() {
        let patch = MemberPatch {
            percentage_1: Some(60),
            percentage_2: Some(50),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = MemberPatch {
            percentage_1: Some(-1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = MemberPatch {
            percentage_1: Some(50),
            percentage_2: Some(50),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_validate_email_and_names() {
        assert!(is_valid_email("someone@example.org"));
        assert!(!is_valid_email("someone@"));

        let patch = MemberPatch {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = MemberPatch {
            first_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_apply_sets_and_clears() {
        let mut active = members::ActiveModel::default();
        let patch = MemberPatch {
            zone: Some("Fahaheel".to_string()),
            area: Some("  ".to_string()),
            percentage_3: Some(25),
            ..Default::default()
        };

        patch.apply(&mut active);

        assert_eq!(active.zone, Set(Some("Fahaheel".to_string())));
        assert_eq!(active.area, Set(None));
        assert_eq!(active.percentage_3, Set(Some(25)));
        assert!(active.first_name.is_not_set());
        assert!(!patch.is_empty());
        assert!(MemberPatch::default().is_empty());
    }
}
