use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl MemberStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Inactive => "inactive",
            Self::Rejected => "rejected",
        }
    }

    /// Case-insensitive parse, as submitted by the admin UI.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "inactive" => Some(Self::Inactive),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,

    #[sea_orm(unique)]
    pub account_id: i64,

    /// Assigned once, at approval. Never reassigned.
    #[sea_orm(unique)]
    pub membership_id: Option<String>,

    pub status: MemberStatus,

    #[sea_orm(unique)]
    pub civil_id: String,

    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
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

    /// Opaque upload paths
    pub profile_picture: Option<String>,
    pub form_scanned: Option<String>,
    pub transaction_slip: Option<String>,

    pub card_printed_date: Option<String>,
    pub card_expiry_date: Option<String>,

    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    #[must_use]
    pub fn full_name(&self) -> String {
        [Some(self.first_name.as_str()), self.middle_name.as_deref(), Some(self.last_name.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
    #[sea_orm(has_many = "super::member_audits::Entity")]
    Audits,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::member_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Audits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
