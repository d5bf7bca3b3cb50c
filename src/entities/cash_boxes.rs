use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A numbered collection box (sandouqcha) handed out to a holder.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cash_boxes")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,

    #[sea_orm(unique)]
    pub number: String,

    /// At most one of `member_id` / `non_member_id` is set.
    pub member_id: Option<i64>,
    pub non_member_id: Option<i64>,

    pub referred_by: Option<i64>,
    pub in_use: bool,
    pub date_issued: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id",
        fk_name = "fk-cash_boxes-holder"
    )]
    Holder,
    #[sea_orm(
        belongs_to = "super::non_members::Entity",
        from = "Column::NonMemberId",
        to = "super::non_members::Column::Id"
    )]
    NonMemberHolder,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::ReferredBy",
        to = "super::members::Column::Id",
        fk_name = "fk-cash_boxes-referrer"
    )]
    Referrer,
    #[sea_orm(has_many = "super::cash_box_audits::Entity")]
    Audits,
    #[sea_orm(has_many = "super::box_collections::Entity")]
    Collections,
}

impl Related<super::cash_box_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Audits.def()
    }
}

impl Related<super::box_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
