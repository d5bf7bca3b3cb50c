use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One emptying of a cash box, counted per denomination.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "box_collections")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub box_id: i64,
    pub collected_by: i64,
    pub date: String,

    pub note_20: i32,
    pub note_10: i32,
    pub note_5: i32,
    pub note_1: i32,
    pub note_0_5: i32,
    pub note_0_25: i32,
    pub coin_100: i32,
    pub coin_50: i32,
    pub coin_20: i32,
    pub coin_10: i32,
    pub coin_5: i32,

    /// Sum of the counts in fils
    pub total_fils: i64,

    pub remarks: Option<String>,
    pub slip_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_boxes::Entity",
        from = "Column::BoxId",
        to = "super::cash_boxes::Column::Id"
    )]
    CashBox,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CollectedBy",
        to = "super::accounts::Column::Id"
    )]
    Collector,
    #[sea_orm(has_many = "super::box_collection_audits::Entity")]
    Audits,
}

impl Related<super::cash_boxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashBox.def()
    }
}

impl Related<super::box_collection_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Audits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
