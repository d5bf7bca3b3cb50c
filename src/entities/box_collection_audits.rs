use sea_orm::entity::prelude::*;

/// Counts are copied here because the breakdown at the time of each change is history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "box_collection_audits")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub collection_id: i64,
    pub action: String,
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
    pub total_fils: i64,

    pub snapshot: String,
    pub committed_by: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::box_collections::Entity",
        from = "Column::CollectionId",
        to = "super::box_collections::Column::Id"
    )]
    Collection,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CommittedBy",
        to = "super::accounts::Column::Id"
    )]
    Committer,
}

impl Related<super::box_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
