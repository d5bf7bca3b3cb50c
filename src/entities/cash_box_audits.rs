use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_box_audits")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub box_id: i64,
    pub action: String,
    pub number: String,
    pub in_use: bool,
    pub snapshot: String,
    pub committed_by: i64,
    pub created_at: String,
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
        from = "Column::CommittedBy",
        to = "super::accounts::Column::Id"
    )]
    Committer,
}

impl Related<super::cash_boxes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashBox.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
