use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "member_transaction_audits")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub transaction_id: i64,
    pub action: String,
    pub category: String,
    pub amount_fils: i64,
    pub date: String,
    pub snapshot: String,
    pub committed_by: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::member_transactions::Column::Id"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CommittedBy",
        to = "super::accounts::Column::Id"
    )]
    Committer,
}

impl Related<super::member_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
