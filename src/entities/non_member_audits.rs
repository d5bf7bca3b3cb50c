use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "non_member_audits")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub non_member_id: i64,
    pub action: String,
    pub snapshot: String,
    pub committed_by: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::non_members::Entity",
        from = "Column::NonMemberId",
        to = "super::non_members::Column::Id"
    )]
    NonMember,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CommittedBy",
        to = "super::accounts::Column::Id"
    )]
    Committer,
}

impl Related<super::non_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NonMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
