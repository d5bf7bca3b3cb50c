use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "raffle_winners")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    #[sea_orm(unique)]
    pub draw_id: i64,
    pub attendee_id: i64,
    /// Size of the pool the winner was drawn from
    pub participants: i32,
    pub won_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lucky_draws::Entity",
        from = "Column::DrawId",
        to = "super::lucky_draws::Column::Id"
    )]
    Draw,
    #[sea_orm(
        belongs_to = "super::event_attendees::Entity",
        from = "Column::AttendeeId",
        to = "super::event_attendees::Column::Id"
    )]
    Attendee,
}

impl Related<super::lucky_draws::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Draw.def()
    }
}

impl Related<super::event_attendees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
