use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Unique per (`event_id`, `attendee_key`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "event_attendees")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Integer")]
    pub id: i64,
    pub event_id: i64,
    /// Membership identifier for members, ticket number otherwise
    pub attendee_key: String,
    pub ticket_no: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub civil_id: Option<String>,
    /// The attendee plus accompanying guests
    pub num_people: i32,
    pub attended_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Event,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
