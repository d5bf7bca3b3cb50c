use crate::entities::{
    box_collection_audits, box_collections, cash_box_audits, event_attendees, event_tickets,
    member_audits, member_transaction_audits, member_transactions, members, non_member_audits,
};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One ticket number per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_tickets_event_ticket")
                    .table(event_tickets::Entity)
                    .col(event_tickets::Column::EventId)
                    .col(event_tickets::Column::TicketNo)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Attendance is marked once per attendee per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_attendees_event_key")
                    .table(event_attendees::Entity)
                    .col(event_attendees::Column::EventId)
                    .col(event_attendees::Column::AttendeeKey)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_status")
                    .table(members::Entity)
                    .col(members::Column::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_member_transactions_member_date")
                    .table(member_transactions::Entity)
                    .col(member_transactions::Column::MemberId)
                    .col(member_transactions::Column::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_box_collections_box")
                    .table(box_collections::Entity)
                    .col(box_collections::Column::BoxId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Audit trails are read per parent, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_member_audits_parent")
                    .table(member_audits::Entity)
                    .col(member_audits::Column::MemberId)
                    .col(member_audits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_non_member_audits_parent")
                    .table(non_member_audits::Entity)
                    .col(non_member_audits::Column::NonMemberId)
                    .col(non_member_audits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cash_box_audits_parent")
                    .table(cash_box_audits::Entity)
                    .col(cash_box_audits::Column::BoxId)
                    .col(cash_box_audits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_box_collection_audits_parent")
                    .table(box_collection_audits::Entity)
                    .col(box_collection_audits::Column::CollectionId)
                    .col(box_collection_audits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_member_transaction_audits_parent")
                    .table(member_transaction_audits::Entity)
                    .col(member_transaction_audits::Column::TransactionId)
                    .col(member_transaction_audits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_member_transaction_audits_parent",
            "idx_box_collection_audits_parent",
            "idx_cash_box_audits_parent",
            "idx_non_member_audits_parent",
            "idx_member_audits_parent",
            "idx_box_collections_box",
            "idx_member_transactions_member_date",
            "idx_members_status",
            "idx_event_attendees_event_key",
            "idx_event_tickets_event_ticket",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
