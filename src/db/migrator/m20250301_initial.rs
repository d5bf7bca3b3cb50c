use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_table_of<E: EntityTrait>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn drop_table_of<E: EntityTrait + 'static>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve
        create_table_of(manager, &schema, Accounts).await?;
        create_table_of(manager, &schema, Members).await?;
        create_table_of(manager, &schema, MemberAudits).await?;
        create_table_of(manager, &schema, ProfileUpdateRequests).await?;
        create_table_of(manager, &schema, PasswordResetTokens).await?;

        create_table_of(manager, &schema, NonMembers).await?;
        create_table_of(manager, &schema, NonMemberAudits).await?;
        create_table_of(manager, &schema, CashBoxes).await?;
        create_table_of(manager, &schema, CashBoxAudits).await?;
        create_table_of(manager, &schema, BoxCollections).await?;
        create_table_of(manager, &schema, BoxCollectionAudits).await?;
        create_table_of(manager, &schema, MemberTransactions).await?;
        create_table_of(manager, &schema, MemberTransactionAudits).await?;

        create_table_of(manager, &schema, Events).await?;
        create_table_of(manager, &schema, EventTickets).await?;
        create_table_of(manager, &schema, EventAttendees).await?;
        create_table_of(manager, &schema, LuckyDraws).await?;
        create_table_of(manager, &schema, RaffleWinners).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table_of(manager, RaffleWinners).await?;
        drop_table_of(manager, LuckyDraws).await?;
        drop_table_of(manager, EventAttendees).await?;
        drop_table_of(manager, EventTickets).await?;
        drop_table_of(manager, Events).await?;
        drop_table_of(manager, MemberTransactionAudits).await?;
        drop_table_of(manager, MemberTransactions).await?;
        drop_table_of(manager, BoxCollectionAudits).await?;
        drop_table_of(manager, BoxCollections).await?;
        drop_table_of(manager, CashBoxAudits).await?;
        drop_table_of(manager, CashBoxes).await?;
        drop_table_of(manager, NonMemberAudits).await?;
        drop_table_of(manager, NonMembers).await?;
        drop_table_of(manager, PasswordResetTokens).await?;
        drop_table_of(manager, ProfileUpdateRequests).await?;
        drop_table_of(manager, MemberAudits).await?;
        drop_table_of(manager, Members).await?;
        drop_table_of(manager, Accounts).await
    }
}
