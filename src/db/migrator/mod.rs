use sea_orm_migration::prelude::*;

mod m20250301_initial;
mod m20250302_add_admin;
mod m20250305_add_indexes;

pub use m20250302_add_admin::DEFAULT_API_KEY;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_initial::Migration),
            Box::new(m20250302_add_admin::Migration),
            Box::new(m20250305_add_indexes::Migration),
        ]
    }
}
