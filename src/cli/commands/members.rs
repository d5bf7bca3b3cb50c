//! Member inspection command handlers

use crate::config::Config;
use crate::db::Store;
use crate::membership::{IdFormat, next_membership_id};

pub async fn cmd_members_pending(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let pending = store.members().list_pending().await?;

    if pending.is_empty() {
        println!("No pending applications.");
        return Ok(());
    }

    println!("Pending Applications ({} total)", pending.len());
    println!("{:-<70}", "");

    for member in pending {
        println!("• {} [civil ID {}]", member.full_name(), member.civil_id);
        println!(
            "  ID: {} | Zone: {} | Applied: {}",
            member.id,
            member.zone.as_deref().unwrap_or("-"),
            member.created_at
        );
    }

    println!();
    println!("Approve through PUT /api/members/{{id}}/approval");

    Ok(())
}

pub async fn cmd_next_id(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let format = IdFormat::members(&config.membership);

    let next = next_membership_id(&store.conn, &format).await?;

    println!("Next membership ID: {next}");
    Ok(())
}
