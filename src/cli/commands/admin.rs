//! Admin maintenance command handlers

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_rotate_key(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let accounts = store.accounts();

    let Some(account) = accounts.get_by_username(username).await? else {
        anyhow::bail!("Account '{username}' not found");
    };

    let api_key = accounts.regenerate_api_key(&account.username).await?;

    println!("✓ API key rotated for {}", account.username);
    println!("  New key: {api_key}");
    Ok(())
}
