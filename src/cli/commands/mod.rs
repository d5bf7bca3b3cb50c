//! Command handlers for the CLI.

mod admin;
mod members;
mod migrate;

pub use admin::cmd_rotate_key;
pub use members::{cmd_members_pending, cmd_next_id};
pub use migrate::cmd_migrate;
