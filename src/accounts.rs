//! `board account register`.

use anyhow::Result;

use project_board_core::audit::ActorAuditor;
use project_board_core::service::{AccountService, NewAccount};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_register(config: &Config, actor: &str, account: NewAccount) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let saved = AccountService::new(&store, &auditor).register(account).await;
    store.close().await;

    let saved = saved?;
    println!("Registered account {} ({})", saved.user_id, saved.display_name());
    Ok(())
}
