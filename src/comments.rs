//! `board comment add|delete`.

use anyhow::Result;

use project_board_core::audit::ActorAuditor;
use project_board_core::service::CommentService;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_comment_add(
    config: &Config,
    actor: &str,
    article_id: i64,
    content: &str,
) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let created = CommentService::new(&store, &auditor)
        .create(article_id, actor, content)
        .await;
    store.close().await;

    let created = created?;
    println!(
        "Added comment {} to article {}",
        created.id.map(|id| id.to_string()).unwrap_or_default(),
        article_id
    );
    Ok(())
}

pub async fn run_comment_delete(config: &Config, actor: &str, comment_id: i64) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let removed = CommentService::new(&store, &auditor).delete(comment_id).await;
    store.close().await;

    if removed? {
        println!("Deleted comment {}", comment_id);
    } else {
        println!("Comment {} not found, nothing deleted", comment_id);
    }
    Ok(())
}
