//! Article writes for `board post`, `board edit` and `board delete`.

use anyhow::Result;

use project_board_core::audit::ActorAuditor;
use project_board_core::service::{ArticlePatch, ArticleService, NewArticle};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Create an article authored by `actor`.
pub async fn run_post(config: &Config, actor: &str, post: NewArticle) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let created = ArticleService::new(&store, &auditor)
        .create(actor, post)
        .await;
    store.close().await;

    let created = created?;
    println!(
        "Created article {}",
        created.id.map(|id| id.to_string()).unwrap_or_default()
    );
    Ok(())
}

/// Apply a partial update. The hashtag is always rewritten, so omitting it
/// clears the stored one.
pub async fn run_edit(config: &Config, actor: &str, id: i64, patch: ArticlePatch) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let result = ArticleService::new(&store, &auditor).update(id, patch).await;
    store.close().await;

    result?;
    println!("Updated article {}", id);
    Ok(())
}

pub async fn run_delete(config: &Config, actor: &str, id: i64) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(actor);
    let outcome = ArticleService::new(&store, &auditor).delete(id).await;
    store.close().await;

    let outcome = outcome?;
    if outcome.article_removed {
        println!(
            "Deleted article {} ({} comments removed)",
            id, outcome.comments_removed
        );
    } else {
        println!("Article {} not found, nothing deleted", id);
    }
    Ok(())
}
