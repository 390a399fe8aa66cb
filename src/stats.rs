//! Board statistics for `board stats`.

use anyhow::Result;

use project_board_core::audit::ActorAuditor;
use project_board_core::service::{ArticleService, CommentService};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: count rows and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(config.actor(None));
    let articles = ArticleService::new(&store, &auditor);

    let article_count = articles.count().await?;
    let hashtag_count = articles.distinct_hashtags().await?.len();
    let comment_count = CommentService::new(&store, &auditor).count().await?;
    let account_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_accounts")
        .fetch_one(store.pool())
        .await?;
    store.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Project Board - Database Stats");
    println!("==============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Accounts:    {}", account_count);
    println!("  Articles:    {}", article_count);
    println!("  Comments:    {}", comment_count);
    println!("  Hashtags:    {}", hashtag_count);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
