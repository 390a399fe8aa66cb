//! Idempotent schema setup for `board init`.
//!
//! Every statement is `IF NOT EXISTS`, so running it against an existing
//! database is a no-op. Timestamps are stored as Unix milliseconds.
//! `search_*` columns hold case-folded copies of searchable text, since
//! SQLite's own `lower()` only folds ASCII.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS user_accounts (
        user_id TEXT PRIMARY KEY,
        credential_hash TEXT NOT NULL,
        email TEXT,
        nickname TEXT,
        memo TEXT,
        search_user_id TEXT NOT NULL,
        search_nickname TEXT,
        created_at INTEGER NOT NULL,
        created_by TEXT NOT NULL,
        modified_at INTEGER NOT NULL,
        modified_by TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        hashtag TEXT,
        search_title TEXT NOT NULL,
        search_content TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        created_by TEXT NOT NULL,
        modified_at INTEGER NOT NULL,
        modified_by TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES user_accounts(user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS article_comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        article_id INTEGER NOT NULL,
        user_id TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        created_by TEXT NOT NULL,
        modified_at INTEGER NOT NULL,
        modified_by TEXT NOT NULL,
        FOREIGN KEY (article_id) REFERENCES articles(id),
        FOREIGN KEY (user_id) REFERENCES user_accounts(user_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title)",
    "CREATE INDEX IF NOT EXISTS idx_articles_hashtag ON articles(hashtag)",
    "CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_articles_created_by ON articles(created_by)",
    "CREATE INDEX IF NOT EXISTS idx_comments_article ON article_comments(article_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_content ON article_comments(content)",
    "CREATE INDEX IF NOT EXISTS idx_comments_created_at ON article_comments(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_created_by ON article_comments(created_by)",
];

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema to an open pool.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("migration failed: {}", statement.trim()))?;
    }
    Ok(())
}
