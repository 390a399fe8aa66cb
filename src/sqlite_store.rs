//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the schema created by
//! [`migrate`](crate::migrate). Articles and comments are always read joined
//! with their author row so the returned aggregates are fully hydrated.
//!
//! Case-insensitive search runs against `search_*` columns written with
//! [`fold_case`], and the needle is folded the same way before binding.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use project_board_core::audit::{AuditFields, AuditStamp};
use project_board_core::error::BoardError;
use project_board_core::models::{Account, Article, ArticlePatch, Comment};
use project_board_core::pagination::{Direction, Page, PageRequest, SortField};
use project_board_core::search::{fold_case, Predicate, TextField};
use project_board_core::store::{CascadeOutcome, Store};

use crate::config::Config;
use crate::db;

const AUTHOR_COLUMNS: &str = "u.user_id AS u_user_id, u.credential_hash AS u_credential_hash, \
    u.email AS u_email, u.nickname AS u_nickname, u.memo AS u_memo, \
    u.created_at AS u_created_at, u.created_by AS u_created_by, \
    u.modified_at AS u_modified_at, u.modified_by AS u_modified_by";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database named in `config`. The schema must already exist.
    pub async fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp out of range: {}", ms))
}

fn audit_from_row(row: &SqliteRow, prefix: &str) -> Result<AuditFields> {
    let col = |name: &str| format!("{}{}", prefix, name);
    Ok(AuditFields {
        created_at: from_millis(row.try_get(col("created_at").as_str())?)?,
        created_by: row.try_get(col("created_by").as_str())?,
        modified_at: from_millis(row.try_get(col("modified_at").as_str())?)?,
        modified_by: row.try_get(col("modified_by").as_str())?,
    })
}

fn account_from_row(row: &SqliteRow, prefix: &str) -> Result<Account> {
    let col = |name: &str| format!("{}{}", prefix, name);
    Ok(Account::restore(
        row.try_get(col("user_id").as_str())?,
        row.try_get(col("credential_hash").as_str())?,
        row.try_get(col("email").as_str())?,
        row.try_get(col("nickname").as_str())?,
        row.try_get(col("memo").as_str())?,
        audit_from_row(row, prefix)?,
    ))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article::restore(
        row.try_get("id")?,
        account_from_row(row, "u_")?,
        row.try_get("title")?,
        row.try_get("content")?,
        row.try_get("hashtag")?,
        audit_from_row(row, "")?,
    ))
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment::restore(
        row.try_get("id")?,
        row.try_get("article_id")?,
        account_from_row(row, "u_")?,
        row.try_get("content")?,
        audit_from_row(row, "")?,
    ))
}

/// SQL condition for a predicate and the value bound to its placeholder.
fn where_clause(predicate: &Predicate) -> (String, Option<String>) {
    match predicate {
        Predicate::Unfiltered => ("1 = 1".to_string(), None),
        Predicate::Contains { field, needle } => {
            let column = match field {
                TextField::Title => "a.search_title",
                TextField::Content => "a.search_content",
                TextField::AuthorId => "u.search_user_id",
                TextField::AuthorNickname => "u.search_nickname",
            };
            (
                format!("instr({}, ?) > 0", column),
                Some(fold_case(needle)),
            )
        }
        Predicate::HashtagEquals(tag) => ("a.hashtag = ?".to_string(), Some(tag.clone())),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Title => "a.title",
        SortField::CreatedAt => "a.created_at",
        SortField::CreatedBy => "a.created_by",
        SortField::UserId => "a.user_id",
        SortField::Nickname => "u.nickname",
        SortField::Hashtag => "a.hashtag",
    }
}

fn sort_direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_account(&self, account: &Account, stamp: &AuditStamp) -> Result<Account> {
        let audit = AuditFields::created(stamp);
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_accounts (user_id, credential_hash, email, nickname, memo,
                                       search_user_id, search_nickname,
                                       created_at, created_by, modified_at, modified_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.user_id())
        .bind(account.credential_hash())
        .bind(account.email())
        .bind(account.nickname())
        .bind(account.memo())
        .bind(fold_case(account.user_id()))
        .bind(account.nickname().map(fold_case))
        .bind(to_millis(audit.created_at))
        .bind(&audit.created_by)
        .bind(to_millis(audit.modified_at))
        .bind(&audit.modified_by)
        .execute(&self.pool)
        .await;

        if matches!(&inserted, Err(e) if is_unique_violation(e)) {
            return Err(BoardError::conflict("account", account.user_id()).into());
        }
        inserted.with_context(|| format!("failed to insert account {}", account.user_id()))?;

        self.find_account(account.user_id())
            .await?
            .ok_or_else(|| anyhow!("account vanished after insert: {}", account.user_id()))
    }

    async fn find_account(&self, user_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, credential_hash, email, nickname, memo,
                   created_at, created_by, modified_at, modified_by
            FROM user_accounts WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| account_from_row(&r, "")).transpose()
    }

    async fn insert_article(&self, article: &Article, stamp: &AuditStamp) -> Result<Article> {
        let audit = AuditFields::created(stamp);
        let result = sqlx::query(
            r#"
            INSERT INTO articles (user_id, title, content, hashtag,
                                  search_title, search_content,
                                  created_at, created_by, modified_at, modified_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.author().user_id())
        .bind(article.title())
        .bind(article.content())
        .bind(article.hashtag())
        .bind(fold_case(article.title()))
        .bind(fold_case(article.content()))
        .bind(to_millis(audit.created_at))
        .bind(&audit.created_by)
        .bind(to_millis(audit.modified_at))
        .bind(&audit.modified_by)
        .execute(&self.pool)
        .await
        .context("failed to insert article")?;

        let id = result.last_insert_rowid();
        self.find_article(id)
            .await?
            .ok_or_else(|| anyhow!("article vanished after insert: {}", id))
    }

    async fn update_article(
        &self,
        id: i64,
        patch: &ArticlePatch,
        stamp: &AuditStamp,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = COALESCE(?, title),
                search_title = COALESCE(?, search_title),
                content = COALESCE(?, content),
                search_content = COALESCE(?, search_content),
                hashtag = ?,
                modified_at = ?,
                modified_by = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.title.as_deref())
        .bind(patch.title.as_deref().map(fold_case))
        .bind(patch.content.as_deref())
        .bind(patch.content.as_deref().map(fold_case))
        .bind(patch.hashtag.as_deref())
        .bind(to_millis(stamp.at))
        .bind(&stamp.actor)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_article(&self, id: i64) -> Result<Option<Article>> {
        let sql = format!(
            "SELECT a.id, a.title, a.content, a.hashtag, a.created_at, a.created_by, \
             a.modified_at, a.modified_by, {} \
             FROM articles a JOIN user_accounts u ON u.user_id = a.user_id \
             WHERE a.id = ?",
            AUTHOR_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| article_from_row(&r)).transpose()
    }

    async fn search_articles(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<Article>> {
        let (condition, param) = where_clause(predicate);

        let count_sql = format!(
            "SELECT COUNT(*) FROM articles a JOIN user_accounts u ON u.user_id = a.user_id \
             WHERE {}",
            condition
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(p) = param.as_deref() {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let direction = sort_direction(request.sort.direction);
        let sql = format!(
            "SELECT a.id, a.title, a.content, a.hashtag, a.created_at, a.created_by, \
             a.modified_at, a.modified_by, {} \
             FROM articles a JOIN user_accounts u ON u.user_id = a.user_id \
             WHERE {} \
             ORDER BY {} {}, a.id {} \
             LIMIT ? OFFSET ?",
            AUTHOR_COLUMNS,
            condition,
            sort_column(request.sort.field),
            direction,
            direction
        );
        let mut query = sqlx::query(&sql);
        if let Some(p) = param.as_deref() {
            query = query.bind(p);
        }
        let rows = query
            .bind(i64::try_from(request.size).unwrap_or(i64::MAX))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(article_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, request, total.max(0) as u64))
    }

    async fn delete_article(&self, id: i64) -> Result<CascadeOutcome> {
        let mut tx = self.pool.begin().await?;

        let comments = sqlx::query("DELETE FROM article_comments WHERE article_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let article = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CascadeOutcome {
            article_removed: article.rows_affected() > 0,
            comments_removed: comments.rows_affected(),
        })
    }

    async fn count_articles(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn distinct_hashtags(&self) -> Result<Vec<String>> {
        let tags: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT hashtag FROM articles WHERE hashtag IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn insert_comment(&self, comment: &Comment, stamp: &AuditStamp) -> Result<Comment> {
        let audit = AuditFields::created(stamp);
        let result = sqlx::query(
            r#"
            INSERT INTO article_comments (article_id, user_id, content,
                                          created_at, created_by, modified_at, modified_by)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.article_id())
        .bind(comment.author().user_id())
        .bind(comment.content())
        .bind(to_millis(audit.created_at))
        .bind(&audit.created_by)
        .bind(to_millis(audit.modified_at))
        .bind(&audit.modified_by)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert comment on article {}", comment.article_id()))?;

        let id = result.last_insert_rowid();
        let sql = format!(
            "SELECT c.id, c.article_id, c.content, c.created_at, c.created_by, \
             c.modified_at, c.modified_by, {} \
             FROM article_comments c JOIN user_accounts u ON u.user_id = c.user_id \
             WHERE c.id = ?",
            AUTHOR_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        comment_from_row(&row)
    }

    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        let sql = format!(
            "SELECT c.id, c.article_id, c.content, c.created_at, c.created_by, \
             c.modified_at, c.modified_by, {} \
             FROM article_comments c JOIN user_accounts u ON u.user_id = c.user_id \
             WHERE c.article_id = ? \
             ORDER BY c.created_at DESC, c.id DESC",
            AUTHOR_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM article_comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_comments(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM article_comments")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
