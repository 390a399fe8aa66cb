//! Storage abstraction for Project Board.
//!
//! The [`Store`] trait defines every storage operation the content services
//! need, so backends stay pluggable (SQLite, in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes, and
//! each method is one logical transaction. In particular
//! [`delete_article`](Store::delete_article) must remove the article and all
//! of its comments atomically.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::audit::AuditStamp;
use crate::models::{Account, Article, ArticlePatch, Comment};
use crate::pagination::{Page, PageRequest};
use crate::search::Predicate;

/// What a cascading article delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CascadeOutcome {
    pub article_removed: bool,
    pub comments_removed: u64,
}

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_account`](Store::insert_account) | Persist a new account |
/// | [`find_account`](Store::find_account) | Look up an account by user id |
/// | [`insert_article`](Store::insert_article) | Persist a new article, assigning its id |
/// | [`update_article`](Store::update_article) | Apply a partial update to the current row |
/// | [`find_article`](Store::find_article) | Look up an article by id |
/// | [`search_articles`](Store::search_articles) | Filter, sort and page articles |
/// | [`delete_article`](Store::delete_article) | Delete an article and its comments |
/// | [`count_articles`](Store::count_articles) | Total article count |
/// | [`distinct_hashtags`](Store::distinct_hashtags) | Non-null hashtags, deduplicated |
/// | [`insert_comment`](Store::insert_comment) | Persist a new comment |
/// | [`comments_for_article`](Store::comments_for_article) | Comments of one article, newest first |
/// | [`delete_comment`](Store::delete_comment) | Delete one comment |
/// | [`count_comments`](Store::count_comments) | Total comment count |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert an account stamped with `stamp`.
    ///
    /// A taken user id fails with [`BoardError::Conflict`](crate::BoardError::Conflict)
    /// wrapped in the `anyhow` error, detected by the insert itself.
    async fn insert_account(&self, account: &Account, stamp: &AuditStamp) -> Result<Account>;

    async fn find_account(&self, user_id: &str) -> Result<Option<Account>>;

    /// Insert an article and return it with its assigned id and audit fields.
    async fn insert_article(&self, article: &Article, stamp: &AuditStamp) -> Result<Article>;

    /// Apply `patch` to the stored article in one step and touch its
    /// modification audit fields.
    ///
    /// Returns `false` when no row with that id exists.
    async fn update_article(
        &self,
        id: i64,
        patch: &ArticlePatch,
        stamp: &AuditStamp,
    ) -> Result<bool>;

    async fn find_article(&self, id: i64) -> Result<Option<Article>>;

    async fn search_articles(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<Article>>;

    /// Delete an article and every comment referencing it, atomically.
    async fn delete_article(&self, id: i64) -> Result<CascadeOutcome>;

    async fn count_articles(&self) -> Result<u64>;

    /// All non-null hashtags in use, deduplicated, in no particular order.
    async fn distinct_hashtags(&self) -> Result<Vec<String>>;

    async fn insert_comment(&self, comment: &Comment, stamp: &AuditStamp) -> Result<Comment>;

    /// Comments of one article, newest first.
    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>>;

    /// Returns `false` when no comment with that id exists.
    async fn delete_comment(&self, id: i64) -> Result<bool>;

    async fn count_comments(&self) -> Result<u64>;
}
