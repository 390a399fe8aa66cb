//! In-memory [`Store`] implementation for tests and embedding.
//!
//! All tables live behind a single `std::sync::RwLock`, so every operation,
//! including the cascading article delete, is atomic with respect to the
//! others. Filtering uses [`Predicate::matches`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::audit::{AuditFields, AuditStamp};
use crate::error::BoardError;
use crate::models::{Account, Article, ArticlePatch, Comment};
use crate::pagination::{Direction, Page, PageRequest, SortField};
use crate::search::Predicate;

use super::{CascadeOutcome, Store};

struct StoredArticle {
    user_id: String,
    title: String,
    content: String,
    hashtag: Option<String>,
    audit: AuditFields,
}

struct StoredComment {
    article_id: i64,
    user_id: String,
    content: String,
    audit: AuditFields,
}

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    articles: BTreeMap<i64, StoredArticle>,
    comments: BTreeMap<i64, StoredComment>,
    next_article_id: i64,
    next_comment_id: i64,
}

impl Tables {
    fn account(&self, user_id: &str) -> Result<Account> {
        self.accounts
            .get(user_id)
            .cloned()
            .ok_or_else(|| anyhow!("dangling account reference: {}", user_id))
    }

    fn hydrate_article(&self, id: i64, row: &StoredArticle) -> Result<Article> {
        Ok(Article::restore(
            id,
            self.account(&row.user_id)?,
            row.title.clone(),
            row.content.clone(),
            row.hashtag.clone(),
            row.audit.clone(),
        ))
    }

    fn hydrate_comment(&self, id: i64, row: &StoredComment) -> Result<Comment> {
        Ok(Comment::restore(
            id,
            row.article_id,
            self.account(&row.user_id)?,
            row.content.clone(),
            row.audit.clone(),
        ))
    }
}

/// In-memory store for tests.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_article_id: 1,
                next_comment_id: 1,
                ..Tables::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_articles(a: &Article, b: &Article, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title().cmp(b.title()),
        SortField::CreatedAt => a
            .audit()
            .map(|x| x.created_at)
            .cmp(&b.audit().map(|x| x.created_at)),
        SortField::CreatedBy => a
            .audit()
            .map(|x| x.created_by.as_str())
            .cmp(&b.audit().map(|x| x.created_by.as_str())),
        SortField::UserId => a.author().user_id().cmp(b.author().user_id()),
        SortField::Nickname => a.author().nickname().cmp(&b.author().nickname()),
        SortField::Hashtag => a.hashtag().cmp(&b.hashtag()),
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_account(&self, account: &Account, stamp: &AuditStamp) -> Result<Account> {
        let mut tables = self.write()?;
        if tables.accounts.contains_key(account.user_id()) {
            return Err(BoardError::conflict("account", account.user_id()).into());
        }
        let stored = Account::restore(
            account.user_id().to_string(),
            account.credential_hash().to_string(),
            account.email().map(String::from),
            account.nickname().map(String::from),
            account.memo().map(String::from),
            AuditFields::created(stamp),
        );
        tables
            .accounts
            .insert(stored.user_id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_account(&self, user_id: &str) -> Result<Option<Account>> {
        Ok(self.read()?.accounts.get(user_id).cloned())
    }

    async fn insert_article(&self, article: &Article, stamp: &AuditStamp) -> Result<Article> {
        let mut tables = self.write()?;
        let author = tables.account(article.author().user_id())?;
        let id = tables.next_article_id;
        tables.next_article_id += 1;
        let row = StoredArticle {
            user_id: author.user_id().to_string(),
            title: article.title().to_string(),
            content: article.content().to_string(),
            hashtag: article.hashtag().map(String::from),
            audit: AuditFields::created(stamp),
        };
        let persisted = tables.hydrate_article(id, &row)?;
        tables.articles.insert(id, row);
        Ok(persisted)
    }

    async fn update_article(
        &self,
        id: i64,
        patch: &ArticlePatch,
        stamp: &AuditStamp,
    ) -> Result<bool> {
        let mut tables = self.write()?;
        let Some(row) = tables.articles.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(content) = &patch.content {
            row.content = content.clone();
        }
        row.hashtag = patch.hashtag.clone();
        row.audit.touch(stamp);
        Ok(true)
    }

    async fn find_article(&self, id: i64) -> Result<Option<Article>> {
        let tables = self.read()?;
        tables
            .articles
            .get(&id)
            .map(|row| tables.hydrate_article(id, row))
            .transpose()
    }

    async fn search_articles(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<Article>> {
        let tables = self.read()?;
        let mut matched = Vec::new();
        for (id, row) in &tables.articles {
            let article = tables.hydrate_article(*id, row)?;
            if predicate.matches(&article) {
                matched.push(article);
            }
        }

        let sort = request.sort;
        matched.sort_by(|a, b| {
            let ord = compare_articles(a, b, sort.field).then_with(|| a.id().cmp(&b.id()));
            match sort.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();
        Ok(Page::new(items, request, total))
    }

    async fn delete_article(&self, id: i64) -> Result<CascadeOutcome> {
        let mut tables = self.write()?;
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.article_id != id);
        let comments_removed = (before - tables.comments.len()) as u64;
        let article_removed = tables.articles.remove(&id).is_some();
        Ok(CascadeOutcome {
            article_removed,
            comments_removed,
        })
    }

    async fn count_articles(&self) -> Result<u64> {
        Ok(self.read()?.articles.len() as u64)
    }

    async fn distinct_hashtags(&self) -> Result<Vec<String>> {
        let tables = self.read()?;
        let unique: HashSet<&String> = tables
            .articles
            .values()
            .filter_map(|row| row.hashtag.as_ref())
            .collect();
        Ok(unique.into_iter().cloned().collect())
    }

    async fn insert_comment(&self, comment: &Comment, stamp: &AuditStamp) -> Result<Comment> {
        let mut tables = self.write()?;
        if !tables.articles.contains_key(&comment.article_id()) {
            bail!("dangling article reference: {}", comment.article_id());
        }
        let author = tables.account(comment.author().user_id())?;
        let id = tables.next_comment_id;
        tables.next_comment_id += 1;
        let row = StoredComment {
            article_id: comment.article_id(),
            user_id: author.user_id().to_string(),
            content: comment.content().to_string(),
            audit: AuditFields::created(stamp),
        };
        let persisted = tables.hydrate_comment(id, &row)?;
        tables.comments.insert(id, row);
        Ok(persisted)
    }

    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        let tables = self.read()?;
        let mut comments = tables
            .comments
            .iter()
            .filter(|(_, row)| row.article_id == article_id)
            .map(|(id, row)| tables.hydrate_comment(*id, row))
            .collect::<Result<Vec<_>>>()?;
        comments.sort_by(|a, b| {
            let at = |c: &Comment| c.audit().map(|x| x.created_at);
            at(b).cmp(&at(a)).then_with(|| b.id().cmp(&a.id()))
        });
        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        Ok(self.write()?.comments.remove(&id).is_some())
    }

    async fn count_comments(&self) -> Result<u64> {
        Ok(self.read()?.comments.len() as u64)
    }
}
