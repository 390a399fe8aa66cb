//! The board aggregate: accounts, articles and the comments they own.
//!
//! Constructors accept domain fields only. Identifiers and audit fields are
//! assigned by the store when an entity is persisted; [`Article::restore`]
//! and friends exist so store implementations can rehydrate rows.
//!
//! Articles and comments compare by persisted id. Two entities that have not
//! been saved yet are never equal to each other, whatever their content.

use std::hash::{Hash, Hasher};

use crate::audit::AuditFields;
use crate::error::{BoardError, BoardResult};

pub const TITLE_MAX_LEN: usize = 255;
pub const CONTENT_MAX_LEN: usize = 10_000;
pub const COMMENT_MAX_LEN: usize = 500;
pub const USER_ID_MAX_LEN: usize = 50;
pub const NICKNAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;

/// Storage identity of an article or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Not saved yet; carries no stable identity.
    Unpersisted,
    /// Surrogate key assigned by the store.
    Persisted(i64),
}

impl Identity {
    pub fn id(&self) -> Option<i64> {
        match self {
            Identity::Unpersisted => None,
            Identity::Persisted(id) => Some(*id),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Identity::Persisted(_))
    }

    /// Persisted-id equality; anything unpersisted never matches.
    fn same_as(&self, other: &Identity) -> bool {
        match (self, other) {
            (Identity::Persisted(a), Identity::Persisted(b)) => a == b,
            _ => false,
        }
    }
}

/// A registered user. Shared by reference between articles and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    user_id: String,
    credential_hash: String,
    email: Option<String>,
    nickname: Option<String>,
    memo: Option<String>,
    audit: Option<AuditFields>,
}

impl Account {
    pub fn new(
        user_id: impl Into<String>,
        credential_hash: impl Into<String>,
        email: Option<String>,
        nickname: Option<String>,
        memo: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            credential_hash: credential_hash.into(),
            email,
            nickname,
            memo,
            audit: None,
        }
    }

    /// Rehydrate a stored account row.
    pub fn restore(
        user_id: String,
        credential_hash: String,
        email: Option<String>,
        nickname: Option<String>,
        memo: Option<String>,
        audit: AuditFields,
    ) -> Self {
        Self {
            user_id,
            credential_hash,
            email,
            nickname,
            memo,
            audit: Some(audit),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn credential_hash(&self) -> &str {
        &self.credential_hash
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn audit(&self) -> Option<&AuditFields> {
        self.audit.as_ref()
    }

    pub fn validate(&self) -> BoardResult<()> {
        require_text("user_id", &self.user_id, USER_ID_MAX_LEN)?;
        require_text("credential_hash", &self.credential_hash, usize::MAX)?;
        optional_text("email", self.email.as_deref(), EMAIL_MAX_LEN)?;
        optional_text("nickname", self.nickname.as_deref(), NICKNAME_MAX_LEN)?;
        Ok(())
    }
}

/// A board post. Owns its comments: they never outlive it.
#[derive(Debug, Clone)]
pub struct Article {
    identity: Identity,
    author: Account,
    title: String,
    content: String,
    hashtag: Option<String>,
    audit: Option<AuditFields>,
}

impl Article {
    pub fn new(
        author: Account,
        title: impl Into<String>,
        content: impl Into<String>,
        hashtag: Option<String>,
    ) -> Self {
        Self {
            identity: Identity::Unpersisted,
            author,
            title: title.into(),
            content: content.into(),
            hashtag,
            audit: None,
        }
    }

    /// Rehydrate a stored article row.
    pub fn restore(
        id: i64,
        author: Account,
        title: String,
        content: String,
        hashtag: Option<String>,
        audit: AuditFields,
    ) -> Self {
        Self {
            identity: Identity::Persisted(id),
            author,
            title,
            content,
            hashtag,
            audit: Some(audit),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn id(&self) -> Option<i64> {
        self.identity.id()
    }

    pub fn author(&self) -> &Account {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn hashtag(&self) -> Option<&str> {
        self.hashtag.as_deref()
    }

    pub fn audit(&self) -> Option<&AuditFields> {
        self.audit.as_ref()
    }

    /// Check title and content. The hashtag is free text.
    pub fn validate(&self) -> BoardResult<()> {
        require_text("title", &self.title, TITLE_MAX_LEN)?;
        require_text("content", &self.content, CONTENT_MAX_LEN)?;
        Ok(())
    }
}

/// A partial article update.
///
/// `title` and `content` are only replaced when `Some`. `hashtag` is always
/// written, so `None` clears it. Stores apply a patch to the current row in
/// one step, so concurrent patches touching different fields both land.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub hashtag: Option<String>,
}

impl ArticlePatch {
    /// Check the fields the patch replaces.
    pub fn validate(&self) -> BoardResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, TITLE_MAX_LEN)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content, CONTENT_MAX_LEN)?;
        }
        Ok(())
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.identity.same_as(&other.identity)
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.id().hash(state);
    }
}

/// A reply attached to exactly one article.
#[derive(Debug, Clone)]
pub struct Comment {
    identity: Identity,
    article_id: i64,
    author: Account,
    content: String,
    audit: Option<AuditFields>,
}

impl Comment {
    /// A new comment on `article`, which must already be persisted.
    pub fn new(article: &Article, author: Account, content: impl Into<String>) -> BoardResult<Self> {
        let article_id = article
            .id()
            .ok_or_else(|| BoardError::invalid("article", "comment target is not persisted"))?;
        Ok(Self {
            identity: Identity::Unpersisted,
            article_id,
            author,
            content: content.into(),
            audit: None,
        })
    }

    /// Rehydrate a stored comment row.
    pub fn restore(
        id: i64,
        article_id: i64,
        author: Account,
        content: String,
        audit: AuditFields,
    ) -> Self {
        Self {
            identity: Identity::Persisted(id),
            article_id,
            author,
            content,
            audit: Some(audit),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn id(&self) -> Option<i64> {
        self.identity.id()
    }

    pub fn article_id(&self) -> i64 {
        self.article_id
    }

    pub fn author(&self) -> &Account {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn audit(&self) -> Option<&AuditFields> {
        self.audit.as_ref()
    }

    pub fn validate(&self) -> BoardResult<()> {
        require_text("comment", &self.content, COMMENT_MAX_LEN)
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.identity.same_as(&other.identity)
    }
}

impl Eq for Comment {}

impl Hash for Comment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.id().hash(state);
    }
}

fn require_text(field: &'static str, value: &str, max_len: usize) -> BoardResult<()> {
    if value.trim().is_empty() {
        return Err(BoardError::invalid(field, "must not be blank"));
    }
    optional_text(field, Some(value), max_len)
}

fn optional_text(field: &'static str, value: Option<&str>, max_len: usize) -> BoardResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(BoardError::invalid(
            field,
            format!("must be at most {} characters", max_len),
        )),
        _ => Ok(()),
    }
}
