//! Read models handed to callers (CLI, HTTP).

use serde::Serialize;

use crate::audit::AuditFields;
use crate::models::{Account, Article, Comment};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub user_id: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

impl AccountSummary {
    /// Nickname when set, otherwise the user id.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user_id)
    }
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id().to_string(),
            nickname: account.nickname().map(String::from),
            email: account.email().map(String::from),
        }
    }
}

/// One row of an article listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSummary {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub hashtag: Option<String>,
    pub author: AccountSummary,
    pub audit: Option<AuditFields>,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id(),
            title: article.title().to_string(),
            content: article.content().to_string(),
            hashtag: article.hashtag().map(String::from),
            author: AccountSummary::from(article.author()),
            audit: article.audit().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: Option<i64>,
    pub article_id: i64,
    pub content: String,
    pub author: AccountSummary,
    pub audit: Option<AuditFields>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id(),
            article_id: comment.article_id(),
            content: comment.content().to_string(),
            author: AccountSummary::from(comment.author()),
            audit: comment.audit().cloned(),
        }
    }
}

/// An article with its comments, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: ArticleSummary,
    pub comments: Vec<CommentView>,
}
