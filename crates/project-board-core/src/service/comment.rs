use tracing::{debug, info};

use crate::audit::Auditor;
use crate::error::{BoardError, BoardResult};
use crate::models::Comment;
use crate::store::Store;
use crate::views::CommentView;

/// Comments attached to articles.
pub struct CommentService<'a, S: Store + ?Sized> {
    store: &'a S,
    auditor: &'a dyn Auditor,
}

impl<'a, S: Store + ?Sized> CommentService<'a, S> {
    pub fn new(store: &'a S, auditor: &'a dyn Auditor) -> Self {
        Self { store, auditor }
    }

    /// Comments of one article, newest first. An unknown article has none.
    pub async fn list_for_article(&self, article_id: i64) -> BoardResult<Vec<CommentView>> {
        let comments = self.store.comments_for_article(article_id).await?;
        Ok(comments.iter().map(CommentView::from).collect())
    }

    pub async fn create(
        &self,
        article_id: i64,
        author_id: &str,
        content: &str,
    ) -> BoardResult<CommentView> {
        let article = self
            .store
            .find_article(article_id)
            .await?
            .ok_or_else(|| BoardError::not_found("article", article_id))?;
        let author = self
            .store
            .find_account(author_id)
            .await?
            .ok_or_else(|| BoardError::not_found("account", author_id))?;

        let comment = Comment::new(&article, author, content)?;
        comment.validate()?;
        let saved = self
            .store
            .insert_comment(&comment, &self.auditor.stamp())
            .await?;
        info!(article_id, comment_id = ?saved.id(), "comment created");
        Ok(CommentView::from(&saved))
    }

    /// Delete one comment. Returns whether a row was removed.
    pub async fn delete(&self, comment_id: i64) -> BoardResult<bool> {
        let removed = self.store.delete_comment(comment_id).await?;
        if !removed {
            debug!(comment_id, "delete ignored: comment not found");
        }
        Ok(removed)
    }

    pub async fn count(&self) -> BoardResult<u64> {
        Ok(self.store.count_comments().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::COMMENT_MAX_LEN;
    use crate::service::test_support::seeded_store;

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        let created = svc.create(1, "uno", "fourth").await.unwrap();
        assert!(created.id.is_some());
        assert_eq!(created.article_id, 1);
        assert_eq!(created.author.user_id, "uno");

        let listed = svc.list_for_article(1).await.unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].content, "fourth");
        assert_eq!(svc.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_create_on_missing_article() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        let err = svc.create(999, "uno", "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "article not found: 999");
    }

    #[tokio::test]
    async fn test_create_with_missing_author() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        let err = svc.create(1, "ghost", "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "account not found: ghost");
    }

    #[tokio::test]
    async fn test_create_rejects_long_content() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        let long = "x".repeat(COMMENT_MAX_LEN + 1);
        let err = svc.create(1, "uno", &long).await.unwrap_err();
        assert!(matches!(err, BoardError::Invalid { field: "comment", .. }));
        assert_eq!(svc.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        let id = svc.list_for_article(1).await.unwrap()[0].id.unwrap();
        assert!(svc.delete(id).await.unwrap());
        assert!(!svc.delete(id).await.unwrap());
        assert_eq!(svc.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_article_has_no_comments() {
        let (store, auditor) = seeded_store().await;
        let svc = CommentService::new(&store, &auditor);
        assert!(svc.list_for_article(999).await.unwrap().is_empty());
    }
}
