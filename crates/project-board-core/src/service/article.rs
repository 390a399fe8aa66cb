use tracing::{debug, info, warn};

use crate::audit::Auditor;
use crate::error::{BoardError, BoardResult};
use crate::models::{Article, ArticlePatch};
use crate::pagination::{pagination_bar_with, Page, PageRequest, BAR_LENGTH};
use crate::search::{build_predicate, Predicate, SearchType};
use crate::store::{CascadeOutcome, Store};
use crate::views::{ArticleDetail, ArticleSummary, CommentView};

/// Domain fields of a new article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub hashtag: Option<String>,
}

/// Listing, retrieval and mutation of articles.
pub struct ArticleService<'a, S: Store + ?Sized> {
    store: &'a S,
    auditor: &'a dyn Auditor,
    bar_length: usize,
}

impl<'a, S: Store + ?Sized> ArticleService<'a, S> {
    pub fn new(store: &'a S, auditor: &'a dyn Auditor) -> Self {
        Self {
            store,
            auditor,
            bar_length: BAR_LENGTH,
        }
    }

    pub fn with_bar_length(mut self, bar_length: usize) -> Self {
        self.bar_length = bar_length.max(1);
        self
    }

    /// Search articles. A blank keyword lists everything.
    pub async fn list(
        &self,
        search_type: Option<SearchType>,
        keyword: Option<&str>,
        request: &PageRequest,
    ) -> BoardResult<Page<ArticleSummary>> {
        let predicate = build_predicate(search_type, keyword);
        debug!(?predicate, page = request.page, size = request.size, "listing articles");
        let page = self.store.search_articles(&predicate, request).await?;
        Ok(page.map(|a| ArticleSummary::from(&a)))
    }

    /// Browse one hashtag, matched exactly as stored, so every value from
    /// [`distinct_hashtags`](Self::distinct_hashtags) can be browsed. Unlike
    /// [`list`](Self::list), a blank hashtag matches nothing.
    pub async fn list_by_hashtag(
        &self,
        hashtag: Option<&str>,
        request: &PageRequest,
    ) -> BoardResult<Page<ArticleSummary>> {
        let tag = match hashtag {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => return Ok(Page::empty(request)),
        };
        let page = self
            .store
            .search_articles(&Predicate::HashtagEquals(tag), request)
            .await?;
        Ok(page.map(|a| ArticleSummary::from(&a)))
    }

    /// An article with its comments, newest first.
    pub async fn get(&self, id: i64) -> BoardResult<ArticleDetail> {
        let article = self.find(id).await?;
        let comments = self.store.comments_for_article(id).await?;
        Ok(ArticleDetail {
            article: ArticleSummary::from(&article),
            comments: comments.iter().map(CommentView::from).collect(),
        })
    }

    /// An article without its comments, for editing.
    pub async fn get_article(&self, id: i64) -> BoardResult<ArticleSummary> {
        self.find(id).await.map(|a| ArticleSummary::from(&a))
    }

    pub async fn create(&self, author_id: &str, post: NewArticle) -> BoardResult<ArticleSummary> {
        let author = self
            .store
            .find_account(author_id)
            .await?
            .ok_or_else(|| BoardError::not_found("account", author_id))?;
        let article = Article::new(author, post.title, post.content, post.hashtag);
        article.validate()?;

        let saved = self
            .store
            .insert_article(&article, &self.auditor.stamp())
            .await?;
        info!(article_id = ?saved.id(), author = author_id, "article created");
        Ok(ArticleSummary::from(&saved))
    }

    /// Apply a partial update.
    ///
    /// The patch is validated, then applied by the store in one step. An
    /// unknown id is logged and otherwise ignored, which keeps the update
    /// path idempotent when the article was deleted concurrently.
    pub async fn update(&self, id: i64, patch: ArticlePatch) -> BoardResult<()> {
        patch.validate()?;
        if self
            .store
            .update_article(id, &patch, &self.auditor.stamp())
            .await?
        {
            debug!(article_id = id, "article updated");
        } else {
            warn!(article_id = id, ?patch, "article update failed: article not found");
        }
        Ok(())
    }

    /// Delete an article and its comments. An unknown id is already deleted.
    pub async fn delete(&self, id: i64) -> BoardResult<CascadeOutcome> {
        let outcome = self.store.delete_article(id).await?;
        if outcome.article_removed {
            info!(
                article_id = id,
                comments = outcome.comments_removed,
                "article deleted"
            );
        } else {
            debug!(article_id = id, "delete ignored: article not found");
        }
        Ok(outcome)
    }

    pub async fn count(&self) -> BoardResult<u64> {
        Ok(self.store.count_articles().await?)
    }

    /// Hashtags in use, deduplicated and unordered.
    pub async fn distinct_hashtags(&self) -> BoardResult<Vec<String>> {
        Ok(self.store.distinct_hashtags().await?)
    }

    /// Page indices for the pagination bar of `page`.
    pub fn pagination_bar<T>(&self, page: &Page<T>) -> Vec<usize> {
        pagination_bar_with(page.page, page.total_pages, self.bar_length)
    }

    async fn find(&self, id: i64) -> BoardResult<Article> {
        self.store
            .find_article(id)
            .await?
            .ok_or_else(|| BoardError::not_found("article", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::ActorAuditor;
    use crate::models::{Account, Comment};
    use crate::pagination::{Direction, Sort, SortField};
    use crate::service::test_support::{post, seeded_store};
    use crate::store::memory::InMemoryStore;
    use std::collections::HashSet;

    fn ids(page: &Page<ArticleSummary>) -> Vec<Option<i64>> {
        page.items.iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn test_blank_keyword_matches_unfiltered_listing() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::of_size(20);
        let all = svc.list(None, None, &req).await.unwrap();
        assert_eq!(all.total_elements, 4);

        for st in SearchType::ALL {
            for kw in [None, Some(""), Some("   ")] {
                let page = svc.list(Some(st), kw, &req).await.unwrap();
                assert_eq!(ids(&page), ids(&all), "{} / {:?}", st, kw);
                assert_eq!(page.total_elements, all.total_elements);
            }
        }
    }

    /// Intentional fallback: a keyword without a type lists everything.
    #[tokio::test]
    async fn test_keyword_without_type_lists_everything() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::default();
        let all = svc.list(None, None, &req).await.unwrap();
        let page = svc.list(None, Some("rust"), &req).await.unwrap();
        assert_eq!(ids(&page), ids(&all));
    }

    #[tokio::test]
    async fn test_hashtag_with_and_without_marker() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::default();
        let bare = svc
            .list(Some(SearchType::Hashtag), Some("java"), &req)
            .await
            .unwrap();
        let marked = svc
            .list(Some(SearchType::Hashtag), Some("#java"), &req)
            .await
            .unwrap();
        assert_eq!(bare.total_elements, 2);
        assert_eq!(ids(&bare), ids(&marked));
    }

    #[tokio::test]
    async fn test_title_search_is_case_insensitive() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let page = svc
            .list(Some(SearchType::Title), Some("SPRING"), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Spring Boot intro");
    }

    #[tokio::test]
    async fn test_nickname_search() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let page = svc
            .list(
                Some(SearchType::AuthorNickname),
                Some("uno"),
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.items[0].author.user_id, "uno");
    }

    #[tokio::test]
    async fn test_no_results_is_an_empty_page() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let page = svc
            .list(Some(SearchType::Content), Some("nothing like this"), &PageRequest::default())
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn test_list_respects_sort() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::new(
            0,
            10,
            Sort {
                field: SortField::Title,
                direction: Direction::Asc,
            },
        );
        let page = svc.list(None, None, &req).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|a| a.title.as_str()).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);
    }

    #[tokio::test]
    async fn test_blank_hashtag_browse_is_empty() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::default();
        for tag in [None, Some(""), Some("  ")] {
            let page = svc.list_by_hashtag(tag, &req).await.unwrap();
            assert!(page.is_empty());
            assert_eq!(page.total_elements, 0);
        }
        assert!(svc.count().await.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_hashtag_browse() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let page = svc
            .list_by_hashtag(Some("#java"), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 2);
        assert!(page
            .items
            .iter()
            .all(|a| a.hashtag.as_deref() == Some("#java")));
    }

    #[tokio::test]
    async fn test_every_distinct_hashtag_is_browsable() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        svc.create("uno", post("Rust", "body", Some("rust")))
            .await
            .unwrap();

        let tags = svc.distinct_hashtags().await.unwrap();
        assert!(tags.contains(&"rust".to_string()));
        for tag in tags {
            let page = svc
                .list_by_hashtag(Some(&tag), &PageRequest::default())
                .await
                .unwrap();
            assert!(page.total_elements >= 1, "{} browses to nothing", tag);
            assert!(page.items.iter().all(|a| a.hashtag.as_deref() == Some(tag.as_str())));
        }
    }

    #[tokio::test]
    async fn test_hashtag_browse_matches_as_stored() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let bare = svc
            .list_by_hashtag(Some("java"), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(bare.total_elements, 0);
    }

    #[tokio::test]
    async fn test_get_returns_comments_newest_first() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let detail = svc.get(1).await.unwrap();
        assert_eq!(detail.article.title, "Java basics");
        let texts: Vec<&str> = detail.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let err = svc.get(999).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "article not found: 999");
        assert!(svc.get_article(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_audit() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("uno");
        store
            .insert_account(&Account::new("uno", "pw", None, None, None), &auditor.stamp())
            .await
            .unwrap();
        let svc = ArticleService::new(&store, &auditor);
        let created = svc
            .create("uno", post("title", "content", Some("#rust")))
            .await
            .unwrap();
        assert!(created.id.is_some());
        let audit = created.audit.unwrap();
        assert_eq!(audit.created_by, "uno");
        assert_eq!(audit.modified_by, "uno");
        assert_eq!(svc.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_unknown_author_is_not_found() {
        let store = InMemoryStore::new();
        let auditor = ActorAuditor::new("ghost");
        let svc = ArticleService::new(&store, &auditor);
        let err = svc
            .create("ghost", post("t", "c", None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let err = svc.create("uno", post("   ", "c", None)).await.unwrap_err();
        assert!(matches!(err, BoardError::Invalid { field: "title", .. }));
    }

    #[tokio::test]
    async fn test_update_hashtag_only_keeps_title_and_content() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let before = svc.get_article(1).await.unwrap();
        svc.update(
            1,
            ArticlePatch {
                hashtag: Some("#springboot".into()),
                ..ArticlePatch::default()
            },
        )
        .await
        .unwrap();
        let after = svc.get_article(1).await.unwrap();
        assert_eq!(after.title, before.title);
        assert_eq!(after.content, before.content);
        assert_eq!(after.hashtag.as_deref(), Some("#springboot"));
    }

    #[tokio::test]
    async fn test_update_without_hashtag_clears_it() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        svc.update(
            1,
            ArticlePatch {
                title: Some("new title".into()),
                ..ArticlePatch::default()
            },
        )
        .await
        .unwrap();
        let after = svc.get_article(1).await.unwrap();
        assert_eq!(after.title, "new title");
        assert_eq!(after.content, "Java content");
        assert_eq!(after.hashtag, None);
    }

    #[tokio::test]
    async fn test_update_touches_modified_audit() {
        let (store, _) = seeded_store().await;
        let editor = ActorAuditor::new("editor");
        let svc = ArticleService::new(&store, &editor);
        svc.update(1, ArticlePatch::default()).await.unwrap();
        let audit = svc.get_article(1).await.unwrap().audit.unwrap();
        assert_eq!(audit.created_by, "uno");
        assert_eq!(audit.modified_by, "editor");
    }

    #[tokio::test]
    async fn test_update_missing_id_is_silent_noop() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let req = PageRequest::of_size(50);
        let before = svc.list(None, None, &req).await.unwrap();

        svc.update(
            999,
            ArticlePatch {
                title: Some("x".into()),
                content: Some("y".into()),
                hashtag: None,
            },
        )
        .await
        .unwrap();

        let after = svc.list(None, None, &req).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_accepts_long_hashtag() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let tag = "#".repeat(300);
        svc.update(
            1,
            ArticlePatch {
                hashtag: Some(tag.clone()),
                ..ArticlePatch::default()
            },
        )
        .await
        .unwrap();
        let after = svc.get_article(1).await.unwrap();
        assert_eq!(after.hashtag.as_deref(), Some(tag.as_str()));
        assert_eq!(after.title, "Java basics");
    }

    #[tokio::test]
    async fn test_concurrent_field_updates_both_apply() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let retitle = ArticlePatch {
            title: Some("Java basics, revised".into()),
            hashtag: Some("#java".into()),
            ..ArticlePatch::default()
        };
        let rewrite = ArticlePatch {
            content: Some("Revised content".into()),
            hashtag: Some("#java".into()),
            ..ArticlePatch::default()
        };
        let (a, b) = tokio::join!(svc.update(1, retitle), svc.update(1, rewrite));
        a.unwrap();
        b.unwrap();

        let after = svc.get_article(1).await.unwrap();
        assert_eq!(after.title, "Java basics, revised");
        assert_eq!(after.content, "Revised content");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_content() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let err = svc
            .update(
                1,
                ArticlePatch {
                    content: Some(" ".into()),
                    ..ArticlePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Invalid { field: "content", .. }));
        assert_eq!(svc.get_article(1).await.unwrap().content, "Java content");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_comments() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let articles_before = store.count_articles().await.unwrap();
        let comments_before = store.count_comments().await.unwrap();
        let owned = store.comments_for_article(1).await.unwrap().len() as u64;
        assert_eq!(owned, 3);

        let outcome = svc.delete(1).await.unwrap();
        assert_eq!(outcome.comments_removed, owned);
        assert_eq!(store.count_articles().await.unwrap(), articles_before - 1);
        assert_eq!(store.count_comments().await.unwrap(), comments_before - owned);
        assert!(store.comments_for_article(1).await.unwrap().is_empty());
        assert!(store.find_account("uno").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let before = svc.count().await.unwrap();
        let outcome = svc.delete(999).await.unwrap();
        assert!(!outcome.article_removed);
        assert_eq!(svc.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_distinct_hashtags_no_nulls_no_duplicates() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let tags = svc.distinct_hashtags().await.unwrap();
        let unique: HashSet<&String> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
        let expected: HashSet<String> = ["#java", "#spring"].iter().map(|s| s.to_string()).collect();
        assert_eq!(tags.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[tokio::test]
    async fn test_pagination_bar_uses_configured_length() {
        let (store, auditor) = seeded_store().await;
        let svc = ArticleService::new(&store, &auditor);
        let page = svc.list(None, None, &PageRequest::new(1, 1, Sort::default())).await.unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(svc.pagination_bar(&page), vec![0, 1, 2, 3]);
        let narrow = ArticleService::new(&store, &auditor).with_bar_length(1);
        assert_eq!(narrow.pagination_bar(&page), vec![1]);
    }

    #[tokio::test]
    async fn test_comment_survives_only_with_article() {
        let (store, auditor) = seeded_store().await;
        let article = store.find_article(2).await.unwrap().unwrap();
        let author = store.find_account("dos").await.unwrap().unwrap();
        let comment = Comment::new(&article, author, "hello").unwrap();
        store.insert_comment(&comment, &auditor.stamp()).await.unwrap();

        ArticleService::new(&store, &auditor).delete(2).await.unwrap();
        assert!(store.comments_for_article(2).await.unwrap().is_empty());
    }
}
