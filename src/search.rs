//! Article listing for `board list` and `board hashtag`.
//!
//! Both commands go through [`ArticleService`], so the CLI shares the
//! predicate and pagination rules with the HTTP surface.

use anyhow::{anyhow, Result};

use project_board_core::audit::ActorAuditor;
use project_board_core::pagination::{Direction, Page, PageRequest, Sort, SortField};
use project_board_core::search::SearchType;
use project_board_core::service::ArticleService;
use project_board_core::views::ArticleSummary;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Paging and sorting flags shared by the listing commands.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: usize,
    pub size: Option<usize>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ListOptions {
    pub fn to_request(&self, config: &Config) -> Result<PageRequest> {
        let mut sort = Sort::default();
        if let Some(field) = &self.sort {
            sort.field = field.parse::<SortField>().map_err(|e| anyhow!(e))?;
        }
        if let Some(direction) = &self.direction {
            sort.direction = direction.parse::<Direction>().map_err(|e| anyhow!(e))?;
        }
        let size = self.size.unwrap_or(config.pagination.page_size);
        Ok(PageRequest::new(self.page, size, sort))
    }
}

pub fn parse_search_type(raw: Option<&str>) -> Result<Option<SearchType>> {
    raw.map(|s| s.parse::<SearchType>().map_err(|e| anyhow!(e)))
        .transpose()
}

pub async fn run_list(
    config: &Config,
    search_type: Option<&str>,
    keyword: Option<&str>,
    options: &ListOptions,
) -> Result<()> {
    let search_type = parse_search_type(search_type)?;
    let request = options.to_request(config)?;

    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(config.actor(None));
    let service = ArticleService::new(&store, &auditor).with_bar_length(config.pagination.bar_length);

    let page = service.list(search_type, keyword, &request).await?;
    let bar = service.pagination_bar(&page);
    store.close().await;

    print_page(&page, &bar);
    Ok(())
}

/// Browse one hashtag, or list the hashtags in use when `tag` is `None`.
pub async fn run_hashtag(config: &Config, tag: Option<&str>, options: &ListOptions) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(config.actor(None));
    let service = ArticleService::new(&store, &auditor).with_bar_length(config.pagination.bar_length);

    let Some(tag) = tag else {
        let mut tags = service.distinct_hashtags().await?;
        store.close().await;
        tags.sort();
        if tags.is_empty() {
            println!("No hashtags.");
        }
        for t in tags {
            println!("{}", t);
        }
        return Ok(());
    };

    let request = options.to_request(config)?;
    let page = service.list_by_hashtag(Some(tag), &request).await?;
    let bar = service.pagination_bar(&page);
    store.close().await;

    print_page(&page, &bar);
    Ok(())
}

fn print_page(page: &Page<ArticleSummary>, bar: &[usize]) {
    if page.is_empty() {
        println!("No articles found.");
        return;
    }

    println!(
        "{:>6}  {:<32} {:<16} {:<16} {}",
        "ID", "TITLE", "HASHTAG", "AUTHOR", "CREATED"
    );
    println!("{}", "-".repeat(90));
    for a in &page.items {
        println!(
            "{:>6}  {:<32} {:<16} {:<16} {}",
            a.id.map(|id| id.to_string()).unwrap_or_default(),
            truncate(&a.title, 32),
            a.hashtag.as_deref().unwrap_or("-"),
            truncate(a.author.display_name(), 16),
            a.audit
                .as_ref()
                .map(|x| x.created_at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        );
    }
    println!();
    println!(
        "page {} of {} ({} articles)",
        page.page + 1,
        page.total_pages,
        page.total_elements
    );
    println!("pages: {}", render_bar(bar, page.page));
}

/// Render the pagination window, bracketing the current page.
pub fn render_bar(bar: &[usize], current: usize) -> String {
    bar.iter()
        .map(|&p| {
            if p == current {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_marks_current() {
        assert_eq!(render_bar(&[0, 1, 2, 3, 4], 2), "0 1 [2] 3 4");
        assert_eq!(render_bar(&[], 0), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long article title", 10), "a long ...");
    }

    #[test]
    fn test_parse_search_type() {
        assert_eq!(parse_search_type(None).unwrap(), None);
        assert_eq!(
            parse_search_type(Some("nickname")).unwrap(),
            Some(SearchType::AuthorNickname)
        );
        assert!(parse_search_type(Some("bogus")).is_err());
    }
}
