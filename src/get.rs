//! Article retrieval by id for `board show`.

use anyhow::Result;

use project_board_core::audit::ActorAuditor;
use project_board_core::service::ArticleService;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// CLI entry point: print an article and its comments, newest first.
pub async fn run_show(config: &Config, id: i64) -> Result<()> {
    let store = SqliteStore::connect(config).await?;
    let auditor = ActorAuditor::new(config.actor(None));
    let detail = ArticleService::new(&store, &auditor).get(id).await;
    store.close().await;

    let detail = match detail {
        Ok(d) => d,
        Err(e) if e.is_not_found() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let article = &detail.article;

    println!("--- Article ---");
    println!("id:           {}", id);
    println!("title:        {}", article.title);
    println!("author:       {}", article.author.display_name());
    if let Some(tag) = &article.hashtag {
        println!("hashtag:      {}", tag);
    }
    if let Some(audit) = &article.audit {
        println!("created_at:   {}", audit.created_at.format("%Y-%m-%dT%H:%M:%SZ"));
        println!("modified_at:  {}", audit.modified_at.format("%Y-%m-%dT%H:%M:%SZ"));
        println!("modified_by:  {}", audit.modified_by);
    }
    println!();
    println!("{}", article.content);
    println!();
    println!("--- Comments ({}) ---", detail.comments.len());
    for c in &detail.comments {
        let at = c
            .audit
            .as_ref()
            .map(|x| x.created_at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "[{}] {} ({}): {}",
            c.id.map(|i| i.to_string()).unwrap_or_default(),
            c.author.display_name(),
            at,
            c.content
        );
    }

    Ok(())
}
