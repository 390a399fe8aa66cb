//! # Project Board CLI (`board`)
//!
//! The `board` binary manages a SQLite-backed discussion board: accounts,
//! articles with an optional hashtag, and comments. It also serves the
//! board over a JSON HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! board --config ./config/board.toml [--as <user>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `board init` | Create the SQLite database and run schema migrations |
//! | `board account register <id>` | Register an account |
//! | `board post` | Publish an article as the acting user |
//! | `board edit <id>` | Partially update an article |
//! | `board delete <id>` | Delete an article and its comments |
//! | `board list` | Search and page articles |
//! | `board hashtag [tag]` | Browse a hashtag, or list hashtags in use |
//! | `board show <id>` | Print an article with its comments |
//! | `board comment add\|delete` | Manage comments |
//! | `board stats` | Row counts and database size |
//! | `board serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! board init
//! board account register uno --credential '{noop}pw' --nickname Uno
//! board --as uno post --title "Hello" --content "First post" --hashtag '#rust'
//! board list --search-type TITLE --keyword hello
//! board hashtag '#rust' --page 0
//! board serve
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use project_board::search::ListOptions;
use project_board::{
    accounts, comments, config, edit, get, logging, migrate, search, server, stats,
};
use project_board_core::service::{ArticlePatch, NewAccount, NewArticle};

/// Project Board CLI: a hashtag-aware discussion board over SQLite.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/board.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "board",
    about = "Project Board - articles, comments and hashtag search over SQLite",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/board.toml")]
    config: PathBuf,

    /// Act as this user. Defaults to `[audit].default_actor`.
    #[arg(long = "as", global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the user_accounts, articles and
    /// article_comments tables. Safe to run repeatedly.
    Init,

    /// Manage accounts.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Publish a new article authored by the acting user.
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Hashtag, stored as given.
        #[arg(long)]
        hashtag: Option<String>,
    },

    /// Partially update an article.
    ///
    /// Title and content change only when given. The hashtag is always
    /// rewritten: omitting `--hashtag` clears it.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        hashtag: Option<String>,
    },

    /// Delete an article and all of its comments.
    Delete { id: i64 },

    /// Search and page articles.
    ///
    /// Without a keyword every article is listed.
    List {
        /// TITLE, CONTENT, ID, NICKNAME or HASHTAG.
        #[arg(long)]
        search_type: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Browse articles with a hashtag, or list hashtags when none is given.
    Hashtag {
        /// Hashtag, with or without the leading `#`.
        tag: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Print an article with its comments.
    Show { id: i64 },

    /// Manage comments.
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Print row counts and database size.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Args)]
struct PagingArgs {
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: usize,
    /// Page size. Defaults to `[pagination].page_size`.
    #[arg(long)]
    size: Option<usize>,
    /// title, created_at, created_by, user_id, nickname or hashtag.
    #[arg(long)]
    sort: Option<String>,
    /// asc or desc.
    #[arg(long)]
    direction: Option<String>,
}

impl From<PagingArgs> for ListOptions {
    fn from(args: PagingArgs) -> Self {
        Self {
            page: args.page,
            size: args.size,
            sort: args.sort,
            direction: args.direction,
        }
    }
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account.
    Register {
        user_id: String,
        /// Credential hash, stored as given.
        #[arg(long)]
        credential: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    /// Add a comment to an article as the acting user.
    Add { article_id: i64, content: String },
    /// Delete a comment.
    Delete { comment_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    logging::init(Some(&cfg));
    let actor = cfg.actor(cli.actor.as_deref());

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Account { action } => match action {
            AccountAction::Register {
                user_id,
                credential,
                email,
                nickname,
                memo,
            } => {
                let account = NewAccount {
                    user_id,
                    credential_hash: credential,
                    email,
                    nickname,
                    memo,
                };
                accounts::run_register(&cfg, &actor, account).await?;
            }
        },
        Commands::Post {
            title,
            content,
            hashtag,
        } => {
            let post = NewArticle {
                title,
                content,
                hashtag,
            };
            edit::run_post(&cfg, &actor, post).await?;
        }
        Commands::Edit {
            id,
            title,
            content,
            hashtag,
        } => {
            let patch = ArticlePatch {
                title,
                content,
                hashtag,
            };
            edit::run_edit(&cfg, &actor, id, patch).await?;
        }
        Commands::Delete { id } => {
            edit::run_delete(&cfg, &actor, id).await?;
        }
        Commands::List {
            search_type,
            keyword,
            paging,
        } => {
            search::run_list(
                &cfg,
                search_type.as_deref(),
                keyword.as_deref(),
                &paging.into(),
            )
            .await?;
        }
        Commands::Hashtag { tag, paging } => {
            search::run_hashtag(&cfg, tag.as_deref(), &paging.into()).await?;
        }
        Commands::Show { id } => {
            get::run_show(&cfg, id).await?;
        }
        Commands::Comment { action } => match action {
            CommentAction::Add {
                article_id,
                content,
            } => {
                comments::run_comment_add(&cfg, &actor, article_id, &content).await?;
            }
            CommentAction::Delete { comment_id } => {
                comments::run_comment_delete(&cfg, &actor, comment_id).await?;
            }
        },
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
