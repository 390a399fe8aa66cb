//! # Project Board
//!
//! A hashtag-aware discussion board: accounts publish articles, readers
//! comment on them, and everyone searches and pages through the result.
//!
//! The storage-agnostic engine lives in `project-board-core`. This crate
//! adds everything that touches the outside world.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────────┐   ┌──────────┐
//! │   CLI    │──▶│  project-board-core │──▶│  SQLite   │
//! │ (board)  │   │ services + Store   │   │  (sqlx)   │
//! └──────────┘   └────────────────────┘   └──────────┘
//!                          ▲
//!                   ┌──────┴─────┐
//!                   │ HTTP (axum)│
//!                   └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` |
//! | [`search`] | `board list` and `board hashtag` |
//! | [`get`] | `board show` |
//! | [`edit`] | `board post`, `edit` and `delete` |
//! | [`comments`] | `board comment` |
//! | [`accounts`] | `board account` |
//! | [`stats`] | `board stats` |
//! | [`server`] | JSON HTTP server |
//! | [`logging`] | `tracing` subscriber setup |

pub mod accounts;
pub mod comments;
pub mod config;
pub mod db;
pub mod edit;
pub mod get;
pub mod logging;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod stats;
