//! # Project Board Core
//!
//! Storage-agnostic engine for a hashtag-aware discussion board: the
//! article/comment/account aggregate, keyword predicates, pagination,
//! the [`store::Store`] abstraction with an in-memory implementation, and
//! the content services built on top of it.
//!
//! This crate contains no sqlx, tokio runtime, or filesystem I/O. The
//! `project-board` application supplies a SQLite-backed store, the CLI and
//! the HTTP server.

pub mod audit;
pub mod error;
pub mod models;
pub mod pagination;
pub mod search;
pub mod service;
pub mod store;
pub mod views;

pub use error::{BoardError, BoardResult};
