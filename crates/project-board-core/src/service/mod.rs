//! Content services: the operations exposed to callers.
//!
//! Services borrow a [`Store`](crate::store::Store) and an
//! [`Auditor`](crate::audit::Auditor) for the duration of a request and hold
//! no state of their own. Each method maps to one logical store transaction;
//! concurrent writers to the same row are serialized by the store.

mod account;
mod article;
mod comment;
#[cfg(test)]
pub(crate) mod test_support;

pub use crate::models::ArticlePatch;
pub use account::{AccountService, NewAccount};
pub use article::{ArticleService, NewArticle};
pub use comment::CommentService;
