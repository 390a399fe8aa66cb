//! Search dispatch: turns a `(search type, keyword)` pair into a [`Predicate`].
//!
//! The builder never fails. A blank or missing keyword means "no filter",
//! whatever the search type, and so does a keyword without a search type.
//! Store backends translate the resulting predicate into their own query
//! language; [`Predicate::matches`] is the reference semantics.
//!
//! | Search type | Field | Match |
//! |-------------|-------|-------|
//! | `TITLE` | title | case-insensitive substring |
//! | `CONTENT` | content | case-insensitive substring |
//! | `ID` | author user id | case-insensitive substring |
//! | `NICKNAME` | author nickname | case-insensitive substring |
//! | `HASHTAG` | hashtag | exact, `#` prefixed |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Article;

pub const HASHTAG_MARKER: char = '#';

/// The dimension a search keyword is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    Title,
    Content,
    #[serde(rename = "ID", alias = "AUTHOR_ID")]
    AuthorId,
    #[serde(rename = "NICKNAME", alias = "AUTHOR_NICKNAME")]
    AuthorNickname,
    Hashtag,
}

impl SearchType {
    pub const ALL: [SearchType; 5] = [
        SearchType::Title,
        SearchType::Content,
        SearchType::AuthorId,
        SearchType::AuthorNickname,
        SearchType::Hashtag,
    ];

    /// Wire name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Title => "TITLE",
            SearchType::Content => "CONTENT",
            SearchType::AuthorId => "ID",
            SearchType::AuthorNickname => "NICKNAME",
            SearchType::Hashtag => "HASHTAG",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SearchType::Title => "title",
            SearchType::Content => "content",
            SearchType::AuthorId => "author id",
            SearchType::AuthorNickname => "author nickname",
            SearchType::Hashtag => "hashtag",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TITLE" => Ok(SearchType::Title),
            "CONTENT" => Ok(SearchType::Content),
            "ID" | "AUTHOR_ID" => Ok(SearchType::AuthorId),
            "NICKNAME" | "AUTHOR_NICKNAME" => Ok(SearchType::AuthorNickname),
            "HASHTAG" => Ok(SearchType::Hashtag),
            other => Err(format!(
                "unknown search type: {}. Use TITLE, CONTENT, ID, NICKNAME or HASHTAG.",
                other
            )),
        }
    }
}

/// Article fields that support substring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Content,
    AuthorId,
    AuthorNickname,
}

impl TextField {
    fn value<'a>(&self, article: &'a Article) -> Option<&'a str> {
        match self {
            TextField::Title => Some(article.title()),
            TextField::Content => Some(article.content()),
            TextField::AuthorId => Some(article.author().user_id()),
            TextField::AuthorNickname => article.author().nickname(),
        }
    }
}

/// A storage-level article filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Match every article.
    Unfiltered,
    /// Case-insensitive substring containment on one field.
    Contains { field: TextField, needle: String },
    /// Exact match on the stored hashtag.
    HashtagEquals(String),
}

impl Predicate {
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Predicate::Unfiltered)
    }

    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Predicate::Unfiltered => true,
            Predicate::Contains { field, needle } => field
                .value(article)
                .map(|v| fold_case(v).contains(&fold_case(needle)))
                .unwrap_or(false),
            Predicate::HashtagEquals(tag) => article.hashtag() == Some(tag.as_str()),
        }
    }
}

/// Build the filter for a search request.
///
/// A keyword without a search type cannot be interpreted and falls back to
/// [`Predicate::Unfiltered`], the same as an empty keyword.
pub fn build_predicate(search_type: Option<SearchType>, keyword: Option<&str>) -> Predicate {
    let keyword = match keyword.map(str::trim) {
        Some(k) if !k.is_empty() => k,
        _ => return Predicate::Unfiltered,
    };

    let Some(search_type) = search_type else {
        return Predicate::Unfiltered;
    };

    let contains = |field| Predicate::Contains {
        field,
        needle: keyword.to_string(),
    };

    match search_type {
        SearchType::Title => contains(TextField::Title),
        SearchType::Content => contains(TextField::Content),
        SearchType::AuthorId => contains(TextField::AuthorId),
        SearchType::AuthorNickname => contains(TextField::AuthorNickname),
        SearchType::Hashtag => Predicate::HashtagEquals(normalize_hashtag(keyword)),
    }
}

/// Case folding used by every case-insensitive match. Stores that index
/// folded text must fold with this function so backends agree.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Prefix `#` unless the tag already starts with it.
pub fn normalize_hashtag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.starts_with(HASHTAG_MARKER) {
        tag.to_string()
    } else {
        format!("{}{}", HASHTAG_MARKER, tag)
    }
}
