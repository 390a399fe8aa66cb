//! Page requests, page results and the pagination bar.
//!
//! # Pagination bar
//!
//! The bar is a window of at most `bar_length` page indices:
//!
//! 1. `start = max(current - bar_length / 2, 0)`
//! 2. `end = min(start + bar_length, total_pages)`
//! 3. return `start..end`
//!
//! Near the first page the window is not re-centred; its right edge stays
//! at `bar_length`. Near the last page it simply shrinks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of page links in the bar.
pub const BAR_LENGTH: usize = 5;

/// Default number of articles per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page indices to show around `current_page`, using [`BAR_LENGTH`].
pub fn pagination_bar(current_page: usize, total_pages: usize) -> Vec<usize> {
    pagination_bar_with(current_page, total_pages, BAR_LENGTH)
}

/// Page indices to show around `current_page` for a bar of `bar_length`.
pub fn pagination_bar_with(current_page: usize, total_pages: usize, bar_length: usize) -> Vec<usize> {
    let start = current_page.saturating_sub(bar_length / 2);
    let end = start.saturating_add(bar_length).min(total_pages);
    (start..end).collect()
}

/// Length of the default pagination bar.
pub fn bar_length() -> usize {
    BAR_LENGTH
}

/// Sortable article columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    CreatedAt,
    CreatedBy,
    UserId,
    Nickname,
    Hashtag,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::CreatedBy => "created_by",
            SortField::UserId => "user_id",
            SortField::Nickname => "nickname",
            SortField::Hashtag => "hashtag",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" => Ok(SortField::Title),
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            "created_by" | "createdBy" => Ok(SortField::CreatedBy),
            "user_id" | "userId" | "userAccount.userId" => Ok(SortField::UserId),
            "nickname" | "userAccount.nickname" => Ok(SortField::Nickname),
            "hashtag" => Ok(SortField::Hashtag),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction: {}. Use asc or desc.", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: Direction::Desc,
        }
    }
}

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: Sort,
}

impl PageRequest {
    /// A size of zero is bumped to one.
    pub fn new(page: usize, size: usize, sort: Sort) -> Self {
        Self {
            page,
            size: size.max(1),
            sort,
        }
    }

    pub fn of_size(size: usize) -> Self {
        Self::new(0, size, Sort::default())
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of_size(DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus totals for the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: u64,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.size.max(1);
        let total_pages = usize::try_from(total_elements.div_ceil(size as u64)).unwrap_or(usize::MAX);
        Self {
            items,
            page: request.page,
            size,
            total_elements,
            total_pages,
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
