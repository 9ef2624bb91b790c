//
//  harbor-client
//  api/options.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! List request shaping.
//!
//! [`ListOptions`] controls the page, page size, sort order and free-text
//! query attached to list endpoints. A subclient keeps its own copy and
//! every call works on a clone of it, so narrowing a lookup (for example
//! filtering by name) never leaks into other calls.
//!
//! The client does not page on its own: a list call returns exactly one
//! page. Callers that need more build a new snapshot with
//! [`ListOptions::with_page`].

use super::transport::Operation;

/// Default number of entries requested per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Immutable request-shaping parameters for list endpoints.
///
/// # Example
///
/// ```rust
/// use harbor_client::api::ListOptions;
///
/// let options = ListOptions::default()
///     .with_page_size(50)
///     .with_sort("-creation_time");
///
/// assert_eq!(options.page_size, 50);
/// assert_eq!(options.sort.as_deref(), Some("-creation_time"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number.
    pub page: i64,

    /// Entries per page.
    pub page_size: i64,

    /// Sort expression, e.g. `name` or `-creation_time`.
    pub sort: Option<String>,

    /// Harbor `q` expression, e.g. `name=~nginx`.
    pub query: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            query: None,
        }
    }
}

impl ListOptions {
    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Snapshot for exact-name lookups: first page, same page size, no
    /// sort and no caller query.
    pub(crate) fn lookup(&self) -> ListOptions {
        ListOptions {
            page_size: self.page_size,
            ..ListOptions::default()
        }
    }

    /// Attaches `page`, `page_size`, `sort` and `q` to a list operation.
    pub(crate) fn apply(&self, operation: Operation) -> Operation {
        operation
            .query("page", self.page)
            .query("page_size", self.page_size)
            .query_opt("sort", self.sort.as_deref())
            .query_opt("q", self.query.as_deref())
    }
}
