//! Pagination utilities for Apify API responses.

use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{ApifyError, Result};
use crate::params;

/// Largest page requested while iterating over dataset items.
pub const ITERATION_PAGE_SIZE: u64 = 1000;

/// A page of results from the Apify API.
///
/// Collection endpoints return this shape inside their `data` envelope; the
/// dataset item endpoint builds it from pagination headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct ListPage<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: u64,
    /// Offset of the first item on this page.
    #[serde(default)]
    pub offset: u64,
    /// Number of items on this page.
    #[serde(default)]
    pub count: u64,
    /// Requested page size. The API reports a huge number when unlimited.
    #[serde(default)]
    pub limit: u64,
    /// Whether items are sorted in descending order.
    #[serde(default)]
    pub desc: bool,
}

impl<T> ListPage<T> {
    /// Whether more items follow this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.count) < self.total
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            count: self.count,
            limit: self.limit,
            desc: self.desc,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for ListPage<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ListPage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Query parameters for listing a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Maximum number of entries to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Number of entries to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Sort newest first.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub desc: Option<bool>,
}

impl ListQuery {
    /// Create list params for a specific window.
    #[must_use]
    pub fn window(offset: u64, limit: u64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            desc: None,
        }
    }
}

/// Query parameters for listing storages (datasets, stores, queues).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageListQuery {
    /// Include storages without a name.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub unnamed: Option<bool>,
    /// Maximum number of entries to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Number of entries to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Sort by modification date, newest first.
    #[serde(
        serialize_with = "params::int_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub desc: Option<bool>,
}

struct Cursor<F> {
    fetch: F,
    offset: u64,
    end: u64,
}

/// Lazily walk an offset-paginated endpoint.
///
/// `fetch(offset, limit)` is called with at most [`ITERATION_PAGE_SIZE`]
/// items per page. The offset advances by the number of items actually
/// returned, and the exclusive end shrinks to the reported total when the
/// server has fewer items than requested. `limit = None` means no bound
/// other than the total.
pub(crate) fn paginate_offsets<T, F, Fut>(
    offset: u64,
    limit: Option<u64>,
    fetch: F,
) -> impl Stream<Item = Result<T>>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<ListPage<T>>>,
{
    let end = limit.map_or(u64::MAX, |l| offset.saturating_add(l));
    let cursor = Cursor { fetch, offset, end };

    stream::try_unfold(cursor, |mut cursor| async move {
        if cursor.offset >= cursor.end {
            return Ok(None);
        }

        let page_limit = ITERATION_PAGE_SIZE.min(cursor.end - cursor.offset);
        let page = (cursor.fetch)(cursor.offset, page_limit).await?;

        tracing::debug!(
            offset = cursor.offset,
            limit = page_limit,
            count = page.count,
            total = page.total,
            "fetched page"
        );

        // An empty page can never advance the cursor.
        if page.count == 0 {
            cursor.end = cursor.offset;
        }
        cursor.offset = cursor.offset.saturating_add(page.count);
        cursor.end = cursor.end.min(page.total);

        Ok::<_, ApifyError>(Some((page.items, cursor)))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, ApifyError>)))
    .try_flatten()
}
