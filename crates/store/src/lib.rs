//! Persistence contracts for the Biblos catalog.
//!
//! The engine never talks to a concrete database directly; it consumes the
//! [`BookStore`] and [`ReviewStore`] traits defined here. [`memory`] provides
//! the in-process implementation used by the application and by tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
mod model;

pub use model::{
    Book, BookFilter, BookPatch, BookSort, RatingRow, Review, ReviewPatch, TextMatch,
};

/// Failure surfaced by a store backend. Writes rejected for uniqueness
/// reasons are not reported here; uniqueness policy lives above the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Durable collection of book records keyed by id.
///
/// Records are only ever logically deleted; `find_by_isbn` therefore returns
/// deleted records too, so callers can resurrect them. When both a live and
/// a deleted record hold the ISBN, the live one is returned.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    async fn find_page(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
        sort: BookSort,
    ) -> Result<Vec<Book>, StoreError>;

    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError>;

    async fn insert(&self, book: Book) -> Result<Book, StoreError>;

    /// Conditionally apply `patch` to the book with `id`. With `only_active`
    /// set, a logically deleted record is left untouched and `None` is
    /// returned, mirroring a filtered find-and-update.
    async fn update_where(
        &self,
        id: Uuid,
        only_active: bool,
        patch: BookPatch,
    ) -> Result<Option<Book>, StoreError>;
}

/// Durable collection of review records, each referencing a book id.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// One grouped pass over the requested book ids, considering only
    /// verified, non-deleted reviews. Books without any such review are
    /// absent from the result.
    async fn grouped_ratings(&self, book_ids: &[Uuid]) -> Result<Vec<RatingRow>, StoreError>;

    /// Reviews for one book. With `only_visible` set, restricts to verified,
    /// non-deleted reviews (the public view).
    async fn find_for_book(
        &self,
        book_id: Uuid,
        only_visible: bool,
    ) -> Result<Vec<Review>, StoreError>;

    async fn insert(&self, review: Review) -> Result<Review, StoreError>;

    async fn update_flags(
        &self,
        id: Uuid,
        patch: ReviewPatch,
    ) -> Result<Option<Review>, StoreError>;
}
