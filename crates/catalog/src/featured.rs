//! Bounded featured-set rotation.
//!
//! Toggles are serialized through one in-process mutex so the whole
//! evaluate-capacity-and-rotate sequence runs single-writer; the store only
//! guarantees per-record atomicity, not atomicity across the demote and
//! promote writes. With multiple service instances this lock would have to
//! become a distributed one.

use std::sync::Arc;

use biblos_store::{Book, BookFilter, BookPatch, BookSort, BookStore};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::CatalogError;

pub struct FeaturedRotation {
    books: Arc<dyn BookStore>,
    capacity: u64,
    gate: Mutex<()>,
}

impl FeaturedRotation {
    pub fn new(books: Arc<dyn BookStore>, capacity: u64) -> Self {
        Self {
            books,
            capacity: capacity.max(1),
            gate: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Toggles the featured flag of one book. Idempotent in both
    /// directions: re-featuring a featured book (or un-featuring an
    /// unfeatured one) returns it unchanged, without touching
    /// `featured_at`. Promoting into a full set demotes the oldest
    /// featured book first.
    pub async fn set_featured(&self, id: Uuid, want_featured: bool) -> Result<Book, CatalogError> {
        let _guard = self.gate.lock().await;

        let book = self
            .books
            .find_by_id(id)
            .await?
            .filter(|b| !b.deleted)
            .ok_or(CatalogError::NotFound("book"))?;

        if !want_featured {
            if !book.featured {
                return Ok(book);
            }
            let demoted = self
                .books
                .update_where(id, true, clear_featured())
                .await?
                .ok_or(CatalogError::NotFound("book"))?;
            tracing::info!(book_id = %id, "book removed from featured set");
            return Ok(demoted);
        }

        if book.featured {
            return Ok(book);
        }

        let featured_only = BookFilter {
            featured: Some(true),
            ..Default::default()
        };
        let count = self.books.count(&featured_only).await?;
        if count >= self.capacity {
            let oldest = self
                .books
                .find_page(&featured_only, 0, 1, BookSort::FeaturedAtAsc)
                .await?
                .into_iter()
                .next();
            if let Some(oldest) = oldest {
                if oldest.id == id {
                    // Stale read: the candidate for eviction is the book
                    // being promoted. Treat as already featured.
                    return Ok(book);
                }
                tracing::warn!(
                    evicted = %oldest.id,
                    promoted = %id,
                    capacity = self.capacity,
                    "featured set at capacity, demoting oldest"
                );
                self.books
                    .update_where(oldest.id, false, clear_featured())
                    .await?;
            }
        }

        let promote = BookPatch {
            featured: Some(true),
            featured_at: Some(Some(OffsetDateTime::now_utc())),
            ..Default::default()
        };
        match self.books.update_where(id, true, promote).await {
            Ok(Some(promoted)) => {
                tracing::info!(book_id = %id, "book added to featured set");
                Ok(promoted)
            }
            Ok(None) => Err(CatalogError::NotFound("book")),
            Err(err) => {
                // The demotion above may already be durable; surface enough
                // context for manual reconciliation of an under-filled set.
                tracing::error!(
                    book_id = %id,
                    error = %err,
                    "promotion failed after demotion, featured set may be under capacity"
                );
                Err(err.into())
            }
        }
    }
}

fn clear_featured() -> BookPatch {
    BookPatch {
        featured: Some(false),
        featured_at: Some(None),
        ..Default::default()
    }
}
