//! Per-book rating aggregation over the review store.
//!
//! Always recomputed at read time; nothing here is ever cached on the book
//! record, so a (re)moderated review is reflected immediately.

use std::collections::HashMap;
use std::sync::Arc;

use biblos_store::ReviewStore;
use serde::Serialize;
use uuid::Uuid;

use crate::CatalogError;

/// Derived rating statistics for one book. `average_rating` is the mean of
/// verified, non-deleted review ratings rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub book_id: Uuid,
    pub average_rating: f64,
    pub total_reviews: u64,
}

impl RatingSummary {
    /// Documented default for a book with no visible reviews.
    pub fn zero(book_id: Uuid) -> Self {
        Self {
            book_id,
            average_rating: 0.0,
            total_reviews: 0,
        }
    }
}

pub struct RatingAggregator {
    reviews: Arc<dyn ReviewStore>,
}

impl RatingAggregator {
    pub fn new(reviews: Arc<dyn ReviewStore>) -> Self {
        Self { reviews }
    }

    /// Aggregates a batch of books in a single grouped store query. Books
    /// with no verified, non-deleted reviews are absent from the result;
    /// callers substitute [`RatingSummary::zero`].
    pub async fn aggregate(
        &self,
        book_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, CatalogError> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self.reviews.grouped_ratings(book_ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.book_id,
                    RatingSummary {
                        book_id: row.book_id,
                        average_rating: round_to_tenth(row.average),
                        total_reviews: row.count,
                    },
                )
            })
            .collect())
    }

    /// Single-book convenience form with the zero default substituted.
    /// Unknown ids yield the default, never an error.
    pub async fn aggregate_one(&self, book_id: Uuid) -> Result<RatingSummary, CatalogError> {
        let mut summaries = self.aggregate(&[book_id]).await?;
        Ok(summaries
            .remove(&book_id)
            .unwrap_or_else(|| RatingSummary::zero(book_id)))
    }
}

/// Round half away from zero to one decimal place.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
