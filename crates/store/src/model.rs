use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Book record as held by the book store.
///
/// `featured_at` is set iff `featured` is true; `deleted` is a logical
/// delete flag, records are never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub synopsis: String,
    pub cover_url: String,
    pub featured: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub featured_at: Option<OffsetDateTime>,
    pub deleted: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Review record as held by the review store. `ip_address` is captured for
/// abuse control and must never be exposed publicly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub rating: u8,
    pub verified: bool,
    pub deleted: bool,
    pub ip_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Grouped aggregation row: raw (unrounded) mean rating and review count
/// over the verified, non-deleted reviews of one book.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRow {
    pub book_id: Uuid,
    pub average: f64,
    pub count: u64,
}

/// Text search criterion: exact ISBN match or accent-class pattern match
/// against title/author (logical OR).
#[derive(Debug, Clone)]
pub struct TextMatch {
    /// Normalized query, compared verbatim against the stored ISBN.
    pub isbn: String,
    /// Regex pattern whose classes cover accent variants, as in
    /// `jos[eéèëê]`, matched case-insensitively against title and author.
    pub pattern: String,
}

/// Filter for book queries. Deleted records are excluded unless
/// `include_deleted` is set.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub include_deleted: bool,
    pub featured: Option<bool>,
    pub text: Option<TextMatch>,
}

/// Sort orders a book store must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    CreatedAsc,
    CreatedDesc,
    FeaturedAtAsc,
    FeaturedAtDesc,
}

/// Partial update of a book record. `featured_at` is doubly optional so a
/// patch can distinguish "leave as is" from "clear the timestamp".
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<Option<String>>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub featured: Option<bool>,
    pub featured_at: Option<Option<OffsetDateTime>>,
    pub deleted: Option<bool>,
}

/// Moderation-only patch for a review record.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub verified: Option<bool>,
    pub deleted: Option<bool>,
}

impl Book {
    pub fn apply(&mut self, patch: BookPatch, now: OffsetDateTime) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = isbn;
        }
        if let Some(synopsis) = patch.synopsis {
            self.synopsis = synopsis;
        }
        if let Some(cover_url) = patch.cover_url {
            self.cover_url = cover_url;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(featured_at) = patch.featured_at {
            self.featured_at = featured_at;
        }
        if let Some(deleted) = patch.deleted {
            self.deleted = deleted;
        }
        self.updated_at = now;
    }
}
