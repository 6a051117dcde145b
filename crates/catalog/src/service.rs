//! Search, listing, and the book/review plumbing around the engine.

use std::cmp::Ordering;
use std::sync::Arc;

use biblos_store::{
    Book, BookFilter, BookPatch, BookSort, BookStore, Review, ReviewPatch, ReviewStore, TextMatch,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::normalize::{normalize, to_fuzzy_pattern};
use crate::rating::{RatingAggregator, RatingSummary};
use crate::{CatalogError, FeaturedRotation};

const MAX_TITLE_LEN: usize = 200;
const MAX_AUTHOR_LEN: usize = 150;

/// Tuning knobs consumed from configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub featured_capacity: u64,
    pub default_page: u64,
    pub default_page_size: u64,
    pub recent_limit: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            featured_capacity: 8,
            default_page: 1,
            default_page_size: 10,
            recent_limit: 10,
        }
    }
}

/// Pagination input as received from the transport layer. Omitted or
/// non-positive values fall back to configured defaults; nothing is
/// silently coerced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of rating-enriched books.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// A book joined with its derived rating summary. The summary is computed
/// per request and never written back to the book record.
#[derive(Debug, Clone, Serialize)]
pub struct BookWithRating {
    #[serde(flatten)]
    pub book: Book,
    pub average_rating: f64,
    pub total_reviews: u64,
}

/// Admin submission for a new book. Title, author, and ISBN are folded to
/// lowercase and trimmed on ingest, matching how records are stored.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub synopsis: String,
    pub cover_url: String,
}

/// Admin correction of an existing book; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
}

/// Visitor review submission; stored unverified.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub body: String,
    pub rating: u8,
    pub ip_address: Option<String>,
}

pub struct CatalogService {
    books: Arc<dyn BookStore>,
    reviews: Arc<dyn ReviewStore>,
    aggregator: RatingAggregator,
    rotation: FeaturedRotation,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(
        books: Arc<dyn BookStore>,
        reviews: Arc<dyn ReviewStore>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            aggregator: RatingAggregator::new(reviews.clone()),
            rotation: FeaturedRotation::new(books.clone(), config.featured_capacity),
            books,
            reviews,
            config,
        }
    }

    /// Non-deleted books in stable creation order, rating-enriched.
    pub async fn list(&self, request: PageRequest) -> Result<Page<BookWithRating>, CatalogError> {
        self.page_of(BookFilter::default(), request).await
    }

    /// Diacritic-insensitive search over title/author plus exact normalized
    /// ISBN match. A blank query degrades to a plain listing.
    pub async fn search(
        &self,
        query: &str,
        request: PageRequest,
    ) -> Result<Page<BookWithRating>, CatalogError> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return self.list(request).await;
        }

        let filter = BookFilter {
            text: Some(TextMatch {
                pattern: to_fuzzy_pattern(&normalized),
                isbn: normalized,
            }),
            ..Default::default()
        };
        self.page_of(filter, request).await
    }

    /// The featured set, most recently promoted first. An empty set is a
    /// valid empty list, not an error.
    pub async fn list_featured(&self) -> Result<Vec<BookWithRating>, CatalogError> {
        let filter = BookFilter {
            featured: Some(true),
            ..Default::default()
        };
        let books = self
            .books
            .find_page(&filter, 0, self.rotation.capacity(), BookSort::FeaturedAtDesc)
            .await?;
        self.enrich(books).await
    }

    /// Newest non-deleted books, rating-enriched.
    pub async fn list_recent(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<BookWithRating>, CatalogError> {
        let limit = positive_or(limit, self.config.recent_limit);
        let books = self
            .books
            .find_page(&BookFilter::default(), 0, limit, BookSort::CreatedDesc)
            .await?;
        self.enrich(books).await
    }

    /// All non-deleted books ranked by average rating descending, ties
    /// broken by creation time descending (newest wins), truncated to
    /// `limit`. Zero-review books rank with average 0.
    pub async fn list_popular(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<BookWithRating>, CatalogError> {
        let limit = positive_or(limit, self.config.default_page_size);
        let books = self
            .books
            .find_page(&BookFilter::default(), 0, u64::MAX, BookSort::CreatedDesc)
            .await?;
        let mut ranked = self.enrich(books).await?;
        ranked.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.book.created_at.cmp(&a.book.created_at))
        });
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    /// One non-deleted book with its rating summary.
    pub async fn get(&self, id: Uuid) -> Result<BookWithRating, CatalogError> {
        let book = self
            .books
            .find_by_id(id)
            .await?
            .filter(|b| !b.deleted)
            .ok_or(CatalogError::NotFound("book"))?;
        let summary = self.aggregator.aggregate_one(book.id).await?;
        Ok(join(book, summary))
    }

    /// Creates a book. A live record with the same ISBN conflicts; a
    /// logically deleted one is resurrected in place with its fields
    /// overwritten.
    pub async fn create(&self, submission: NewBook) -> Result<Book, CatalogError> {
        let title = fold_field(&submission.title);
        let author = fold_field(&submission.author);
        let isbn = submission.isbn.as_deref().map(fold_field);
        validate_title(&title)?;
        validate_author(&author)?;

        if let Some(isbn) = &isbn {
            if let Some(existing) = self.books.find_by_isbn(isbn).await? {
                if !existing.deleted {
                    return Err(CatalogError::conflict("book with this ISBN already exists"));
                }
                let patch = BookPatch {
                    title: Some(title),
                    author: Some(author),
                    isbn: Some(Some(isbn.clone())),
                    synopsis: Some(submission.synopsis.trim().to_string()),
                    cover_url: Some(submission.cover_url.trim().to_string()),
                    deleted: Some(false),
                    ..Default::default()
                };
                let revived = self
                    .books
                    .update_where(existing.id, false, patch)
                    .await?
                    .ok_or(CatalogError::NotFound("book"))?;
                tracing::info!(book_id = %revived.id, "resurrected previously deleted book");
                return Ok(revived);
            }
        }

        let now = OffsetDateTime::now_utc();
        let book = Book {
            id: Uuid::new_v4(),
            title,
            author,
            isbn,
            synopsis: submission.synopsis.trim().to_string(),
            cover_url: submission.cover_url.trim().to_string(),
            featured: false,
            featured_at: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        Ok(self.books.insert(book).await?)
    }

    /// Updates a non-deleted book in place.
    pub async fn update(&self, id: Uuid, changes: UpdateBook) -> Result<Book, CatalogError> {
        let title = changes.title.as_deref().map(fold_field);
        let author = changes.author.as_deref().map(fold_field);
        let isbn = changes.isbn.as_deref().map(fold_field);

        if let Some(title) = &title {
            validate_title(title)?;
        }
        if let Some(author) = &author {
            validate_author(author)?;
        }
        if let Some(isbn) = &isbn {
            if let Some(existing) = self.books.find_by_isbn(isbn).await? {
                if existing.id != id && !existing.deleted {
                    return Err(CatalogError::conflict("book with this ISBN already exists"));
                }
            }
        }

        let patch = BookPatch {
            title,
            author,
            isbn: isbn.map(Some),
            synopsis: changes.synopsis.map(|s| s.trim().to_string()),
            cover_url: changes.cover_url.map(|c| c.trim().to_string()),
            ..Default::default()
        };
        self.books
            .update_where(id, true, patch)
            .await?
            .ok_or(CatalogError::NotFound("book"))
    }

    /// Logical delete. The featured flags are cleared so the capacity count
    /// never includes invisible books.
    pub async fn remove(&self, id: Uuid) -> Result<Book, CatalogError> {
        let patch = BookPatch {
            deleted: Some(true),
            featured: Some(false),
            featured_at: Some(None),
            ..Default::default()
        };
        self.books
            .update_where(id, true, patch)
            .await?
            .ok_or(CatalogError::NotFound("book"))
    }

    /// Toggle a book in or out of the featured set (see [`FeaturedRotation`]).
    pub async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Book, CatalogError> {
        self.rotation.set_featured(id, featured).await
    }

    /// Stores a visitor review, unverified. The target book must exist and
    /// be non-deleted; the rating must lie in [1,5].
    pub async fn submit_review(
        &self,
        book_id: Uuid,
        submission: NewReview,
    ) -> Result<Review, CatalogError> {
        if !(1..=5).contains(&submission.rating) {
            return Err(CatalogError::invalid("rating must be between 1 and 5"));
        }
        self.books
            .find_by_id(book_id)
            .await?
            .filter(|b| !b.deleted)
            .ok_or(CatalogError::NotFound("book"))?;

        let review = Review {
            id: Uuid::new_v4(),
            book_id,
            name: fold_field(&submission.name),
            email: fold_field(&submission.email),
            body: submission.body.trim().to_string(),
            rating: submission.rating,
            verified: false,
            deleted: false,
            ip_address: submission.ip_address,
            created_at: OffsetDateTime::now_utc(),
        };
        Ok(self.reviews.insert(review).await?)
    }

    /// Verified, non-deleted reviews for a book's public detail view.
    pub async fn list_reviews(&self, book_id: Uuid) -> Result<Vec<Review>, CatalogError> {
        self.books
            .find_by_id(book_id)
            .await?
            .filter(|b| !b.deleted)
            .ok_or(CatalogError::NotFound("book"))?;
        Ok(self.reviews.find_for_book(book_id, true).await?)
    }

    /// Operator moderation: flips the verified flag.
    pub async fn moderate_review(&self, id: Uuid, verified: bool) -> Result<Review, CatalogError> {
        let patch = ReviewPatch {
            verified: Some(verified),
            ..Default::default()
        };
        self.reviews
            .update_flags(id, patch)
            .await?
            .ok_or(CatalogError::NotFound("review"))
    }

    /// Operator moderation: logical delete of a review.
    pub async fn delete_review(&self, id: Uuid) -> Result<Review, CatalogError> {
        let patch = ReviewPatch {
            deleted: Some(true),
            ..Default::default()
        };
        self.reviews
            .update_flags(id, patch)
            .await?
            .ok_or(CatalogError::NotFound("review"))
    }

    async fn page_of(
        &self,
        filter: BookFilter,
        request: PageRequest,
    ) -> Result<Page<BookWithRating>, CatalogError> {
        let page = positive_or(request.page, self.config.default_page);
        let limit = positive_or(request.limit, self.config.default_page_size);
        let skip = (page - 1).saturating_mul(limit);

        let total = self.books.count(&filter).await?;
        let books = self
            .books
            .find_page(&filter, skip, limit, BookSort::CreatedAsc)
            .await?;
        let data = self.enrich(books).await?;

        Ok(Page {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    /// One aggregate call per page of books, never one per book.
    async fn enrich(&self, books: Vec<Book>) -> Result<Vec<BookWithRating>, CatalogError> {
        let ids: Vec<Uuid> = books.iter().map(|b| b.id).collect();
        let mut summaries = self.aggregator.aggregate(&ids).await?;
        Ok(books
            .into_iter()
            .map(|book| {
                let summary = summaries
                    .remove(&book.id)
                    .unwrap_or_else(|| RatingSummary::zero(book.id));
                join(book, summary)
            })
            .collect())
    }
}

fn join(book: Book, summary: RatingSummary) -> BookWithRating {
    BookWithRating {
        book,
        average_rating: summary.average_rating,
        total_reviews: summary.total_reviews,
    }
}

fn fold_field(value: &str) -> String {
    value.trim().to_lowercase()
}

fn positive_or(value: Option<u64>, default: u64) -> u64 {
    match value {
        Some(v) if v > 0 => v,
        _ => default,
    }
}

fn validate_title(title: &str) -> Result<(), CatalogError> {
    if title.is_empty() {
        return Err(CatalogError::invalid("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CatalogError::invalid("title too long (max 200 chars)"));
    }
    Ok(())
}

fn validate_author(author: &str) -> Result<(), CatalogError> {
    if author.is_empty() {
        return Err(CatalogError::invalid("author is required"));
    }
    if author.chars().count() > MAX_AUTHOR_LEN {
        return Err(CatalogError::invalid("author name too long (max 150 chars)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblos_store::memory::{MemoryBookStore, MemoryReviewStore};

    fn service() -> CatalogService {
        service_with_capacity(8)
    }

    fn service_with_capacity(capacity: u64) -> CatalogService {
        CatalogService::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryReviewStore::new()),
            CatalogConfig {
                featured_capacity: capacity,
                ..Default::default()
            },
        )
    }

    fn submission(title: &str, author: &str, isbn: Option<&str>) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.map(str::to_string),
            synopsis: "a synopsis of reasonable length".to_string(),
            cover_url: "https://covers.example/c.jpg".to_string(),
        }
    }

    fn reader_review(rating: u8) -> NewReview {
        NewReview {
            name: "Ana".to_string(),
            email: "Ana@Example.com".to_string(),
            body: "  enjoyed it  ".to_string(),
            rating,
            ip_address: Some("203.0.113.9".to_string()),
        }
    }

    #[tokio::test]
    async fn pagination_is_deterministic() {
        let svc = service();
        for i in 0..25 {
            svc.create(submission(&format!("book {i:02}"), "author", None))
                .await
                .unwrap();
        }

        let page = svc
            .list(PageRequest {
                page: Some(2),
                limit: Some(10),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 10);
        let titles: Vec<&str> = page.data.iter().map(|b| b.book.title.as_str()).collect();
        assert_eq!(titles.first(), Some(&"book 10"));
        assert_eq!(titles.last(), Some(&"book 19"));
    }

    #[tokio::test]
    async fn non_positive_pagination_falls_back_to_defaults() {
        let svc = service();
        for i in 0..3 {
            svc.create(submission(&format!("b{i}"), "a", None)).await.unwrap();
        }
        let page = svc
            .list(PageRequest {
                page: Some(0),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn search_is_accent_insensitive() {
        let svc = service();
        svc.create(submission("José y el mar", "Álvaro Núñez", None))
            .await
            .unwrap();
        svc.create(submission("Unrelated", "Someone Else", None))
            .await
            .unwrap();

        let plain = svc.search("jose", PageRequest::default()).await.unwrap();
        let accented = svc.search("José", PageRequest::default()).await.unwrap();

        assert_eq!(plain.total, 1);
        assert_eq!(plain.data[0].book.title, "josé y el mar");
        let plain_ids: Vec<Uuid> = plain.data.iter().map(|b| b.book.id).collect();
        let accented_ids: Vec<Uuid> = accented.data.iter().map(|b| b.book.id).collect();
        assert_eq!(plain_ids, accented_ids);
    }

    #[tokio::test]
    async fn search_matches_author_and_isbn_too() {
        let svc = service();
        svc.create(submission("Primero", "Gabriel García", Some("9780307474728")))
            .await
            .unwrap();

        let by_author = svc.search("garcia", PageRequest::default()).await.unwrap();
        assert_eq!(by_author.total, 1);

        let by_isbn = svc
            .search("9780307474728", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(by_isbn.total, 1);
    }

    #[tokio::test]
    async fn blank_search_degrades_to_list() {
        let svc = service();
        svc.create(submission("anything", "anyone", None)).await.unwrap();
        let results = svc.search("   ", PageRequest::default()).await.unwrap();
        assert_eq!(results.total, 1);
    }

    #[tokio::test]
    async fn deleted_books_never_appear_in_listings() {
        let svc = service();
        let kept = svc.create(submission("kept", "a", None)).await.unwrap();
        let gone = svc.create(submission("gone", "a", None)).await.unwrap();
        svc.remove(gone.id).await.unwrap();

        let page = svc.list(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].book.id, kept.id);

        assert!(matches!(
            svc.get(gone.id).await.unwrap_err(),
            CatalogError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn create_conflicts_on_live_isbn_and_resurrects_deleted_one() {
        let svc = service();
        let first = svc
            .create(submission("original", "author", Some("9780307474728")))
            .await
            .unwrap();

        let err = svc
            .create(submission("copycat", "author", Some("9780307474728")))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        svc.remove(first.id).await.unwrap();
        let revived = svc
            .create(submission("Second Edition", "New Author", Some("9780307474728")))
            .await
            .unwrap();

        assert_eq!(revived.id, first.id);
        assert!(!revived.deleted);
        assert_eq!(revived.title, "second edition");
        assert_eq!(svc.list(PageRequest::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn isbn_taken_over_from_a_deleted_record_still_conflicts() {
        let svc = service();
        let first = svc
            .create(submission("first", "x", Some("9780307474728")))
            .await
            .unwrap();
        let second = svc.create(submission("second", "x", None)).await.unwrap();
        svc.remove(first.id).await.unwrap();
        svc.update(
            second.id,
            UpdateBook {
                isbn: Some("9780307474728".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // The deleted record still carries the ISBN, but the live holder
        // must win: no resurrection, no second live book with that ISBN.
        let err = svc
            .create(submission("third", "x", Some("9780307474728")))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        let page = svc.list(PageRequest::default()).await.unwrap();
        let holders: Vec<Uuid> = page
            .data
            .iter()
            .filter(|b| b.book.isbn.as_deref() == Some("9780307474728"))
            .map(|b| b.book.id)
            .collect();
        assert_eq!(holders, vec![second.id]);
    }

    #[tokio::test]
    async fn empty_featured_set_is_a_valid_empty_list() {
        let svc = service();
        svc.create(submission("not featured", "a", None)).await.unwrap();
        assert!(svc.list_featured().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn featured_listing_is_most_recent_first() {
        let svc = service_with_capacity(8);
        let a = svc.create(submission("a", "x", None)).await.unwrap();
        let b = svc.create(submission("b", "x", None)).await.unwrap();
        svc.set_featured(a.id, true).await.unwrap();
        svc.set_featured(b.id, true).await.unwrap();

        let featured: Vec<Uuid> = svc
            .list_featured()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.book.id)
            .collect();
        assert_eq!(featured, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn popular_ranks_by_rating_then_recency() {
        let svc = service();
        let low = svc.create(submission("low", "x", None)).await.unwrap();
        let high = svc.create(submission("high", "x", None)).await.unwrap();
        let unrated = svc.create(submission("unrated", "x", None)).await.unwrap();

        for rating in [5, 5, 4] {
            let r = svc.submit_review(high.id, reader_review(rating)).await.unwrap();
            svc.moderate_review(r.id, true).await.unwrap();
        }
        let r = svc.submit_review(low.id, reader_review(2)).await.unwrap();
        svc.moderate_review(r.id, true).await.unwrap();

        let ranked: Vec<Uuid> = svc
            .list_popular(None)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.book.id)
            .collect();
        assert_eq!(ranked, vec![high.id, low.id, unrated.id]);
    }

    #[tokio::test]
    async fn popular_ties_break_newest_first() {
        let svc = service();
        let older = svc.create(submission("older", "x", None)).await.unwrap();
        let newer = svc.create(submission("newer", "x", None)).await.unwrap();

        let ranked: Vec<Uuid> = svc
            .list_popular(Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.book.id)
            .collect();
        assert_eq!(ranked, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn recent_lists_newest_first_with_limit() {
        let svc = service();
        for i in 0..5 {
            svc.create(submission(&format!("r{i}"), "a", None)).await.unwrap();
        }
        let recent = svc.list_recent(Some(3)).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].book.title, "r4");
    }

    #[tokio::test]
    async fn listing_carries_rating_summaries() {
        let svc = service();
        let book = svc.create(submission("rated", "a", None)).await.unwrap();
        for rating in [5, 4, 3] {
            let r = svc.submit_review(book.id, reader_review(rating)).await.unwrap();
            svc.moderate_review(r.id, true).await.unwrap();
        }

        let page = svc.list(PageRequest::default()).await.unwrap();
        assert_eq!(page.data[0].average_rating, 4.0);
        assert_eq!(page.data[0].total_reviews, 3);

        let detail = svc.get(book.id).await.unwrap();
        assert_eq!(detail.average_rating, 4.0);
    }

    #[tokio::test]
    async fn review_rating_must_be_in_range() {
        let svc = service();
        let book = svc.create(submission("b", "a", None)).await.unwrap();
        let err = svc.submit_review(book.id, reader_review(6)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        let err = svc.submit_review(book.id, reader_review(0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn reviews_become_visible_only_after_moderation() {
        let svc = service();
        let book = svc.create(submission("b", "a", None)).await.unwrap();
        let review = svc.submit_review(book.id, reader_review(4)).await.unwrap();
        assert!(!review.verified);
        assert_eq!(review.name, "ana");
        assert!(svc.list_reviews(book.id).await.unwrap().is_empty());

        svc.moderate_review(review.id, true).await.unwrap();
        assert_eq!(svc.list_reviews(book.id).await.unwrap().len(), 1);

        svc.delete_review(review.id).await.unwrap();
        assert!(svc.list_reviews(book.id).await.unwrap().is_empty());
        let detail = svc.get(book.id).await.unwrap();
        assert_eq!(detail.total_reviews, 0);
    }

    #[tokio::test]
    async fn listing_issues_one_grouped_rating_query_per_page() {
        use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

        struct CountingReviewStore {
            inner: MemoryReviewStore,
            grouped_calls: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl ReviewStore for CountingReviewStore {
            async fn grouped_ratings(
                &self,
                book_ids: &[Uuid],
            ) -> Result<Vec<biblos_store::RatingRow>, biblos_store::StoreError> {
                self.grouped_calls.fetch_add(1, AtomicOrdering::SeqCst);
                self.inner.grouped_ratings(book_ids).await
            }

            async fn find_for_book(
                &self,
                book_id: Uuid,
                only_visible: bool,
            ) -> Result<Vec<Review>, biblos_store::StoreError> {
                self.inner.find_for_book(book_id, only_visible).await
            }

            async fn insert(
                &self,
                review: Review,
            ) -> Result<Review, biblos_store::StoreError> {
                self.inner.insert(review).await
            }

            async fn update_flags(
                &self,
                id: Uuid,
                patch: ReviewPatch,
            ) -> Result<Option<Review>, biblos_store::StoreError> {
                self.inner.update_flags(id, patch).await
            }
        }

        let reviews = Arc::new(CountingReviewStore {
            inner: MemoryReviewStore::new(),
            grouped_calls: AtomicUsize::new(0),
        });
        let svc = CatalogService::new(
            Arc::new(MemoryBookStore::new()),
            reviews.clone(),
            CatalogConfig::default(),
        );
        for i in 0..7 {
            svc.create(submission(&format!("b{i}"), "a", None)).await.unwrap();
        }

        svc.list(PageRequest::default()).await.unwrap();
        assert_eq!(reviews.grouped_calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let svc = service();
        let err = svc.create(submission("   ", "author", None)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn update_folds_fields_and_checks_isbn_conflicts() {
        let svc = service();
        let a = svc.create(submission("a", "x", Some("9780140449136"))).await.unwrap();
        let b = svc.create(submission("b", "x", Some("9780307474728"))).await.unwrap();

        let err = svc
            .update(
                b.id,
                UpdateBook {
                    isbn: Some("9780140449136".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        let updated = svc
            .update(
                a.id,
                UpdateBook {
                    title: Some("  Renamed Title  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed title");
    }
}
