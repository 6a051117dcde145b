//! In-process store implementation backed by `tokio::sync::RwLock` maps.
//!
//! Single-record updates take one write lock acquisition and are therefore
//! atomic with respect to concurrent callers; nothing here spans records.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Book, BookFilter, BookPatch, BookSort, RatingRow, Review, ReviewPatch, StoreError,
};

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<HashMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::BookStore for MemoryBookStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let books = self.books.read().await;
        // A live holder always wins over a deleted one, so callers deciding
        // between conflict and resurrection never miss an active record.
        let live = books
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn) && !b.deleted);
        let hit = live.or_else(|| books.values().find(|b| b.isbn.as_deref() == Some(isbn)));
        Ok(hit.cloned())
    }

    async fn find_page(
        &self,
        filter: &BookFilter,
        skip: u64,
        limit: u64,
        sort: BookSort,
    ) -> Result<Vec<Book>, StoreError> {
        let books = self.books.read().await;
        let pattern = compile_text_pattern(filter);
        let mut matches: Vec<Book> = books
            .values()
            .filter(|b| filter_matches(b, filter, pattern.as_ref()))
            .cloned()
            .collect();
        sort_books(&mut matches, sort);
        Ok(matches
            .into_iter()
            .skip(skip as usize)
            .take(limit.min(usize::MAX as u64) as usize)
            .collect())
    }

    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError> {
        let books = self.books.read().await;
        let pattern = compile_text_pattern(filter);
        Ok(books
            .values()
            .filter(|b| filter_matches(b, filter, pattern.as_ref()))
            .count() as u64)
    }

    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_where(
        &self,
        id: Uuid,
        only_active: bool,
        patch: BookPatch,
    ) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        match books.get_mut(&id) {
            Some(book) if !(only_active && book.deleted) => {
                book.apply(patch, OffsetDateTime::now_utc());
                Ok(Some(book.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryReviewStore {
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::ReviewStore for MemoryReviewStore {
    async fn grouped_ratings(&self, book_ids: &[Uuid]) -> Result<Vec<RatingRow>, StoreError> {
        let wanted: HashSet<Uuid> = book_ids.iter().copied().collect();
        let reviews = self.reviews.read().await;

        let mut groups: HashMap<Uuid, (u64, u64)> = HashMap::new();
        for review in reviews.values() {
            if review.verified && !review.deleted && wanted.contains(&review.book_id) {
                let entry = groups.entry(review.book_id).or_insert((0, 0));
                entry.0 += u64::from(review.rating);
                entry.1 += 1;
            }
        }

        Ok(groups
            .into_iter()
            .map(|(book_id, (sum, count))| RatingRow {
                book_id,
                average: sum as f64 / count as f64,
                count,
            })
            .collect())
    }

    async fn find_for_book(
        &self,
        book_id: Uuid,
        only_visible: bool,
    ) -> Result<Vec<Review>, StoreError> {
        let reviews = self.reviews.read().await;
        let mut matches: Vec<Review> = reviews
            .values()
            .filter(|r| r.book_id == book_id)
            .filter(|r| !only_visible || (r.verified && !r.deleted))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn insert(&self, review: Review) -> Result<Review, StoreError> {
        self.reviews.write().await.insert(review.id, review.clone());
        Ok(review)
    }

    async fn update_flags(
        &self,
        id: Uuid,
        patch: ReviewPatch,
    ) -> Result<Option<Review>, StoreError> {
        let mut reviews = self.reviews.write().await;
        match reviews.get_mut(&id) {
            Some(review) => {
                if let Some(verified) = patch.verified {
                    review.verified = verified;
                }
                if let Some(deleted) = patch.deleted {
                    review.deleted = deleted;
                }
                Ok(Some(review.clone()))
            }
            None => Ok(None),
        }
    }
}

/// Compiles the filter's fuzzy pattern the way a database backend would
/// evaluate a regex operator server-side. An uncompilable pattern matches
/// nothing rather than failing the whole query.
fn compile_text_pattern(filter: &BookFilter) -> Option<Regex> {
    let text = filter.text.as_ref()?;
    RegexBuilder::new(&text.pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

fn filter_matches(book: &Book, filter: &BookFilter, pattern: Option<&Regex>) -> bool {
    if !filter.include_deleted && book.deleted {
        return false;
    }
    if let Some(featured) = filter.featured {
        if book.featured != featured {
            return false;
        }
    }
    if let Some(text) = &filter.text {
        let isbn_hit = book.isbn.as_deref() == Some(text.isbn.as_str());
        let fuzzy_hit = pattern
            .map(|re| re.is_match(&book.title) || re.is_match(&book.author))
            .unwrap_or(false);
        if !(isbn_hit || fuzzy_hit) {
            return false;
        }
    }
    true
}

fn sort_books(books: &mut [Book], sort: BookSort) {
    match sort {
        BookSort::CreatedAsc => {
            books.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
        }
        BookSort::CreatedDesc => {
            books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)))
        }
        BookSort::FeaturedAtAsc => {
            books.sort_by(|a, b| a.featured_at.cmp(&b.featured_at).then(a.id.cmp(&b.id)))
        }
        BookSort::FeaturedAtDesc => {
            books.sort_by(|a, b| b.featured_at.cmp(&a.featured_at).then(a.id.cmp(&b.id)))
        }
    }
}
