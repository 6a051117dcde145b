use biblos_catalog::{BookWithRating, NewBook, Page, PageRequest, UpdateBook};
use biblos_store::Book;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Pagination query parameters; omitted or zero values fall back to the
/// configured defaults.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest {
            page: query.page,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

/// Admin submission for a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub synopsis: String,
    pub cover_url: String,
}

impl From<CreateBookRequest> for NewBook {
    fn from(req: CreateBookRequest) -> Self {
        NewBook {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            synopsis: req.synopsis,
            cover_url: req.cover_url,
        }
    }
}

/// Partial admin correction; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
}

impl From<UpdateBookRequest> for UpdateBook {
    fn from(req: UpdateBookRequest) -> Self {
        UpdateBook {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            synopsis: req.synopsis,
            cover_url: req.cover_url,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetFeaturedRequest {
    pub featured: bool,
}

/// Public representation of a book with its derived rating summary.
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub synopsis: String,
    pub cover_url: String,
    pub featured: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub featured_at: Option<OffsetDateTime>,
    pub average_rating: f64,
    pub total_reviews: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<BookWithRating> for BookResponse {
    fn from(rated: BookWithRating) -> Self {
        let mut response = Self::from_book(rated.book);
        response.average_rating = rated.average_rating;
        response.total_reviews = rated.total_reviews;
        response
    }
}

impl BookResponse {
    /// A book without an aggregation pass carries the documented zero
    /// default.
    pub fn from_book(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            synopsis: book.synopsis,
            cover_url: book.cover_url,
            featured: book.featured,
            featured_at: book.featured_at,
            average_rating: 0.0,
            total_reviews: 0,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub data: Vec<BookResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl From<Page<BookWithRating>> for PageResponse {
    fn from(page: Page<BookWithRating>) -> Self {
        Self {
            data: page.data.into_iter().map(BookResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}
