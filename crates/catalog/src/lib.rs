//! Catalog ranking and discovery engine.
//!
//! The engine is request-scoped: it holds no cache and no background tasks,
//! every read re-queries the stores. It is composed of four pieces:
//!
//! - [`normalize`] — diacritic and case folding for search input
//! - [`rating`] — batched review aggregation with a zero default
//! - [`featured`] — the bounded, time-ordered featured set rotation
//! - [`service`] — list/search/featured/popular queries plus the book and
//!   review plumbing that exercises them

pub mod error;
pub mod featured;
pub mod normalize;
pub mod rating;
pub mod service;

pub use error::CatalogError;
pub use featured::FeaturedRotation;
pub use rating::{RatingAggregator, RatingSummary};
pub use service::{
    BookWithRating, CatalogConfig, CatalogService, NewBook, NewReview, Page, PageRequest,
    UpdateBook,
};
