use biblos_catalog::NewReview;
use biblos_store::Review;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Visitor review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub rating: u8,
}

impl CreateReviewRequest {
    pub fn into_new_review(self, ip_address: Option<String>) -> NewReview {
        NewReview {
            name: self.name,
            email: self.email,
            body: self.body,
            rating: self.rating,
            ip_address,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModerateReviewRequest {
    pub verified: bool,
}

/// Public representation of a review. The submitter email and IP address
/// are never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub body: String,
    pub rating: u8,
    pub verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id,
            name: review.name,
            body: review.body,
            rating: review.rating,
            verified: review.verified,
            created_at: review.created_at,
        }
    }
}
