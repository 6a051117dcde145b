//! HTTP handlers for the reviews module.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use biblos_catalog::CatalogService;
use biblos_http::error::AppError;
use uuid::Uuid;

use super::models::{CreateReviewRequest, ModerateReviewRequest, ReviewResponse};

/// Submitter address as reported by the reverse proxy; absent when the
/// request reaches the service directly.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
}

pub async fn submit_review(
    State(service): State<Arc<CatalogService>>,
    headers: HeaderMap,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let book_id = request.book_id;
    let submission = request.into_new_review(client_ip(&headers));
    let review = service.submit_review(book_id, submission).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn list_book_reviews(
    State(service): State<Arc<CatalogService>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let reviews = service.list_reviews(book_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

pub async fn moderate_review(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ModerateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = service.moderate_review(id, request.verified).await?;
    Ok(Json(review.into()))
}

pub async fn delete_review(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = service.delete_review(id).await?;
    Ok(Json(review.into()))
}

#[cfg(test)]
mod tests {
    use super::super::create_module;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use biblos_catalog::{CatalogConfig, CatalogService, NewBook};
    use biblos_kernel::Module;
    use biblos_store::memory::{MemoryBookStore, MemoryReviewStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn service_with_book() -> (Arc<CatalogService>, uuid::Uuid) {
        let service = Arc::new(CatalogService::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryReviewStore::new()),
            CatalogConfig::default(),
        ));
        let book = service
            .create(NewBook {
                title: "Rayuela".to_string(),
                author: "Cortázar".to_string(),
                isbn: None,
                synopsis: "novela".to_string(),
                cover_url: "https://covers.example/r.jpg".to_string(),
            })
            .await
            .unwrap();
        (service, book.id)
    }

    #[tokio::test]
    async fn submission_is_created_and_hidden_until_verified() {
        let (service, book_id) = service_with_book().await;
        let router = create_module(service).routes();

        let body = serde_json::json!({
            "book_id": book_id,
            "name": "Ana",
            "email": "ana@example.com",
            "body": "great",
            "rating": 5
        })
        .to_string();

        let created = router
            .clone()
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .header("x-forwarded-for", "203.0.113.9")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(created.into_body(), usize::MAX)
            .await
            .unwrap();
        let review: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(review["verified"], false);
        // Abuse-control fields stay private.
        assert!(review.get("ip_address").is_none());
        assert!(review.get("email").is_none());

        let listed = router
            .oneshot(
                Request::get(format!("/book/{book_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(listed.into_body(), usize::MAX)
            .await
            .unwrap();
        let reviews: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reviews.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_a_422() {
        let (service, book_id) = service_with_book().await;
        let router = create_module(service).routes();

        let body = serde_json::json!({
            "book_id": book_id,
            "name": "Ana",
            "email": "ana@example.com",
            "body": "meh",
            "rating": 6
        })
        .to_string();

        let response = router
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
