//! HTTP handlers for the catalog module.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use biblos_catalog::{CatalogService, PageRequest};
use biblos_http::error::AppError;
use uuid::Uuid;

use super::models::{
    BookResponse, CreateBookRequest, LimitQuery, PageQuery, PageResponse, SearchQuery,
    SetFeaturedRequest, UpdateBookRequest,
};

pub async fn list_books(
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let page = service.list(query.into()).await?;
    Ok(Json(page.into()))
}

pub async fn search_books(
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let request = PageRequest {
        page: query.page,
        limit: query.limit,
    };
    let page = service
        .search(query.q.as_deref().unwrap_or(""), request)
        .await?;
    Ok(Json(page.into()))
}

pub async fn list_featured(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let featured = service.list_featured().await?;
    Ok(Json(featured.into_iter().map(BookResponse::from).collect()))
}

pub async fn list_recent(
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let recent = service.list_recent(query.limit).await?;
    Ok(Json(recent.into_iter().map(BookResponse::from).collect()))
}

pub async fn list_popular(
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let ranked = service.list_popular(query.limit).await?;
    Ok(Json(ranked.into_iter().map(BookResponse::from).collect()))
}

pub async fn get_book(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.get(id).await?;
    Ok(Json(book.into()))
}

pub async fn create_book(
    State(service): State<Arc<CatalogService>>,
    Json(request): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book = service.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from_book(book))))
}

pub async fn update_book(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.update(id, request.into()).await?;
    Ok(Json(BookResponse::from_book(book)))
}

pub async fn set_featured(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFeaturedRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.set_featured(id, request.featured).await?;
    Ok(Json(BookResponse::from_book(book)))
}

pub async fn delete_book(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.remove(id).await?;
    Ok(Json(BookResponse::from_book(book)))
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

    fn test_service() -> Arc<CatalogService> {
        Arc::new(CatalogService::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryReviewStore::new()),
            CatalogConfig::default(),
        ))
    }

    #[tokio::test]
    async fn list_endpoint_returns_a_page() {
        let service = test_service();
        service
            .create(NewBook {
                title: "El Aleph".to_string(),
                author: "Borges".to_string(),
                isbn: None,
                synopsis: "short stories".to_string(),
                cover_url: "https://covers.example/aleph.jpg".to_string(),
            })
            .await
            .unwrap();

        let router = create_module(service).routes();
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["title"], "el aleph");
        assert_eq!(page["data"][0]["average_rating"], 0.0);
    }

    #[tokio::test]
    async fn create_endpoint_returns_created_and_conflicts_repeat() {
        let service = test_service();
        let router = create_module(service).routes();

        let body = serde_json::json!({
            "title": "Ficciones",
            "author": "Borges",
            "isbn": "9780307474728",
            "synopsis": "stories",
            "cover_url": "https://covers.example/f.jpg"
        })
        .to_string();

        let request = |body: String| {
            Request::post("/")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let created = router.clone().oneshot(request(body.clone())).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let conflicted = router.oneshot(request(body)).await.unwrap();
        assert_eq!(conflicted.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_book_is_a_404() {
        let router = create_module(test_service()).routes();
        let response = router
            .oneshot(
                Request::get(format!("/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_endpoint_is_accent_insensitive() {
        let service = test_service();
        service
            .create(NewBook {
                title: "José y el mar".to_string(),
                author: "Autor".to_string(),
                isbn: None,
                synopsis: "novela".to_string(),
                cover_url: "https://covers.example/j.jpg".to_string(),
            })
            .await
            .unwrap();

        let router = create_module(service).routes();
        let response = router
            .oneshot(
                Request::get("/search?q=jose")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(page["total"], 1);
    }
}
