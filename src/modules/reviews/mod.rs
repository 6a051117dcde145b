pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::{get, patch, post};
use axum::Router;
use biblos_catalog::CatalogService;
use biblos_kernel::{InitCtx, Module};
use serde_json::json;

/// Reviews module: rate-limited intake lives upstream; this surface stores
/// submissions unverified and exposes moderation.
pub struct ReviewsModule {
    service: Arc<CatalogService>,
}

impl ReviewsModule {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(routes::submit_review))
            .route("/book/{book_id}", get(routes::list_book_reviews))
            .route("/{id}/moderation", patch(routes::moderate_review))
            .route("/{id}", axum::routing::delete(routes::delete_review))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Submit a review (stored unverified)",
                        "tags": ["Reviews"],
                        "responses": {
                            "201": {
                                "description": "Created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Review" }
                                    }
                                }
                            },
                            "404": { "description": "Unknown or deleted book" },
                            "422": { "description": "Rating out of range" }
                        }
                    }
                },
                "/book/{book_id}": {
                    "get": {
                        "summary": "Verified reviews for one book",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": {
                                "description": "Verified, non-deleted reviews",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Review" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}/moderation": {
                    "patch": {
                        "summary": "Flip the verified flag of a review",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "Updated review" },
                            "404": { "description": "Unknown review" }
                        }
                    }
                },
                "/{id}": {
                    "delete": {
                        "summary": "Logically delete a review",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": { "description": "The deleted review" },
                            "404": { "description": "Unknown review" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "book_id": { "type": "string", "format": "uuid" },
                            "name": { "type": "string" },
                            "body": { "type": "string" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "verified": { "type": "boolean" },
                            "created_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "book_id", "name", "rating", "verified"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// Create a new instance of the reviews module
pub fn create_module(service: Arc<CatalogService>) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(service))
}
