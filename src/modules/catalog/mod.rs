pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::routing::{get, patch};
use axum::Router;
use biblos_catalog::CatalogService;
use biblos_kernel::{InitCtx, Module};
use serde_json::json;

/// Catalog module: listings, search, featured rotation, and the admin book
/// plumbing around them.
pub struct CatalogModule {
    service: Arc<CatalogService>,
}

impl CatalogModule {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            featured_capacity = ctx.settings.catalog.featured_capacity,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books).post(routes::create_book))
            .route("/search", get(routes::search_books))
            .route("/featured", get(routes::list_featured))
            .route("/new", get(routes::list_recent))
            .route("/popular", get(routes::list_popular))
            .route(
                "/{id}",
                get(routes::get_book)
                    .patch(routes::update_book)
                    .delete(routes::delete_book),
            )
            .route("/{id}/featured", patch(routes::set_featured))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books with rating summaries",
                        "tags": ["Catalog"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookPage" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book (resurrects a deleted record with the same ISBN)",
                        "tags": ["Catalog"],
                        "responses": {
                            "201": {
                                "description": "Created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "409": {
                                "description": "A live book with this ISBN already exists",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Diacritic-insensitive search over title, author, and ISBN",
                        "tags": ["Catalog"],
                        "parameters": [
                            { "name": "q", "in": "query", "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books; a blank query lists everything",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookPage" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/featured": {
                    "get": {
                        "summary": "Featured books, most recently promoted first",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "Featured books (possibly empty)",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/new": {
                    "get": {
                        "summary": "Newest books",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "Newest books first" }
                        }
                    }
                },
                "/popular": {
                    "get": {
                        "summary": "Books ranked by average rating",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "Ranked books" }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch one book",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "The book with its rating summary" },
                            "404": { "description": "Unknown or deleted book" }
                        }
                    },
                    "patch": {
                        "summary": "Update a book",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "404": { "description": "Unknown or deleted book" }
                        }
                    },
                    "delete": {
                        "summary": "Logically delete a book",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "The deleted book" },
                            "404": { "description": "Unknown or already deleted book" }
                        }
                    }
                },
                "/{id}/featured": {
                    "patch": {
                        "summary": "Toggle a book in or out of the featured set",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "404": { "description": "Unknown or deleted book" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "isbn": { "type": "string", "nullable": true },
                            "synopsis": { "type": "string" },
                            "cover_url": { "type": "string" },
                            "featured": { "type": "boolean" },
                            "featured_at": { "type": "string", "format": "date-time", "nullable": true },
                            "average_rating": { "type": "number" },
                            "total_reviews": { "type": "integer" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "author", "featured"]
                    },
                    "BookPage": {
                        "type": "object",
                        "properties": {
                            "data": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            },
                            "total": { "type": "integer" },
                            "page": { "type": "integer" },
                            "limit": { "type": "integer" },
                            "total_pages": { "type": "integer" }
                        },
                        "required": ["data", "total", "page", "limit", "total_pages"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create a new instance of the catalog module
pub fn create_module(service: Arc<CatalogService>) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(service))
}
