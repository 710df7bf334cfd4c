//! Product listing, detail and search.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::ProductId;
use greengrocer_core::api::{Product, ProductQuery, SearchResponse};

use super::{ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List products ordered by id.
///
/// GET /api/products?featured=true&q=apple
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list(state.pool(), &query).await?;
    Ok(Json(products.as_ref().clone()))
}

/// A single product.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// 404 `Product not found`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .get(state.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search names and descriptions; an empty query finds nothing.
///
/// GET /api/search?q=milk
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let products = state.catalog().search(state.pool(), &query.q).await?;
    Ok(Json(SearchResponse { products }))
}
