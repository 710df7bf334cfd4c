//! Product catalog with an in-memory cache.
//!
//! Listings and single products are cached with `moka` for the configured
//! TTL. Text queries bypass the cache. Any write through [`Catalog`] (admin
//! edits, checkout stock changes) invalidates everything.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, instrument};

use greengrocer_core::ProductId;
use greengrocer_core::api::{Product, ProductInput, ProductInputError, ProductQuery};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;

/// Errors from catalog writes.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Invalid(#[from] ProductInputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Products { featured_only: bool },
}

#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    cache: Cache<CacheKey, CacheValue>,
    search_limit: i64,
}

impl Catalog {
    #[must_use]
    pub fn new(ttl: Duration, search_limit: i64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                cache,
                search_limit,
            }),
        }
    }

    /// Products ordered by id, filtered by `query`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, pool))]
    pub async fn list(
        &self,
        pool: &PgPool,
        query: &ProductQuery,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let featured_only = query.featured.unwrap_or(false);
        let text = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
        let cache_key = CacheKey::Products { featured_only };

        if text.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(
            ProductRepository::new(pool)
                .list(featured_only, text)
                .await?,
        );

        if text.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
                .await;
        }

        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, pool), fields(product_id = %id))]
    pub async fn get(&self, pool: &PgPool, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product = ProductRepository::new(pool).get(id).await?;
        if let Some(product) = &product {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }
        Ok(product)
    }

    /// Search names and descriptions. A blank term matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, pool))]
    pub async fn search(&self, pool: &PgPool, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        ProductRepository::new(pool)
            .search(term, self.inner.search_limit)
            .await
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for bad input.
    #[instrument(skip(self, pool, input), fields(name = %input.name))]
    pub async fn create(&self, pool: &PgPool, input: ProductInput) -> Result<ProductId, CatalogError> {
        let input = input.normalize()?;
        let id = ProductRepository::new(pool).create(&input).await?;
        self.invalidate_all().await;
        tracing::info!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for bad input and
    /// `RepositoryError::NotFound` for an unknown product.
    #[instrument(skip(self, pool, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        pool: &PgPool,
        id: ProductId,
        input: ProductInput,
    ) -> Result<(), CatalogError> {
        let input = input.normalize()?;
        ProductRepository::new(pool).update(id, &input).await?;
        self.invalidate_all().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product.
    #[instrument(skip(self, pool), fields(product_id = %id))]
    pub async fn delete(&self, pool: &PgPool, id: ProductId) -> Result<(), RepositoryError> {
        ProductRepository::new(pool).delete(id).await?;
        self.invalidate_all().await;
        tracing::info!("Product deleted");
        Ok(())
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
