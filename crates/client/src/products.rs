//! Catalog reads.

use tracing::instrument;

use greengrocer_core::ProductId;
use greengrocer_core::api::{Product, ProductQuery, SearchResponse};

use crate::GreengrocerClient;
use crate::error::Result;
use crate::request::RequestOptions;

/// Product listing and search.
#[derive(Debug, Clone, Copy)]
pub struct Products<'a> {
    client: &'a GreengrocerClient,
}

impl<'a> Products<'a> {
    pub(crate) const fn new(client: &'a GreengrocerClient) -> Self {
        Self { client }
    }

    /// Products matching `query`, ordered by id.
    ///
    /// # Errors
    ///
    /// Any request failure.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut options = RequestOptions::get();
        if let Some(featured) = query.featured {
            options = options.with_query("featured", featured.to_string());
        }
        if let Some(q) = &query.q {
            options = options.with_query("q", q.clone());
        }
        self.client.request("products", options).await
    }

    /// Featured products.
    ///
    /// # Errors
    ///
    /// Any request failure.
    pub async fn featured(&self) -> Result<Vec<Product>> {
        self.list(&ProductQuery {
            featured: Some(true),
            q: None,
        })
        .await
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// 404 `Product not found`.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.client
            .request(&format!("products/{id}"), RequestOptions::get())
            .await
    }

    /// Search names and descriptions. An empty query finds nothing.
    ///
    /// # Errors
    ///
    /// Any request failure.
    #[instrument(skip(self))]
    pub async fn search(&self, q: &str) -> Result<Vec<Product>> {
        let response: SearchResponse = self
            .client
            .request("search", RequestOptions::get().with_query("q", q))
            .await?;
        Ok(response.products)
    }
}
