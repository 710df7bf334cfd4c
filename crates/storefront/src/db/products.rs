//! Product catalog queries.

use rust_decimal::Decimal;
use sqlx::PgPool;

use greengrocer_core::ProductId;
use greengrocer_core::api::{Product, ProductInput};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    image_url: String,
    is_featured: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            is_featured: row.is_featured,
        }
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products ordered by id, optionally only featured ones and/or
    /// those whose name or description contains `query`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        featured_only: bool,
        query: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = query.map(like_pattern);
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, image_url, is_featured
            FROM products
            WHERE ($1 = FALSE OR is_featured)
              AND ($2::TEXT IS NULL OR name ILIKE $2 OR description ILIKE $2)
            ORDER BY id
            ",
        )
        .bind(featured_only)
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Case-insensitive substring search on name or description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, image_url, is_featured
            FROM products
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY id
            LIMIT $2
            ",
        )
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, image_url, is_featured
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a product. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (name, description, price, stock, image_url, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image_or_default())
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Replace a product's fields. `input` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5,
                image_url = $6, is_featured = $7
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image_or_default())
        .bind(input.is_featured)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product. Cart lines referencing it go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
