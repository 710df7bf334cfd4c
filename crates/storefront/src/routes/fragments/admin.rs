//! Admin product table and product form fragments.
//!
//! Every write answers with the refreshed table, an out-of-band reset of
//! the product form and a notification.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use greengrocer_core::api::{Product, ProductInput, ProductQuery};
use greengrocer_core::ProductId;

use super::{FragmentResult, Notification, with_notification};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Admin table row display data.
#[derive(Debug, Clone)]
pub struct AdminProductRow {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub is_featured: bool,
}

impl From<&Product> for AdminProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            is_featured: product.is_featured,
        }
    }
}

/// Admin product table fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/admin_products.html")]
pub struct AdminTableTemplate {
    pub products: Vec<AdminProductRow>,
    /// Empty the product form out of band after a write.
    pub reset_form: bool,
}

impl AdminTableTemplate {
    fn new(products: &[Product], reset_form: bool) -> Self {
        Self {
            products: products.iter().map(AdminProductRow::from).collect(),
            reset_form,
        }
    }
}

/// Admin product form fragment template, for both create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/admin_product_form.html")]
pub struct ProductFormTemplate {
    pub title: &'static str,
    pub action: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub image_url: String,
    pub is_featured: bool,
}

impl ProductFormTemplate {
    fn blank() -> Self {
        Self {
            title: "Add product",
            action: "/fragments/admin/products".to_string(),
            name: String::new(),
            description: String::new(),
            price: String::new(),
            stock: "0".to_string(),
            image_url: String::new(),
            is_featured: false,
        }
    }

    fn edit(product: &Product) -> Self {
        Self {
            title: "Edit product",
            action: format!("/fragments/admin/products/{}", product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.round_dp(2).to_string(),
            stock: product.stock.to_string(),
            image_url: product.image_url.clone(),
            is_featured: product.is_featured,
        }
    }
}

/// Body of the admin product form. Numbers arrive as text.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub image_url: String,
    /// Checkbox: present (`on`) when ticked.
    #[serde(default)]
    pub is_featured: Option<String>,
}

impl TryFrom<ProductForm> for ProductInput {
    type Error = AppError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let price = form
            .price
            .trim()
            .parse::<Decimal>()
            .map_err(|_| AppError::BadRequest("Price must be a number".to_string()))?;
        let stock = match form.stock.trim() {
            "" => 0,
            s => s
                .parse::<i32>()
                .map_err(|_| AppError::BadRequest("Stock must be a whole number".to_string()))?,
        };
        Ok(Self {
            name: form.name,
            description: form.description,
            price,
            stock,
            image_url: Some(form.image_url),
            is_featured: form.is_featured.is_some(),
        })
    }
}

async fn table(state: &AppState, reset_form: bool) -> FragmentResult<AdminTableTemplate> {
    let products = state
        .catalog()
        .list(state.pool(), &ProductQuery::default())
        .await?;
    Ok(AdminTableTemplate::new(&products, reset_form))
}

/// Render the product table.
#[instrument(skip(state, _admin))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> FragmentResult<AdminTableTemplate> {
    table(&state, false).await
}

/// Render an empty product form.
pub async fn new_product(RequireAdmin(_admin): RequireAdmin) -> ProductFormTemplate {
    ProductFormTemplate::blank()
}

/// Render the form for an existing product.
#[instrument(skip(state, _admin))]
pub async fn edit_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> FragmentResult<ProductFormTemplate> {
    let product = state
        .catalog()
        .get(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(ProductFormTemplate::edit(&product))
}

/// Create a product.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> FragmentResult {
    let input = ProductInput::try_from(form)?;
    let name = input.name.trim().to_string();
    state.catalog().create(state.pool(), input).await?;

    let body = with_notification(
        &table(&state, true).await?,
        &Notification::success(format!("Added {name}")),
    )?;
    Ok(body.into_response())
}

/// Update a product.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> FragmentResult {
    let input = ProductInput::try_from(form)?;
    state.catalog().update(state.pool(), id, input).await?;

    let body = with_notification(
        &table(&state, true).await?,
        &Notification::success("Product updated"),
    )?;
    Ok(body.into_response())
}

/// Delete a product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> FragmentResult {
    state.catalog().delete(state.pool(), id).await?;

    let body = with_notification(
        &table(&state, false).await?,
        &Notification::success("Product deleted"),
    )?;
    Ok(body.into_response())
}
