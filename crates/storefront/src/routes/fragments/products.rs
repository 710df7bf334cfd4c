//! Product grid fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use tracing::instrument;

use greengrocer_core::api::{Product, ProductQuery};
use greengrocer_core::ProductId;

use super::FragmentResult;
use crate::filters;
use crate::state::AppState;

/// Stars shown under every product; the catalog has no ratings yet.
const STAR_ROW: [&str; 5] = ["filled", "filled", "filled", "filled", "empty"];

/// Stock left before the card warns about it.
const LOW_STOCK: i32 = 10;

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock_note: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            stock_note: stock_note(product.stock),
            in_stock: product.stock > 0,
        }
    }
}

fn stock_note(stock: i32) -> String {
    match stock {
        s if s <= 0 => "Out of stock".to_string(),
        s if s <= LOW_STOCK => format!("Only {s} left"),
        _ => "In stock".to_string(),
    }
}

/// Product grid fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/products.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
    pub stars: [&'static str; 5],
}

impl ProductGridTemplate {
    #[must_use]
    pub fn new(products: &[Product]) -> Self {
        Self {
            products: products.iter().map(ProductCardView::from).collect(),
            stars: STAR_ROW,
        }
    }
}

/// Render the product grid, optionally featured-only or filtered by `q`.
#[instrument(skip(state))]
pub async fn grid(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> FragmentResult<ProductGridTemplate> {
    let products = state.catalog().list(state.pool(), &query).await?;
    Ok(ProductGridTemplate::new(&products))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Apples {id}"),
            description: "Crisp red apples".to_string(),
            price: Decimal::new(299, 2),
            stock,
            image_url: "/static/images/apples.png".to_string(),
            is_featured: true,
        }
    }

    #[test]
    fn test_stock_note() {
        assert_eq!(stock_note(0), "Out of stock");
        assert_eq!(stock_note(4), "Only 4 left");
        assert_eq!(stock_note(75), "In stock");
    }

    #[test]
    fn test_grid_renders_add_to_cart_action() {
        let html = ProductGridTemplate::new(&[product(7, 20)]).render().unwrap();
        assert!(html.contains(r#"data-product-id="7""#));
        assert!(html.contains(r#"hx-post="/fragments/cart/add""#));
        assert!(html.contains("$2.99"));
        assert_eq!(html.matches("star filled").count(), 4);
        assert_eq!(html.matches("star empty").count(), 1);
    }

    #[test]
    fn test_sold_out_product_has_no_add_button() {
        let html = ProductGridTemplate::new(&[product(2, 0)]).render().unwrap();
        assert!(html.contains("Out of stock"));
        assert!(!html.contains("hx-post"));
    }

    #[test]
    fn test_empty_grid() {
        let html = ProductGridTemplate::new(&[]).render().unwrap();
        assert!(html.contains("No products found"));
    }
}
