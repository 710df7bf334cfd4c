//! Cart fragments: the cart panel, the count badge, add and remove.
//!
//! Reading the cart works without a session (an anonymous visitor sees an
//! empty panel and a zero badge). Writes require login and answer with the
//! "Please login to add items to cart" notification otherwise.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use greengrocer_core::ProductId;
use greengrocer_core::api::{AddToCartRequest, RemoveFromCartRequest};

use super::{CART_UPDATED, FragmentResult, Notification, trigger, with_notification};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Cart, CartLine};
use crate::services::CartService;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub quantity: i32,
    pub price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            price: line.price,
            line_total: line.line_total().rounded(),
        }
    }
}

/// Cart panel fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "fragments/cart.html")]
pub struct CartPanelTemplate {
    pub logged_in: bool,
    pub lines: Vec<CartLineView>,
    pub total: Decimal,
    pub count: CartCountTemplate,
}

impl CartPanelTemplate {
    #[must_use]
    pub fn new(cart: &Cart) -> Self {
        Self {
            logged_in: true,
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            total: cart.total().rounded(),
            count: CartCountTemplate::out_of_band(cart.item_count()),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            logged_in: false,
            lines: Vec::new(),
            total: Decimal::ZERO,
            count: CartCountTemplate::out_of_band(0),
        }
    }
}

/// Cart count badge fragment template.
#[derive(Debug, Clone, Copy, Template, WebTemplate)]
#[template(path = "fragments/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
    /// Swap into `#cart-count` out of band, alongside another fragment.
    pub oob: bool,
}

impl CartCountTemplate {
    #[must_use]
    pub const fn new(count: i64) -> Self {
        Self { count, oob: false }
    }

    #[must_use]
    pub const fn out_of_band(count: i64) -> Self {
        Self { count, oob: true }
    }
}

/// Render the cart panel.
#[instrument(skip(state, user))]
pub async fn panel(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> FragmentResult<CartPanelTemplate> {
    let Some(user) = user else {
        return Ok(CartPanelTemplate::anonymous());
    };
    let cart = CartService::new(state.pool()).get(user.id).await?;
    Ok(CartPanelTemplate::new(&cart))
}

/// Render the cart count badge.
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> FragmentResult<CartCountTemplate> {
    let count = match user {
        Some(user) => CartService::new(state.pool()).count(user.id).await?,
        None => 0,
    };
    Ok(CartCountTemplate::new(count))
}

/// Add a product, answering with the new count badge.
///
/// Fires `cart-updated` so the cart panel reloads itself.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartRequest>,
) -> FragmentResult {
    let cart = CartService::new(state.pool());
    cart.add(user.id, form.product_id, form.quantity).await?;
    let count = cart.count(user.id).await?;

    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &product_id)]));

    let body = with_notification(
        &CartCountTemplate::new(count),
        &Notification::success("Product added to cart!"),
    )?;
    Ok((trigger(CART_UPDATED), body).into_response())
}

/// Remove a product, answering with the refreshed cart panel.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartRequest>,
) -> FragmentResult<Response> {
    let service = CartService::new(state.pool());
    service.remove(user.id, form.product_id).await?;
    let cart = service.get(user.id).await?;

    let body = with_notification(
        &CartPanelTemplate::new(&cart),
        &Notification::success("Product removed from cart"),
    )?;
    Ok(body.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: i32, cents: i64, quantity: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Decimal::new(cents, 2),
            quantity,
            image_url: "/static/images/default.png".to_string(),
            stock: 100,
        }
    }

    #[test]
    fn test_panel_lists_lines_and_total() {
        let cart = Cart::new(vec![line(1, 299, 2), line(4, 150, 1)]);
        let html = CartPanelTemplate::new(&cart).render().unwrap();
        assert!(html.contains("Item 1"));
        assert!(html.contains("qty: 2"));
        assert!(html.contains("Total: $7.48"));
        assert!(html.contains(r#"hx-post="/fragments/cart/remove""#));
        assert!(html.contains(r#"data-product-id="4""#));
        assert!(html.contains(r#"hx-get="/fragments/checkout""#));
    }

    #[test]
    fn test_panel_refreshes_badge_out_of_band() {
        let cart = Cart::new(vec![line(1, 100, 3)]);
        let html = CartPanelTemplate::new(&cart).render().unwrap();
        assert!(html.contains(r#"id="cart-count""#));
        assert!(html.contains(r#"hx-swap-oob="true""#));
    }

    #[test]
    fn test_empty_cart_has_no_checkout_button() {
        let html = CartPanelTemplate::new(&Cart::default()).render().unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains("Total: $0.00"));
        assert!(!html.contains("checkout-btn"));
    }

    #[test]
    fn test_anonymous_panel_asks_for_login() {
        let html = CartPanelTemplate::anonymous().render().unwrap();
        assert!(html.contains("Please login"));
        assert!(!html.contains("checkout-btn"));
    }

    #[test]
    fn test_count_badge() {
        let html = CartCountTemplate::new(5).render().unwrap();
        assert!(html.contains(">5<"));
        assert!(!html.contains("hx-swap-oob"));
    }
}
