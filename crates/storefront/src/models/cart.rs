//! Cart contents and totals.

use rust_decimal::Decimal;

use greengrocer_core::api::{CartItem, CartResponse};
use greengrocer_core::{Price, ProductId};

/// One product in a user's cart, joined with its current catalog row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: String,
    pub stock: i32,
}

impl CartLine {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::usd(self.price).times(self.quantity)
    }
}

/// A user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    /// Lines asking for more than is in stock.
    pub fn short_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.quantity > line.stock)
    }

    #[must_use]
    pub fn to_response(&self) -> CartResponse {
        CartResponse {
            items: self
                .lines
                .iter()
                .map(|line| CartItem {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    price: line.price,
                    quantity: line.quantity,
                    image_url: line.image_url.clone(),
                    item_total: line.line_total().rounded(),
                })
                .collect(),
            total: self.total().rounded(),
            item_count: self.item_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i32, cents: i64, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("product {id}"),
            price: Decimal::new(cents, 2),
            quantity,
            image_url: "/static/images/default.png".to_string(),
            stock,
        }
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let cart = Cart::new(vec![line(1, 299, 2, 100), line(3, 349, 3, 75)]);
        assert_eq!(cart.total().amount, Decimal::new(1645, 2));
        assert_eq!(cart.total().display(), "$16.45");
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total().display(), "$0.00");
        assert_eq!(cart.to_response().item_count, 0);
    }

    #[test]
    fn test_response_carries_item_totals() {
        let response = Cart::new(vec![line(2, 199, 4, 50)]).to_response();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].item_total, Decimal::new(796, 2));
        assert_eq!(response.total, Decimal::new(796, 2));
    }

    #[test]
    fn test_short_lines() {
        let cart = Cart::new(vec![line(1, 100, 5, 4), line(2, 100, 1, 1)]);
        let short: Vec<_> = cart.short_lines().map(|l| l.product_id).collect();
        assert_eq!(short, vec![ProductId::new(1)]);
    }
}
