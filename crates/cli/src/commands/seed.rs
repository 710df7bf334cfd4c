//! Load the starter catalog.

use rust_decimal::Decimal;
use sqlx::PgPool;

use greengrocer_core::api::ProductInput;
use greengrocer_storefront::db::products::ProductRepository;

use super::CommandError;

/// (name, description, price in cents, stock, featured)
const STARTER_PRODUCTS: [(&str, &str, i64, i32, bool); 8] = [
    ("Fresh Apples", "Crisp red apples from local orchards", 299, 120, true),
    ("Organic Bananas", "Ripe Cavendish bananas, sold by the bunch", 149, 200, true),
    ("Vine Tomatoes", "Sweet tomatoes still on the vine", 349, 80, true),
    ("Baby Spinach", "Washed and ready to eat, 250g bag", 259, 60, false),
    ("Whole Milk", "Fresh whole milk, 1 litre", 119, 90, true),
    ("Free-Range Eggs", "A dozen large free-range eggs", 429, 50, false),
    ("Sourdough Loaf", "Baked this morning with a slow-rise starter", 549, 25, true),
    ("Hass Avocados", "Ready to eat, pack of two", 399, 8, false),
];

fn starter_products() -> impl Iterator<Item = ProductInput> {
    STARTER_PRODUCTS
        .into_iter()
        .map(|(name, description, cents, stock, is_featured)| ProductInput {
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::new(cents, 2),
            stock,
            image_url: None,
            is_featured,
        })
}

/// Insert the starter products when the catalog is empty.
///
/// Returns how many products were inserted (0 when the catalog already had
/// products).
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub async fn run(pool: &PgPool) -> Result<usize, CommandError> {
    let products = ProductRepository::new(pool);

    let existing = products.count().await?;
    if existing > 0 {
        tracing::info!(existing, "Catalog already has products, skipping seed");
        return Ok(0);
    }

    let mut inserted = 0;
    for input in starter_products() {
        let id = products.create(&input).await?;
        tracing::info!(product_id = %id, name = %input.name, "Seeded product");
        inserted += 1;
    }

    tracing::info!(inserted, "Seeding complete!");
    Ok(inserted)
}
