use crate::repositories::RepositoryError;
use crate::DbPool;

/// One row of the fixed default catalog.
pub struct SeededProduct {
    pub id: i64,
    pub name: &'static str,
    pub price: &'static str,
    pub image: &'static str,
}

/// Canonical catalog installed on first startup against an empty store.
pub const DEFAULT_CATALOG: &[SeededProduct] = &[
    SeededProduct { id: 1, name: "Apple", price: "0.50", image: "images/apple.svg" },
    SeededProduct { id: 2, name: "Bread", price: "1.20", image: "images/bread.svg" },
    SeededProduct { id: 3, name: "Milk", price: "0.99", image: "images/milk.svg" },
    SeededProduct { id: 4, name: "Cheese", price: "2.50", image: "images/cheese.svg" },
    SeededProduct { id: 5, name: "Chocolate", price: "1.75", image: "images/chocolate.svg" },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadySeeded,
}

/// Insert the default catalog when the store holds zero products.
///
/// Idempotent: a store that already has products is left exactly as it is.
pub async fn seed_default_catalog(pool: &DbPool) -> Result<SeedOutcome, RepositoryError> {
    let mut tx = pool.begin().await?;

    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM products").fetch_one(&mut *tx).await?;
    if existing > 0 {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    for product in DEFAULT_CATALOG {
        sqlx::query("INSERT INTO products (id, name, price, image) VALUES (?, ?, ?, ?)")
            .bind(product.id)
            .bind(product.name)
            .bind(product.price)
            .bind(product.image)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(SeedOutcome::Seeded(DEFAULT_CATALOG.len()))
}
