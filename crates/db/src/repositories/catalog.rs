use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::Row;

use carty_core::domain::product::{Product, ProductId};
use carty_core::errors::ApplicationError;

use super::{Catalog, RepositoryError};
use crate::DbPool;

pub struct SqlCatalog {
    pool: DbPool,
}

impl SqlCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// Prices are stored as TEXT so Decimal round-trips without float drift.
pub(crate) fn parse_price(product_id: i64, text: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(text).map_err(|error| {
        RepositoryError::Decode(format!("invalid price `{text}` for product {product_id}: {error}"))
    })
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price_text: String =
        row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let image: String = row.try_get("image").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Product { id: ProductId(id), name, price: parse_price(id, &price_text)?, image })
}

#[async_trait::async_trait]
impl Catalog for SqlCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, ApplicationError> {
        let rows = sqlx::query("SELECT id, name, price, image FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, ApplicationError> {
        let row = sqlx::query("SELECT id, name, price, image FROM products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }
}
