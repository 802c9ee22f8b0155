use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use carty_core::domain::cart::{Cart, CartEntry, CheckoutReceipt, LineItem};
use carty_core::domain::product::ProductId;
use carty_core::errors::{ApplicationError, DomainError};

use super::{CartLedger, CheckoutEngine, RepositoryError};
use crate::repositories::catalog::parse_price;
use crate::DbPool;

pub struct SqlCartLedger {
    pool: DbPool,
}

impl SqlCartLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub struct SqlCheckoutEngine {
    pool: DbPool,
}

impl SqlCheckoutEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const LINE_ITEM_SQL: &str = "SELECT c.product_id, c.qty, p.name, p.price
     FROM cart_items c
     JOIN products p ON p.id = c.product_id
     ORDER BY c.product_id";

fn row_to_line_item(row: &SqliteRow) -> Result<LineItem, RepositoryError> {
    let product_id: i64 =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let qty: i64 = row.try_get("qty").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price_text: String =
        row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(LineItem::new(ProductId(product_id), name, parse_price(product_id, &price_text)?, qty))
}

async fn fetch_line_items<'e, E>(executor: E) -> Result<Vec<LineItem>, RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows = sqlx::query(LINE_ITEM_SQL).fetch_all(executor).await?;
    rows.iter().map(row_to_line_item).collect()
}

// Single deletion path shared by `clear` and checkout.
async fn delete_all<'e, E>(executor: E) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query("DELETE FROM cart_items").execute(executor).await?;
    Ok(())
}

#[async_trait::async_trait]
impl CartLedger for SqlCartLedger {
    async fn add(&self, product_id: ProductId, qty: i64) -> Result<CartEntry, ApplicationError> {
        if qty <= 0 {
            return Err(DomainError::InvalidQuantity { qty }.into());
        }

        let now = Utc::now().to_rfc3339();
        // One atomic upsert: accumulation cannot lose a concurrent increment,
        // and the foreign key on product_id enforces that the product exists.
        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO cart_items (product_id, qty, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(product_id) DO UPDATE SET
                 qty = qty + excluded.qty,
                 updated_at = excluded.updated_at
             RETURNING qty",
        )
        .bind(product_id.0)
        .bind(qty)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(accumulated) => Ok(CartEntry { product_id, qty: accumulated }),
            Err(sqlx::Error::Database(error)) if error.is_foreign_key_violation() => {
                Err(DomainError::ProductNotFound(product_id).into())
            }
            Err(error) => Err(RepositoryError::from(error).into()),
        }
    }

    async fn view(&self) -> Result<Cart, ApplicationError> {
        let items = fetch_line_items(&self.pool).await?;
        Ok(Cart::from_items(items))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        delete_all(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CheckoutEngine for SqlCheckoutEngine {
    async fn checkout(&self) -> Result<CheckoutReceipt, ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Prices are read here, at checkout time; the same transaction deletes
        // exactly the entries that were summed.
        let items = fetch_line_items(&mut *tx).await?;
        let total: Decimal = items.iter().map(|item| item.subtotal).sum();
        delete_all(&mut *tx).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(CheckoutReceipt::settled(total))
    }
}
