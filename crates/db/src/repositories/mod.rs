use async_trait::async_trait;
use thiserror::Error;

use carty_core::domain::cart::{Cart, CartEntry, CheckoutReceipt};
use carty_core::domain::product::{Product, ProductId};
use carty_core::errors::ApplicationError;

pub mod cart;
pub mod catalog;

pub use cart::{SqlCartLedger, SqlCheckoutEngine};
pub use catalog::SqlCatalog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::StoreUnavailable(value.to_string())
    }
}

/// Read-only access to the seeded product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All products ordered by id ascending. An empty catalog is a valid
    /// result, not a failure.
    async fn list_products(&self) -> Result<Vec<Product>, ApplicationError>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, ApplicationError>;
}

/// Durable accumulation of desired purchase quantities, shared process-wide.
#[async_trait]
pub trait CartLedger: Send + Sync {
    /// Accumulate `qty` onto the entry for `product_id`, creating it on first
    /// add. Validation failures leave the ledger untouched.
    async fn add(&self, product_id: ProductId, qty: i64) -> Result<CartEntry, ApplicationError>;

    /// Current entries joined with catalog data. Pure read.
    async fn view(&self) -> Result<Cart, ApplicationError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), ApplicationError>;
}

/// Finalizes a purchase: computes the binding total and empties the ledger as
/// one atomic unit.
#[async_trait]
pub trait CheckoutEngine: Send + Sync {
    async fn checkout(&self) -> Result<CheckoutReceipt, ApplicationError>;
}
