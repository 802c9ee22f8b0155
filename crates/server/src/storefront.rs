//! Storefront API routes: catalog listing, the shared cart, and checkout.
//!
//! JSON endpoints:
//! - `GET  /api/products` — list the catalog (id ascending)
//! - `POST /api/cart/add` — accumulate quantity for one product
//! - `GET  /api/cart`     — view line items and the running total
//! - `POST /api/checkout` — finalize: binding total, cart emptied
//!
//! Every path outside `/api` falls through to the static assets directory,
//! which carries the browser frontend.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{info, warn};
use uuid::Uuid;

use carty_core::domain::cart::{Cart, LineItem};
use carty_core::domain::product::{Product, ProductId};
use carty_core::errors::{ApplicationError, InterfaceError};
use carty_db::repositories::{
    CartLedger, Catalog, CheckoutEngine, SqlCartLedger, SqlCatalog, SqlCheckoutEngine,
};
use carty_db::DbPool;

#[derive(Clone)]
pub struct StorefrontState {
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn CartLedger>,
    checkout: Arc<dyn CheckoutEngine>,
}

impl StorefrontState {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            catalog: Arc::new(SqlCatalog::new(db_pool.clone())),
            ledger: Arc::new(SqlCartLedger::new(db_pool.clone())),
            checkout: Arc::new(SqlCheckoutEngine::new(db_pool)),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub qty: i64,
}

#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    pub ok: bool,
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub qty: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.0,
            name: product.name,
            price: product.price,
            image: product.image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
    pub subtotal: Decimal,
}

impl From<LineItem> for CartItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            product_id: item.product_id.0,
            name: item.name,
            price: item.price,
            qty: item.qty,
            subtotal: item.subtotal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            total: cart.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub total: Decimal,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StorefrontError {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(db_pool: DbPool, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/cart", get(view_cart))
        .route("/api/cart/add", post(add_to_cart))
        .route("/api/checkout", post(checkout))
        .with_state(StorefrontState::new(db_pool))
        .fallback_service(ServeDir::new(static_dir))
}

fn fail(operation: &'static str, error: ApplicationError) -> (StatusCode, Json<StorefrontError>) {
    let correlation_id = Uuid::new_v4().to_string();
    let interface = error.into_interface(correlation_id.clone());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };

    warn!(
        event_name = "storefront.request.failed",
        correlation_id = %correlation_id,
        operation,
        error = %interface,
        "storefront operation failed"
    );

    (status, Json(StorefrontError { error: interface.user_message().to_string() }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_products(
    State(state): State<StorefrontState>,
) -> Result<Json<Vec<ProductResponse>>, (StatusCode, Json<StorefrontError>)> {
    let products =
        state.catalog.list_products().await.map_err(|error| fail("list_products", error))?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

async fn view_cart(
    State(state): State<StorefrontState>,
) -> Result<Json<CartResponse>, (StatusCode, Json<StorefrontError>)> {
    let cart = state.ledger.view().await.map_err(|error| fail("view_cart", error))?;

    Ok(Json(cart.into()))
}

async fn add_to_cart(
    State(state): State<StorefrontState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>, (StatusCode, Json<StorefrontError>)> {
    let entry = state
        .ledger
        .add(ProductId(request.product_id), request.qty)
        .await
        .map_err(|error| fail("add_to_cart", error))?;

    info!(
        event_name = "storefront.cart.added",
        product_id = entry.product_id.0,
        qty = entry.qty,
        "cart entry accumulated"
    );

    Ok(Json(AddToCartResponse { ok: true, product_id: entry.product_id.0, qty: entry.qty }))
}

async fn checkout(
    State(state): State<StorefrontState>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<StorefrontError>)> {
    let receipt = state.checkout.checkout().await.map_err(|error| fail("checkout", error))?;

    info!(
        event_name = "storefront.checkout.completed",
        total = %receipt.total,
        "checkout completed and cart cleared"
    );

    Ok(Json(CheckoutResponse { total: receipt.total, message: receipt.message }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tower::util::ServiceExt;

    use carty_db::{connect_with_settings, migrations, seed_default_catalog};

    use super::*;

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        seed_default_catalog(&pool).await.expect("seed");
        pool
    }

    fn state(pool: sqlx::SqlitePool) -> State<StorefrontState> {
        State(StorefrontState::new(pool))
    }

    #[tokio::test]
    async fn list_products_returns_seeded_catalog() {
        let pool = setup().await;

        let Json(products) = list_products(state(pool)).await.expect("should succeed");

        assert_eq!(products.len(), 5);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].name, "Apple");
        assert_eq!(products[0].price, Decimal::new(50, 2));
        assert_eq!(products[4].name, "Chocolate");
    }

    #[tokio::test]
    async fn prices_serialize_as_exact_decimal_strings() {
        let pool = setup().await;

        let Json(products) = list_products(state(pool)).await.expect("should succeed");
        let value = serde_json::to_value(&products).expect("serialize");

        assert_eq!(value[0]["price"], serde_json::json!("0.50"));
        assert_eq!(value[1]["price"], serde_json::json!("1.20"));
    }

    #[tokio::test]
    async fn add_to_cart_accumulates_and_reports_quantity() {
        let pool = setup().await;

        let Json(first) =
            add_to_cart(state(pool.clone()), Json(AddToCartRequest { product_id: 1, qty: 2 }))
                .await
                .expect("first add");
        assert!(first.ok);
        assert_eq!(first.qty, 2);

        let Json(second) =
            add_to_cart(state(pool.clone()), Json(AddToCartRequest { product_id: 1, qty: 3 }))
                .await
                .expect("second add");
        assert_eq!(second.qty, 5);

        let Json(cart) = view_cart(state(pool)).await.expect("view");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].qty, 5);
    }

    #[tokio::test]
    async fn add_to_cart_rejects_non_positive_quantity_with_bad_request() {
        let pool = setup().await;

        let result =
            add_to_cart(state(pool), Json(AddToCartRequest { product_id: 1, qty: 0 })).await;

        let (status, Json(body)) = result.expect_err("must fail");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Quantity must be a positive whole number.");
    }

    #[tokio::test]
    async fn add_to_cart_rejects_unknown_product_with_not_found() {
        let pool = setup().await;

        let result =
            add_to_cart(state(pool.clone()), Json(AddToCartRequest { product_id: 999, qty: 1 }))
                .await;

        let (status, Json(body)) = result.expect_err("must fail");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Product not found.");

        let Json(cart) = view_cart(state(pool)).await.expect("view");
        assert!(cart.items.is_empty(), "failed add must not mutate the ledger");
    }

    #[tokio::test]
    async fn view_cart_on_empty_ledger_returns_empty_cart() {
        let pool = setup().await;

        let Json(cart) = view_cart(state(pool)).await.expect("view");

        assert!(cart.items.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn checkout_returns_binding_total_and_empties_the_cart() {
        let pool = setup().await;

        add_to_cart(state(pool.clone()), Json(AddToCartRequest { product_id: 1, qty: 2 }))
            .await
            .expect("add apples");
        add_to_cart(state(pool.clone()), Json(AddToCartRequest { product_id: 2, qty: 1 }))
            .await
            .expect("add bread");

        let Json(cart) = view_cart(state(pool.clone())).await.expect("view");
        assert_eq!(cart.total, Decimal::new(220, 2));

        let Json(receipt) = checkout(state(pool.clone())).await.expect("checkout");
        assert_eq!(receipt.total, Decimal::new(220, 2));
        assert_eq!(receipt.message, "Purchase completed");

        let Json(after) = view_cart(state(pool)).await.expect("view after");
        assert!(after.items.is_empty());
        assert_eq!(after.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn checkout_on_empty_cart_is_valid_and_returns_zero() {
        let pool = setup().await;

        let Json(receipt) = checkout(state(pool)).await.expect("checkout");

        assert_eq!(receipt.total, Decimal::ZERO);
        assert_eq!(receipt.message, "Purchase completed");
    }

    #[tokio::test]
    async fn router_serves_api_and_static_assets() {
        let pool = setup().await;
        let assets = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(assets.path().join("index.html"), "<html><body>Carty</body></html>")
            .expect("write index");

        let app = router(pool, assets.path());

        let api_response = app
            .clone()
            .oneshot(Request::builder().uri("/api/products").body(Body::empty()).expect("request"))
            .await
            .expect("api response");
        assert_eq!(api_response.status(), StatusCode::OK);

        let page_response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("page response");
        assert_eq!(page_response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(page_response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert!(String::from_utf8_lossy(&body).contains("Carty"));
    }
}
