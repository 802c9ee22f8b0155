use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Durable quantity of one product held in the shared cart.
///
/// At most one entry exists per product; adds accumulate onto it. An entry
/// with a non-positive quantity must not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub qty: i64,
}

/// Display row joining a cart entry with its product's name and price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
    pub subtotal: Decimal,
}

impl LineItem {
    pub fn new(product_id: ProductId, name: impl Into<String>, price: Decimal, qty: i64) -> Self {
        Self { product_id, name: name.into(), price, qty, subtotal: price * Decimal::from(qty) }
    }
}

/// Snapshot of the shared cart: every line item plus the derived total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<LineItem>,
    pub total: Decimal,
}

impl Cart {
    /// Build a cart from line items, deriving the total from their subtotals.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let total = items.iter().map(|item| item.subtotal).sum();
        Self { items, total }
    }

    /// The well-formed empty cart: no items, total zero.
    pub fn empty() -> Self {
        Self { items: Vec::new(), total: Decimal::ZERO }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of a completed checkout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub total: Decimal,
    pub message: String,
}

impl CheckoutReceipt {
    pub const SUCCESS_MESSAGE: &'static str = "Purchase completed";

    pub fn settled(total: Decimal) -> Self {
        Self { total, message: Self::SUCCESS_MESSAGE.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::ProductId;

    use super::{Cart, CheckoutReceipt, LineItem};

    #[test]
    fn line_item_subtotal_is_price_times_qty() {
        let item = LineItem::new(ProductId(1), "Apple", Decimal::new(50, 2), 3);

        assert_eq!(item.subtotal, Decimal::new(150, 2));
    }

    #[test]
    fn cart_total_sums_line_subtotals_exactly() {
        let cart = Cart::from_items(vec![
            LineItem::new(ProductId(1), "Apple", Decimal::new(50, 2), 2),
            LineItem::new(ProductId(2), "Bread", Decimal::new(120, 2), 1),
        ]);

        assert_eq!(cart.total, Decimal::new(220, 2));
        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn empty_cart_has_zero_total_and_no_items() {
        let cart = Cart::empty();

        assert!(cart.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn settled_receipt_carries_success_message() {
        let receipt = CheckoutReceipt::settled(Decimal::new(220, 2));

        assert_eq!(receipt.total, Decimal::new(220, 2));
        assert_eq!(receipt.message, CheckoutReceipt::SUCCESS_MESSAGE);
    }
}
