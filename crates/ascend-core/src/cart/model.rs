//! Cart line model.

use serde::Serialize;

use crate::catalog::{Product, ProductId};

/// One row of the cart: a product snapshot and its quantity.
///
/// The product is copied when the line is created, so later catalog price
/// changes do not affect lines already in the cart. Only the cart engine
/// changes the quantity, so it never drops below 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub(super) quantity: u32,
}

impl CartLine {
    /// Creates a line for `product` with quantity 1.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Price captured when the line was created.
    pub fn unit_price(&self) -> f64 {
        self.product.price
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price() * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_starts_at_one() {
        let line = CartLine::new(Product::new(7, "Lamp", 12.5));
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.line_total(), 12.5);
    }

    #[test]
    fn test_line_serializes_quantity() {
        let line = CartLine::new(Product::new(7, "Lamp", 12.5));
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["quantity"], 1);
        assert_eq!(json["product"]["id"], 7);
    }
}
