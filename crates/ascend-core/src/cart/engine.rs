//! Cart engine.

use serde::Serialize;

use crate::cart::model::CartLine;
use crate::catalog::{Product, ProductId};

/// The authoritative in-memory cart.
///
/// Holds at most one [`CartLine`] per product id. Every operation is total:
/// unknown ids are ignored and quantities are clamped rather than rejected.
/// The cart is not synchronized; hosts with parallel event handling keep it
/// behind a mutex.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `product`.
    ///
    /// An existing line for the same id is incremented; otherwise a new line
    /// with quantity 1 is appended holding a snapshot of `product`. Returns
    /// the updated lines so the caller can decide whether to reveal the cart.
    pub fn add_to_cart(&mut self, product: &Product) -> &[CartLine] {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::new(product.clone())),
        }
        &self.lines
    }

    /// Applies `delta` to the matching line, never going below 1.
    ///
    /// Unknown ids and a zero delta leave the cart unchanged.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) {
        if delta == 0 {
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
        {
            let next = i64::from(line.quantity).saturating_add(delta).max(1);
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    /// Removes the matching line; no-op if absent.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id() != product_id);
    }

    /// Sum of `price * quantity` over all lines, using add-time prices.
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities (badge count), not the number of lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
