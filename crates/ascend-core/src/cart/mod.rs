//! Shopping cart: line model and the cart engine.

pub mod engine;
pub mod model;

pub use engine::Cart;
pub use model::CartLine;
