//! Request handler module
//!
//! Routing, input validation and the item handlers. Storage is reached only
//! through the `ItemStore` held in `AppState`.

mod error;
mod items;
pub mod router;
mod validation;

// Re-export main entry point
pub use router::handle_request;
