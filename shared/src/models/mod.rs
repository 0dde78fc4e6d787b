//! Data models
//!
//! Shared between the order-intake client and display clients. The
//! backend owns the authoritative copies; these are the shapes we
//! read and write through its API.

pub mod courier;
pub mod customer;
pub mod flavor;
pub mod order;

// Re-exports
pub use courier::*;
pub use customer::*;
pub use flavor::*;
pub use order::*;
