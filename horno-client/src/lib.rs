//! Order-intake core for the HORNO pizzeria point-of-sale
//!
//! This crate owns the parts of the POS with real state and
//! concurrency content: the flavor pricing engine, the cart and draft
//! session, debounced draft persistence, the order submission state
//! machine, and the realtime order-sync channel shared by all display
//! clients. Storage, auth, invoicing and printing live behind the
//! backend and are consumed through [`api::OrderBackend`].

pub mod api;
pub mod board;
pub mod cart;
pub mod config;
pub mod draft;
pub mod error;
pub mod notify;
pub mod pricing;
pub mod submission;
pub mod sync;

pub use api::{HttpBackend, OrderBackend};
pub use board::{AttentionNotice, OrderBoard};
pub use cart::{Cart, CartLine, NewLine, OrderDraft};
pub use config::ClientConfig;
pub use draft::{DraftSession, DraftStore};
pub use error::{ClientError, ClientResult, ValidationError};
pub use submission::{OrderSubmitter, SubmissionState};
pub use sync::{ConnectionStatus, OrderSignal, SyncChannel};
