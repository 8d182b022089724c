//! services/client/src/adapters/mod.rs
//!
//! Concrete implementations of the core crate's ports.

pub mod http;
pub mod token_store;
pub mod wire;

pub use http::HttpApi;
pub use token_store::{FileTokenStore, MemoryTokenStore};
