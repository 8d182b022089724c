//! services/client/src/lib.rs
//!
//! The Arsipku client: REST adapters, configuration and the view controllers
//! the `arsipku` binary drives.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
