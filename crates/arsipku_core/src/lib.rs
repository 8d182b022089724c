//! crates/arsipku_core/src/lib.rs
//!
//! Pure logic of the Arsipku client: domain types, the service ports the
//! adapters implement, and the view-independent state machines.

pub mod annotation;
pub mod display;
pub mod domain;
pub mod error_code;
pub mod listing;
pub mod members;
pub mod ports;
pub mod routes;
pub mod selection;
pub mod store;
pub mod tags;

#[cfg(test)]
pub(crate) mod fixtures;

pub use domain::{
    Annotation, AnnotationDetail, Appliance, ApplianceStatus, Document, FieldError, Page, Profile,
    Tag, Version, Visibility,
};
pub use error_code::{ErrorCode, ErrorPolicy};
pub use ports::{ArsipkuApi, OrEmpty, PortError, PortResult, TokenStore};
pub use routes::{Route, RouteDecision};
pub use store::{Action, AppState};
