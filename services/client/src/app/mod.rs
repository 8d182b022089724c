pub mod annotate;
pub mod appliances;
pub mod auth;
pub mod documents;
pub mod organizations;
pub mod profile;
pub mod state;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

// Every view controller takes the shared context.
pub use state::{AppContext, Store};
