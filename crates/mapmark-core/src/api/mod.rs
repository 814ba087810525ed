//! Remote store client for the place web app.
//!
//! One endpoint URL serves the whole contract: GET for the full list,
//! POST for `add`/`update`/`delete` mutations carrying the shared app key.

pub mod client;
pub mod error;

pub use client::{ApiClient, RemoteStore};
pub use error::ApiError;
