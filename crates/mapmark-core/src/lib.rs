//! Core library for mapmark: a place store synchronized against a
//! spreadsheet-backed web app, with a durable local cache for offline use.
//!
//! The pieces, leaves first:
//!
//! - [`models`]: `Place` / `PlaceDraft` records and their validation
//! - [`api`]: HTTP client for the remote store (`{ok, data, error}` envelope)
//! - [`cache`]: whole-snapshot place cache with swallow-on-corruption loads
//! - [`store`]: the authoritative in-memory list, confirmed-first mutations,
//!   write-through caching, and cache fallback on remote failure
//! - [`geo`]: read-only district-boundary reader for frontends
//! - [`config`] / [`auth`]: endpoint configuration and app-key storage

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod geo;
pub mod models;
pub mod store;

pub use api::{ApiClient, ApiError, RemoteStore};
pub use store::{PlaceStore, RefreshOutcome, StoreError};
