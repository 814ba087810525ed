//! Data models for mapmark entities.
//!
//! - `Place`: a persisted marker with its remote-assigned id
//! - `PlaceDraft`: a marker awaiting its first save
//! - `ValidationError`: input problems caught before any network call

pub mod place;

pub use place::{Place, PlaceDraft, ValidationError, DEFAULT_COLOR};
