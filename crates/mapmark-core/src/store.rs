//! The place store: one authoritative in-memory list reconciled against
//! the remote, with the local cache as the offline fallback.
//!
//! Mutations are confirmed-first: nothing touches the in-memory list or the
//! cache until the remote has accepted the change, so a failed call leaves
//! both exactly as they were. The cache mirrors the list after every
//! successful change ("write-through").

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, RemoteStore};
use crate::cache::CacheManager;
use crate::models::{Place, PlaceDraft, ValidationError};

/// Two places within this many degrees are treated as the same spot when a
/// caller only retained coordinates (~11m at the equator). Known flaw: two
/// distinct places inside the radius collide; prefer [`PlaceStore::find_by_id`].
pub const COORD_TOLERANCE: f64 = 1e-4;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Where the in-memory list came from after a [`PlaceStore::refresh`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The remote answered; memory and cache now hold its list.
    Remote,
    /// The remote failed; memory holds the last cached snapshot.
    CacheFallback(ApiError),
}

/// Owner of the authoritative place list.
///
/// Operations take `&mut self`, so a single store cannot run two mutations
/// at once. Racing a `refresh` against a mutation through separate stores
/// on the same backend is not guarded: whichever resolves last wins.
pub struct PlaceStore<R: RemoteStore> {
    remote: R,
    cache: CacheManager,
    places: Vec<Place>,
    syncing: bool,
}

impl<R: RemoteStore> PlaceStore<R> {
    pub fn new(remote: R, cache: CacheManager) -> Self {
        Self {
            remote,
            cache,
            places: Vec::new(),
            syncing: false,
        }
    }

    /// The authoritative list, in remote order with local appends at the end.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Advisory progress flag for frontends; never consulted for correctness.
    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    /// First place within [`COORD_TOLERANCE`] of the given coordinates.
    pub fn find_near(&self, lat: f64, lng: f64) -> Option<&Place> {
        self.places
            .iter()
            .find(|p| (p.lat - lat).abs() < COORD_TOLERANCE && (p.lng - lng).abs() < COORD_TOLERANCE)
    }

    /// Reload the list from the remote, falling back to the cache when the
    /// remote fails. The fallback path performs no cache write, so a stale
    /// snapshot is never re-stamped as fresh.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        self.syncing = true;
        let result = self.remote.fetch_all().await;
        self.syncing = false;

        match result {
            Ok(places) => {
                debug!(count = places.len(), "Loaded places from remote");
                self.places = places;
                self.write_through();
                RefreshOutcome::Remote
            }
            Err(err) => {
                warn!(error = %err, "Remote fetch failed, falling back to cached places");
                self.places = self.cache.load_places();
                RefreshOutcome::CacheFallback(err)
            }
        }
    }

    /// Save a new place. The draft is validated before any network call,
    /// stamped with the current time, and appended to the list only once
    /// the remote has assigned it an id.
    pub async fn create(&mut self, mut draft: PlaceDraft) -> Result<Place, StoreError> {
        draft.validate()?;
        draft.timestamp = Some(Utc::now().to_rfc3339());

        self.syncing = true;
        let result = self.remote.create(&draft).await;
        self.syncing = false;

        let id = result?;
        let place = draft.into_place(id);
        self.places.push(place.clone());
        self.write_through();
        Ok(place)
    }

    /// Push a full record for an existing place. An id the local list does
    /// not know is still sent and accepted as a local no-op: the remote
    /// owns existence.
    pub async fn update(&mut self, mut place: Place) -> Result<(), StoreError> {
        place.validate()?;
        place.timestamp = Some(Utc::now().to_rfc3339());

        self.syncing = true;
        let result = self.remote.update(&place).await;
        self.syncing = false;
        result?;

        if let Some(slot) = self.places.iter_mut().find(|p| p.id == place.id) {
            *slot = place;
        } else {
            debug!(id = %place.id, "Updated place not in local list; leaving list unchanged");
        }
        self.write_through();
        Ok(())
    }

    /// Remove a place by id. Filtering out zero entries is a safe no-op if
    /// the remote deleted a record the local list never had.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.syncing = true;
        let result = self.remote.delete(id).await;
        self.syncing = false;
        result?;

        self.places.retain(|p| p.id != id);
        self.write_through();
        Ok(())
    }

    /// Pretty JSON dump of the current list (the `places.json` escape hatch).
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.places)
    }

    /// A failed cache write must not undo an already-confirmed remote
    /// mutation, so it is logged and swallowed here.
    fn write_through(&self) {
        if let Err(err) = self.cache.save_places(&self.places) {
            warn!(error = %err, "Failed to write place snapshot to cache");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
