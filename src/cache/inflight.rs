//! In-flight request coalescing.
//!
//! [`InFlightRegistry`] guarantees at most one network call per
//! [`RequestKey`] at any instant. The first caller for a key starts the call
//! and registers a handle to it; every caller arriving before it settles
//! awaits the same handle and observes the same outcome.
//!
//! # Ownership
//!
//! Handles are [`Shared`] futures. Awaiters hold strong clones, the registry
//! only a [`WeakShared`]. The call is driven by whoever is awaiting it, so:
//!
//! - if one of several awaiters is dropped or cancelled, the others keep
//!   driving the call to completion;
//! - once every awaiter is gone, the call future is dropped, which aborts the
//!   underlying HTTP request and releases the registration.
//!
//! A registration is also released the moment its call settles, success or
//! failure, so a failed call never blocks a fresh attempt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::endpoint::RequestKey;

/// A single network call producing a validated payload.
pub type Fetch = BoxFuture<'static, Result<Arc<Value>>>;

/// A [`Fetch`] that any number of callers can await.
pub type SharedFetch = Shared<Fetch>;

/// Handle returned by [`InFlightRegistry::dedupe`].
pub struct Pending {
    pub handle: SharedFetch,
    /// `true` if the caller attached to a call someone else started.
    pub joined: bool,
}

struct Slot {
    id: u64,
    handle: WeakShared<Fetch>,
}

#[derive(Default)]
struct Slots {
    map: Mutex<HashMap<RequestKey, Slot>>,
    next_id: AtomicU64,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, Slot>> {
        // The map is only touched in short non-panicking sections.
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its slot when the call settles or is dropped.
///
/// Matches on `id` so that a stale registration (e.g. after [`clear`]) never
/// removes a newer call for the same key.
///
/// [`clear`]: InFlightRegistry::clear
struct Registration {
    slots: Arc<Slots>,
    key: RequestKey,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut map = self.slots.lock();
        if map.get(&self.key).is_some_and(|slot| slot.id == self.id) {
            map.remove(&self.key);
            debug!(key = %self.key, "in-flight registration released");
        }
    }
}

/// Map from request key to the call currently serving it.
///
/// Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    slots: Arc<Slots>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the live call for `key`, or start one with `perform`.
    ///
    /// The existence check and the registration happen under one lock, so
    /// two callers can never both start a call for the same key. `perform`
    /// only builds the future; nothing runs until the handle is awaited.
    pub fn dedupe<F>(&self, key: &RequestKey, perform: F) -> Pending
    where
        F: FnOnce() -> Fetch,
    {
        let mut map = self.slots.lock();
        if let Some(handle) = map.get(key).and_then(|slot| slot.handle.upgrade()) {
            return Pending {
                handle,
                joined: true,
            };
        }

        let id = self.slots.next_id.fetch_add(1, Ordering::Relaxed);
        let registration = Registration {
            slots: Arc::clone(&self.slots),
            key: key.clone(),
            id,
        };
        let call = perform();
        let handle = async move {
            let _registration = registration;
            call.await
        }
        .boxed()
        .shared();

        if let Some(weak) = handle.downgrade() {
            map.insert(key.clone(), Slot { id, handle: weak });
        }
        Pending {
            handle,
            joined: false,
        }
    }

    /// Whether a live call is registered for `key`.
    pub fn contains(&self, key: &RequestKey) -> bool {
        // The upgraded handle must outlive the guard: dropping the last
        // strong handle runs `Registration::drop`, which takes the lock.
        let handle = self.slots.lock().get(key).and_then(|slot| slot.handle.upgrade());
        handle.is_some()
    }

    /// Number of registered calls.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every registration.
    ///
    /// Calls already running keep serving their current awaiters, but new
    /// requests start fresh calls.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
