//! Process-wide build cache keyed by fingerprint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pf_core::Fingerprint;
use pf_graph::Component;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::CacheError;

type Slot = Arc<Mutex<Option<Arc<Component>>>>;

/// Hit/build counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub builds: u64,
    pub entries: usize,
}

/// Memoizes sealed components by fingerprint.
///
/// - the map lock is only held to find or create a key's slot
/// - a slot's own lock serializes construction of that key, so concurrent
///   requests for one fingerprint wait and then share the result, while
///   different fingerprints build in parallel
/// - failed builds leave the slot empty; the next request retries
/// - names are registered atomically with insertion; a name may only ever
///   belong to one fingerprint
#[derive(Debug, Default)]
pub struct BuildCache {
    slots: Mutex<HashMap<Fingerprint, Slot>>,
    names: Mutex<HashMap<String, Fingerprint>>,
    hits: AtomicU64,
    builds: AtomicU64,
}

// Slots are only written after a successful build, so a poisoned slot still
// holds `None`.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, fp: Fingerprint) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(fp).or_default())
    }

    /// Return the cached component for `fp`, building it at most once.
    ///
    /// `build` runs with the key's slot held. On success the component name
    /// is registered; if another fingerprint already owns that name the
    /// result is discarded and `NameCollision` is returned.
    pub fn get_or_build<E, F>(&self, fp: Fingerprint, build: F) -> Result<Arc<Component>, E>
    where
        E: From<CacheError>,
        F: FnOnce() -> Result<Component, E>,
    {
        let slot = self.slot(fp);
        let mut guard = lock(&slot);
        if let Some(existing) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(fingerprint = %fp.short(), name = %existing.name(), "cache hit");
            return Ok(Arc::clone(existing));
        }

        let component = build()?;
        {
            let mut names = lock(&self.names);
            match names.get(component.name()) {
                Some(owner) if *owner != fp => {
                    warn!(
                        name = %component.name(),
                        existing = %owner.short(),
                        incoming = %fp.short(),
                        "component name collision"
                    );
                    return Err(CacheError::NameCollision {
                        name: component.name().to_string(),
                        existing: *owner,
                        incoming: fp,
                    }
                    .into());
                }
                Some(_) => {}
                None => {
                    names.insert(component.name().to_string(), fp);
                }
            }
        }

        let component = Arc::new(component);
        *guard = Some(Arc::clone(&component));
        self.builds.fetch_add(1, Ordering::Relaxed);
        debug!(fingerprint = %fp.short(), name = %component.name(), "cached new component");
        Ok(component)
    }

    /// Cached component for `fp`, if built. Waits for an in-flight build.
    pub fn get(&self, fp: &Fingerprint) -> Option<Arc<Component>> {
        let slot = lock(&self.slots).get(fp).cloned()?;
        let guard = lock(&slot);
        guard.clone()
    }

    /// Fingerprint currently owning `name`.
    pub fn name_owner(&self, name: &str) -> Option<Fingerprint> {
        lock(&self.names).get(name).copied()
    }

    /// Number of built entries.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All built components, sorted by name.
    pub fn components(&self) -> Vec<Arc<Component>> {
        let mut out = self.snapshot();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn snapshot(&self) -> Vec<Arc<Component>> {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter_map(|s| lock(s).clone()).collect()
    }
}
