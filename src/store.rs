//! Persistence boundary for decoded tours.
//!
//! The decoder never computes tour identities itself. A caller-supplied
//! [`TourIdentity`] derives one from the finished [`Tour`], and a [`TourStore`]
//! reports whether that identity is already known.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::Tour;

/// Derives a content identity from a finished tour
pub trait TourIdentity: Send + Sync {
    fn identity(&self, tour: &Tour) -> String;
}

impl<F> TourIdentity for F
where
    F: Fn(&Tour) -> String + Send + Sync,
{
    fn identity(&self, tour: &Tour) -> String {
        self(tour)
    }
}

/// Identity built from start time, sample count and last distance
#[derive(Debug, Clone, Copy, Default)]
pub struct StartTimeIdentity;

impl TourIdentity for StartTimeIdentity {
    fn identity(&self, tour: &Tour) -> String {
        let distance = tour.total_distance().map_or(0, |d| d.round() as i64);
        format!("{}-{}-{}", tour.start_time.timestamp(), tour.samples.len(), distance)
    }
}

/// Tour persistence collaborator
pub trait TourStore: Send + Sync {
    /// True when a tour with `identity` was stored before.
    fn contains(&self, identity: &str) -> bool;

    /// Store a tour. Returns `false` if the identity was already present.
    fn insert(&self, identity: String, tour: Arc<Tour>) -> bool;
}

/// Shared in-memory store; clones see the same tours
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tours: Arc<Mutex<HashMap<String, Arc<Tour>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Tour>>> {
        self.tours.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<Arc<Tour>> {
        self.lock().get(identity).cloned()
    }
}

impl TourStore for InMemoryStore {
    fn contains(&self, identity: &str) -> bool {
        self.lock().contains_key(identity)
    }

    fn insert(&self, identity: String, tour: Arc<Tour>) -> bool {
        let mut tours = self.lock();
        if tours.contains_key(&identity) {
            return false;
        }
        tours.insert(identity, tour);
        true
    }
}
