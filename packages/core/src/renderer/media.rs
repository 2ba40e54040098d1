//! Media metadata resolution for the `media` renderer variant
//!
//! Ids are resolved lazily, one Tokio task per id. Each task only updates
//! its own slot, so a slow or failing id never holds up ids that are already
//! known. Dropping the loader aborts every fetch still in flight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Display metadata of one media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub mime_type: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Media lookup failed: {0}")]
    Unavailable(String),
}

/// Host collaborator that turns a media id into display metadata
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, id: &str) -> Result<MediaInfo, MediaError>;
}

/// State of one media preview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "media", rename_all = "snake_case")]
pub enum MediaSlot {
    Loading,
    Ready(MediaInfo),
    NotFound,
}

/// Synchronous view of media state used while rendering
pub trait MediaLookup {
    fn lookup(&self, id: &str) -> MediaSlot;
}

/// A fixed table: known ids are ready, everything else is not found
impl MediaLookup for HashMap<String, MediaInfo> {
    fn lookup(&self, id: &str) -> MediaSlot {
        match self.get(id) {
            Some(info) => MediaSlot::Ready(info.clone()),
            None => MediaSlot::NotFound,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Lazy, per-id media metadata cache backed by a `MediaResolver`
pub struct MediaLoader {
    resolver: Arc<dyn MediaResolver>,
    runtime: Handle,
    slots: Arc<Mutex<HashMap<String, MediaSlot>>>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl MediaLoader {
    /// Create a loader spawning its fetches on `runtime`
    pub fn new(resolver: Arc<dyn MediaResolver>, runtime: Handle) -> Self {
        Self {
            resolver,
            runtime,
            slots: Arc::new(Mutex::new(HashMap::new())),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Current slot for `id`, starting a fetch the first time it is seen
    pub fn request(&self, id: &str) -> MediaSlot {
        {
            let mut slots = lock(&self.slots);
            if let Some(slot) = slots.get(id) {
                return slot.clone();
            }
            slots.insert(id.to_string(), MediaSlot::Loading);
        }

        let resolver = Arc::clone(&self.resolver);
        let slots = Arc::clone(&self.slots);
        let key = id.to_string();
        let task = self.runtime.spawn(async move {
            let slot = match resolver.resolve(&key).await {
                Ok(info) => MediaSlot::Ready(info),
                Err(MediaError::NotFound(_)) => MediaSlot::NotFound,
                Err(e) => {
                    tracing::warn!(id = %key, error = %e, "media lookup failed");
                    MediaSlot::NotFound
                }
            };
            lock(&slots).insert(key, slot);
        });
        let mut tasks = lock(&self.tasks);
        tasks.retain(|_, t| !t.is_finished());
        tasks.insert(id.to_string(), task);

        MediaSlot::Loading
    }

    /// Request every id, returning their current slots in order
    pub fn request_all<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<MediaSlot> {
        ids.into_iter().map(|id| self.request(id)).collect()
    }

    /// Current slot without starting a fetch
    pub fn slot(&self, id: &str) -> Option<MediaSlot> {
        lock(&self.slots).get(id).cloned()
    }

    /// Drop the cached slot (and any running fetch) so the next request
    /// fetches again
    pub fn forget(&self, id: &str) {
        if let Some(task) = lock(&self.tasks).remove(id) {
            task.abort();
        }
        lock(&self.slots).remove(id);
    }

    /// Number of fetches still running
    pub fn pending(&self) -> usize {
        let mut tasks = lock(&self.tasks);
        tasks.retain(|_, t| !t.is_finished());
        tasks.len()
    }

    /// Wait until every fetch started so far has settled
    pub async fn settle(&self) {
        let tasks: Vec<JoinHandle<()>> = lock(&self.tasks).drain().map(|(_, t)| t).collect();
        for task in tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "media fetch task failed");
                }
            }
        }
    }
}

impl MediaLookup for MediaLoader {
    fn lookup(&self, id: &str) -> MediaSlot {
        self.request(id)
    }
}

impl Drop for MediaLoader {
    fn drop(&mut self) {
        for (_, task) in lock(&self.tasks).drain() {
            task.abort();
        }
    }
}
