pub mod events;
pub mod invites;
pub mod kv;
pub mod responses;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::event::EventRecord;
use crate::models::invite::Invite;
use crate::models::response::Response;
use kv::{KvError, KvStore, MemoryKv, SqliteKv};

static MEMORY_ONLY_WARNED: AtomicBool = AtomicBool::new(false);

/// Ledgers kept in memory before idle ones are dropped. Dropped events reload from
/// persistence on next use.
pub const DEFAULT_CACHE_LIMIT: usize = 1024;

pub fn event_key(event_id: &str) -> String {
    format!("event:{event_id}")
}

pub fn invites_key(event_id: &str) -> String {
    format!("event:{event_id}:invites")
}

pub fn responses_key(event_id: &str) -> String {
    format!("event:{event_id}:responses")
}

pub fn invite_index_key(invite_id: &str) -> String {
    format!("invite:{invite_id}")
}

/// Invites and responses of one event. Only ever touched while holding its mutex.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    pub invites: Vec<Invite>,
    pub responses: Vec<Response>,
}

/// Owner of all persisted state. Cheap to clone; clones share the same caches.
///
/// The caches are a read-through view of `kv`, which always holds the full state.
/// Once more than `cache_limit` ledgers are loaded, ledgers nobody is using are
/// dropped together with their event record and invite index entries.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    persistent: bool,
    cache_limit: usize,
    events: Arc<DashMap<String, EventRecord>>,
    ledgers: Arc<DashMap<String, Arc<Mutex<Ledger>>>>,
    invite_index: Arc<DashMap<String, String>>,
    // Serializes ledger loads with eviction so a stale load never replaces newer state.
    loading: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(kv: Arc<dyn KvStore>, persistent: bool) -> Self {
        Self {
            kv,
            persistent,
            cache_limit: DEFAULT_CACHE_LIMIT,
            events: Arc::new(DashMap::new()),
            ledgers: Arc::new(DashMap::new()),
            invite_index: Arc::new(DashMap::new()),
            loading: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit;
        self
    }

    /// In-memory-only store. Data is lost on restart.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()), false)
    }

    /// Open the configured backend. `memory` selects the in-memory backend; a SQLite
    /// backend that cannot be opened degrades to memory with a single warning.
    pub async fn open(database_url: &str) -> Self {
        if database_url.eq_ignore_ascii_case("memory") {
            tracing::info!("using in-memory persistence");
            return Self::memory();
        }
        match SqliteKv::connect(database_url).await {
            Ok(kv) => Self::new(Arc::new(kv), true),
            Err(e) => {
                warn_memory_only(&e);
                Self::memory()
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub(crate) async fn load_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, AppError> {
        let bytes = with_retry("load", key, || self.kv.load(key)).await?;
        match bytes {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::Internal(format!("corrupt record at {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Persist every entry or none of them, retrying once on failure.
    pub(crate) async fn save_entries(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), AppError> {
        let label = entries
            .first()
            .map(|(k, _)| k.clone())
            .unwrap_or_default();
        with_retry("save", &label, || self.kv.save_batch(&entries)).await
    }

    pub(crate) fn cached_event(&self, event_id: &str) -> Option<EventRecord> {
        self.events.get(event_id).map(|r| r.value().clone())
    }

    pub(crate) fn cache_event(&self, record: EventRecord) {
        self.events.insert(record.event.id.clone(), record);
    }

    /// Cache a record read from persistence unless a write already cached a newer one.
    pub(crate) fn cache_loaded_event(&self, record: EventRecord) -> EventRecord {
        self.events
            .entry(record.event.id.clone())
            .or_insert(record)
            .value()
            .clone()
    }

    /// Per-event ledger, loaded from persistence on first use.
    pub(crate) async fn ledger(&self, event_id: &str) -> Result<Arc<Mutex<Ledger>>, AppError> {
        if let Some(ledger) = self.ledgers.get(event_id) {
            return Ok(Arc::clone(ledger.value()));
        }

        let _loading = self.loading.lock().await;
        if let Some(ledger) = self.ledgers.get(event_id) {
            return Ok(Arc::clone(ledger.value()));
        }

        let invites: Vec<Invite> = self
            .load_json(&invites_key(event_id))
            .await?
            .unwrap_or_default();
        let responses: Vec<Response> = self
            .load_json(&responses_key(event_id))
            .await?
            .unwrap_or_default();
        for invite in &invites {
            self.invite_index
                .insert(invite.id.clone(), invite.event_id.clone());
        }

        let ledger = Arc::new(Mutex::new(Ledger { invites, responses }));
        self.ledgers
            .insert(event_id.to_string(), Arc::clone(&ledger));
        self.evict_idle();
        Ok(ledger)
    }

    /// Drop ledgers no caller holds once the cache is over its limit.
    /// Must run under `loading`, with no reference into `ledgers` held.
    fn evict_idle(&self) {
        if self.ledgers.len() <= self.cache_limit {
            return;
        }
        let mut evicted = Vec::new();
        self.ledgers.retain(|event_id, ledger| {
            let idle = Arc::strong_count(ledger) == 1;
            if idle {
                evicted.push(event_id.clone());
            }
            !idle
        });
        if evicted.is_empty() {
            return;
        }
        for event_id in &evicted {
            self.events.remove(event_id);
        }
        self.invite_index
            .retain(|_, event_id| !evicted.contains(event_id));
        tracing::debug!("evicted {} idle event(s) from cache", evicted.len());
    }

    pub fn cached_ledgers(&self) -> usize {
        self.ledgers.len()
    }

    /// Copy of an event's invites and responses, taken under its lock.
    pub async fn snapshot(&self, event_id: &str) -> Result<Ledger, AppError> {
        let ledger = self.ledger(event_id).await?;
        let guard = ledger.lock().await;
        Ok(guard.clone())
    }

    pub(crate) async fn event_of_invite(&self, invite_id: &str) -> Result<Option<String>, AppError> {
        if let Some(event_id) = self.invite_index.get(invite_id) {
            return Ok(Some(event_id.value().clone()));
        }
        let event_id: Option<String> = self.load_json(&invite_index_key(invite_id)).await?;
        if let Some(ref event_id) = event_id {
            self.invite_index
                .insert(invite_id.to_string(), event_id.clone());
        }
        Ok(event_id)
    }

    pub(crate) fn index_invite(&self, invite_id: &str, event_id: &str) {
        self.invite_index
            .insert(invite_id.to_string(), event_id.to_string());
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(value).map_err(|e| AppError::Internal(format!("failed to encode record: {e}")))
}

fn warn_memory_only(e: &KvError) {
    if !MEMORY_ONLY_WARNED.swap(true, Ordering::SeqCst) {
        tracing::warn!("persistence unavailable ({e}); continuing in memory-only mode, data will not survive a restart");
    }
}

async fn with_retry<T, F, Fut>(op: &str, key: &str, mut call: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, KvError>>,
{
    match call().await {
        Ok(v) => Ok(v),
        Err(first) => {
            tracing::warn!("persistence {op} of {key} failed, retrying: {first}");
            call().await.map_err(|e| {
                AppError::DependencyUnavailable(format!("persistence {op} failed: {e}"))
            })
        }
    }
}
