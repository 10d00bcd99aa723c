//! Session store: one in-memory [`Session`] per client.
//!
//! Concurrency discipline: the outer map is behind a `RwLock` that is only
//! held long enough to find or insert a client's slot. Each slot has its own
//! `Mutex`, which a request holds from session load to commit. Turns from
//! the same client are therefore serialised, and different clients never
//! wait on each other's generation calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use curhat_core::{ClientId, Session};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

type Slot = Arc<Mutex<Session>>;

const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);

struct Table {
    slots: HashMap<ClientId, Slot>,
    last_sweep: DateTime<Utc>,
}

impl Table {
    /// Drop sessions untouched for `idle_ttl`. A slot someone else still
    /// holds a handle to is never dropped.
    fn sweep(&mut self, now: DateTime<Utc>, idle_ttl: Duration) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => !idle_for(session.updated_at, now, idle_ttl),
                Err(_) => true,
            }
        });
        self.last_sweep = now;
        before - self.slots.len()
    }
}

fn idle_for(updated_at: DateTime<Utc>, now: DateTime<Utc>, idle_ttl: Duration) -> bool {
    (now - updated_at).to_std().is_ok_and(|age| age >= idle_ttl)
}

pub struct SessionStore {
    table: RwLock<Table>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    /// Sessions idle for `idle_ttl` are dropped. Inserting a new client
    /// sweeps at most once per `idle_ttl`; [`SessionStore::sweep_idle`]
    /// sweeps on demand.
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            table: RwLock::new(Table {
                slots: HashMap::new(),
                last_sweep: Utc::now(),
            }),
            idle_ttl,
        }
    }

    /// Lock a client's session, creating it on first use.
    ///
    /// The guard is exclusive for this client until dropped. Write the
    /// finished turn back through it in a single assignment.
    pub async fn lock(&self, client: &ClientId) -> OwnedMutexGuard<Session> {
        let existing = self.table.read().await.slots.get(client).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let now = Utc::now();
                let mut table = self.table.write().await;
                if idle_for(table.last_sweep, now, self.idle_ttl) {
                    let removed = table.sweep(now, self.idle_ttl);
                    debug!(removed, "Swept idle sessions");
                }
                table
                    .slots
                    .entry(client.clone())
                    .or_insert_with(|| {
                        debug!(client = %client, "Creating session");
                        Arc::new(Mutex::new(Session::new(now)))
                    })
                    .clone()
            }
        };
        slot.lock_owned().await
    }

    /// Drop every session idle for the configured TTL. Returns how many.
    pub async fn sweep_idle(&self, now: DateTime<Utc>) -> usize {
        let removed = self.table.write().await.sweep(now, self.idle_ttl);
        if removed > 0 {
            debug!(removed, "Swept idle sessions");
        }
        removed
    }

    /// A copy of the client's session, if one exists. Waits for any
    /// in-flight turn of that client to commit.
    pub async fn snapshot(&self, client: &ClientId) -> Option<Session> {
        let slot = self.table.read().await.slots.get(client).cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    pub async fn contains(&self, client: &ClientId) -> bool {
        self.table.read().await.slots.contains_key(client)
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.slots.is_empty()
    }
}
