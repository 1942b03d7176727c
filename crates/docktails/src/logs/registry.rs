//! Registry — at most one live tail session per container id.
//!
//! Every claim carries the generation of the Docker connection that
//! discovered the container. A second claim from the same generation is
//! refused unless it comes from a start event, which always means a new
//! process. A claim from a newer generation replaces the slot and aborts the
//! session left over from the old connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::AbortHandle;

/// How a claim treats a live session from the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    /// Listing found the container; leave an existing session alone.
    Keep,
    /// A start event: the old session follows a process that has exited.
    Replace,
}

#[derive(Debug)]
struct Slot {
    serial: u64,
    generation: u64,
    abort: Option<AbortHandle>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: DashMap<String, Slot>,
    serial: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the slot for `container_id`. `None` if a session from the
    /// same or a newer generation already holds it.
    pub fn claim(self: &Arc<Self>, container_id: &str, generation: u64) -> Option<SessionGuard> {
        self.claim_with(container_id, generation, ClaimMode::Keep)
    }

    /// Like [`claim`](Self::claim), but [`ClaimMode::Replace`] also takes
    /// over a slot held by the same generation. Only a newer generation
    /// blocks it.
    pub fn claim_with(
        self: &Arc<Self>,
        container_id: &str,
        generation: u64,
        mode: ClaimMode,
    ) -> Option<SessionGuard> {
        let serial = self.serial.fetch_add(1, Ordering::Relaxed) + 1;
        let fresh = Slot { serial, generation, abort: None };

        let stale = match self.slots.entry(container_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let held = entry.get().generation;
                let blocked = match mode {
                    ClaimMode::Keep => held >= generation,
                    ClaimMode::Replace => held > generation,
                };
                if blocked {
                    return None;
                }
                std::mem::replace(entry.get_mut(), fresh).abort
            }
            Entry::Vacant(entry) => {
                entry.insert(fresh);
                None
            }
        };

        // Abort outside the shard lock; the stale guard's drop takes it again.
        if let Some(handle) = stale {
            tracing::debug!(container = %crate::docker::short_id(container_id), "superseding stale session");
            handle.abort();
        }

        Some(SessionGuard {
            registry: Arc::clone(self),
            container_id: container_id.to_string(),
            serial,
        })
    }

    /// Record the task holding the slot so a newer connection can abort it.
    /// No-op if the slot has already moved on.
    pub fn attach(&self, container_id: &str, serial: u64, handle: AbortHandle) {
        if let Some(mut slot) = self.slots.get_mut(container_id) {
            if slot.serial == serial {
                slot.abort = Some(handle);
            }
        }
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.slots.contains_key(container_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Releases the slot on drop, unless a newer claim has taken it over.
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    container_id: String,
    serial: u64,
}

impl SessionGuard {
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let serial = self.serial;
        self.registry
            .slots
            .remove_if(&self.container_id, |_, slot| slot.serial == serial);
    }
}
