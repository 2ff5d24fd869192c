use crate::state::RepoState;
use crate::types::RepoId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Slot = Arc<RwLock<Arc<RepoState>>>;

/// Published repository snapshots, one lock-guarded slot per repository.
///
/// Locks are held only to clone or swap an `Arc`, never across I/O. A reader
/// therefore sees either the previous snapshot or the next one in full.
#[derive(Debug, Default)]
pub struct StateStore {
    slots: RwLock<HashMap<RepoId, Slot>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RepoId) -> Option<Arc<RepoState>> {
        let slot = read(&self.slots).get(&id).cloned()?;
        let snapshot = Arc::clone(&read(&slot));
        Some(snapshot)
    }

    /// Replaces the published snapshot for `id`.
    pub fn publish(&self, id: RepoId, state: RepoState) -> Arc<RepoState> {
        let state = Arc::new(state);
        let existing = read(&self.slots).get(&id).cloned();
        match existing {
            Some(slot) => *write(&slot) = Arc::clone(&state),
            None => {
                write(&self.slots)
                    .entry(id)
                    .and_modify(|slot| *write(slot) = Arc::clone(&state))
                    .or_insert_with(|| Arc::new(RwLock::new(Arc::clone(&state))));
            }
        }
        state
    }

    /// All published snapshots, ordered by `owner/name`.
    pub fn snapshots(&self) -> Vec<Arc<RepoState>> {
        let slots: Vec<Slot> = read(&self.slots).values().cloned().collect();
        let mut snapshots: Vec<Arc<RepoState>> =
            slots.iter().map(|slot| Arc::clone(&read(slot))).collect();
        snapshots.sort_by(|a, b| {
            (&a.repo.owner, &a.repo.name).cmp(&(&b.repo.owner, &b.repo.name))
        });
        snapshots
    }

    pub fn find(&self, owner: &str, name: &str) -> Option<Arc<RepoState>> {
        self.snapshots()
            .into_iter()
            .find(|state| state.repo.owner == owner && state.repo.name == name)
    }
}

// A panicking holder can only have been mid-clone or mid-swap of an `Arc`,
// which leaves the guarded value intact.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
