use alloc::{sync::Arc, vec::Vec};

use kerrno::{KError, KResult};
use spin::Mutex;

use crate::{Pid, Process};

/// A parent's table of live children.
///
/// Entries sit in the first free slot and are found by linear scan. A child
/// is removed only when its parent reaps it.
pub struct ChildTable {
    capacity: usize,
    slots: Mutex<Vec<Option<Arc<Process>>>>,
}

impl ChildTable {
    /// Creates an empty table holding at most `capacity` children.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Inserts `child` into the first free slot and returns the slot index.
    pub fn register(&self, child: Arc<Process>) -> KResult<usize> {
        let mut slots = self.slots.lock();
        if let Some(idx) = slots.iter().position(Option::is_none) {
            slots[idx] = Some(child);
            return Ok(idx);
        }
        if slots.len() >= self.capacity {
            warn!("child table full ({} entries)", self.capacity);
            return Err(KError::TooManyProcesses);
        }
        slots.push(Some(child));
        Ok(slots.len() - 1)
    }

    /// Looks up the child with `pid`, returning its slot and record.
    pub fn find(&self, pid: Pid) -> Option<(usize, Arc<Process>)> {
        self.slots
            .lock()
            .iter()
            .enumerate()
            .find_map(|(idx, slot)| match slot {
                Some(child) if child.pid() == pid => Some((idx, child.clone())),
                _ => None,
            })
    }

    pub(crate) fn remove(&self, pid: Pid) -> Option<Arc<Process>> {
        let mut slots = self.slots.lock();
        let slot = slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|child| child.pid() == pid))?;
        slot.take()
    }

    /// Number of registered children.
    pub fn len(&self) -> usize {
        self.slots.lock().iter().flatten().count()
    }

    /// Whether no child is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pids of the registered children, in slot order.
    pub fn pids(&self) -> Vec<Pid> {
        self.slots
            .lock()
            .iter()
            .flatten()
            .map(|child| child.pid())
            .collect()
    }
}
