use alloc::vec;
use alloc::vec::Vec;

use kerrno::{KError, KResult};
use spin::Mutex;

use crate::Pid;

/// Allocator for process identities in `[min, max]`.
///
/// Identities below `min` belong to the kernel and the bootstrap process and
/// are never handed out. Allocation always picks the lowest free pid.
pub struct PidTable {
    min: Pid,
    max: Pid,
    used: Mutex<Vec<bool>>,
}

impl PidTable {
    /// Creates a table handing out pids in `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if `min` is zero or the range is empty.
    pub fn new(min: Pid, max: Pid) -> Self {
        assert!(min > 0 && min <= max, "invalid pid range [{min}, {max}]");
        let mut used = vec![false; max as usize + 1];
        used[..min as usize].fill(true);
        Self {
            min,
            max,
            used: Mutex::new(used),
        }
    }

    /// Lowest pid this table hands out.
    pub fn min(&self) -> Pid {
        self.min
    }

    /// Highest pid this table hands out.
    pub fn max(&self) -> Pid {
        self.max
    }

    /// Whether `pid` lies in the assignable range.
    pub fn contains(&self, pid: Pid) -> bool {
        (self.min..=self.max).contains(&pid)
    }

    /// Marks the lowest free pid as used and returns it.
    pub fn assign(&self) -> KResult<Pid> {
        let mut used = self.used.lock();
        let slot = used[self.min as usize..]
            .iter()
            .position(|used| !used)
            .ok_or_else(|| {
                warn!("pid space [{}, {}] exhausted", self.min, self.max);
                KError::TooManyProcesses
            })?;
        let pid = self.min as usize + slot;
        used[pid] = true;
        Ok(pid as Pid)
    }

    /// Returns `pid` to the free pool.
    ///
    /// Releasing a reserved or unassigned pid is ignored.
    pub fn release(&self, pid: Pid) {
        if !self.contains(pid) {
            warn!("refusing to release reserved pid {pid}");
            return;
        }
        let mut used = self.used.lock();
        if !core::mem::replace(&mut used[pid as usize], false) {
            warn!("pid {pid} released twice");
        }
    }

    /// Whether `pid` is currently held by a process (or reserved).
    pub fn is_assigned(&self, pid: Pid) -> bool {
        self.used
            .lock()
            .get(pid as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Number of pids in `[min, max]` currently handed out.
    pub fn in_use(&self) -> usize {
        self.used.lock()[self.min as usize..]
            .iter()
            .filter(|used| **used)
            .count()
    }
}
