use alloc::{sync::Arc, vec, vec::Vec};
use core::fmt;

use kerrno::{KError, KResult};
use spin::Mutex;

use super::OpenFile;
use crate::vfs::{OpenFlags, VNodeRef, Vfs};

/// A process's descriptor table.
///
/// Descriptor `fd` names slot `fd`. Every occupied slot holds one reference
/// to an [`OpenFile`]. Files displaced from the table are dropped after the
/// table lock is released, since dropping the last reference calls into the
/// filesystem.
pub struct FdTable {
    slots: Mutex<Vec<Option<Arc<OpenFile>>>>,
}

impl FdTable {
    /// Creates a table with `open_max` empty slots.
    pub fn new(open_max: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; open_max]),
        }
    }

    /// Creates a table whose descriptors 0, 1 and 2 are the console opened
    /// read-only, write-only and write-only.
    pub fn with_stdio(
        vfs: &dyn Vfs,
        cwd: Option<&VNodeRef>,
        console: &str,
        open_max: usize,
    ) -> KResult<Self> {
        let table = Self::new(open_max);
        for flags in [OpenFlags::RDONLY, OpenFlags::WRONLY, OpenFlags::WRONLY] {
            let file = OpenFile::open(vfs, cwd, console, flags, 0o664)?;
            table.place(file)?;
        }
        Ok(table)
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.lock().len()
    }

    /// Number of open descriptors.
    pub fn count(&self) -> usize {
        self.slots.lock().iter().flatten().count()
    }

    /// Installs `file` in the lowest free slot.
    pub fn place(&self, file: Arc<OpenFile>) -> KResult<i32> {
        let mut slots = self.slots.lock();
        let Some(fd) = slots.iter().position(Option::is_none) else {
            warn!("descriptor table full ({} slots)", slots.len());
            return Err(KError::TooManyOpenFiles);
        };
        slots[fd] = Some(file);
        Ok(fd as i32)
    }

    /// Puts `file` (or nothing) in slot `fd` and returns what was there.
    pub fn place_at(&self, fd: i32, file: Option<Arc<OpenFile>>) -> KResult<Option<Arc<OpenFile>>> {
        let mut slots = self.slots.lock();
        let slot = Self::slot_index(&slots, fd).ok_or(KError::BadFileDescriptor)?;
        Ok(core::mem::replace(&mut slots[slot], file))
    }

    /// The file behind `fd`.
    pub fn get(&self, fd: i32) -> KResult<Arc<OpenFile>> {
        let slots = self.slots.lock();
        Self::slot_index(&slots, fd)
            .and_then(|slot| slots[slot].clone())
            .ok_or(KError::BadFileDescriptor)
    }

    /// Empties slot `fd`.
    pub fn close(&self, fd: i32) -> KResult {
        let prev = self
            .place_at(fd, None)?
            .ok_or(KError::BadFileDescriptor)?;
        drop(prev);
        Ok(())
    }

    /// Makes `new_fd` refer to the same file as `old_fd`, closing whatever
    /// `new_fd` held. Returns `new_fd`.
    pub fn dup2(&self, old_fd: i32, new_fd: i32) -> KResult<i32> {
        let mut slots = self.slots.lock();
        let old = Self::slot_index(&slots, old_fd)
            .and_then(|slot| slots[slot].clone())
            .ok_or(KError::BadFileDescriptor)?;
        let new = Self::slot_index(&slots, new_fd).ok_or(KError::BadFileDescriptor)?;
        if old_fd == new_fd {
            return Ok(new_fd);
        }
        let prev = slots[new].replace(old);
        drop(slots);
        drop(prev);
        Ok(new_fd)
    }

    /// Copies the table for a forked child. Both tables refer to the same
    /// open files.
    pub fn duplicate(&self) -> Self {
        Self {
            slots: Mutex::new(self.slots.lock().clone()),
        }
    }

    /// Closes every descriptor.
    pub fn close_all(&self) {
        let closed = {
            let mut slots = self.slots.lock();
            let capacity = slots.len();
            core::mem::replace(&mut *slots, vec![None; capacity])
        };
        debug!("closing {} descriptors", closed.iter().flatten().count());
        drop(closed);
    }

    fn slot_index(slots: &[Option<Arc<OpenFile>>], fd: i32) -> Option<usize> {
        usize::try_from(fd).ok().filter(|&slot| slot < slots.len())
    }
}

impl fmt::Debug for FdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        let open: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter_map(|(fd, slot)| slot.as_ref().map(|_| fd))
            .collect();
        f.debug_struct("FdTable")
            .field("capacity", &slots.len())
            .field("open", &open)
            .finish_non_exhaustive()
    }
}
