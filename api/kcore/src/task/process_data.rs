use alloc::{
    borrow::ToOwned,
    boxed::Box,
    string::String,
    sync::Arc,
};
use core::fmt;

use kerrno::{KError, KResult};
use kprocess::{Pid, Process};
use spin::Mutex;

use super::Kernel;
use crate::{file::FdTable, mm::AddrSpace, vfs::VNodeRef};

/// Everything the kernel keeps for one user process.
pub struct ProcessData {
    /// Identity, exit status and children.
    pub proc: Arc<Process>,
    /// Open descriptors.
    pub fd_table: FdTable,
    kernel: Arc<Kernel>,
    name: Mutex<String>,
    aspace: Mutex<Option<Box<dyn AddrSpace>>>,
    cwd: Mutex<Option<VNodeRef>>,
}

impl ProcessData {
    /// Bundles the state of a new process.
    pub fn new(
        kernel: Arc<Kernel>,
        proc: Arc<Process>,
        name: &str,
        fd_table: FdTable,
        aspace: Option<Box<dyn AddrSpace>>,
        cwd: Option<VNodeRef>,
    ) -> Arc<Self> {
        Arc::new(Self {
            proc,
            fd_table,
            kernel,
            name: Mutex::new(name.to_owned()),
            aspace: Mutex::new(aspace),
            cwd: Mutex::new(cwd),
        })
    }

    pub fn pid(&self) -> Pid {
        self.proc.pid()
    }

    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    /// Name of the program the process runs.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    pub fn set_name(&self, name: &str) {
        *self.name.lock() = name.to_owned();
    }

    /// Runs `f` on the address space.
    ///
    /// Fails with `BadAddress` once the address space has been torn down.
    pub fn with_aspace<R>(&self, f: impl FnOnce(&mut dyn AddrSpace) -> R) -> KResult<R> {
        let mut aspace = self.aspace.lock();
        let aspace = aspace.as_deref_mut().ok_or(KError::BadAddress)?;
        Ok(f(aspace))
    }

    /// Whether the process still has an address space.
    pub fn has_aspace(&self) -> bool {
        self.aspace.lock().is_some()
    }

    /// Installs `aspace` and returns the previous one.
    pub fn replace_aspace(&self, aspace: Option<Box<dyn AddrSpace>>) -> Option<Box<dyn AddrSpace>> {
        core::mem::replace(&mut *self.aspace.lock(), aspace)
    }

    /// The working directory, if one was set.
    pub fn cwd(&self) -> Option<VNodeRef> {
        self.cwd.lock().clone()
    }

    /// Replaces the working directory, releasing the old one.
    pub fn set_cwd(&self, dir: Option<VNodeRef>) {
        let old = core::mem::replace(&mut *self.cwd.lock(), dir);
        drop(old);
    }
}

impl fmt::Debug for ProcessData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessData")
            .field("pid", &self.pid())
            .field("name", &*self.name.lock())
            .field("fds", &self.fd_table.count())
            .finish_non_exhaustive()
    }
}
