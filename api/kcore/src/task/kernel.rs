use alloc::sync::Arc;

use kerrno::KResult;
use kprocess::{Pid, PidTable, Process};

use super::{ProcessData, TaskOps};
use crate::{
    config::KernelConfig,
    file::FdTable,
    mm::{MemoryManager, ProgramLoader},
    vfs::Vfs,
};

/// The collaborators a [`Kernel`] drives.
#[derive(Clone)]
pub struct KernelServices {
    pub vfs: Arc<dyn Vfs>,
    pub mm: Arc<dyn MemoryManager>,
    pub loader: Arc<dyn ProgramLoader>,
    pub task: Arc<dyn TaskOps>,
}

/// State shared by every process: the limits, the pid registry and the
/// collaborators.
pub struct Kernel {
    config: KernelConfig,
    pids: PidTable,
    services: KernelServices,
}

impl Kernel {
    /// Creates the kernel context.
    ///
    /// # Panics
    ///
    /// Panics if `config` is not valid.
    pub fn new(config: KernelConfig, services: KernelServices) -> Arc<Self> {
        assert!(config.is_valid(), "invalid kernel config: {config:?}");
        info!(
            "kernel: pids {}..={}, {} descriptors per process",
            config.pid_min, config.pid_max, config.open_max
        );
        Arc::new(Self {
            pids: PidTable::new(config.pid_min, config.pid_max),
            config,
            services,
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The pid registry.
    pub fn pids(&self) -> &PidTable {
        &self.pids
    }

    pub fn vfs(&self) -> &dyn Vfs {
        &*self.services.vfs
    }

    pub fn mm(&self) -> &dyn MemoryManager {
        &*self.services.mm
    }

    pub fn loader(&self) -> &dyn ProgramLoader {
        &*self.services.loader
    }

    pub fn task(&self) -> &dyn TaskOps {
        &*self.services.task
    }

    /// Creates the first user process: a fresh pid, the console on
    /// descriptors 0 to 2 and an empty address space.
    pub fn create_user_process(self: &Arc<Self>, name: &str) -> KResult<Arc<ProcessData>> {
        let pid = self.pids.assign()?;
        let data = self.build_user_process(pid, name);
        if data.is_err() {
            self.pids.release(pid);
        }
        data
    }

    fn build_user_process(self: &Arc<Self>, pid: Pid, name: &str) -> KResult<Arc<ProcessData>> {
        let fd_table = FdTable::with_stdio(
            self.vfs(),
            None,
            self.config.console_path,
            self.config.open_max,
        )?;
        let aspace = self.mm().create_addr_space()?;
        let proc = Process::new(pid, self.config.pid_count());
        info!("created user process {pid} ({name})");
        Ok(ProcessData::new(
            self.clone(),
            proc,
            name,
            fd_table,
            Some(aspace),
            None,
        ))
    }
}
