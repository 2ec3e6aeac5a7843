// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! User processes and the thread layer beneath them.

mod kernel;
mod process_data;

use alloc::{boxed::Box, sync::Arc};

use kerrno::KResult;
pub use kernel::{Kernel, KernelServices};
pub use process_data::ProcessData;

/// The saved user register state of a thread that entered the kernel.
pub trait UserContext: Send {
    /// Duplicates the context for a forked child.
    fn try_clone_box(&self) -> KResult<Box<dyn UserContext>>;

    /// Adjusts a duplicated context so that the child sees `fork` return 0
    /// and resumes after the system call.
    fn set_fork_return(&mut self);
}

/// Where a freshly loaded program starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEntry {
    /// Program entry point.
    pub entry: usize,
    /// Initial stack pointer.
    pub stack: usize,
    /// Number of arguments.
    pub argc: usize,
    /// User address of the argument pointer array.
    pub argv: usize,
}

/// The thread layer.
pub trait TaskOps: Send + Sync {
    /// Starts a thread for the forked process `child` that resumes user
    /// mode from `ctx`.
    fn spawn_forked(&self, child: Arc<ProcessData>, ctx: Box<dyn UserContext>) -> KResult;

    /// Leaves the kernel into a freshly loaded program on the current
    /// thread.
    fn enter_user(&self, entry: UserEntry) -> !;

    /// Terminates the current thread.
    fn exit_current(&self) -> !;
}
