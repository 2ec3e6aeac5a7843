// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Process creation.

use kcore::task::{ProcessData, UserContext};
use kerrno::KResult;
use kprocess::{Pid, Process};

/// Creates a child process running a copy of the caller.
///
/// The child gets a copy of the address space, a descriptor table sharing
/// the caller's open files and the same working directory, and resumes from
/// `ctx` with a return value of 0. The caller gets the child's pid.
pub fn sys_fork(curr: &ProcessData, ctx: &dyn UserContext) -> KResult<isize> {
    let kernel = curr.kernel();
    let pid = kernel.pids().assign()?;
    debug!("sys_fork <= parent {} child {pid}", curr.pid());

    if let Err(err) = fork_into(curr, ctx, pid) {
        warn!("fork of process {} failed: {err:?}", curr.pid());
        kernel.pids().release(pid);
        return Err(err);
    }
    Ok(pid as isize)
}

fn fork_into(curr: &ProcessData, ctx: &dyn UserContext, pid: Pid) -> KResult {
    let kernel = curr.kernel();

    let mut child_ctx = ctx.try_clone_box()?;
    child_ctx.set_fork_return();
    // a process without an address space forks into one without
    let aspace = curr
        .with_aspace(|aspace| aspace.try_clone())
        .ok()
        .transpose()?;

    let proc = Process::new(pid, kernel.config().pid_count());
    let child = ProcessData::new(
        kernel.clone(),
        proc.clone(),
        &curr.name(),
        curr.fd_table.duplicate(),
        aspace,
        curr.cwd(),
    );

    curr.proc.add_child(proc)?;
    if let Err(err) = kernel.task().spawn_forked(child, child_ctx) {
        curr.proc.unregister_child(pid);
        return Err(err);
    }
    Ok(())
}
