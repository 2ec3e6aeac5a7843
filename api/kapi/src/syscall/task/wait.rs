// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Waiting for children.

use kcore::task::ProcessData;
use kerrno::{KError, KResult};
use kprocess::Pid;
use osvm::{VirtMutPtr, VirtPtr};

use crate::mm::UserMutPtr;

/// Waits for child `pid` to exit, stores its status through `status` and
/// reaps it.
///
/// No option bits are supported. A null `status` skips the copy. If the copy
/// faults the child is left unreaped so a later wait can still collect it.
pub fn sys_waitpid(
    curr: &ProcessData,
    pid: i32,
    status: UserMutPtr<i32>,
    options: u32,
) -> KResult<isize> {
    debug!("sys_waitpid <= pid: {pid}, status: {status:?}, options: {options:#x}");
    if options != 0 {
        return Err(KError::InvalidInput);
    }
    if curr.proc.children().is_none() {
        return Err(KError::NoSuchProcess);
    }
    let pid = Pid::try_from(pid).map_err(|_| KError::NoChildProcess)?;
    let pids = curr.kernel().pids();

    let (_child, exit_status) = curr.proc.wait_child(pid, pids)?;
    if let Some(status) = status.check_non_null() {
        curr.with_aspace(|aspace| status.write_vm(&*aspace, exit_status.raw()))??;
    }
    curr.proc.reap_child(pid, pids)?;
    Ok(pid as isize)
}
