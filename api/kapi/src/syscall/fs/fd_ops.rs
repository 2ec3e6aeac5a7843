// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Descriptor management syscalls.

use core::ffi::{c_char, c_int};

use kcore::{file::OpenFile, task::ProcessData, vfs::OpenFlags};
use kerrno::KResult;

use crate::mm::{UserConstPtr, vm_load_string};

/// Opens `path` and installs the new open file in the lowest free
/// descriptor.
pub fn sys_open(
    curr: &ProcessData,
    path: UserConstPtr<c_char>,
    flags: u32,
    mode: u32,
) -> KResult<isize> {
    let flags = OpenFlags::from_user(flags)?;
    let kernel = curr.kernel();
    let path = vm_load_string(curr, path, kernel.config().path_max)?;
    debug!("sys_open <= {path:?} {flags:?} {mode:#o}");

    let cwd = curr.cwd();
    let file = OpenFile::open(kernel.vfs(), cwd.as_ref(), &path, flags, mode)?;
    let fd = curr.fd_table.place(file)?;
    Ok(fd as isize)
}

/// Closes `fd`.
pub fn sys_close(curr: &ProcessData, fd: c_int) -> KResult<isize> {
    debug!("sys_close <= {fd}");
    curr.fd_table.close(fd)?;
    Ok(0)
}

/// Makes `new_fd` refer to the open file behind `old_fd`.
pub fn sys_dup2(curr: &ProcessData, old_fd: c_int, new_fd: c_int) -> KResult<isize> {
    debug!("sys_dup2 <= old_fd: {old_fd}, new_fd: {new_fd}");
    Ok(curr.fd_table.dup2(old_fd, new_fd)? as isize)
}
