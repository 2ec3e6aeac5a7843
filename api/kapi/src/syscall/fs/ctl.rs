// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Working directory syscalls.

use core::ffi::c_char;

use kcore::task::ProcessData;
use kerrno::{KError, KResult};
use osvm::VirtPtr;

use crate::mm::{UserConstPtr, UserMutPtr, vm_load_string, vm_write_bytes};

/// Changes the working directory.
pub fn sys_chdir(curr: &ProcessData, path: UserConstPtr<c_char>) -> KResult<isize> {
    let kernel = curr.kernel();
    let path = vm_load_string(curr, path, kernel.config().path_max)?;
    debug!("sys_chdir <= {path:?}");

    let cwd = curr.cwd();
    let dir = kernel.vfs().lookup_dir(cwd.as_ref(), &path)?;
    curr.set_cwd(Some(dir));
    Ok(0)
}

/// Copies the working directory path into `buf`.
///
/// The path is not NUL-terminated and is cut at `len` bytes; the return value
/// is the number of bytes copied.
pub fn sys_getcwd(curr: &ProcessData, buf: UserMutPtr<u8>, len: usize) -> KResult<isize> {
    debug!("sys_getcwd <= {buf:?} {len}");
    if buf.is_null() {
        return Err(KError::BadAddress);
    }
    let cwd = curr.cwd().ok_or(KError::NotFound)?;
    let path = curr.kernel().vfs().getcwd(&cwd)?;
    let n = path.len().min(len);
    vm_write_bytes(curr, buf, &path.as_bytes()[..n])?;
    Ok(n as isize)
}
