// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! File I/O syscalls.
//!
//! Data moves through a kernel buffer of at most `io_max` bytes, so a larger
//! request completes short.

use alloc::vec;
use core::ffi::c_int;

use kcore::{file::SeekFrom, task::ProcessData};
use kerrno::{KError, KResult};
use linux_raw_sys::general::__kernel_off_t;
use osvm::VirtPtr;

use crate::mm::{UserConstPtr, UserMutPtr, vm_read_bytes, vm_write_bytes};

/// Read data from the file indicated by `fd`.
///
/// Return the read size if success.
pub fn sys_read(curr: &ProcessData, fd: c_int, buf: UserMutPtr<u8>, len: usize) -> KResult<isize> {
    debug!("sys_read <= fd: {fd}, buf: {buf:?}, len: {len}");
    let file = curr.fd_table.get(fd)?;
    if !file.access_mode().readable() {
        return Err(KError::BadFileDescriptor);
    }
    if buf.is_null() {
        return Err(KError::BadAddress);
    }
    let mut kbuf = vec![0; len.min(curr.kernel().config().io_max)];
    let n = file.read_with(&mut kbuf, |data| vm_write_bytes(curr, buf, data))?;
    Ok(n as isize)
}

/// Write data to the file indicated by `fd`.
///
/// Return the written size if success.
pub fn sys_write(
    curr: &ProcessData,
    fd: c_int,
    buf: UserConstPtr<u8>,
    len: usize,
) -> KResult<isize> {
    debug!("sys_write <= fd: {fd}, buf: {buf:?}, len: {len}");
    let file = curr.fd_table.get(fd)?;
    if !file.access_mode().writable() {
        return Err(KError::BadFileDescriptor);
    }
    let kbuf = vm_read_bytes(curr, buf, len.min(curr.kernel().config().io_max))?;
    Ok(file.write(&kbuf)? as isize)
}

/// Repositions the read/write file offset.
pub fn sys_lseek(
    curr: &ProcessData,
    fd: c_int,
    offset: __kernel_off_t,
    whence: c_int,
) -> KResult<isize> {
    debug!("sys_lseek <= {fd} {offset} {whence}");
    let file = curr.fd_table.get(fd)?;
    if !file.node().is_seekable() {
        return Err(KError::NotSeekable);
    }
    let pos = SeekFrom::from_whence(offset as i64, whence as u32)?;
    let off = file.seek(pos)?;
    Ok(off as isize)
}
