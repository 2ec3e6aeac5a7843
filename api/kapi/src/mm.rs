// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Copying between kernel buffers and the caller's address space.

use alloc::{string::String, vec, vec::Vec};
use core::ffi::c_char;

use kcore::task::ProcessData;
use kerrno::{KError, KResult};
pub use osvm::{UserConstPtr, UserMutPtr};
use osvm::{VirtPtr, load_vec_until_null, read_vm_mem, write_vm_mem};

/// Loads a NUL-terminated string of at most `max` bytes, terminator
/// included.
///
/// Fails with `BadAddress` for a null or unmapped pointer and with
/// `NameTooLong` if no terminator is found in time.
pub fn vm_load_string(
    curr: &ProcessData,
    ptr: UserConstPtr<c_char>,
    max: usize,
) -> KResult<String> {
    let ptr = ptr.check_non_null().ok_or(KError::BadAddress)?;
    let bytes = curr.with_aspace(|aspace| {
        load_vec_until_null::<u8>(&*aspace, ptr.addr(), max.saturating_sub(1))
    })??;
    String::from_utf8(bytes).map_err(|_| KError::InvalidInput)
}

/// Copies `len` bytes in from `ptr`.
pub fn vm_read_bytes(curr: &ProcessData, ptr: UserConstPtr<u8>, len: usize) -> KResult<Vec<u8>> {
    let ptr = ptr.check_non_null().ok_or(KError::BadAddress)?;
    let mut buf = vec![0; len];
    curr.with_aspace(|aspace| read_vm_mem(&*aspace, ptr.addr(), &mut buf))??;
    Ok(buf)
}

/// Copies `data` out to `ptr`.
pub fn vm_write_bytes(curr: &ProcessData, ptr: UserMutPtr<u8>, data: &[u8]) -> KResult {
    let ptr = ptr.check_non_null().ok_or(KError::BadAddress)?;
    curr.with_aspace(|aspace| write_vm_mem(&*aspace, ptr.addr(), data))??;
    Ok(())
}
