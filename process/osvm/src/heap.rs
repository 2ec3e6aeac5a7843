// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Loading variable-length user data into kernel buffers.
extern crate alloc;

use alloc::{vec, vec::Vec};
use core::slice;

use bytemuck::{Pod, Zeroable};

use crate::{MemError, MemResult, VirtMemIo, read_vm_mem};

/// Load `len` elements starting at user address `addr`.
pub fn load_vec<T: Pod>(
    mem: &(impl VirtMemIo + ?Sized),
    addr: usize,
    len: usize,
) -> MemResult<Vec<T>> {
    let mut buf = vec![<T as Zeroable>::zeroed(); len];
    read_vm_mem(mem, addr, &mut buf)?;
    Ok(buf)
}

/// Load elements from `addr` up to (not including) the first zero element.
///
/// At most `max` elements are accepted before the terminator; a longer run
/// fails with [`MemError::NameTooLong`]. Elements are read one at a time so a
/// terminator right before an unmapped page is found without faulting.
pub fn load_vec_until_null<T: Pod + PartialEq>(
    mem: &(impl VirtMemIo + ?Sized),
    addr: usize,
    max: usize,
) -> MemResult<Vec<T>> {
    if addr == 0 {
        return Err(MemError::InvalidAddr);
    }
    let zero = <T as Zeroable>::zeroed();
    let mut buf = Vec::new();
    let mut cur = addr;
    loop {
        let mut elem = <T as Zeroable>::zeroed();
        read_vm_mem(mem, cur, slice::from_mut(&mut elem))?;
        if elem == zero {
            return Ok(buf);
        }
        if buf.len() == max {
            return Err(MemError::NameTooLong);
        }
        buf.push(elem);
        cur = cur
            .checked_add(size_of::<T>())
            .ok_or(MemError::InvalidAddr)?;
    }
}
