// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Helpers for reading/writing user virtual memory.
//!
//! User addresses are plain integers interpreted by an address space that
//! implements [`VirtMemIo`]; nothing here dereferences them directly.
#![no_std]

use core::mem::align_of;

use bytemuck::Pod;
use kerrno::KError;

/// Errors returned by virtual memory access helpers.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemError {
    /// The address is misaligned, null or outside the user range.
    InvalidAddr,
    /// The range is not mapped with the required permission.
    NoAccess,
    /// A null-terminated load ran past its bound.
    #[cfg(feature = "alloc")]
    NameTooLong,
}

impl From<MemError> for KError {
    fn from(e: MemError) -> Self {
        match e {
            MemError::InvalidAddr | MemError::NoAccess => KError::BadAddress,
            #[cfg(feature = "alloc")]
            MemError::NameTooLong => KError::NameTooLong,
        }
    }
}

/// Result type for virtual memory operations.
pub type MemResult<T = ()> = Result<T, MemError>;

/// Byte-level access to one user address space.
pub trait VirtMemIo: Send + Sync {
    /// Copies `out.len()` bytes starting at user address `addr` into `out`.
    fn read_mem(&self, addr: usize, out: &mut [u8]) -> MemResult;
    /// Copies `src` to user address `addr`.
    fn write_mem(&self, addr: usize, src: &[u8]) -> MemResult;
}

/// Read a typed slice from virtual memory.
pub fn read_vm_mem<T: Pod>(
    mem: &(impl VirtMemIo + ?Sized),
    addr: usize,
    out: &mut [T],
) -> MemResult {
    if addr % align_of::<T>() != 0 {
        return Err(MemError::InvalidAddr);
    }
    mem.read_mem(addr, bytemuck::cast_slice_mut(out))
}

/// Write a typed slice to virtual memory.
pub fn write_vm_mem<T: Pod>(mem: &(impl VirtMemIo + ?Sized), addr: usize, src: &[T]) -> MemResult {
    if addr % align_of::<T>() != 0 {
        return Err(MemError::InvalidAddr);
    }
    mem.write_mem(addr, bytemuck::cast_slice(src))
}

mod ptrs;
pub use ptrs::{UserConstPtr, UserMutPtr, VirtMutPtr, VirtPtr};

#[cfg(feature = "alloc")]
mod heap;
#[cfg(feature = "alloc")]
pub use heap::{load_vec, load_vec_until_null};
