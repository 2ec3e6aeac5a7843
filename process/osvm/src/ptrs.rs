// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Virtual pointer helpers for safe user memory access.
use core::{fmt, marker::PhantomData, slice};

use bytemuck::{Pod, Zeroable};

use crate::{MemResult, VirtMemIo, read_vm_mem, write_vm_mem};

/// A user pointer to data the kernel only reads.
pub struct UserConstPtr<T> {
    addr: usize,
    _marker: PhantomData<*const T>,
}

/// A user pointer the kernel may write through.
pub struct UserMutPtr<T> {
    addr: usize,
    _marker: PhantomData<*mut T>,
}

macro_rules! impl_user_ptr {
    ($name:ident) => {
        impl<T> $name<T> {
            /// Wraps a raw user address.
            pub const fn new(addr: usize) -> Self {
                Self {
                    addr,
                    _marker: PhantomData,
                }
            }

            /// The null user pointer.
            pub const fn null() -> Self {
                Self::new(0)
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.addr)
            }
        }

        impl<T> From<usize> for $name<T> {
            fn from(addr: usize) -> Self {
                Self::new(addr)
            }
        }

        // SAFETY: a user pointer is only an address; it is never dereferenced
        // outside `VirtMemIo`.
        unsafe impl<T> Send for $name<T> {}
        unsafe impl<T> Sync for $name<T> {}

        impl<T> VirtPtr for $name<T> {
            type Target = T;

            fn addr(self) -> usize {
                self.addr
            }
        }
    };
}

impl_user_ptr!(UserConstPtr);
impl_user_ptr!(UserMutPtr);

/// Read-only virtual pointer access helpers.
pub trait VirtPtr: Copy {
    /// Type of the pointee.
    type Target;

    /// Returns the user address.
    fn addr(self) -> usize;

    /// Whether the pointer is null.
    fn is_null(self) -> bool {
        self.addr() == 0
    }

    /// Returns `None` if the pointer is null.
    fn check_non_null(self) -> Option<Self> {
        if self.is_null() { None } else { Some(self) }
    }

    /// Read a typed value from user memory.
    fn read_vm(self, mem: &(impl VirtMemIo + ?Sized)) -> MemResult<Self::Target>
    where
        Self::Target: Pod,
    {
        let mut value = <Self::Target as Zeroable>::zeroed();
        read_vm_mem(mem, self.addr(), slice::from_mut(&mut value))?;
        Ok(value)
    }
}

/// Mutable virtual pointer access helpers.
pub trait VirtMutPtr: VirtPtr {
    /// Write a typed value to user memory.
    fn write_vm(self, mem: &(impl VirtMemIo + ?Sized), v: Self::Target) -> MemResult
    where
        Self::Target: Pod,
    {
        write_vm_mem(mem, self.addr(), slice::from_ref(&v))
    }
}

impl<T> VirtMutPtr for UserMutPtr<T> {}
