// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Interface to the memory manager and the program loader.

use alloc::boxed::Box;

use kerrno::KResult;
use osvm::VirtMemIo;

use crate::vfs::VNode;

/// A user address space.
///
/// Dropping it tears down every mapping.
pub trait AddrSpace: VirtMemIo {
    /// Duplicates the address space for a forked child.
    fn try_clone(&self) -> KResult<Box<dyn AddrSpace>>;

    /// Maps the user stack and returns the initial stack pointer.
    fn define_stack(&mut self) -> KResult<usize>;

    /// Makes this address space the one the current CPU translates through.
    fn activate(&self);
}

/// Creates empty address spaces.
pub trait MemoryManager: Send + Sync {
    /// Returns a new address space with no user mappings.
    fn create_addr_space(&self) -> KResult<Box<dyn AddrSpace>>;
}

/// Loads executable images.
pub trait ProgramLoader: Send + Sync {
    /// Maps the program read from `image` into `aspace` and returns its
    /// entry point.
    fn load(&self, image: &dyn VNode, aspace: &mut dyn AddrSpace) -> KResult<usize>;
}
