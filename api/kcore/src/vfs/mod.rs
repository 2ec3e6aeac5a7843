// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Interface to the filesystem layer.
//!
//! Path resolution, device nodes and on-disk formats live behind [`Vfs`] and
//! [`VNode`]. The process layer only opens nodes, transfers bytes at explicit
//! offsets and releases them when the last open file object goes away.

mod flags;

use alloc::{string::String, sync::Arc};

use downcast_rs::{DowncastSync, impl_downcast};
pub use flags::{AccessMode, OpenFlags};
use kerrno::KResult;

/// A shared handle to an open filesystem node.
pub type VNodeRef = Arc<dyn VNode>;

/// An object the filesystem layer handed out from [`Vfs::open`] or
/// [`Vfs::lookup_dir`].
pub trait VNode: DowncastSync {
    /// Reads into `buf` starting at byte `offset`. Returns bytes read, 0 at
    /// end of file.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KResult<usize>;

    /// Writes `buf` starting at byte `offset`. Returns bytes written.
    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<usize>;

    /// Current size in bytes.
    fn size(&self) -> KResult<u64>;

    /// Whether the node has a file position. Devices such as the console
    /// do not.
    fn is_seekable(&self) -> bool;

    /// Called once for every open that is closed.
    fn release(&self) {}
}

impl_downcast!(sync VNode);

/// The filesystem layer.
pub trait Vfs: Send + Sync {
    /// Opens `path`, relative to `cwd` unless absolute.
    fn open(
        &self,
        cwd: Option<&VNodeRef>,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> KResult<VNodeRef>;

    /// Resolves `path` to a directory usable as a working directory.
    fn lookup_dir(&self, cwd: Option<&VNodeRef>, path: &str) -> KResult<VNodeRef>;

    /// Absolute path of directory `dir`.
    fn getcwd(&self, dir: &VNodeRef) -> KResult<String>;
}
