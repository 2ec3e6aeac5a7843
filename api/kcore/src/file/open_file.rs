use alloc::sync::Arc;
use core::fmt;

use kerrno::{KError, KResult};
use linux_raw_sys::general::{SEEK_CUR, SEEK_END, SEEK_SET};
use spin::Mutex;

use crate::vfs::{AccessMode, OpenFlags, VNodeRef, Vfs};

/// Target of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Start(u64),
    Current(i64),
    End(i64),
}

impl SeekFrom {
    /// Decodes an `lseek` request.
    ///
    /// A negative absolute offset and an unknown `whence` are both invalid.
    pub fn from_whence(offset: i64, whence: u32) -> KResult<Self> {
        match whence {
            SEEK_SET => u64::try_from(offset)
                .map(Self::Start)
                .map_err(|_| KError::InvalidInput),
            SEEK_CUR => Ok(Self::Current(offset)),
            SEEK_END => Ok(Self::End(offset)),
            _ => Err(KError::InvalidInput),
        }
    }
}

/// An opened file: the node, how it was opened and the shared position.
///
/// Descriptors refer to it through an `Arc`, so descriptors duplicated with
/// `dup2` or inherited across `fork` share one offset. The node is released
/// when the last reference is dropped.
pub struct OpenFile {
    node: VNodeRef,
    mode: AccessMode,
    append: bool,
    offset: Mutex<u64>,
}

impl OpenFile {
    /// Wraps an already opened node.
    pub fn new(node: VNodeRef, mode: AccessMode, append: bool) -> Arc<Self> {
        Arc::new(Self {
            node,
            mode,
            append,
            offset: Mutex::new(0),
        })
    }

    /// Opens `path` through `vfs` and wraps the result.
    pub fn open(
        vfs: &dyn Vfs,
        cwd: Option<&VNodeRef>,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> KResult<Arc<Self>> {
        let access = flags.access_mode()?;
        let node = vfs.open(cwd, path, flags, mode)?;
        Ok(Self::new(node, access, flags.contains(OpenFlags::APPEND)))
    }

    /// The underlying node.
    pub fn node(&self) -> &VNodeRef {
        &self.node
    }

    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    /// Current position. Always 0 for objects without one.
    pub fn offset(&self) -> u64 {
        *self.offset.lock()
    }

    /// Reads at the current position and advances it.
    pub fn read(&self, buf: &mut [u8]) -> KResult<usize> {
        self.read_with(buf, |_| Ok(()))
    }

    /// Reads at the current position and passes the data to `deliver`.
    ///
    /// The position only advances if `deliver` succeeds, so a failed copy to
    /// the caller leaves the data to be read again. Objects without a
    /// position consume the data either way.
    pub fn read_with(
        &self,
        buf: &mut [u8],
        deliver: impl FnOnce(&[u8]) -> KResult,
    ) -> KResult<usize> {
        if !self.mode.readable() {
            return Err(KError::BadFileDescriptor);
        }
        if buf.is_empty() {
            deliver(&[])?;
            return Ok(0);
        }
        if !self.node.is_seekable() {
            let n = self.node.read_at(0, buf)?;
            deliver(&buf[..n])?;
            return Ok(n);
        }
        let mut offset = self.offset.lock();
        let n = self.node.read_at(*offset, buf)?;
        deliver(&buf[..n])?;
        *offset += n as u64;
        Ok(n)
    }

    /// Writes at the current position, or at the end in append mode, and
    /// advances the position.
    pub fn write(&self, buf: &[u8]) -> KResult<usize> {
        if !self.mode.writable() {
            return Err(KError::BadFileDescriptor);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if !self.node.is_seekable() {
            return self.node.write_at(0, buf);
        }
        let mut offset = self.offset.lock();
        if self.append {
            *offset = self.node.size()?;
        }
        let n = self.node.write_at(*offset, buf)?;
        *offset += n as u64;
        Ok(n)
    }

    /// Moves the position and returns the new one.
    ///
    /// On failure the position is left unchanged.
    pub fn seek(&self, pos: SeekFrom) -> KResult<u64> {
        if !self.node.is_seekable() {
            return Err(KError::NotSeekable);
        }
        let mut offset = self.offset.lock();
        let new = match pos {
            SeekFrom::Start(off) => Some(off),
            SeekFrom::Current(delta) => offset.checked_add_signed(delta),
            SeekFrom::End(delta) => self.node.size()?.checked_add_signed(delta),
        };
        let new = new
            .filter(|&off| i64::try_from(off).is_ok())
            .ok_or(KError::InvalidInput)?;
        *offset = new;
        Ok(new)
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        trace!("releasing open file {:?}", self.mode);
        self.node.release();
    }
}

impl fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenFile")
            .field("mode", &self.mode)
            .field("append", &self.append)
            .field("offset", &self.offset())
            .finish_non_exhaustive()
    }
}
