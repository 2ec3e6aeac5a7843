use bitflags::bitflags;
use kerrno::{KError, KResult};
use linux_raw_sys::general::{
    O_ACCMODE, O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY,
};

bitflags! {
    /// Flags accepted by `open`.
    ///
    /// Read-only access is the absence of both access bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open for writing only.
        const WRONLY = O_WRONLY;
        /// Open for reading and writing.
        const RDWR = O_RDWR;
        /// Create the file if it does not exist.
        const CREAT = O_CREAT;
        /// With `CREAT`, fail if the file exists.
        const EXCL = O_EXCL;
        /// Truncate to zero length.
        const TRUNC = O_TRUNC;
        /// Every write goes to the end of the file.
        const APPEND = O_APPEND;
    }
}

impl OpenFlags {
    /// Read-only open.
    pub const RDONLY: Self = Self::empty();

    /// Parses flags passed from user space.
    ///
    /// Unknown bits and the unused access mode `3` are rejected.
    pub fn from_user(bits: u32) -> KResult<Self> {
        let flags = Self::from_bits(bits).ok_or(KError::InvalidInput)?;
        flags.access_mode()?;
        Ok(flags)
    }

    /// The access mode encoded in the low bits.
    pub fn access_mode(self) -> KResult<AccessMode> {
        match self.bits() & O_ACCMODE {
            O_RDONLY => Ok(AccessMode::ReadOnly),
            O_WRONLY => Ok(AccessMode::WriteOnly),
            O_RDWR => Ok(AccessMode::ReadWrite),
            _ => Err(KError::InvalidInput),
        }
    }
}

/// How an open file object may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// `O_RDONLY`.
    ReadOnly,
    /// `O_WRONLY`.
    WriteOnly,
    /// `O_RDWR`.
    ReadWrite,
}

impl AccessMode {
    /// Whether `read` is allowed.
    pub fn readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Whether `write` is allowed.
    pub fn writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}
