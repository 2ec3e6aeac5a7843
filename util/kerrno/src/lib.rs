// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel error kinds and their Linux errno encoding.
//!
//! Every fallible kernel operation returns a [`KResult`]. The syscall layer
//! turns the error into a negative errno with [`KError::code`].
#![no_std]

use core::fmt;

use linux_raw_sys::errno;

/// Categorical kernel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KError {
    /// Argument list too long (`E2BIG`).
    ArgumentListTooLong,
    /// An entity already exists (`EEXIST`).
    AlreadyExists,
    /// Bad user address (`EFAULT`).
    BadAddress,
    /// Bad file descriptor (`EBADF`).
    BadFileDescriptor,
    /// Invalid argument (`EINVAL`).
    InvalidInput,
    /// Generic I/O failure reported by a filesystem (`EIO`).
    Io,
    /// Is a directory (`EISDIR`).
    IsADirectory,
    /// File name too long (`ENAMETOOLONG`).
    NameTooLong,
    /// No child process (`ECHILD`).
    NoChildProcess,
    /// Out of memory (`ENOMEM`).
    NoMemory,
    /// No such process (`ESRCH`).
    NoSuchProcess,
    /// No such file or directory (`ENOENT`).
    NotFound,
    /// Not a directory (`ENOTDIR`).
    NotADirectory,
    /// Illegal seek (`ESPIPE`).
    NotSeekable,
    /// Permission denied (`EACCES`).
    PermissionDenied,
    /// Too many open files in this process (`EMFILE`).
    TooManyOpenFiles,
    /// No process identity left to hand out (`EAGAIN`).
    TooManyProcesses,
}

/// A specialized [`Result`] type with [`KError`] as the error type.
pub type KResult<T = ()> = Result<T, KError>;

impl KError {
    /// Returns the positive Linux errno for this error.
    pub const fn code(self) -> i32 {
        let code = match self {
            KError::ArgumentListTooLong => errno::E2BIG,
            KError::AlreadyExists => errno::EEXIST,
            KError::BadAddress => errno::EFAULT,
            KError::BadFileDescriptor => errno::EBADF,
            KError::InvalidInput => errno::EINVAL,
            KError::Io => errno::EIO,
            KError::IsADirectory => errno::EISDIR,
            KError::NameTooLong => errno::ENAMETOOLONG,
            KError::NoChildProcess => errno::ECHILD,
            KError::NoMemory => errno::ENOMEM,
            KError::NoSuchProcess => errno::ESRCH,
            KError::NotFound => errno::ENOENT,
            KError::NotADirectory => errno::ENOTDIR,
            KError::NotSeekable => errno::ESPIPE,
            KError::PermissionDenied => errno::EACCES,
            KError::TooManyOpenFiles => errno::EMFILE,
            KError::TooManyProcesses => errno::EAGAIN,
        };
        code as i32
    }

    /// Looks up the error kind for a positive Linux errno.
    pub fn try_from_code(code: i32) -> Option<Self> {
        ALL.iter().copied().find(|e| e.code() == code)
    }

    /// Returns a short human readable description.
    pub const fn as_str(self) -> &'static str {
        match self {
            KError::ArgumentListTooLong => "Argument list too long",
            KError::AlreadyExists => "Entity already exists",
            KError::BadAddress => "Bad address",
            KError::BadFileDescriptor => "Bad file descriptor",
            KError::InvalidInput => "Invalid argument",
            KError::Io => "I/O error",
            KError::IsADirectory => "Is a directory",
            KError::NameTooLong => "File name too long",
            KError::NoChildProcess => "No child process",
            KError::NoMemory => "Out of memory",
            KError::NoSuchProcess => "No such process",
            KError::NotFound => "No such file or directory",
            KError::NotADirectory => "Not a directory",
            KError::NotSeekable => "Illegal seek",
            KError::PermissionDenied => "Permission denied",
            KError::TooManyOpenFiles => "Too many open files",
            KError::TooManyProcesses => "No process identities available",
        }
    }
}

const ALL: [KError; 17] = [
    KError::ArgumentListTooLong,
    KError::AlreadyExists,
    KError::BadAddress,
    KError::BadFileDescriptor,
    KError::InvalidInput,
    KError::Io,
    KError::IsADirectory,
    KError::NameTooLong,
    KError::NoChildProcess,
    KError::NoMemory,
    KError::NoSuchProcess,
    KError::NotFound,
    KError::NotADirectory,
    KError::NotSeekable,
    KError::PermissionDenied,
    KError::TooManyOpenFiles,
    KError::TooManyProcesses,
];

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for KError {}
