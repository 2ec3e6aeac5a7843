// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel limits.

use kprocess::Pid;

/// Smallest pid handed to a user process. Lower values are reserved.
pub const PID_MIN: Pid = 2;
/// Largest assignable pid.
pub const PID_MAX: Pid = 32767;
/// Descriptor slots per process.
pub const OPEN_MAX: usize = 128;
/// Bytes of argument data accepted by `execv`, pointer array included.
pub const ARG_MAX: usize = 64 * 1024;
/// Longest path accepted from user space, terminator included.
pub const PATH_MAX: usize = 1024;
/// Largest transfer performed by a single `read` or `write`.
pub const IO_MAX: usize = 1024 * 1024;
/// Device path opened for the standard streams.
pub const CONSOLE_PATH: &str = "con:";

/// Limits a [`Kernel`](crate::task::Kernel) is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Smallest assignable pid, at least 2.
    pub pid_min: Pid,
    /// Largest assignable pid.
    pub pid_max: Pid,
    /// Descriptor slots per process, at least 3 for the standard streams.
    pub open_max: usize,
    /// Bytes of argument data accepted by `execv`.
    pub arg_max: usize,
    /// Longest path accepted from user space.
    pub path_max: usize,
    /// Largest single transfer.
    pub io_max: usize,
    /// Path of the console device.
    pub console_path: &'static str,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            pid_min: PID_MIN,
            pid_max: PID_MAX,
            open_max: OPEN_MAX,
            arg_max: ARG_MAX,
            path_max: PATH_MAX,
            io_max: IO_MAX,
            console_path: CONSOLE_PATH,
        }
    }
}

impl KernelConfig {
    /// Whether the limits can run a process.
    pub fn is_valid(&self) -> bool {
        self.pid_min >= PID_MIN
            && self.pid_min <= self.pid_max
            && self.open_max >= 3
            && self.arg_max > 0
            && self.path_max > 0
            && self.io_max > 0
    }

    /// Number of pids in the configured range.
    pub fn pid_count(&self) -> usize {
        (self.pid_max - self.pid_min) as usize + 1
    }
}
