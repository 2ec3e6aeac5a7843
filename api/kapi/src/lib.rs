// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Process and file system calls.
//!
//! Each `sys_*` function takes the calling process and the raw arguments and
//! returns `KResult<isize>`; [`syscall::syscall_ret`] turns that into the
//! value placed in the user's return register.
#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[macro_use]
extern crate log;

pub mod mm;
pub mod syscall;
pub mod task;
