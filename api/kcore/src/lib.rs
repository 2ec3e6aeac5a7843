// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel-side state of user processes.
//!
//! This crate owns what a process holds besides its identity: the open file
//! objects and descriptor table, the address space slot and the working
//! directory. Filesystems, memory management, program loading and thread
//! creation are reached through the collaborator traits in [`vfs`], [`mm`]
//! and [`task`].
#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[macro_use]
extern crate log;

pub mod config;
pub mod file;
pub mod mm;
pub mod task;
pub mod vfs;
