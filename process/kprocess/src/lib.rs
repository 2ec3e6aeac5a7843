// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Process Management
//!
//! Process identities ([`PidTable`]), the per-parent table of live children
//! ([`ChildTable`]) and the process record with its exit/wait rendezvous
//! ([`Process`]).

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;
extern crate alloc;

mod children;
mod pid;
mod process;

#[cfg(test)]
mod tests;

/// A process ID.
pub type Pid = u32;

pub use children::ChildTable;
pub use pid::PidTable;
pub use process::{ExitStatus, Process};
