//! Task and process management syscalls.
//!
//! This module implements process management operations including:
//! - Process creation and execution (fork, execv)
//! - Process termination (exit)
//! - Waiting for children (waitpid)
//! - Process identity (getpid)

mod clone;
mod execve;
mod exit;
mod thread;
mod wait;

pub use self::{clone::*, execve::*, exit::*, thread::*, wait::*};
