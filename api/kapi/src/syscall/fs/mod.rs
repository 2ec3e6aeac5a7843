//! File system related syscalls.
//!
//! This module implements the descriptor-level file operations:
//! - Opening and closing (open, close)
//! - Descriptor duplication (dup2)
//! - File I/O and seeking (read, write, lseek)
//! - Working directory (chdir, getcwd)

mod ctl;
mod fd_ops;
mod io;

pub use self::{ctl::*, fd_ops::*, io::*};
