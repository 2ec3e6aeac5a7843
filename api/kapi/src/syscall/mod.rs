// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! System call implementations.

mod fs;
mod task;

use kerrno::KResult;

pub use self::{fs::*, task::*};

/// Converts a system call result into the user-visible return value: the
/// value itself on success, the negated errno on failure.
pub fn syscall_ret(result: KResult<isize>) -> isize {
    match result {
        Ok(value) => value,
        Err(err) => {
            debug!("syscall failed: {err:?}");
            -(err.code() as isize)
        }
    }
}
