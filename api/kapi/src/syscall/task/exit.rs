// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Process exit syscall.

use kcore::task::ProcessData;
use kerrno::KResult;

use crate::task::do_exit;

/// Terminates the calling process with `exit_code`. Does not return.
pub fn sys_exit(curr: &ProcessData, exit_code: i32) -> KResult<isize> {
    debug!("sys_exit <= {exit_code}");
    do_exit(curr, exit_code)
}
