// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Process teardown.

use kcore::task::ProcessData;
use kprocess::ExitStatus;

/// Releases everything `curr` holds, publishes its exit status and ends the
/// current thread.
///
/// The process record stays registered with its parent until reaped.
pub fn do_exit(curr: &ProcessData, exit_code: i32) -> ! {
    let status = ExitStatus::exited(exit_code);
    info!("process {} ({}) exiting: {status:?}", curr.pid(), curr.name());

    curr.fd_table.close_all();
    curr.set_cwd(None);
    drop(curr.replace_aspace(None));
    curr.proc.exit(status);

    curr.kernel().task().exit_current()
}
