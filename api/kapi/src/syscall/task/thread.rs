use kcore::task::ProcessData;
use kerrno::KResult;

/// Returns the caller's pid. Never fails.
pub fn sys_getpid(curr: &ProcessData) -> KResult<isize> {
    Ok(curr.pid() as isize)
}
