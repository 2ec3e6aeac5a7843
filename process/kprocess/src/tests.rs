//! Unit tests for kprocess

use alloc::sync::Arc;

use kerrno::KError;

use crate::{ExitStatus, PidTable, Process};

fn new_parent(pids: &PidTable) -> Arc<Process> {
    Process::new(pids.assign().unwrap(), 8)
}

#[test]
fn test_exit_status_encoding() {
    let status = ExitStatus::exited(42);
    assert!(status.is_exited());
    assert_eq!(status.code(), 42);
    assert_eq!(status.raw(), 42 << 8);

    // only the low byte of the code survives
    assert_eq!(ExitStatus::exited(0x1ff).code(), 0xff);
    assert_eq!(ExitStatus::exited(-1).code(), 0xff);

    // a signal-style status is not a normal exit
    assert!(!ExitStatus::from_raw(9).is_exited());
}

#[test]
fn test_process_lifecycle() {
    let pids = PidTable::new(2, 64);
    let parent = new_parent(&pids);
    assert_eq!(parent.pid(), 2);
    assert!(parent.children().is_none());

    let child = Process::new(pids.assign().unwrap(), 8);
    parent.add_child(child.clone()).unwrap();
    assert_eq!(parent.children_pids(), [3]);

    assert!(!child.is_exited());
    assert!(child.exit(ExitStatus::exited(7)));
    assert!(child.is_exited());

    let (found, status) = parent.wait_child(3, &pids).unwrap();
    assert!(Arc::ptr_eq(&found, &child));
    assert_eq!(status.code(), 7);

    parent.reap_child(3, &pids).unwrap();
    assert!(parent.children_pids().is_empty());
    assert!(!pids.is_assigned(3));
}

#[test]
fn test_exit_is_recorded_once() {
    let proc = Process::new(5, 1);
    assert!(proc.exit(ExitStatus::exited(1)));
    assert!(!proc.exit(ExitStatus::exited(2)));
    assert_eq!(proc.exit_status().unwrap().code(), 1);
}

#[test]
fn test_unregister_child_rolls_back() {
    let pids = PidTable::new(2, 64);
    let parent = new_parent(&pids);
    let child = Process::new(pids.assign().unwrap(), 8);
    parent.add_child(child.clone()).unwrap();

    let removed = parent.unregister_child(child.pid()).unwrap();
    assert!(Arc::ptr_eq(&removed, &child));
    assert_eq!(
        parent.find_child(child.pid(), &pids).unwrap_err(),
        KError::NoChildProcess
    );
}
