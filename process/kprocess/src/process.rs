use alloc::{sync::Arc, vec::Vec};
use core::fmt;

use event_listener::{Event, EventListener};
use kerrno::{KError, KResult};
use spin::Once;

use crate::{ChildTable, Pid, PidTable};

/// Encoded wait status of an exited process.
///
/// Normal exits carry the code in bits 8..16 and zero in the low 7 bits,
/// the layout decoded by `WIFEXITED`/`WEXITSTATUS`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(i32);

impl ExitStatus {
    /// Status of a process that called `exit(code)`.
    pub const fn exited(code: i32) -> Self {
        Self((code & 0xff) << 8)
    }

    /// Wraps a raw wait status.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw wait status as copied out to user space.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether this is a normal exit.
    pub const fn is_exited(self) -> bool {
        self.0 & 0x7f == 0
    }

    /// Exit code of a normal exit.
    pub const fn code(self) -> i32 {
        (self.0 >> 8) & 0xff
    }
}

impl fmt::Debug for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exited() {
            write!(f, "ExitStatus(exited {})", self.code())
        } else {
            write!(f, "ExitStatus({:#x})", self.0)
        }
    }
}

/// A process record.
///
/// The record outlives the process itself: after [`Process::exit`] it keeps
/// the exit status until the parent reaps it through
/// [`Process::reap_child`].
pub struct Process {
    pid: Pid,
    child_capacity: usize,
    exit_status: Once<ExitStatus>,
    exit_event: Event,
    children: Once<ChildTable>,
}

impl Process {
    /// Creates a running process record.
    ///
    /// `child_capacity` bounds the child table created on the first fork.
    pub fn new(pid: Pid, child_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            pid,
            child_capacity,
            exit_status: Once::new(),
            exit_event: Event::new(),
            children: Once::new(),
        })
    }

    /// The [`Process`] ID.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Records the exit status and wakes every waiter.
    ///
    /// Only the first call has an effect; returns whether this call recorded
    /// the status.
    pub fn exit(&self, status: ExitStatus) -> bool {
        let mut recorded = false;
        self.exit_status.call_once(|| {
            recorded = true;
            status
        });
        if recorded {
            debug!("process {} exited with {status:?}", self.pid);
            self.exit_event.notify(usize::MAX);
        }
        recorded
    }

    /// Whether the process has exited.
    pub fn is_exited(&self) -> bool {
        self.exit_status.is_completed()
    }

    /// The exit status, if the process has exited.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status.get().copied()
    }

    /// Blocks until the process exits and returns its status.
    pub fn wait_exit(&self) -> ExitStatus {
        loop {
            if let Some(status) = self.exit_status() {
                return status;
            }
            let listener = self.exit_event.listen();
            // an exit between the first check and `listen` has already
            // notified, so look again before sleeping
            if let Some(status) = self.exit_status() {
                return status;
            }
            block_on_listener(listener);
        }
    }

    /// The child table, if this process has ever forked.
    pub fn children(&self) -> Option<&ChildTable> {
        self.children.get()
    }

    /// Pids of the live (unreaped) children.
    pub fn children_pids(&self) -> Vec<Pid> {
        self.children().map(ChildTable::pids).unwrap_or_default()
    }

    /// Registers `child`, creating the child table on first use.
    pub fn add_child(&self, child: Arc<Process>) -> KResult<usize> {
        self.children
            .call_once(|| ChildTable::new(self.child_capacity))
            .register(child)
    }

    /// Takes back the registration of a child that never started running.
    ///
    /// Used by fork to roll back when the child thread cannot be created.
    pub fn unregister_child(&self, pid: Pid) -> Option<Arc<Process>> {
        self.children()?.remove(pid)
    }

    /// Finds the live child `pid`.
    ///
    /// Fails with `NoSuchProcess` if this process has never forked, and with
    /// `NoChildProcess` if `pid` is out of range or not one of its children.
    pub fn find_child(&self, pid: Pid, pids: &PidTable) -> KResult<Arc<Process>> {
        let children = self.children().ok_or(KError::NoSuchProcess)?;
        if !pids.contains(pid) {
            return Err(KError::NoChildProcess);
        }
        children
            .find(pid)
            .map(|(_, child)| child)
            .ok_or(KError::NoChildProcess)
    }

    /// Blocks until child `pid` exits and returns it with its status.
    ///
    /// The child stays registered; call [`Process::reap_child`] once the
    /// status has been delivered.
    pub fn wait_child(&self, pid: Pid, pids: &PidTable) -> KResult<(Arc<Process>, ExitStatus)> {
        let child = self.find_child(pid, pids)?;
        let status = child.wait_exit();
        Ok((child, status))
    }

    /// Removes an exited child from the table and frees its pid.
    ///
    /// Fails with `NoChildProcess` if another waiter reaped it first.
    pub fn reap_child(&self, pid: Pid, pids: &PidTable) -> KResult<Arc<Process>> {
        let children = self.children().ok_or(KError::NoSuchProcess)?;
        let child = children.remove(pid).ok_or(KError::NoChildProcess)?;
        debug_assert!(child.is_exited());
        pids.release(pid);
        info!("process {} reaped child {pid}", self.pid);
        Ok(child)
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("exit_status", &self.exit_status())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
fn block_on_listener(listener: EventListener) {
    use event_listener::Listener;

    listener.wait();
}

#[cfg(not(feature = "std"))]
fn block_on_listener(listener: EventListener) {
    use core::{
        future::Future,
        pin::pin,
        task::{Context, Waker},
    };

    let mut listener = pin!(listener);
    let mut cx = Context::from_waker(Waker::noop());
    while listener.as_mut().poll(&mut cx).is_pending() {
        core::hint::spin_loop();
    }
}
