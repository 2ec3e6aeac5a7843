//! In-memory collaborators for driving system calls on the host.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    ffi::c_char,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use kapi::{
    mm::{UserConstPtr, UserMutPtr},
    syscall::{sys_execv, sys_exit},
};
use kcore::{
    config::KernelConfig,
    mm::{AddrSpace, MemoryManager, ProgramLoader},
    task::{Kernel, KernelServices, ProcessData, TaskOps, UserContext, UserEntry},
    vfs::{OpenFlags, VNode, VNodeRef, Vfs},
};
use kerrno::{KError, KResult};
use osvm::{MemError, MemResult, VirtMemIo};

pub const USER_BASE: usize = 0x1_0000;
pub const USER_SIZE: usize = 0x2_0000;
pub const STACK_TOP: usize = USER_BASE + USER_SIZE;
/// Where tests place strings and buffers they pass to system calls.
pub const SCRATCH: usize = USER_BASE + 0x8000;
pub const ENTRY: usize = USER_BASE + 0x100;
pub const ELF_MAGIC: &[u8] = b"\x7fELF";

/// A regular file or the console.
#[derive(Default)]
pub struct MemFile {
    pub data: Mutex<Vec<u8>>,
    releases: AtomicUsize,
    device: bool,
}

impl MemFile {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl VNode for MemFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KResult<usize> {
        let mut data = self.data.lock().unwrap();
        if self.device {
            // console input is consumed
            let n = buf.len().min(data.len());
            buf[..n].copy_from_slice(&data[..n]);
            data.drain(..n);
            return Ok(n);
        }
        let start = (offset as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<usize> {
        let mut data = self.data.lock().unwrap();
        let offset = if self.device { data.len() } else { offset as usize };
        if data.len() < offset + buf.len() {
            data.resize(offset + buf.len(), 0);
        }
        data[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn size(&self) -> KResult<u64> {
        Ok(self.data.lock().unwrap().len() as u64)
    }

    fn is_seekable(&self) -> bool {
        !self.device
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MemDir {
    path: String,
}

impl VNode for MemDir {
    fn read_at(&self, _offset: u64, _buf: &mut [u8]) -> KResult<usize> {
        Err(KError::IsADirectory)
    }

    fn write_at(&self, _offset: u64, _buf: &[u8]) -> KResult<usize> {
        Err(KError::IsADirectory)
    }

    fn size(&self) -> KResult<u64> {
        Ok(0)
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// A flat namespace of files plus a set of directory paths.
pub struct MemFs {
    files: Mutex<HashMap<String, Arc<MemFile>>>,
    dirs: Mutex<HashSet<String>>,
    console: Arc<MemFile>,
}

impl MemFs {
    pub fn new() -> Self {
        Self {
            files: Mutex::default(),
            dirs: Mutex::new(HashSet::from(["/".to_owned()])),
            console: Arc::new(MemFile {
                device: true,
                ..Default::default()
            }),
        }
    }

    pub fn console(&self) -> &Arc<MemFile> {
        &self.console
    }

    pub fn file(&self, path: &str) -> Arc<MemFile> {
        self.files.lock().unwrap()[path].clone()
    }

    pub fn add_file(&self, path: &str, data: &[u8]) -> Arc<MemFile> {
        let file = Arc::new(MemFile {
            data: Mutex::new(data.to_vec()),
            ..Default::default()
        });
        self.files.lock().unwrap().insert(path.into(), file.clone());
        file
    }

    pub fn add_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(path.into());
    }

    fn resolve(cwd: Option<&VNodeRef>, path: &str) -> String {
        if path.starts_with('/') {
            return path.into();
        }
        let base = cwd
            .and_then(|dir| dir.downcast_ref::<MemDir>())
            .map_or("/", |dir| dir.path.as_str());
        if base.ends_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Vfs for MemFs {
    fn open(
        &self,
        cwd: Option<&VNodeRef>,
        path: &str,
        flags: OpenFlags,
        _mode: u32,
    ) -> KResult<VNodeRef> {
        if path == "con:" {
            return Ok(self.console.clone());
        }
        let path = Self::resolve(cwd, path);
        if self.dirs.lock().unwrap().contains(&path) {
            return Err(KError::IsADirectory);
        }
        let mut files = self.files.lock().unwrap();
        let existing = files.get(&path).cloned();
        let file = match existing {
            Some(_) if flags.contains(OpenFlags::CREAT | OpenFlags::EXCL) => {
                return Err(KError::AlreadyExists);
            }
            Some(file) => file,
            None if flags.contains(OpenFlags::CREAT) => files.entry(path).or_default().clone(),
            None => return Err(KError::NotFound),
        };
        if flags.contains(OpenFlags::TRUNC) {
            file.data.lock().unwrap().clear();
        }
        Ok(file)
    }

    fn lookup_dir(&self, cwd: Option<&VNodeRef>, path: &str) -> KResult<VNodeRef> {
        let path = Self::resolve(cwd, path);
        if self.dirs.lock().unwrap().contains(&path) {
            Ok(Arc::new(MemDir { path }))
        } else if self.files.lock().unwrap().contains_key(&path) {
            Err(KError::NotADirectory)
        } else {
            Err(KError::NotFound)
        }
    }

    fn getcwd(&self, dir: &VNodeRef) -> KResult<String> {
        dir.downcast_ref::<MemDir>()
            .map(|dir| dir.path.clone())
            .ok_or(KError::NotADirectory)
    }
}

#[derive(Default)]
pub struct MmState {
    pub fail_clone: AtomicBool,
    pub live: AtomicUsize,
    pub activations: AtomicUsize,
}

/// Address spaces backed by one flat buffer each.
#[derive(Default)]
pub struct MockMm {
    pub state: Arc<MmState>,
}

impl MemoryManager for MockMm {
    fn create_addr_space(&self) -> KResult<Box<dyn AddrSpace>> {
        Ok(Box::new(FlatSpace::new(
            self.state.clone(),
            vec![0; USER_SIZE],
        )))
    }
}

pub struct FlatSpace {
    mem: Mutex<Vec<u8>>,
    state: Arc<MmState>,
}

impl FlatSpace {
    fn new(state: Arc<MmState>, mem: Vec<u8>) -> Self {
        state.live.fetch_add(1, Ordering::SeqCst);
        Self {
            mem: Mutex::new(mem),
            state,
        }
    }

    fn range(addr: usize, len: usize) -> MemResult<std::ops::Range<usize>> {
        let start = addr.checked_sub(USER_BASE).ok_or(MemError::NoAccess)?;
        let end = start.checked_add(len).ok_or(MemError::NoAccess)?;
        if end > USER_SIZE {
            return Err(MemError::NoAccess);
        }
        Ok(start..end)
    }
}

impl Drop for FlatSpace {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl VirtMemIo for FlatSpace {
    fn read_mem(&self, addr: usize, out: &mut [u8]) -> MemResult {
        let range = Self::range(addr, out.len())?;
        out.copy_from_slice(&self.mem.lock().unwrap()[range]);
        Ok(())
    }

    fn write_mem(&self, addr: usize, src: &[u8]) -> MemResult {
        let range = Self::range(addr, src.len())?;
        self.mem.lock().unwrap()[range].copy_from_slice(src);
        Ok(())
    }
}

impl AddrSpace for FlatSpace {
    fn try_clone(&self) -> KResult<Box<dyn AddrSpace>> {
        if self.state.fail_clone.load(Ordering::SeqCst) {
            return Err(KError::NoMemory);
        }
        let mem = self.mem.lock().unwrap().clone();
        Ok(Box::new(FlatSpace::new(self.state.clone(), mem)))
    }

    fn define_stack(&mut self) -> KResult<usize> {
        Ok(STACK_TOP)
    }

    fn activate(&self) {
        self.state.activations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Accepts images starting with the ELF magic and copies them to
/// `USER_BASE`.
pub struct MockLoader;

impl ProgramLoader for MockLoader {
    fn load(&self, image: &dyn VNode, aspace: &mut dyn AddrSpace) -> KResult<usize> {
        let mut data = vec![0; image.size()? as usize];
        let n = image.read_at(0, &mut data)?;
        if !data[..n].starts_with(ELF_MAGIC) {
            return Err(KError::InvalidInput);
        }
        aspace.write_mem(USER_BASE, &data[..n])?;
        Ok(ENTRY)
    }
}

/// Unwind payload of a thread leaving through `exit_current`.
pub struct ThreadExit;

type Program = Box<dyn FnOnce(Arc<ProcessData>) + Send>;

/// Runs forked children on host threads.
///
/// Each fork consumes the next queued program; with none queued the child
/// exits with status 0.
#[derive(Default)]
pub struct MockTask {
    programs: Mutex<VecDeque<Program>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    pub fail_spawn: AtomicBool,
}

impl MockTask {
    pub fn push_program(&self, program: impl FnOnce(Arc<ProcessData>) + Send + 'static) {
        self.programs.lock().unwrap().push_back(Box::new(program));
    }

    /// Waits for every child thread, re-raising a failed assertion.
    pub fn join_all(&self) {
        let threads = std::mem::take(&mut *self.threads.lock().unwrap());
        for handle in threads {
            if let Err(payload) = handle.join() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl TaskOps for MockTask {
    fn spawn_forked(&self, child: Arc<ProcessData>, _ctx: Box<dyn UserContext>) -> KResult {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(KError::NoMemory);
        }
        let program = self
            .programs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Box::new(|child: Arc<ProcessData>| exit(&child, 0)));
        let handle = thread::spawn(move || {
            match panic::catch_unwind(AssertUnwindSafe(|| program(child))) {
                Err(payload) if !payload.is::<ThreadExit>() => panic::resume_unwind(payload),
                _ => {}
            }
        });
        self.threads.lock().unwrap().push(handle);
        Ok(())
    }

    fn enter_user(&self, entry: UserEntry) -> ! {
        panic::resume_unwind(Box::new(entry))
    }

    fn exit_current(&self) -> ! {
        panic::resume_unwind(Box::new(ThreadExit))
    }
}

/// Saved registers of a caller that is never actually resumed.
pub struct TestContext {
    pub retval: isize,
}

impl UserContext for TestContext {
    fn try_clone_box(&self) -> KResult<Box<dyn UserContext>> {
        Ok(Box::new(TestContext {
            retval: self.retval,
        }))
    }

    fn set_fork_return(&mut self) {
        self.retval = 0;
    }
}

pub struct TestKernel {
    pub kernel: Arc<Kernel>,
    pub fs: Arc<MemFs>,
    pub mm: Arc<MockMm>,
    pub task: Arc<MockTask>,
}

impl TestKernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let fs = Arc::new(MemFs::new());
        let mm = Arc::new(MockMm::default());
        let task = Arc::new(MockTask::default());
        let kernel = Kernel::new(
            config,
            KernelServices {
                vfs: fs.clone(),
                mm: mm.clone(),
                loader: Arc::new(MockLoader),
                task: task.clone(),
            },
        );
        Self {
            kernel,
            fs,
            mm,
            task,
        }
    }

    /// Creates a process with the console on descriptors 0 to 2.
    pub fn init_process(&self) -> Arc<ProcessData> {
        self.kernel.create_user_process("init").unwrap()
    }

    pub fn live_aspaces(&self) -> usize {
        self.mm.state.live.load(Ordering::SeqCst)
    }
}

/// Writes `data` into the address space of `proc`.
pub fn poke(proc: &ProcessData, addr: usize, data: &[u8]) {
    proc.with_aspace(|aspace| aspace.write_mem(addr, data))
        .unwrap()
        .unwrap();
}

/// Reads `len` bytes from the address space of `proc`.
pub fn peek(proc: &ProcessData, addr: usize, len: usize) -> Vec<u8> {
    let mut buf = vec![0; len];
    proc.with_aspace(|aspace| aspace.read_mem(addr, &mut buf))
        .unwrap()
        .unwrap();
    buf
}

pub fn peek_word(proc: &ProcessData, addr: usize) -> usize {
    usize::from_ne_bytes(peek(proc, addr, size_of::<usize>()).try_into().unwrap())
}

/// Places a NUL-terminated `s` at `addr`.
pub fn put_str(proc: &ProcessData, addr: usize, s: &str) -> UserConstPtr<c_char> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    poke(proc, addr, &bytes);
    UserConstPtr::new(addr)
}

/// Places a null-terminated pointer array at `addr` with the strings it
/// points to right after it.
pub fn put_argv(proc: &ProcessData, addr: usize, args: &[&str]) -> UserConstPtr<usize> {
    let word = size_of::<usize>();
    let mut str_addr = addr + (args.len() + 1) * word;
    let mut ptrs = Vec::new();
    for arg in args {
        put_str(proc, str_addr, arg);
        ptrs.extend_from_slice(&str_addr.to_ne_bytes());
        str_addr += arg.len() + 1;
    }
    ptrs.extend_from_slice(&0usize.to_ne_bytes());
    poke(proc, addr, &ptrs);
    UserConstPtr::new(addr)
}

pub fn user_buf(addr: usize) -> UserMutPtr<u8> {
    UserMutPtr::new(addr)
}

/// Runs `execv` and returns where the new program would start.
pub fn exec(
    proc: &ProcessData,
    path: UserConstPtr<c_char>,
    argv: UserConstPtr<usize>,
) -> KResult<UserEntry> {
    match panic::catch_unwind(AssertUnwindSafe(|| sys_execv(proc, path, argv))) {
        Ok(Err(err)) => Err(err),
        Ok(Ok(ret)) => panic!("execv returned {ret}"),
        Err(payload) => match payload.downcast::<UserEntry>() {
            Ok(entry) => Ok(*entry),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Exits `proc` from a child program.
pub fn exit(proc: &ProcessData, code: i32) {
    let _ = sys_exit(proc, code);
}
