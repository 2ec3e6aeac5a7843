// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Program execution.

use alloc::{vec, vec::Vec};
use core::{ffi::c_char, mem::size_of};

use kcore::{
    file::OpenFile,
    task::{ProcessData, UserEntry},
    vfs::OpenFlags,
};
use kerrno::{KError, KResult};
use osvm::{MemError, VirtPtr, load_vec_until_null};

use crate::mm::{UserConstPtr, vm_load_string};

const WORD: usize = size_of::<usize>();
const STACK_ALIGN: usize = 2 * WORD;

/// The argument block placed at the top of a new user stack.
///
/// From `sp` upwards: `argc + 1` pointers (the last one null), then the
/// NUL-terminated strings, each padded to a word boundary.
#[derive(Debug)]
pub struct ArgLayout {
    /// Initial stack pointer, aligned to two words.
    pub sp: usize,
    /// User address of the pointer array.
    pub argv: usize,
    pub argc: usize,
    /// Bytes to copy to `sp`.
    pub image: Vec<u8>,
}

impl ArgLayout {
    /// Lays out `args` below `stack_top`.
    pub fn new(stack_top: usize, args: &[Vec<u8>]) -> KResult<Self> {
        let ptrs_size = (args.len() + 1) * WORD;
        let total = ptrs_size + args.iter().map(|arg| padded_len(arg.len())).sum::<usize>();
        let sp = stack_top
            .checked_sub(total)
            .ok_or(KError::ArgumentListTooLong)?
            & !(STACK_ALIGN - 1);

        let mut image = vec![0; stack_top - sp];
        let mut str_off = ptrs_size;
        for (i, arg) in args.iter().enumerate() {
            image[str_off..str_off + arg.len()].copy_from_slice(arg);
            image[i * WORD..(i + 1) * WORD].copy_from_slice(&(sp + str_off).to_ne_bytes());
            str_off += padded_len(arg.len());
        }
        Ok(Self {
            sp,
            argv: sp,
            argc: args.len(),
            image,
        })
    }
}

/// Space a string of `len` bytes takes with its terminator and padding.
fn padded_len(len: usize) -> usize {
    (len + 1).next_multiple_of(WORD)
}

/// Copies in the null-terminated argument vector at `argv`.
///
/// Strings, padding and pointers together may not exceed `arg_max` bytes.
fn load_args(
    curr: &ProcessData,
    argv: UserConstPtr<usize>,
    arg_max: usize,
) -> KResult<Vec<Vec<u8>>> {
    let argv = argv.check_non_null().ok_or(KError::BadAddress)?;
    curr.with_aspace(|aspace| -> KResult<Vec<Vec<u8>>> {
        let mut args = Vec::new();
        // the terminating null pointer
        let mut used = WORD;
        let mut addr = argv.addr();
        loop {
            let ptr = UserConstPtr::<usize>::new(addr).read_vm(&*aspace)?;
            if ptr == 0 {
                return Ok(args);
            }
            used += WORD;
            let remaining = arg_max
                .checked_sub(used)
                .ok_or(KError::ArgumentListTooLong)?;
            let arg = load_vec_until_null::<u8>(&*aspace, ptr, remaining.saturating_sub(1))
                .map_err(|err| match err {
                    MemError::NameTooLong => KError::ArgumentListTooLong,
                    err => err.into(),
                })?;
            used += padded_len(arg.len());
            if used > arg_max {
                return Err(KError::ArgumentListTooLong);
            }
            args.push(arg);
            addr = addr.checked_add(WORD).ok_or(KError::BadAddress)?;
        }
    })?
}

/// Replaces the caller's program with the one at `path`.
///
/// On success the caller's old address space is gone and the thread
/// continues at the new entry point; this function does not return. On
/// failure the caller is untouched.
pub fn sys_execv(
    curr: &ProcessData,
    path: UserConstPtr<c_char>,
    argv: UserConstPtr<usize>,
) -> KResult<isize> {
    let kernel = curr.kernel();
    let path = vm_load_string(curr, path, kernel.config().path_max)?;
    if path.is_empty() {
        return Err(KError::InvalidInput);
    }
    let args = load_args(curr, argv, kernel.config().arg_max)?;
    debug!("sys_execv <= {path:?} argc: {}", args.len());

    let cwd = curr.cwd();
    let image = OpenFile::open(kernel.vfs(), cwd.as_ref(), &path, OpenFlags::RDONLY, 0)?;
    let mut aspace = kernel.mm().create_addr_space()?;
    let entry = kernel.loader().load(&**image.node(), &mut *aspace)?;
    drop(image);

    let stack_top = aspace.define_stack()?;
    let layout = ArgLayout::new(stack_top, &args)?;
    aspace.write_mem(layout.sp, &layout.image)?;

    let name = path.rsplit('/').next().unwrap_or(&path);
    curr.set_name(name);
    aspace.activate();
    drop(curr.replace_aspace(Some(aspace)));
    info!("process {} executing {path:?} at {entry:#x}", curr.pid());

    kernel.task().enter_user(UserEntry {
        entry,
        stack: layout.sp,
        argc: layout.argc,
        argv: layout.argv,
    })
}
