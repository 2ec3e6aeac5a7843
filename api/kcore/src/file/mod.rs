// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Open file objects and per-process descriptor tables.

mod fd_table;
mod open_file;

pub use fd_table::FdTable;
pub use open_file::{OpenFile, SeekFrom};
