//! 输出目录管理模块
//!
//! # 设计思路
//!
//! 统一管理处理结果的输出目录：默认位置的解析、目录创建、目录信息统计。
//! 库代码只接受显式传入的目录，默认位置只在 `main` 中使用。
//!
//! # 实现思路
//!
//! - 默认目录为 crate 根目录下的 `src/assets/images`，通过 `CARGO_MANIFEST_DIR` 解析。
//! - 目录不存在时 `create_dir_all`，连同缺失的父目录一起创建。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 默认输出目录相对 crate 根目录的路径。
pub const ASSETS_SUBDIR: &str = "src/assets/images";

/// 输出目录信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirInfo {
    pub path: PathBuf,
    pub total_size: u64,
    pub png_count: u64,
}

/// 默认输出目录。
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(ASSETS_SUBDIR)
}

/// 确保输出目录存在。
///
/// # 返回
/// - `Ok(true)` — 目录原本不存在，本次已创建
/// - `Ok(false)` — 目录已存在
/// - `Err(AppError::Storage)` — 无法创建目录（例如同名文件已存在、权限不足）
pub fn ensure_output_dir(path: &Path) -> Result<bool, AppError> {
    if path.is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(path).map_err(|e| {
        AppError::Storage(format!("创建输出目录 '{}' 失败: {}", path.display(), e))
    })?;

    Ok(true)
}

/// 统计输出目录信息（PNG 数量 + 占用大小）。
pub fn output_dir_info(path: &Path) -> Result<OutputDirInfo, AppError> {
    let mut total_size: u64 = 0;
    let mut png_count: u64 = 0;

    for entry in fs::read_dir(path)?.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let is_png = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            total_size += metadata.len();
            png_count += 1;
        }
    }

    Ok(OutputDirInfo {
        path: path.to_path_buf(),
        total_size,
        png_count,
    })
}
