//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 单个条目的失败由 `ImageError` 表达，并在条目级别被吸收；
//! `AppError` 只承载条目循环之外的错误：处理器初始化、输出目录、目录统计。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError`、`std::io::Error` 提供 `From` 转换，调用侧直接 `?`。

use crate::asset_pipeline::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片处理相关错误（如 HTTP 客户端初始化失败）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出目录不可用
    #[error("输出目录不可用: {0}")]
    Storage(String),
}
