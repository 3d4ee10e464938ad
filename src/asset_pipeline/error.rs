//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载单个条目处理链路中的所有错误来源。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧（含测试）可按分支匹配失败类型。

/// 单条图片处理错误类型。
///
/// 在 `run` 中按条目捕获并记录，不会中断整批处理。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("网络错误：{0}")]
    Network(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),
}
