//! # 中间数据模型
//!
//! 下载阶段与解码阶段之间传递的数据。

use bytes::Bytes;

/// 下载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Bytes,
    /// 来源提示（已脱敏的 URL，用于日志与诊断）。
    pub(crate) source_hint: String,
}
