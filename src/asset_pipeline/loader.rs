//! # 下载模块
//!
//! ## 设计思路
//!
//! 每个条目只发起一次 HTTP GET，不做重试。非 2xx 状态码、连接失败、读取失败
//! 统一映射为 `ImageError::Network`，超出体积上限映射为 `ResourceLimit`。
//!
//! ## 实现思路
//!
//! - 先按 `Content-Length` 快速拒绝超大响应。
//! - 再分块读取响应体，累计体积超过上限立即失败。
//! - 日志中的 URL 去掉 query 与 fragment。

use bytes::BytesMut;

use super::source::RawImageData;
use super::{AssetProcessor, ImageEntry, ImageError};

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

impl AssetProcessor {
    /// 构建 HTTP 客户端。
    ///
    /// 超时、重定向等均沿用 reqwest 默认值。
    pub(super) fn build_http_client(
        config: &super::ImageConfig,
    ) -> Result<reqwest::Client, ImageError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| ImageError::Network(format!("无法创建 HTTP 客户端：{}", e)))
    }

    /// 下载条目对应的原始字节。
    pub(super) async fn fetch_entry(&self, entry: &ImageEntry) -> Result<RawImageData, ImageError> {
        let url = reqwest::Url::parse(&entry.url)
            .map_err(|e| ImageError::Network(format!("URL 格式错误：{}", e)))?;
        let source_hint = redact_url_for_log(url.as_str());

        log::debug!("📡 发送 HTTP 请求 - URL: {}", source_hint);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, url.as_str()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status_message(status.as_u16())
            )));
        }

        let max_file_size = self.config.max_file_size;
        let total_len = response.content_length();
        if let Some(size) = total_len {
            if size > max_file_size {
                return Err(ImageError::ResourceLimit(format!(
                    "文件过大：{:.2} MB（限制：{:.2} MB）",
                    size as f64 / 1024.0 / 1024.0,
                    max_file_size as f64 / 1024.0 / 1024.0
                )));
            }
        }

        let initial_capacity = total_len
            .map(|len| len.min(max_file_size).min(usize::MAX as u64) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = BytesMut::with_capacity(initial_capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageError::Network(format!("下载失败：{}", e)))?
        {
            if (buffer.len() + chunk.len()) as u64 > max_file_size {
                return Err(ImageError::ResourceLimit("下载后文件超过大小限制".to_string()));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("✅ 下载完成 - {} bytes", buffer.len());

        Ok(RawImageData {
            bytes: buffer.freeze(),
            source_hint,
        })
    }
}

/// 日志用 URL：保留协议、主机、端口与路径，去掉 query 与 fragment。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

/// 统一映射 reqwest 错误到业务错误。
fn map_reqwest_error(e: reqwest::Error, url: &str) -> ImageError {
    let err_msg = e.to_string().replace(url, &redact_url_for_log(url));

    if e.is_timeout() {
        ImageError::Network(format!("请求超时：{}", err_msg))
    } else if e.is_connect() {
        ImageError::Network(format!("无法连接：{}", err_msg))
    } else {
        ImageError::Network(format!("请求失败：{}", err_msg))
    }
}

/// 常见 HTTP 状态码文案。
fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        403 => "访问被拒绝",
        410 => "资源已删除",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}
