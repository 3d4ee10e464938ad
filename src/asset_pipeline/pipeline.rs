//! # 解码与抠图流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA → 去白底”的过程集中管理。
//! 优先读取图片头做尺寸检查，再进行完整解码，避免超大图片占满内存。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 转换 RGBA，逐像素按阈值替换为透明白色
//!
//! 抠图只看单个像素，不考虑邻域：图案内部的孤立白点同样会被抠掉，
//! 抗锯齿边缘低于阈值的像素保持原样（会留下轻微白边）。

use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

use super::source::RawImageData;
use super::{AssetProcessor, ImageConfig, ImageError, KeyingConfig};

/// 背景像素的替换值：全透明白色。
pub const TRANSPARENT_WHITE: Rgba<u8> = Rgba([255, 255, 255, 0]);

impl AssetProcessor {
    pub(super) fn decode_entry(&self, raw: &RawImageData) -> Result<DynamicImage, ImageError> {
        let decoded = decode_image(&raw.bytes, &self.config)?;

        log::debug!(
            "✅ 图片解码成功 - 来源: {} 尺寸: {}x{} 颜色: {:?}",
            raw.source_hint,
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        Ok(decoded)
    }
}

/// 将内存中的编码字节解码为图像。
pub fn decode_image(bytes: &[u8], config: &ImageConfig) -> Result<DynamicImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }

    let (width, height) = inspect_dimensions_from_memory(bytes)?;
    validate_pixel_limits(config, width, height)?;

    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))
}

/// 仅通过图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

    if reader.format().is_none() {
        return Err(ImageError::Decode(describe_unrecognized_payload(bytes)));
    }

    reader
        .into_dimensions()
        .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
}

/// 为无法识别的内容生成诊断信息（例如服务器返回了 HTML 错误页）。
fn describe_unrecognized_payload(bytes: &[u8]) -> String {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() != infer::MatcherType::Image => {
            format!("下载内容不是图片类型：{}", kind.mime_type())
        }
        Some(kind) => format!("不支持的图片格式：{}", kind.mime_type()),
        None if looks_like_markup(bytes) => "下载内容不是图片类型：疑似 HTML/XML 文本".to_string(),
        None => "无法识别图片格式".to_string(),
    }
}

fn looks_like_markup(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    text.trim_start().starts_with('<')
}

fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

/// 原地去除接近白色的背景，返回被替换的像素数量。
///
/// R、G、B 均严格大于阈值的像素替换为 [`TRANSPARENT_WHITE`]，
/// 其余像素（包括原有 alpha）保持不变。重复执行结果不变。
pub fn remove_near_white(image: &mut RgbaImage, keying: KeyingConfig) -> usize {
    let mut keyed = 0;

    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if keying.is_background(r, g, b) {
            *pixel = TRANSPARENT_WHITE;
            keyed += 1;
        }
    }

    keyed
}

/// 转换为 RGBA 后执行去白底。
///
/// 源图没有 alpha 通道时，保留下来的像素 alpha 为 255。
pub fn key_out_background(image: DynamicImage, keying: KeyingConfig) -> (RgbaImage, usize) {
    let mut rgba = image.into_rgba8();
    let keyed = remove_near_white(&mut rgba, keying);
    (rgba, keyed)
}
