//! # PNG 写出模块
//!
//! 先在内存中完整编码，再一次性写入目标路径。
//! 编码失败时不会创建或截断目标文件；写入阶段失败时不做回滚。

use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::ImageError;

/// 将 RGBA 图像编码为 PNG 字节（保留 alpha 通道）。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

/// 编码并保存 PNG，覆盖已有文件。返回写入的字节数。
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<usize, ImageError> {
    let encoded = encode_png(image)?;

    fs::write(path, &encoded).map_err(|e| {
        ImageError::FileSystem(format!("写入 '{}' 失败：{}", path.display(), e))
    })?;

    Ok(encoded.len())
}
