//! # 配置模块
//!
//! ## 设计思路
//!
//! 将“处理哪些图片”和“怎么处理”拆成两份显式配置：
//! - `ImageManifest`：有序、不可变的 URL → 输出文件名清单
//! - `ImageConfig`：抠图阈值、体积与像素上限、HTTP 客户端参数
//!
//! 两者都作为参数注入 `AssetProcessor::run`，测试可以直接替换。
//!
//! ## 实现思路
//!
//! - `ImageManifest::new` 在构造时完成去重与文件名安全校验，运行期不再判断。
//! - URL 本身不做预校验，格式问题留到下载阶段按条目失败处理。
//! - `ImageManifest::builtin` 提供内置的插画清单。

use std::collections::HashSet;

use super::ImageError;

/// 默认白色阈值：R/G/B 三个通道都严格大于该值才视为背景。
pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;

const DEFAULT_USER_AGENT: &str = concat!("asset-prep/", env!("CARGO_PKG_VERSION"));

const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    (
        "https://www.overflow.design/src/assets/img/oc/full-mailbox.jpg",
        "hero-overflow",
    ),
    (
        "https://www.overflow.design/src/assets/img/oc/going-through-emails.jpg",
        "feature-find",
    ),
    (
        "https://www.overflow.design/src/assets/img/oc/trash-bin.jpg",
        "feature-unsubscribe",
    ),
    (
        "https://www.overflow.design/src/assets/img/oc/empty-mailbox.jpg",
        "feature-cleanup",
    ),
];

/// 单个待处理条目：来源 URL + 输出文件名（不含扩展名）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub url: String,
    pub output_name: String,
}

impl ImageEntry {
    pub fn new(url: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_name: output_name.into(),
        }
    }

    /// 输出文件名，固定为 PNG。
    pub fn file_name(&self) -> String {
        format!("{}.png", self.output_name)
    }
}

/// 有序的图片清单。
///
/// 构造后不可变；URL 与输出文件名均唯一。
#[derive(Debug, Clone)]
pub struct ImageManifest {
    entries: Vec<ImageEntry>,
}

impl ImageManifest {
    /// 校验并构建清单。
    ///
    /// # 示例
    /// ```rust
    /// use asset_prep::asset_pipeline::{ImageEntry, ImageManifest};
    ///
    /// let manifest = ImageManifest::new(vec![
    ///     ImageEntry::new("https://example.com/art.jpg", "hero-overflow"),
    /// ])?;
    /// assert_eq!(manifest.len(), 1);
    /// # Ok::<(), asset_prep::asset_pipeline::ImageError>(())
    /// ```
    pub fn new(entries: Vec<ImageEntry>) -> Result<Self, ImageError> {
        let mut seen_urls = HashSet::new();
        let mut seen_names = HashSet::new();

        for entry in &entries {
            Self::validate_output_name(&entry.output_name)?;

            if !seen_urls.insert(entry.url.as_str()) {
                return Err(ImageError::InvalidFormat(format!(
                    "清单中存在重复 URL：{}",
                    entry.url
                )));
            }

            if !seen_names.insert(entry.output_name.as_str()) {
                return Err(ImageError::InvalidFormat(format!(
                    "清单中存在重复输出文件名：{}",
                    entry.output_name
                )));
            }
        }

        Ok(Self { entries })
    }

    /// 内置插画清单。
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ENTRIES
                .iter()
                .map(|(url, name)| ImageEntry::new(*url, *name))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 输出文件名只能是单层文件名，防止写出输出目录之外。
    fn validate_output_name(name: &str) -> Result<(), ImageError> {
        if name.trim().is_empty() {
            return Err(ImageError::InvalidFormat("输出文件名不能为空".to_string()));
        }

        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(ImageError::InvalidFormat(format!(
                "输出文件名不合法：{}",
                name
            )));
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a ImageManifest {
    type Item = &'a ImageEntry;
    type IntoIter = std::slice::Iter<'a, ImageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// 白底抠图参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyingConfig {
    /// 三个颜色通道都严格大于该值时，像素被替换为全透明白色。
    pub white_threshold: u8,
}

impl Default for KeyingConfig {
    fn default() -> Self {
        Self {
            white_threshold: DEFAULT_WHITE_THRESHOLD,
        }
    }
}

impl KeyingConfig {
    pub fn with_threshold(white_threshold: u8) -> Self {
        Self { white_threshold }
    }

    /// 判断像素颜色是否属于背景（接近白色）。
    #[inline]
    pub fn is_background(&self, r: u8, g: u8, b: u8) -> bool {
        r > self.white_threshold && g > self.white_threshold && b > self.white_threshold
    }
}

/// 图片处理配置。
///
/// 字段覆盖下载、解码与抠图三个阶段。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 抠图阈值。
    pub keying: KeyingConfig,
    /// 下载时允许的最大响应体积（字节）。
    pub max_file_size: u64,
    /// 解码前按图片头信息检查的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 是否使用系统代理设置（`HTTP_PROXY` 等环境变量）。
    pub use_system_proxy: bool,
    /// 请求时发送的 `User-Agent`。
    pub user_agent: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            keying: KeyingConfig::default(),
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            use_system_proxy: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
