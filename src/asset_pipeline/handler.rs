//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `AssetProcessor` 只负责流程编排，处理链路固定为：
//! 1. 确保输出目录存在
//! 2. 逐个条目执行 下载 → 解码 → 去白底 → 写出 PNG
//! 3. 单个条目失败只记录，不中断后续条目
//!
//! ## 实现思路
//!
//! - 条目严格串行处理，上一个条目结束后才开始下一个。
//! - 每个阶段的错误都带上阶段信息包装为 `EntryFailure`。
//! - 记录 `fetch/decode/key/save` 阶段耗时，便于排查慢请求。

use std::path::Path;
use std::time::Instant;

use super::loader::redact_url_for_log;
use super::pipeline::key_out_background;
use super::report::{EntryFailure, EntryOutcome, EntryStage, RunReport, SavedAsset};
use super::writer::save_png;
use super::{ImageConfig, ImageEntry, ImageError, ImageManifest};
use crate::storage;

/// 图片处理器。
///
/// 封装了配置与复用的 HTTP 客户端。
pub struct AssetProcessor {
    pub(super) client: reqwest::Client,
    pub(super) config: ImageConfig,
}

impl AssetProcessor {
    /// 根据配置创建处理器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use asset_prep::asset_pipeline::{AssetProcessor, ImageConfig, ImageManifest};
    ///
    /// # async fn demo() -> Result<(), asset_prep::asset_pipeline::ImageError> {
    /// let processor = AssetProcessor::new(ImageConfig::default())?;
    /// let report = processor
    ///     .run(&ImageManifest::builtin(), "src/assets/images".as_ref())
    ///     .await;
    /// println!("{} succeeded", report.succeeded());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        let client = Self::build_http_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 处理整份清单。
    ///
    /// 总是处理完所有条目后返回；每个条目的成败记录在 `RunReport` 中。
    pub async fn run(&self, manifest: &ImageManifest, output_dir: &Path) -> RunReport {
        let created = match storage::ensure_output_dir(output_dir) {
            Ok(created) => {
                if created {
                    log::info!("📁 已创建输出目录: {}", output_dir.display());
                }
                created
            }
            Err(err) => {
                // 目录不可用时继续执行，各条目会在写出阶段失败
                log::error!("❌ {}", err);
                false
            }
        };

        let mut report = RunReport::new(output_dir, created);
        let total_start = Instant::now();

        for entry in manifest {
            log::info!(
                "🖼️ 正在处理 {} - 来源: {}",
                entry.output_name,
                redact_url_for_log(&entry.url)
            );

            let outcome = self.process_entry(entry, output_dir).await;
            match &outcome.result {
                Ok(saved) => log::info!("💾 已保存到 {}", saved.path.display()),
                Err(failure) => log::error!("❌ 处理 {} 失败：{}", entry.output_name, failure),
            }

            report.outcomes.push(outcome);
        }

        log::info!(
            "✅ 全部条目处理结束 - 成功 {} / 失败 {}，耗时 {}ms",
            report.succeeded(),
            report.failed(),
            total_start.elapsed().as_millis()
        );

        report
    }

    /// 处理单个条目，输出写入 `{output_dir}/{output_name}.png`。
    pub async fn process_entry(&self, entry: &ImageEntry, output_dir: &Path) -> EntryOutcome {
        let result = self.run_stages(entry, output_dir).await;
        EntryOutcome {
            entry: entry.clone(),
            result,
        }
    }

    async fn run_stages(
        &self,
        entry: &ImageEntry,
        output_dir: &Path,
    ) -> Result<SavedAsset, EntryFailure> {
        let mut stage = EntryStage::Pending;

        stage.advance();
        let fetch_start = Instant::now();
        let raw = self
            .fetch_entry(entry)
            .await
            .map_err(|e| EntryFailure::new(stage, e))?;
        let fetch_elapsed = fetch_start.elapsed();

        stage.advance();
        let decode_start = Instant::now();
        let decoded = self
            .decode_entry(&raw)
            .map_err(|e| EntryFailure::new(stage, e))?;
        let decode_elapsed = decode_start.elapsed();

        stage.advance();
        let key_start = Instant::now();
        let (keyed_image, keyed_pixels) = key_out_background(decoded, self.config.keying);
        let key_elapsed = key_start.elapsed();

        stage.advance();
        let save_start = Instant::now();
        let path = output_dir.join(entry.file_name());
        let bytes_written = save_png(&keyed_image, &path).map_err(|e| EntryFailure::new(stage, e))?;
        let save_elapsed = save_start.elapsed();

        stage.advance();
        debug_assert_eq!(stage, EntryStage::Done);

        log::info!(
            "⏱️ {} - fetch={}ms decode={}ms key={}ms save={}ms（抠除 {} 像素）",
            entry.output_name,
            fetch_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            key_elapsed.as_millis(),
            save_elapsed.as_millis(),
            keyed_pixels
        );

        Ok(SavedAsset {
            path,
            width: keyed_image.width(),
            height: keyed_image.height(),
            keyed_pixels,
            bytes_written,
        })
    }
}
