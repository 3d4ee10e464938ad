//! # 插画资源预处理工具 — 程序入口
//!
//! 下载内置清单中的插画，去除白色背景后保存到 `src/assets/images`。
//! 单个图片失败只记录日志，进程始终以成功状态结束。

use asset_prep::asset_pipeline::{AssetProcessor, ImageConfig, ImageManifest};
use asset_prep::error::AppError;
use asset_prep::storage;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    if let Err(err) = run().await {
        log::error!("❌ 处理流程未能启动: {err}");
    }
}

async fn run() -> Result<(), AppError> {
    let output_dir = storage::default_output_dir();
    let manifest = ImageManifest::builtin();
    let processor = AssetProcessor::new(ImageConfig::default())?;

    log::info!(
        "🚀 开始处理 {} 张图片，输出目录: {}",
        manifest.len(),
        output_dir.display()
    );

    let report = processor.run(&manifest, &output_dir).await;

    for (entry, failure) in report.failures() {
        log::warn!("⚠️ 未生成 {}：{}", entry.file_name(), failure);
    }

    match storage::output_dir_info(&output_dir) {
        Ok(info) => log::info!(
            "📦 输出目录共有 {} 个 PNG，合计 {:.1} KB",
            info.png_count,
            info.total_size as f64 / 1024.0
        ),
        Err(err) => log::warn!("⚠️ 无法统计输出目录: {err}"),
    }

    Ok(())
}
