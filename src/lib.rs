//! # 插画资源预处理工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main.rs  日志初始化 · 默认清单 · 默认输出目录           │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ AssetProcessor::run(&ImageManifest, &Path)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ asset_pipeline   下载 · 解码 · 去白底 · 写出 PNG     │
//! │  ├─ storage          输出目录解析与创建                  │
//! │  └─ error            AppError (统一错误类型)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 应用级错误类型 `AppError` |
//! | [`asset_pipeline`] | 按清单逐条下载图片，将接近白色的像素替换为透明并保存为 PNG |
//! | [`storage`] | 默认输出目录、目录创建与统计 |

pub mod asset_pipeline;
pub mod error;
pub mod storage;
