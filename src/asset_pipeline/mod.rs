//! # 图片资源处理模块（asset_pipeline）
//!
//! ## 设计思路
//!
//! 该模块将“下载 → 解码 → 去白底 → 写出 PNG”按职责拆分为多个子模块：
//!
//! - `handler`：编排整条处理流水线（`AssetProcessor::run`）
//! - `loader`：负责 HTTP 下载与体积限制
//! - `pipeline`：负责解码、像素限制与白底抠图
//! - `writer`：负责 PNG 编码与写盘
//! - `report`：条目状态机与处理结果
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 实现思路
//!
//! 清单（`ImageManifest`）与输出目录都作为参数注入，模块内部不持有全局状态。
//! 单个条目的任何失败都只影响该条目。
//!
//! ## 调用链
//!
//! ```text
//! main.rs（日志初始化 + 默认配置）
//!    ↓
//! handler.rs（确保目录存在 + 逐条编排 + 阶段耗时日志）
//!    ├─ loader.rs（HTTP GET + 状态码/体积校验）
//!    ├─ pipeline.rs（解码 + 像素限制 + 去白底）
//!    └─ writer.rs（PNG 编码 + 写盘）
//!    ↓
//! RunReport（每个条目的成功路径或失败阶段）
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod report;
mod source;
mod writer;

pub use config::{DEFAULT_WHITE_THRESHOLD, ImageConfig, ImageEntry, ImageManifest, KeyingConfig};
pub use error::ImageError;
pub use handler::AssetProcessor;
pub use pipeline::{TRANSPARENT_WHITE, decode_image, key_out_background, remove_near_white};
pub use report::{EntryFailure, EntryOutcome, EntryStage, RunReport, SavedAsset};
pub use writer::{encode_png, save_png};
