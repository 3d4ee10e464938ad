//! # 处理结果模型
//!
//! ## 设计思路
//!
//! 每个条目都有自己的状态机：
//!
//! ```text
//! Pending → Fetching → Decoding → Transforming → Saving → Done
//!              └──────────┴────────────┴────────────┴──→ Failed
//! ```
//!
//! 失败时记录“在哪个阶段、因为什么”，而不是只留一条字符串，
//! 调用方与测试都可以按阶段和错误类型做匹配。

use std::fmt;
use std::path::{Path, PathBuf};

use super::{ImageEntry, ImageError};

/// 单个条目的处理阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStage {
    Pending,
    Fetching,
    Decoding,
    Transforming,
    Saving,
    Done,
    Failed,
}

impl EntryStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Decoding => "decoding",
            Self::Transforming => "transforming",
            Self::Saving => "saving",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// 是否为终止状态。
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// 成功路径上的下一个阶段；终止状态没有后继。
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Fetching),
            Self::Fetching => Some(Self::Decoding),
            Self::Decoding => Some(Self::Transforming),
            Self::Transforming => Some(Self::Saving),
            Self::Saving => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// 沿成功路径前进一步；终止状态保持不变。
    pub fn advance(&mut self) -> Self {
        if !self.is_terminal() {
            if let Some(next) = self.next() {
                log::trace!("条目阶段 {} → {}", self, next);
                *self = next;
            }
        }
        *self
    }
}

impl fmt::Display for EntryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 条目失败信息：失败发生的阶段 + 错误。
#[derive(Debug, thiserror::Error)]
#[error("{stage} 阶段失败：{error}")]
pub struct EntryFailure {
    pub stage: EntryStage,
    #[source]
    pub error: ImageError,
}

impl EntryFailure {
    pub fn new(stage: EntryStage, error: ImageError) -> Self {
        Self { stage, error }
    }
}

/// 成功写出的资源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// 被替换为透明的像素数量。
    pub keyed_pixels: usize,
    pub bytes_written: usize,
}

/// 单个条目的最终结果。
#[derive(Debug)]
pub struct EntryOutcome {
    pub entry: ImageEntry,
    pub result: Result<SavedAsset, EntryFailure>,
}

impl EntryOutcome {
    pub fn name(&self) -> &str {
        &self.entry.output_name
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// 最终状态：`Done` 或 `Failed`。
    pub fn final_stage(&self) -> EntryStage {
        match self.result {
            Ok(_) => EntryStage::Done,
            Err(_) => EntryStage::Failed,
        }
    }

    pub fn failure(&self) -> Option<&EntryFailure> {
        self.result.as_ref().err()
    }
}

/// 一次 `run` 的汇总结果。
#[derive(Debug)]
pub struct RunReport {
    pub output_dir: PathBuf,
    /// 本次运行是否新建了输出目录。
    pub created_output_dir: bool,
    pub outcomes: Vec<EntryOutcome>,
}

impl RunReport {
    pub(crate) fn new(output_dir: &Path, created_output_dir: bool) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            created_output_dir,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn saved_paths(&self) -> impl Iterator<Item = &Path> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|saved| saved.path.as_path()))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ImageEntry, &EntryFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure().map(|failure| (&o.entry, failure)))
    }

    pub fn outcome(&self, output_name: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|o| o.name() == output_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_outcome(name: &str, stage: EntryStage) -> EntryOutcome {
        EntryOutcome {
            entry: ImageEntry::new(format!("https://example.com/{name}.jpg"), name),
            result: Err(EntryFailure::new(
                stage,
                ImageError::Network("HTTP 404: 未找到".to_string()),
            )),
        }
    }

    fn saved_outcome(name: &str) -> EntryOutcome {
        EntryOutcome {
            entry: ImageEntry::new(format!("https://example.com/{name}.jpg"), name),
            result: Ok(SavedAsset {
                path: PathBuf::from(format!("/tmp/{name}.png")),
                width: 2,
                height: 2,
                keyed_pixels: 1,
                bytes_written: 80,
            }),
        }
    }

    #[test]
    fn stage_transitions_follow_pipeline_order() {
        let mut stage = EntryStage::Pending;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            visited.push(stage);
        }

        assert_eq!(
            visited,
            [
                EntryStage::Pending,
                EntryStage::Fetching,
                EntryStage::Decoding,
                EntryStage::Transforming,
                EntryStage::Saving,
                EntryStage::Done,
            ]
        );
        assert!(EntryStage::Failed.is_terminal());
        assert_eq!(EntryStage::Failed.next(), None);
    }

    #[test]
    fn advance_walks_to_done_and_stays_terminal() {
        let mut stage = EntryStage::Pending;
        for _ in 0..4 {
            stage.advance();
        }
        assert_eq!(stage, EntryStage::Saving);

        assert_eq!(stage.advance(), EntryStage::Done);
        assert_eq!(stage.advance(), EntryStage::Done);

        let mut failed = EntryStage::Failed;
        assert_eq!(failed.advance(), EntryStage::Failed);
    }

    #[test]
    fn report_counts_and_filters_outcomes() {
        let mut report = RunReport::new(Path::new("/tmp"), false);
        report.outcomes.push(saved_outcome("a"));
        report.outcomes.push(failed_outcome("b", EntryStage::Fetching));
        report.outcomes.push(saved_outcome("c"));

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.saved_paths().count(), 2);

        let (entry, failure) = report.failures().next().expect("one failure");
        assert_eq!(entry.output_name, "b");
        assert_eq!(failure.stage, EntryStage::Fetching);
        assert_eq!(report.outcome("b").map(|o| o.final_stage()), Some(EntryStage::Failed));
    }

    #[test]
    fn failure_message_names_stage_and_error() {
        let failure = EntryFailure::new(
            EntryStage::Decoding,
            ImageError::Decode("无法识别图片格式".to_string()),
        );

        let message = failure.to_string();
        assert!(message.contains("decoding"));
        assert!(message.contains("无法识别图片格式"));
    }
}
