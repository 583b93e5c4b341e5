//! 流程编排.
//!
//! 每个 series 依次经过 `读取 → 投影/阈值化 → 过滤 → 测量 → 标注 → 写出`.
//! 任一步骤失败都会中止当前 series; 批处理会记录失败并继续处理下一个.

mod batch;
mod config;
mod output;
mod spots;
mod volume;

pub use batch::{analyse_all_series, analyse_dir, analyse_lines, run_series, BatchReport, Workflow};
pub use config::{PipelineConfig, ThresholdMethod};
pub use output::OutputDir;
pub use spots::{find_plasmodesmata, SpotSummary};
pub use volume::{analyse_volume, plasmodesmata_analysis, VolumeSummary};
