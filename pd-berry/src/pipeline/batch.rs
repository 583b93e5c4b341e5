//! 批处理: 全部 series, 目录, 目录的目录.
//!
//! 单个单元失败时只记录日志, 继续处理其余单元. 已存在的输出目录被视为已完成,
//! 直接跳过, 因此中断后重新运行只会处理缺失的部分.

use std::path::{Path, PathBuf};

use crate::source::{is_source, open_source, VolumeSource};
use crate::{PdError, PdResult};

use super::{analyse_volume, find_plasmodesmata, OutputDir, PipelineConfig};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 对每个 series 执行的流程.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Workflow {
    /// 二维光斑流程.
    #[default]
    Spots,

    /// 三维流程.
    Volume,
}

/// 批处理的汇总.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 成功处理的单元.
    pub processed: Vec<String>,
    /// 因输出已存在而跳过的单元.
    pub skipped: Vec<String>,
    /// 失败的单元及原因.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// 合并另一份汇总, 单元名加上 `prefix/` 前缀.
    pub fn merge(&mut self, prefix: &str, other: BatchReport) {
        let tag = |s: String| format!("{prefix}/{s}");
        self.processed.extend(other.processed.into_iter().map(tag));
        self.skipped.extend(other.skipped.into_iter().map(tag));
        self.failed
            .extend(other.failed.into_iter().map(|(s, e)| (tag(s), e)));
    }

    /// 是否没有任何失败.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, unit: String, result: Result<(), String>) {
        match result {
            Ok(()) => self.processed.push(unit),
            Err(e) => {
                log::warn!("Failed: {unit}: {e}");
                self.failed.push((unit, e));
            }
        }
    }
}

/// 对单个 series 执行流程, 输出到 `dir`.
pub fn run_series(
    source: &dyn VolumeSource,
    series: usize,
    workflow: Workflow,
    cfg: &PipelineConfig,
    dir: &Path,
) -> PdResult<()> {
    log::info!("Analysing series {series}");
    let out = OutputDir::create(dir)?;
    let volume = source.zstack(series)?;
    match workflow {
        Workflow::Spots => find_plasmodesmata(&volume, cfg, &out).map(|_| ()),
        Workflow::Volume => analyse_volume(&volume, cfg, &out).map(|_| ()),
    }
}

/// 处理数据源中的所有 series, 第 `s` 个 series 输出到 `out_root/s`.
///
/// 开启 `rayon` feature 时各 series 并行处理.
pub fn analyse_all_series(
    source: &(dyn VolumeSource + Sync),
    workflow: Workflow,
    cfg: &PipelineConfig,
    out_root: &Path,
) -> BatchReport {
    let series = source.series();
    let run = |s: &usize| -> (String, Result<(), String>) {
        let result = run_series(source, *s, workflow, cfg, &out_root.join(s.to_string()))
            .map_err(|e| e.to_string());
        (s.to_string(), result)
    };

    #[cfg(feature = "rayon")]
    let results: Vec<(String, Result<(), String>)> = series.par_iter().map(run).collect();
    #[cfg(not(feature = "rayon"))]
    let results: Vec<(String, Result<(), String>)> = series.iter().map(run).collect();

    let mut report = BatchReport::default();
    for (unit, result) in results {
        report.record(unit, result);
    }
    report
}

/// 输出子目录名: 文件名去掉最后一个扩展名, 目录名保持不变.
fn unit_name(path: &Path) -> Option<String> {
    let name = if path.is_dir() {
        path.file_name()?
    } else {
        path.file_stem()?
    };
    Some(name.to_string_lossy().into_owned())
}

/// `dir` 下所有可作为数据源打开的条目, 按文件名排序.
fn list_sources(dir: &Path) -> PdResult<Vec<PathBuf>> {
    let mut ans: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| is_source(p))
        .collect();
    ans.sort();
    Ok(ans)
}

/// 处理 `input_dir` 下的每个数据源 (`.npy` 文件或含 `manifest.json` 的目录),
/// 输出到 `out_root/{名称}`.
///
/// 输出目录已存在的数据源被跳过.
pub fn analyse_dir(
    input_dir: &Path,
    workflow: Workflow,
    cfg: &PipelineConfig,
    out_root: &Path,
) -> PdResult<BatchReport> {
    if !input_dir.is_dir() {
        return Err(PdError::InvalidInput(format!(
            "no such directory: {}",
            input_dir.display()
        )));
    }
    std::fs::create_dir_all(out_root)?;

    let mut report = BatchReport::default();
    for path in list_sources(input_dir)? {
        let Some(name) = unit_name(&path) else {
            continue;
        };
        log::info!("Analysing image: {name}");
        let out_dir = out_root.join(&name);
        if out_dir.is_dir() {
            log::info!("Directory exists: {}", out_dir.display());
            log::info!("Skipping: {name}");
            report.skipped.push(name);
            continue;
        }
        let source = match open_source(&path) {
            Ok(s) => s,
            Err(e) => {
                report.record(name, Err(e.to_string()));
                continue;
            }
        };
        if let Err(e) = std::fs::create_dir_all(&out_dir) {
            report.record(name, Err(e.to_string()));
            continue;
        }
        let sub = analyse_all_series(source.as_ref(), workflow, cfg, &out_dir);
        report.merge(&name, sub);
    }
    Ok(report)
}

/// 对 `input_root` 的每个子目录调用 [`analyse_dir`], 输出到 `out_root/{子目录名}`.
pub fn analyse_lines(
    input_root: &Path,
    workflow: Workflow,
    cfg: &PipelineConfig,
    out_root: &Path,
) -> PdResult<BatchReport> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(input_root)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let mut report = BatchReport::default();
    for dir in dirs {
        let Some(name) = unit_name(&dir) else {
            continue;
        };
        log::info!("Analysing directory: {name}");
        match analyse_dir(&dir, workflow, cfg, &out_root.join(&name)) {
            Ok(sub) => report.merge(&name, sub),
            Err(e) => report.record(name, Err(e.to_string())),
        }
    }
    Ok(report)
}
