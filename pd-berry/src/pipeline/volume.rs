//! 三维流程: 逐切片阈值化 → 三维连通域 → 按体素数划分 → 逐切片标注 → 测量.

use crate::annotate::annotate_3d;
use crate::consts::names;
use crate::filter::filter_volume_3d;
use crate::measure::{measure_3d, write_voxel_csv};
use crate::projection::{otsu_threshold, segment_3d};
use crate::segment::label_3d;
use crate::source::VolumeSource;
use crate::{IntensityVolume, LabeledVolume, PdResult};

use super::{OutputDir, PipelineConfig, ThresholdMethod};

/// 三维流程的结果.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSummary {
    /// 阈值化实际使用的截断值.
    pub cutoff: u16,
    /// 保留的区域个数.
    pub kept: usize,
    /// 剔除的区域个数.
    pub removed: usize,
}

/// 标注并测量一组区域, 写出编号的标注图像和 `{namespace}plasmodesmata.csv`.
fn persist(volume: &IntensityVolume, labeled: &LabeledVolume, out: &OutputDir) -> PdResult<()> {
    for img in annotate_3d(volume, labeled)? {
        out.save_rgb("annotate", &img)?;
    }
    let records = measure_3d(labeled, volume)?;
    write_voxel_csv(&records, out.file_path(names::PLASMODESMATA_CSV))
}

/// 分析一个 z-stack 中的三维胞间连丝.
///
/// 体素数在 `[min_voxel, max_voxel]` 之外的区域 (例如气孔) 被剔除;
/// `min_voxel` 为 0 时等价于 [`crate::filter::filter_large_3d`].
/// 保留和剔除的两部分各自标注并输出 CSV, 后者使用 `removed.` 命名空间.
/// 开启中间结果时, 先按编号写出最大强度投影和阈值化掩膜的投影.
pub fn analyse_volume(
    volume: &IntensityVolume,
    cfg: &PipelineConfig,
    out: &OutputDir,
) -> PdResult<VolumeSummary> {
    let cutoff = match cfg.threshold {
        ThresholdMethod::Absolute(t) => t,
        ThresholdMethod::Otsu => otsu_threshold(volume.data()),
    };
    let mask = segment_3d(volume, cutoff);
    if cfg.write_intermediates {
        out.save("max_intensity_projection", volume)?;
        out.save("threshold", &mask)?;
    }
    let labeled = label_3d(mask.view(), cfg.connectivity, false);
    let (kept, removed) = filter_volume_3d(&labeled, cfg.min_voxel, cfg.max_voxel);

    let summary = VolumeSummary {
        cutoff,
        kept: kept.number_of_segments(),
        removed: removed.number_of_segments(),
    };
    log::info!("Number of plasmodesmata : {}", summary.kept);
    log::info!("Number of removed       : {}", summary.removed);

    persist(volume, &kept, out)?;
    persist(volume, &removed, &out.namespaced(names::REMOVED_NAMESPACE))?;
    Ok(summary)
}

/// 从数据源读取第 `series` 个 series 并执行三维流程.
pub fn plasmodesmata_analysis(
    source: &dyn VolumeSource,
    series: usize,
    cfg: &PipelineConfig,
    out: &OutputDir,
) -> PdResult<VolumeSummary> {
    let volume = source.zstack(series)?;
    analyse_volume(&volume, cfg, out)
}
