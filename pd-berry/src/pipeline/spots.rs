//! 二维光斑流程: 最大强度投影 → 阈值化 → 尺寸过滤 → 测量 → 标注.

use crate::consts::names;
use crate::filter::{count_spots, remove_large_with, remove_small};
use crate::measure::{measure, write_spot_csv, SpotRecord};
use crate::projection::{max_intensity_projection, threshold_abs, threshold_otsu};
use crate::segment::label;
use crate::{annotate, IntensityVolume, ImgWriteVis, PdResult};

use super::{OutputDir, PipelineConfig, ThresholdMethod};

/// 二维流程的结果.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotSummary {
    /// 光斑个数.
    pub spots: usize,
    /// 被大目标过滤忽略的像素个数.
    pub ignored_pixels: usize,
    /// 每个光斑的测量值, 按标签升序.
    pub records: Vec<SpotRecord>,
}

/// 在一个 z-stack 中寻找胞间连丝光斑.
///
/// 写出 `ignored.png`, `spots.csv` 和 `annotated.png`; 开启中间结果时,
/// 还会按编号写出投影, 阈值化结果和两次过滤后的掩膜.
pub fn find_plasmodesmata(
    volume: &IntensityVolume,
    cfg: &PipelineConfig,
    out: &OutputDir,
) -> PdResult<SpotSummary> {
    let projection = max_intensity_projection(volume)?;
    if cfg.write_intermediates {
        out.save("max_intensity_projection", &projection)?;
    }

    let mask = match cfg.threshold {
        ThresholdMethod::Absolute(t) => threshold_abs(projection.view(), t),
        ThresholdMethod::Otsu => threshold_otsu(projection.view()),
    };
    if cfg.write_intermediates {
        out.save("threshold", &mask)?;
    }

    let removal = remove_large_with(mask.view(), cfg.max_size, cfg.dilation_margin, cfg.connectivity);
    removal.ignored.save(out.file_path(names::IGNORED_PNG))?;
    if cfg.write_intermediates {
        out.save("remove_large_objects", &removal.mask)?;
    }

    let mask = remove_small(removal.mask.view(), cfg.min_size, cfg.connectivity);
    if cfg.write_intermediates {
        out.save("remove_small_objects", &mask)?;
    }

    let labeled = label(mask.view(), cfg.connectivity, false);
    let spots = count_spots(&labeled);

    let records = measure(&labeled, projection.view())?;
    write_spot_csv(&records, out.file_path(names::SPOTS_CSV))?;

    let annotated = annotate::annotate(projection.view(), &labeled)?;
    annotated.save(out.file_path(names::ANNOTATED_PNG))?;

    Ok(SpotSummary {
        spots,
        ignored_pixels: removal.ignored_count(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    fn synthetic() -> IntensityVolume {
        let mut data = Array3::<u16>::zeros((3, 120, 120));
        // 一个 5x5 的亮斑, 只出现在中间的切片上.
        data.slice_mut(s![1, 10..15, 10..15]).fill(20000);
        // 一个面积 400 的大目标.
        data.slice_mut(s![2, 60..80, 60..80]).fill(30000);
        // 大目标附近的小点, 会随大目标一起被去除.
        data[(0, 55, 55)] = 20000;
        data[(0, 55, 56)] = 20000;
        // 孤立的单像素噪声.
        data[(0, 5, 100)] = 20000;
        IntensityVolume::new(data)
    }

    #[test]
    fn test_find_plasmodesmata_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputDir::create(dir.path()).unwrap();
        let cfg = PipelineConfig {
            write_intermediates: true,
            ..Default::default()
        };
        let summary = find_plasmodesmata(&synthetic(), &cfg, &out).unwrap();

        assert_eq!(summary.spots, 1);
        assert!(summary.ignored_pixels >= 400);
        let r = &summary.records[0];
        assert_eq!((r.id, r.area, r.max_intensity), (1, 25, 20000));
        assert_eq!(r.sum_intensity, 25 * 20000);
        assert_eq!(r.rounded_centroid(), (12.0, 12.0));

        for name in [names::SPOTS_CSV, names::ANNOTATED_PNG, names::IGNORED_PNG] {
            assert!(dir.path().join(name).is_file(), "{name}");
        }
        assert!(dir.path().join("000_max_intensity_projection.png").is_file());
        assert!(dir.path().join("003_remove_small_objects.png").is_file());
        let csv = std::fs::read_to_string(dir.path().join(names::SPOTS_CSV)).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_intermediates_off_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputDir::create(dir.path()).unwrap();
        find_plasmodesmata(&synthetic(), &PipelineConfig::default(), &out).unwrap();
        let numbered = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("000_"))
            .count();
        assert_eq!(numbered, 0);
        assert!(dir.path().join(names::IGNORED_PNG).is_file());
    }
}
