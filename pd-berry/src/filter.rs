//! 按大小过滤连通域.

use ndarray::{Array2, ArrayView2};

use crate::consts::{BACKGROUND_LABEL, DILATION_MARGIN};
use crate::segment::label;
use crate::{BinaryMask, Connectivity, LabeledImage, LabeledVolume};

/// 去除大目标的结果.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeObjectRemoval {
    /// 过滤后的掩膜.
    pub mask: BinaryMask,

    /// 被忽略的范围: 所有大目标凸包膨胀后覆盖的像素, 无论原本是否为前景.
    pub ignored: BinaryMask,
}

impl LargeObjectRemoval {
    /// 被忽略的像素个数.
    #[inline]
    pub fn ignored_count(&self) -> usize {
        self.ignored.iter().filter(|&&p| p).count()
    }
}

/// 以 8-邻域和默认膨胀步数去除面积大于 `max_size` 的区域.
///
/// 见 [`remove_large_with`].
#[inline]
pub fn remove_large(mask: ArrayView2<bool>, max_size: usize) -> LargeObjectRemoval {
    remove_large_with(mask, max_size, DILATION_MARGIN, Connectivity::N8)
}

/// 去除面积大于 `max_size` 的区域, 以及它们周围的一圈像素.
///
/// 对每个大区域, 取其凸包并膨胀 `margin` 步, 将这一范围内的所有像素清零.
/// 大区域往往是阈值化后残缺的成像伪影, 只去除区域本身会在附近留下假阳性.
///
/// 由于只会清除像素, 对结果再次调用本函数不会产生任何变化.
pub fn remove_large_with(
    mask: ArrayView2<bool>,
    max_size: usize,
    margin: usize,
    connectivity: Connectivity,
) -> LargeObjectRemoval {
    let labeled = label(mask, connectivity, false);
    let mut ignored = Array2::from_elem(mask.dim(), false);
    for region in labeled.regions().into_values() {
        if region.area() <= max_size {
            continue;
        }
        for pos in region.convex_hull().dilate(margin).iter() {
            ignored[pos] = true;
        }
    }
    let filtered = ndarray::Zip::from(mask)
        .and(&ignored)
        .map_collect(|&m, &i| m && !i);

    let result = LargeObjectRemoval {
        mask: filtered,
        ignored,
    };
    log::info!("Number of pixels        : {}", mask.len());
    log::info!("Number of ignored pixels: {}", result.ignored_count());
    result
}

/// 去除面积小于 `min_size` 的区域.
pub fn remove_small(mask: ArrayView2<bool>, min_size: usize, connectivity: Connectivity) -> BinaryMask {
    let labeled = label(mask, connectivity, false);
    let mut out = mask.to_owned();
    for region in labeled.regions().into_values() {
        if region.area() < min_size {
            for pos in region.iter() {
                out[pos] = false;
            }
        }
    }
    out
}

/// 将三维标记体按体素数划分为两部分.
///
/// 体素数在 `[min_voxel, max_voxel]` 之内的区域进入 `kept`, 其余进入 `removed`.
/// 两者都保留原标签, 每个非背景体素恰好属于其中之一.
pub fn filter_volume_3d(
    labeled: &LabeledVolume,
    min_voxel: usize,
    max_voxel: usize,
) -> (LabeledVolume, LabeledVolume) {
    let mut sizes = std::collections::HashMap::<u32, usize>::new();
    for &v in labeled.data().iter() {
        if v != BACKGROUND_LABEL {
            *sizes.entry(v).or_default() += 1;
        }
    }
    let accept = |l: u32| {
        let n = sizes.get(&l).copied().unwrap_or_default();
        n >= min_voxel && n <= max_voxel
    };
    let kept = labeled.retain(&accept);
    let removed = labeled.retain(|l| !accept(l));
    (kept, removed)
}

/// 体素数大于 `max_voxel` 的区域进入 `removed`, 其余进入 `kept`.
#[inline]
pub fn filter_large_3d(labeled: &LabeledVolume, max_voxel: usize) -> (LabeledVolume, LabeledVolume) {
    filter_volume_3d(labeled, 0, max_voxel)
}

/// 统计已标记图像中的光斑个数, 并记录到日志.
pub fn count_spots(labeled: &LabeledImage) -> usize {
    let n = labeled.number_of_segments();
    log::info!("Number of spots         : {n}");
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    fn mask_with_block(shape: (usize, usize), top: usize, left: usize, h: usize, w: usize) -> BinaryMask {
        let mut m = Array2::from_elem(shape, false);
        m.slice_mut(s![top..top + h, left..left + w]).fill(true);
        m
    }

    #[test]
    fn test_large_region_and_neighbourhood_removed() {
        // 面积 200 的区域, 以及 20 像素外的一个小点.
        let mut mask = mask_with_block((120, 120), 40, 40, 10, 20);
        mask[(70, 50)] = true;
        mask[(2, 2)] = true;

        let out = remove_large(mask.view(), 100);
        assert!(out.ignored_count() >= 200);
        // 凸包即为矩形本身, 膨胀 30 步后覆盖 [10, 79] x [10, 89].
        for h in 10..80 {
            for w in 10..90 {
                assert!(!out.mask[(h, w)]);
                assert!(out.ignored[(h, w)]);
            }
        }
        assert!(!out.ignored[(9, 10)]);
        assert!(out.mask[(2, 2)]);
        assert_eq!(out.mask.iter().filter(|&&p| p).count(), 1);
    }

    #[test]
    fn test_remove_large_is_idempotent() {
        let mut mask = mask_with_block((100, 100), 10, 10, 12, 12);
        mask[(90, 90)] = true;
        mask[(90, 91)] = true;
        let once = remove_large(mask.view(), 100);
        let twice = remove_large(once.mask.view(), 100);
        assert_eq!(once.mask, twice.mask);
        assert_eq!(twice.ignored_count(), 0);
    }

    #[test]
    fn test_small_regions_kept() {
        let mask = mask_with_block((10, 10), 2, 2, 3, 3);
        let out = remove_large(mask.view(), 9);
        assert_eq!(out.mask, mask);
        assert_eq!(out.ignored_count(), 0);
    }

    #[test]
    fn test_remove_small() {
        let mut mask = mask_with_block((10, 10), 0, 0, 2, 2);
        mask[(8, 8)] = true;
        let out = remove_small(mask.view(), 2, Connectivity::N8);
        assert!(!out[(8, 8)]);
        assert_eq!(out.iter().filter(|&&p| p).count(), 4);
    }

    #[test]
    fn test_count_spots() {
        let mut mask = mask_with_block((10, 10), 0, 0, 2, 2);
        mask[(8, 8)] = true;
        mask[(5, 0)] = true;
        assert_eq!(count_spots(&crate::segment::connected_components(mask.view())), 3);
        assert_eq!(count_spots(&label(mask.view(), Connectivity::N4, false)), 3);
    }

    fn sample_volume() -> LabeledVolume {
        let mut data = Array3::<u32>::zeros((3, 4, 4));
        // 标签 1: 8 个体素.
        data.slice_mut(s![0..2, 0..2, 0..2]).fill(1);
        // 标签 2: 1 个体素.
        data[(2, 3, 3)] = 2;
        // 标签 3: 3 个体素.
        data.slice_mut(s![1, 3, 0..3]).fill(3);
        LabeledVolume::new(data, Connectivity::N8)
    }

    #[test]
    fn test_filter_large_3d_partitions_volume() {
        let vol = sample_volume();
        let (kept, removed) = filter_large_3d(&vol, 5);
        assert_eq!(kept.identifiers(), vec![2, 3]);
        assert_eq!(removed.identifiers(), vec![1]);
        for ((pos, &orig), (&k, &r)) in vol
            .data()
            .indexed_iter()
            .zip(kept.data().iter().zip(removed.data().iter()))
        {
            if orig == BACKGROUND_LABEL {
                assert_eq!((k, r), (0, 0), "{pos:?}");
            } else {
                // 恰好一方持有原标签.
                assert!((k == orig) ^ (r == orig), "{pos:?}");
                assert!(k == 0 || r == 0);
            }
        }
    }

    #[test]
    fn test_filter_volume_3d_bounds() {
        let vol = sample_volume();
        let (kept, removed) = filter_volume_3d(&vol, 2, 50);
        assert_eq!(kept.identifiers(), vec![1, 3]);
        assert_eq!(removed.identifiers(), vec![2]);
        assert_eq!(kept.count_foreground() + removed.count_foreground(), vol.count_foreground());
    }
}
