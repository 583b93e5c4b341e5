//! 投影与阈值化.

use ndarray::{Array2, ArrayView, ArrayView2, Axis, Dimension, Zip};

use crate::{BinaryMask, BinaryMask3d, IntensityVolume, PdError, PdResult};

/// 最大强度投影: 每个 `(row, col)` 取所有 z 切片中的最大值.
///
/// 强度体不含切片时返回 [`PdError::EmptySeries`].
pub fn max_intensity_projection(volume: &IntensityVolume) -> PdResult<Array2<u16>> {
    let mut slices = volume.slice_iter();
    let Some(first) = slices.next() else {
        return Err(PdError::EmptySeries(0));
    };
    let mut ans = first.to_owned();
    for slice in slices {
        Zip::from(&mut ans).and(slice).for_each(|a, &b| *a = (*a).max(b));
    }
    Ok(ans)
}

/// 绝对阈值: 强度严格大于 `cutoff` 的像素为前景.
#[inline]
pub fn threshold_abs(image: ArrayView2<u16>, cutoff: u16) -> BinaryMask {
    image.mapv(|v| v > cutoff)
}

/// 计算 Otsu 阈值.
///
/// 对整数图像以单位宽度的直方图 (覆盖 `[min, max]`) 计算类间方差,
/// 取使其最大的第一个灰度值. 图像所有值相同时返回该值; 空图像返回 0.
pub fn otsu_threshold<D: Dimension>(image: ArrayView<u16, D>) -> u16 {
    let Some((lo, hi)) = image.iter().fold(None, |acc: Option<(u16, u16)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    }) else {
        return 0;
    };
    if lo == hi {
        return lo;
    }

    let bins = (hi - lo) as usize + 1;
    let mut hist = vec![0u64; bins];
    for &v in image.iter() {
        hist[(v - lo) as usize] += 1;
    }

    // 前缀 (背景类) 与后缀 (前景类) 的权重和加权和.
    let center = |i: usize| lo as f64 + i as f64;
    let mut w1 = vec![0f64; bins];
    let mut s1 = vec![0f64; bins];
    let (mut w, mut s) = (0f64, 0f64);
    for (i, &n) in hist.iter().enumerate() {
        w += n as f64;
        s += n as f64 * center(i);
        w1[i] = w;
        s1[i] = s;
    }
    let (total_w, total_s) = (w, s);

    let mut best = (f64::MIN, 0usize);
    for i in 0..bins - 1 {
        let w2 = total_w - w1[i];
        if w1[i] == 0.0 || w2 == 0.0 {
            continue;
        }
        let m1 = s1[i] / w1[i];
        let m2 = (total_s - s1[i]) / w2;
        let var = w1[i] * w2 * (m1 - m2).powi(2);
        if var > best.0 {
            best = (var, i);
        }
    }
    lo + best.1 as u16
}

/// Otsu 阈值化: 强度严格大于 Otsu 阈值的像素为前景.
pub fn threshold_otsu(image: ArrayView2<u16>) -> BinaryMask {
    let t = otsu_threshold(image);
    log::debug!("otsu threshold: {t}");
    threshold_abs(image, t)
}

/// 对每个 z 切片分别施加绝对阈值, 再堆叠为三维掩膜.
pub fn segment_3d(volume: &IntensityVolume, cutoff: u16) -> BinaryMask3d {
    let mut mask = BinaryMask3d::from_elem(volume.shape(), false);
    for (mut out, slice) in mask.axis_iter_mut(Axis(0)).zip(volume.slice_iter()) {
        out.assign(&threshold_abs(slice, cutoff));
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_projection_takes_max_over_z() {
        let v = IntensityVolume::from_slices(&[array![[1u16, 9], [3, 0]], array![[5u16, 2], [3, 4]]])
            .unwrap();
        assert_eq!(max_intensity_projection(&v).unwrap(), array![[5u16, 9], [3, 4]]);

        let empty = IntensityVolume::new(Array3::zeros((0, 2, 2)));
        assert!(matches!(
            max_intensity_projection(&empty),
            Err(PdError::EmptySeries(_))
        ));
    }

    #[test]
    fn test_threshold_abs_is_strict() {
        let img = array![[100u16, 101], [0, 65535]];
        assert_eq!(threshold_abs(img.view(), 100), array![[false, true], [false, true]]);
    }

    #[test]
    fn test_otsu_separates_two_levels() {
        let mut img = Array2::<u16>::from_elem((10, 10), 10);
        img.slice_mut(ndarray::s![..5, ..]).fill(200);
        let t = otsu_threshold(img.view());
        assert!((10..200).contains(&t));
        let mask = threshold_otsu(img.view());
        assert_eq!(mask.iter().filter(|&&p| p).count(), 50);
    }

    #[test]
    fn test_otsu_constant_image() {
        let img = Array2::<u16>::from_elem((3, 3), 42);
        assert_eq!(otsu_threshold(img.view()), 42);
        assert_eq!(threshold_otsu(img.view()).iter().filter(|&&p| p).count(), 0);
    }

    #[test]
    fn test_segment_3d_per_slice() {
        let v = IntensityVolume::from_slices(&[array![[0u16, 600]], array![[700u16, 0]]]).unwrap();
        let mask = segment_3d(&v, 500);
        assert_eq!(mask, ndarray::array![[[false, true]], [[true, false]]]);
    }
}
