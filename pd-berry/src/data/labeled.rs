//! 标记图像: 每个像素 (体素) 保存所属连通区域的标签, 背景为 0.

use std::collections::BTreeMap;
use std::ops::Index;

use itertools::Itertools;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use super::Region;
use crate::consts::BACKGROUND_LABEL;
use crate::{BinaryMask, BinaryMask3d, Connectivity, Idx2d, Idx3d, PdError, PdResult};

/// 二维标记图像.
///
/// 背景标签恒为 [`BACKGROUND_LABEL`]; 区域标签从 1 开始编号.
/// 标记图像记录了产生它的连通规则, 其区域上的几何操作沿用同一规则.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledImage {
    data: Array2<u32>,
    connectivity: Connectivity,
}

/// 三维标记体, 以 `(z, row, col)` 组织.
///
/// 连通规则 [`Connectivity::N4`] 对应 6-邻域, [`Connectivity::N8`] 对应 26-邻域.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledVolume {
    data: Array3<u32>,
    connectivity: Connectivity,
}

/// 将背景为 `background` 的外部标签平移为背景为 0 的标签. 无法表示时返回 `None`.
#[inline]
fn shift_label(v: i64, background: i64) -> Option<u32> {
    v.checked_sub(background).and_then(|d| u32::try_from(d).ok())
}

macro_rules! impl_labeled {
    ($name: ident, $arr: ty, $view: ident, $idx: ty, $mask: ty) => {
        impl Index<$idx> for $name {
            type Output = u32;

            #[inline]
            fn index(&self, index: $idx) -> &Self::Output {
                &self.data[index]
            }
        }

        impl $name {
            /// 由已经按 "背景为 0" 约定编号的标签数组创建.
            #[inline]
            pub fn new(data: $arr, connectivity: Connectivity) -> Self {
                Self { data, connectivity }
            }

            /// 由使用其他背景约定的外部标签数组创建.
            ///
            /// 值等于 `background` 的位置成为背景, 其余的值 `v` 被映射为
            /// `v - background`. 对于以 -1 表示背景的数组, 真实区域 `0` 会成为
            /// 标签 `1`. 出现小于 `background` 的值, 或映射后超出 `u32` 范围的值时,
            /// 返回 [`PdError::InvalidLabel`].
            pub fn from_signed(
                raw: $view<i64>,
                background: i64,
                connectivity: Connectivity,
            ) -> PdResult<Self> {
                if let Some(&bad) = raw.iter().find(|&&v| shift_label(v, background).is_none()) {
                    return Err(PdError::InvalidLabel {
                        label: bad,
                        background,
                    });
                }
                let data = raw.mapv(|v| shift_label(v, background).unwrap_or(BACKGROUND_LABEL));
                Ok(Self { data, connectivity })
            }

            /// 获得数据的一份不可变 shallow copy.
            #[inline]
            pub fn data(&self) -> $view<'_, u32> {
                self.data.view()
            }

            /// 直接获得底层数据.
            #[inline]
            pub fn into_raw(self) -> $arr {
                self.data
            }

            /// 标记时使用的连通规则.
            #[inline]
            pub fn connectivity(&self) -> Connectivity {
                self.connectivity
            }

            /// 形状.
            #[inline]
            pub fn shape(&self) -> $idx {
                self.data.dim()
            }

            /// 所有非背景标签, 升序且无重复.
            pub fn identifiers(&self) -> Vec<u32> {
                self.data
                    .iter()
                    .copied()
                    .filter(|&v| v != BACKGROUND_LABEL)
                    .sorted_unstable()
                    .dedup()
                    .collect()
            }

            /// 非背景区域的个数.
            #[inline]
            pub fn number_of_segments(&self) -> usize {
                self.identifiers().len()
            }

            /// 获取标签为 `identifier` 的区域.
            ///
            /// 标签为背景, 或图像中不存在该标签时, 返回 [`PdError::NotFound`].
            pub fn region_by_identifier(&self, identifier: u32) -> PdResult<Region<$idx>> {
                if identifier == BACKGROUND_LABEL {
                    return Err(PdError::NotFound(identifier));
                }
                let coords: Vec<$idx> = self
                    .data
                    .indexed_iter()
                    .filter(|(_, &v)| v == identifier)
                    .map(|(pos, _)| pos)
                    .collect();
                if coords.is_empty() {
                    return Err(PdError::NotFound(identifier));
                }
                Ok(Region::new(coords, self.shape(), self.connectivity))
            }

            /// 一次扫描获得所有非背景区域, 按标签升序.
            pub fn regions(&self) -> BTreeMap<u32, Region<$idx>> {
                let mut buckets: BTreeMap<u32, Vec<$idx>> = BTreeMap::new();
                for (pos, &v) in self.data.indexed_iter() {
                    if v != BACKGROUND_LABEL {
                        buckets.entry(v).or_default().push(pos);
                    }
                }
                let shape = self.shape();
                buckets
                    .into_iter()
                    .map(|(k, coords)| (k, Region::new(coords, shape, self.connectivity)))
                    .collect()
            }

            /// 将 `region` 覆盖的位置置为背景. 越界的坐标被忽略.
            pub fn zero_region(&mut self, region: &Region<$idx>) {
                for pos in region.iter() {
                    if let Some(v) = self.data.get_mut(pos) {
                        *v = BACKGROUND_LABEL;
                    }
                }
            }

            /// 将所有非背景像素视为前景, 转换为二值掩膜.
            #[inline]
            pub fn to_mask(&self) -> $mask {
                self.data.mapv(|v| v != BACKGROUND_LABEL)
            }

            /// 非背景像素个数.
            #[inline]
            pub fn count_foreground(&self) -> usize {
                self.data.iter().filter(|&&v| v != BACKGROUND_LABEL).count()
            }
        }
    };
}

impl_labeled!(LabeledImage, Array2<u32>, ArrayView2, Idx2d, BinaryMask);
impl_labeled!(LabeledVolume, Array3<u32>, ArrayView3, Idx3d, BinaryMask3d);

impl LabeledVolume {
    /// z 切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取第 `z` 个切片的标签视图. 当 `z` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z: usize) -> ArrayView2<'_, u32> {
        self.data.index_axis(ndarray::Axis(0), z)
    }

    /// 获取第 `z` 个切片, 作为独立的二维标记图像.
    ///
    /// 切片中的标签保持不变, 因此同一个三维区域在各切片中使用同一标签.
    pub fn label_slice(&self, z: usize) -> LabeledImage {
        LabeledImage::new(self.slice_at(z).to_owned(), self.connectivity)
    }

    /// 只保留标签在 `keep` 中的区域, 其余置为背景.
    pub(crate) fn retain(&self, keep: impl Fn(u32) -> bool) -> Self {
        let data = self
            .data
            .mapv(|v| if v != BACKGROUND_LABEL && keep(v) { v } else { BACKGROUND_LABEL });
        Self::new(data, self.connectivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> LabeledImage {
        LabeledImage::new(
            array![[0, 1, 1, 0], [0, 0, 0, 3], [3, 0, 0, 3]],
            Connectivity::N8,
        )
    }

    #[test]
    fn test_identifiers_skip_background() {
        let img = sample();
        assert_eq!(img.identifiers(), vec![1, 3]);
        assert_eq!(img.number_of_segments(), 2);
        assert_eq!(img.count_foreground(), 5);
    }

    #[test]
    fn test_region_lookup() {
        let img = sample();
        let r = img.region_by_identifier(3).unwrap();
        assert_eq!(r.coords(), &[(1, 3), (2, 0), (2, 3)]);
        assert!(matches!(
            img.region_by_identifier(2),
            Err(PdError::NotFound(2))
        ));
        assert!(matches!(
            img.region_by_identifier(0),
            Err(PdError::NotFound(0))
        ));
    }

    #[test]
    fn test_zero_region() {
        let mut img = sample();
        let r = img.region_by_identifier(1).unwrap();
        img.zero_region(&r);
        assert_eq!(img.identifiers(), vec![3]);
        assert_eq!(img.count_foreground(), 3);
    }

    #[test]
    fn test_regions_match_lookup() {
        let img = sample();
        let all = img.regions();
        assert_eq!(all.keys().copied().collect::<Vec<_>>(), img.identifiers());
        for (k, r) in all {
            assert_eq!(r, img.region_by_identifier(k).unwrap());
        }
    }

    #[test]
    fn test_from_signed_minus_one_background() {
        let raw = array![[-1i64, 0, 0], [-1, -1, 1]];
        let img = LabeledImage::from_signed(raw.view(), -1, Connectivity::N8).unwrap();
        assert_eq!(img.data(), array![[0u32, 1, 1], [0, 0, 2]]);
        assert_eq!(img.identifiers(), vec![1, 2]);
    }

    #[test]
    fn test_from_signed_zero_background() {
        let raw = array![[0i64, 4], [0, 4]];
        let img = LabeledImage::from_signed(raw.view(), 0, Connectivity::N4).unwrap();
        assert_eq!(img.identifiers(), vec![4]);
        assert_eq!(img.connectivity(), Connectivity::N4);

        let bad = array![[-2i64, 0]];
        assert!(matches!(
            LabeledImage::from_signed(bad.view(), -1, Connectivity::N8),
            Err(PdError::InvalidLabel {
                label: -2,
                background: -1
            })
        ));
    }

    #[test]
    fn test_from_signed_rejects_labels_beyond_u32() {
        // 平移后为 u32::MAX + 1, 不能悄悄截断为背景.
        let raw = array![[-1i64, u32::MAX as i64]];
        assert!(matches!(
            LabeledImage::from_signed(raw.view(), -1, Connectivity::N8),
            Err(PdError::InvalidLabel {
                label: 4_294_967_295,
                background: -1
            })
        ));

        let raw = array![[-1i64, u32::MAX as i64 - 1]];
        let img = LabeledImage::from_signed(raw.view(), -1, Connectivity::N8).unwrap();
        assert_eq!(img.identifiers(), vec![u32::MAX]);
        assert_eq!(img.count_foreground(), 1);

        let raw = array![[i64::MAX, 0]];
        assert!(LabeledImage::from_signed(raw.view(), i64::MIN, Connectivity::N8).is_err());
    }

    #[test]
    fn test_volume_slices_keep_labels() {
        let mut data = Array3::<u32>::zeros((2, 2, 2));
        data[(0, 0, 0)] = 5;
        data[(1, 0, 0)] = 5;
        data[(1, 1, 1)] = 7;
        let vol = LabeledVolume::new(data, Connectivity::N8);
        assert_eq!(vol.identifiers(), vec![5, 7]);
        assert_eq!(vol.region_by_identifier(5).unwrap().area(), 2);
        assert_eq!(vol.label_slice(1).identifiers(), vec![5, 7]);

        let kept = vol.retain(|l| l == 7);
        assert_eq!(kept.identifiers(), vec![7]);
    }
}
