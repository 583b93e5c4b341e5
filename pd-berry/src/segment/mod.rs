//! 连通域标记.
//!
//! 按光栅顺序 (行优先, 三维时 z 优先) 扫描, 每遇到一个尚未标记的前景像素,
//! 就以广度优先搜索标记它所在的整个连通域. 因此标签从 1 开始连续编号,
//! 且区域的标签顺序与其第一个像素的光栅顺序一致.

use std::collections::VecDeque;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::consts::BACKGROUND_LABEL;
use crate::{Connectivity, Idx2d, Idx3d, LabeledImage, LabeledVolume};

macro_rules! impl_label {
    ($(#[$meta: meta])* $fn_name: ident, $view: ident, $arr: ident, $idx: ty, $out: ident, $neigh: ident) => {
        $(#[$meta])*
        pub fn $fn_name(mask: $view<bool>, connectivity: Connectivity, background: bool) -> $out {
            let mut labels = $arr::<u32>::zeros(mask.dim());
            let mut q: VecDeque<$idx> = VecDeque::with_capacity(16);
            let mut next = BACKGROUND_LABEL + 1;

            for (start, &pix) in mask.indexed_iter() {
                if pix == background || labels[start] != BACKGROUND_LABEL {
                    continue;
                }
                labels[start] = next;
                q.push_back(start);
                while let Some(cur) = q.pop_front() {
                    for neigh in connectivity.$neigh(cur) {
                        let Some(&p) = mask.get(neigh) else {
                            continue;
                        };
                        if p != background && labels[neigh] == BACKGROUND_LABEL {
                            labels[neigh] = next;
                            q.push_back(neigh);
                        }
                    }
                }
                next += 1;
            }
            $out::new(labels, connectivity)
        }
    };
}

impl_label!(
    /// 对二维二值图像进行连通域标记. 值等于 `background` 的像素为背景.
    label,
    ArrayView2,
    Array2,
    Idx2d,
    LabeledImage,
    neighbours_2d
);

impl_label!(
    /// 对三维二值体进行连通域标记. 值等于 `background` 的体素为背景.
    ///
    /// [`Connectivity::N4`] 对应 6-邻域, [`Connectivity::N8`] 对应 26-邻域.
    label_3d,
    ArrayView3,
    Array3,
    Idx3d,
    LabeledVolume,
    neighbours_3d
);

/// 按 8-邻域标记二维掩膜中的前景 (`true`) 像素.
#[inline]
pub fn connected_components(mask: ArrayView2<bool>) -> LabeledImage {
    label(mask, Connectivity::N8, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_diagonal_depends_on_connectivity() {
        let mask = array![[true, false], [false, true]];
        assert_eq!(label(mask.view(), Connectivity::N8, false).number_of_segments(), 1);
        assert_eq!(label(mask.view(), Connectivity::N4, false).number_of_segments(), 2);
    }

    #[test]
    fn test_labels_follow_raster_order() {
        let mask = array![
            [false, false, true],
            [true, false, true],
            [true, false, false],
        ];
        let img = connected_components(mask.view());
        assert_eq!(img.data(), array![[0u32, 0, 1], [2, 0, 1], [2, 0, 0]]);
    }

    #[test]
    fn test_inverted_background() {
        let mask = array![[true, false], [true, true]];
        let img = label(mask.view(), Connectivity::N4, true);
        assert_eq!(img.identifiers(), vec![1]);
        assert_eq!(img.region_by_identifier(1).unwrap().coords(), &[(0, 1)]);
    }

    #[test]
    fn test_disjoint_blocks_keep_foreground() {
        let mut mask = Array2::from_elem((10, 10), false);
        mask.slice_mut(ndarray::s![1..4, 1..4]).fill(true);
        mask.slice_mut(ndarray::s![6..9, 5..8]).fill(true);

        let img = label(mask.view(), Connectivity::N8, false);
        assert_eq!(img.identifiers(), vec![1, 2]);
        assert!(!img.identifiers().contains(&BACKGROUND_LABEL));
        let areas: Vec<_> = img.regions().values().map(|r| r.area()).collect();
        assert_eq!(areas, vec![9, 9]);
        assert_eq!(img.count_foreground(), mask.iter().filter(|&&p| p).count());
        assert_eq!(img.count_foreground(), 18);
        for (idx, &p) in mask.indexed_iter() {
            assert_eq!(img.data()[idx] != BACKGROUND_LABEL, p);
        }
    }

    #[test]
    fn test_empty_mask_has_no_segments() {
        let mask = Array2::from_elem((4, 4), false);
        assert_eq!(connected_components(mask.view()).number_of_segments(), 0);
    }

    #[test]
    fn test_label_3d_connectivity() {
        let mut mask = Array3::from_elem((2, 2, 2), false);
        mask[(0, 0, 0)] = true;
        mask[(1, 1, 1)] = true;
        assert_eq!(label_3d(mask.view(), Connectivity::N8, false).number_of_segments(), 1);
        assert_eq!(label_3d(mask.view(), Connectivity::N4, false).number_of_segments(), 2);

        mask[(1, 0, 0)] = true;
        let vol = label_3d(mask.view(), Connectivity::N4, false);
        assert_eq!(vol.identifiers(), vec![1, 2]);
        assert_eq!(vol.region_by_identifier(1).unwrap().area(), 2);
    }
}
