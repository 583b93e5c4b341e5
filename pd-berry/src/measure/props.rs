//! 单次光栅扫描统计所有区域的属性.
//!
//! 这里的计算刻意不经过 [`crate::Region`], 只依赖标记数组和强度数组本身,
//! 作为区域坐标查找结果的独立对照.

use std::collections::BTreeMap;

use ndarray::{ArrayView2, ArrayView3, Zip};

use crate::consts::BACKGROUND_LABEL;

/// 二维区域属性.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionProps {
    /// 区域标签.
    pub label: u32,
    /// 像素个数.
    pub area: u64,
    /// 强度和.
    pub sum_intensity: u64,
    /// 强度最大值.
    pub max_intensity: u16,
    sum_row: f64,
    sum_col: f64,
    sum_rr: f64,
    sum_cc: f64,
    sum_rc: f64,
}

impl RegionProps {
    fn new(label: u32) -> Self {
        Self {
            label,
            area: 0,
            sum_intensity: 0,
            max_intensity: 0,
            sum_row: 0.0,
            sum_col: 0.0,
            sum_rr: 0.0,
            sum_cc: 0.0,
            sum_rc: 0.0,
        }
    }

    fn push(&mut self, (r, c): (usize, usize), v: u16) {
        let (r, c) = (r as f64, c as f64);
        self.area += 1;
        self.sum_intensity += v as u64;
        self.max_intensity = self.max_intensity.max(v);
        self.sum_row += r;
        self.sum_col += c;
        self.sum_rr += r * r;
        self.sum_cc += c * c;
        self.sum_rc += r * c;
    }

    /// 质心 `(row, col)`.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.area as f64;
        (self.sum_row / n, self.sum_col / n)
    }

    /// 平均强度.
    #[inline]
    pub fn mean_intensity(&self) -> f64 {
        self.sum_intensity as f64 / self.area as f64
    }

    /// 与区域具有相同二阶中心矩的椭圆的 `(长轴, 短轴)` 长度.
    ///
    /// 轴长为协方差矩阵特征值平方根的 4 倍.
    pub fn axis_lengths(&self) -> (f64, f64) {
        let n = self.area as f64;
        let (mr, mc) = self.centroid();
        let a = self.sum_rr / n - mr * mr;
        let c = self.sum_cc / n - mc * mc;
        let b = self.sum_rc / n - mr * mc;
        let half_trace = (a + c) / 2.0;
        let root = (((a - c) / 2.0).powi(2) + b * b).sqrt();
        let major = (half_trace + root).max(0.0);
        let minor = (half_trace - root).max(0.0);
        (4.0 * major.sqrt(), 4.0 * minor.sqrt())
    }
}

/// 三维区域属性.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeProps {
    /// 区域标签.
    pub label: u32,
    /// 体素个数.
    pub voxels: u64,
    /// 强度和.
    pub sum: u64,
    /// 强度最小值.
    pub min: u16,
    /// 强度最大值.
    pub max: u16,
}

/// 一次扫描计算所有非背景区域的二维属性, 按标签升序.
///
/// 调用方保证两个数组形状一致.
pub fn region_props(labels: ArrayView2<u32>, intensity: ArrayView2<u16>) -> Vec<RegionProps> {
    let mut acc: BTreeMap<u32, RegionProps> = BTreeMap::new();
    Zip::indexed(labels)
        .and(intensity)
        .for_each(|pos, &l, &v| {
            if l != BACKGROUND_LABEL {
                acc.entry(l).or_insert_with(|| RegionProps::new(l)).push(pos, v);
            }
        });
    acc.into_values().collect()
}

/// 一次扫描计算所有非背景区域的三维属性, 按标签升序.
///
/// 调用方保证两个数组形状一致.
pub fn volume_props(labels: ArrayView3<u32>, intensity: ArrayView3<u16>) -> Vec<VolumeProps> {
    let mut acc: BTreeMap<u32, VolumeProps> = BTreeMap::new();
    Zip::from(labels).and(intensity).for_each(|&l, &v| {
        if l == BACKGROUND_LABEL {
            return;
        }
        let p = acc.entry(l).or_insert(VolumeProps {
            label: l,
            voxels: 0,
            sum: 0,
            min: u16::MAX,
            max: 0,
        });
        p.voxels += 1;
        p.sum += v as u64;
        p.min = p.min.min(v);
        p.max = p.max.max(v);
    });
    acc.into_values().collect()
}
