//! 光斑测量.
//!
//! 每个区域的测量值都来自两条相互独立的路径: 一次光栅扫描得到的区域属性
//! ([`props`]), 以及按标签直接查找的区域坐标. 两者的面积和最大强度必须一致,
//! 否则说明标记图像与强度图像没有正确配准, 整批测量作废.
//!
//! # 编号
//!
//! 记录的 `id` 就是区域标签, 从 1 开始升序. 区域属性列表中的第 `i` 项
//! 必须对应 `identifiers()[i]`, 这一点会被显式检查.

use ndarray::ArrayView2;

use crate::annotate::pretty_color;
use crate::{IntensityVolume, LabeledImage, LabeledVolume, PdError, PdResult};

pub mod props;
mod table;

pub use table::{write_spot_csv, write_spot_csv_to, write_voxel_csv, write_voxel_csv_to};
use props::{region_props, volume_props};

/// 二维流程中一个光斑的测量值.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotRecord {
    /// 区域标签.
    pub id: u32,
    /// 质心 `(row, col)`, 未取整.
    pub centroid: (f64, f64),
    /// 像素个数.
    pub area: usize,
    /// 强度和.
    pub sum_intensity: u64,
    /// 强度最大值.
    pub max_intensity: u16,
    /// 平均强度.
    pub mean_intensity: f64,
    /// 等效椭圆长轴长度.
    pub major_axis_length: f64,
    /// 等效椭圆短轴长度.
    pub minor_axis_length: f64,
}

impl SpotRecord {
    /// 四舍五入后的质心.
    #[inline]
    pub fn rounded_centroid(&self) -> (f64, f64) {
        (self.centroid.0.round(), self.centroid.1.round())
    }
}

/// 三维流程中一个光斑的测量值.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelRecord {
    /// 区域标签.
    pub id: u32,
    /// 标注颜色.
    pub rgb: [u8; 3],
    /// 体素个数.
    pub voxels: usize,
    /// 强度和.
    pub sum: u64,
    /// 强度最小值.
    pub min: u16,
    /// 强度最大值.
    pub max: u16,
    /// 平均强度.
    pub mean: f64,
}

fn check_shape(expected: &[usize], found: &[usize]) -> PdResult<()> {
    if expected != found {
        return Err(PdError::shape_mismatch(expected, found));
    }
    Ok(())
}

fn check_mapping(identifiers: &[u32], props_labels: impl ExactSizeIterator<Item = u32>) -> PdResult<()> {
    if identifiers.len() != props_labels.len() {
        return Err(PdError::InvalidInput(format!(
            "{} identifiers but {} region properties",
            identifiers.len(),
            props_labels.len()
        )));
    }
    for (index, (&identifier, props_label)) in identifiers.iter().zip(props_labels).enumerate() {
        if identifier != props_label {
            return Err(PdError::LabelMapping {
                index,
                identifier,
                props_label,
            });
        }
    }
    Ok(())
}

fn cross_validate(label: u32, field: &'static str, direct: u64, props: u64) -> PdResult<()> {
    if direct != props {
        return Err(PdError::CrossValidation {
            label,
            field,
            direct,
            props,
        });
    }
    Ok(())
}

/// 测量二维标记图像中的所有光斑, 按标签升序.
///
/// `intensity` 必须与标记图像形状一致. 任一区域交叉验证失败时, 返回错误且
/// 不产生任何记录.
pub fn measure(labeled: &LabeledImage, intensity: ArrayView2<u16>) -> PdResult<Vec<SpotRecord>> {
    check_shape(labeled.data().shape(), intensity.shape())?;

    let identifiers = labeled.identifiers();
    let props = region_props(labeled.data(), intensity);
    check_mapping(&identifiers, props.iter().map(|p| p.label))?;

    let regions = labeled.regions();
    let mut records = Vec::with_capacity(props.len());
    for p in props.iter() {
        let region = regions.get(&p.label).ok_or(PdError::NotFound(p.label))?;
        let direct_max = region.iter().map(|pos| intensity[pos]).max().unwrap_or(0);
        cross_validate(p.label, "area", region.area() as u64, p.area)?;
        cross_validate(p.label, "max_intensity", direct_max as u64, p.max_intensity as u64)?;

        let (major, minor) = p.axis_lengths();
        records.push(SpotRecord {
            id: p.label,
            centroid: p.centroid(),
            area: region.area(),
            sum_intensity: p.sum_intensity,
            max_intensity: p.max_intensity,
            mean_intensity: p.mean_intensity(),
            major_axis_length: major,
            minor_axis_length: minor,
        });
    }
    Ok(records)
}

/// 测量三维标记体中的所有光斑, 按标签升序.
pub fn measure_3d(labeled: &LabeledVolume, intensity: &IntensityVolume) -> PdResult<Vec<VoxelRecord>> {
    check_shape(labeled.data().shape(), intensity.data().shape())?;

    let identifiers = labeled.identifiers();
    let props = volume_props(labeled.data(), intensity.data());
    check_mapping(&identifiers, props.iter().map(|p| p.label))?;

    let regions = labeled.regions();
    let mut records = Vec::with_capacity(props.len());
    for p in props.iter() {
        let region = regions.get(&p.label).ok_or(PdError::NotFound(p.label))?;
        let direct_max = region.iter().map(|pos| intensity[pos]).max().unwrap_or(0);
        cross_validate(p.label, "voxels", region.area() as u64, p.voxels)?;
        cross_validate(p.label, "max", direct_max as u64, p.max as u64)?;

        records.push(VoxelRecord {
            id: p.label,
            rgb: pretty_color(p.label),
            voxels: region.area(),
            sum: p.sum,
            min: p.min,
            max: p.max,
            mean: p.sum as f64 / p.voxels as f64,
        });
    }
    Ok(records)
}
