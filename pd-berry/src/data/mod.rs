use std::ops::Index;

use ndarray::{stack, Array2, Array3, ArrayView, ArrayView2, Axis, Ix3};

use crate::{Idx3d, PdError, PdResult};

mod labeled;
mod region;
mod save;

pub use labeled::{LabeledImage, LabeledVolume};
pub use region::Region;
pub use save::{ImgWriteRaw, ImgWriteVis};

/// 单个 series 的荧光强度体. 样本以 `u16` 保存.
///
/// 内部以 `(z, row, col)` 组织, 使得每个 z 切片都是连续的二维视图.
/// 该结构创建后只读.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityVolume {
    data: Array3<u16>,
}

impl Index<Idx3d> for IntensityVolume {
    type Output = u16;

    /// 以 `(z, row, col)` 访问.
    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<u16>> for IntensityVolume {
    #[inline]
    fn from(data: Array3<u16>) -> Self {
        Self { data }
    }
}

impl IntensityVolume {
    /// 由 `(z, row, col)` 组织的数组直接创建.
    #[inline]
    pub fn new(data: Array3<u16>) -> Self {
        Self { data }
    }

    /// 将若干形状相同的二维切片按顺序堆叠为强度体.
    ///
    /// 切片为空时返回 [`PdError::InvalidInput`]; 切片形状不一致时返回
    /// [`PdError::ShapeMismatch`].
    pub fn from_slices(slices: &[Array2<u16>]) -> PdResult<Self> {
        let Some(first) = slices.first() else {
            return Err(PdError::InvalidInput("no z-slices to stack".to_string()));
        };
        if let Some(bad) = slices.iter().find(|s| s.shape() != first.shape()) {
            return Err(PdError::shape_mismatch(first.shape(), bad.shape()));
        }
        let views: Vec<ArrayView2<u16>> = slices.iter().map(|s| s.view()).collect();
        let data = stack(Axis(0), &views)?;
        Ok(Self { data })
    }

    /// 强度体形状 `(z, row, col)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// z 切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 以 `(row, col, z)` 的顺序访问单个样本. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, row: usize, col: usize, z: usize) -> Option<u16> {
        self.data.get((z, row, col)).copied()
    }

    /// 获取第 `z` 个切片的视图.
    ///
    /// 当 `z` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z: usize) -> ArrayView2<'_, u16> {
        self.data.index_axis(Axis(0), z)
    }

    /// 获取能按 z 升序迭代切片视图的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, u16>> {
        self.data.axis_iter(Axis(0))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u16, Ix3> {
        self.data.view()
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<u16> {
        self.data
    }
}
