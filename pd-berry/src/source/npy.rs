//! `.npy` 数组文件.

use std::path::Path;

use ndarray::{Array2, Array4, ArrayD, Axis, Ix4};
use ndarray_npy::read_npy;

use super::VolumeSource;
use crate::{IntensityVolume, PdError, PdResult};

/// 保存在单个 `.npy` 文件中的 `u16` 数组.
///
/// 形状为 `(z, row, col)` 时只有 series 0; 形状为 `(series, z, row, col)` 时
/// 第一维为 series.
#[derive(Debug, Clone)]
pub struct NpyStack {
    data: Array4<u16>,
}

impl NpyStack {
    /// 读取 `.npy` 文件.
    pub fn open<P: AsRef<Path>>(path: P) -> PdResult<Self> {
        let raw: ArrayD<u16> = read_npy(path.as_ref())?;
        Self::from_dyn(raw)
    }

    /// 由任意维数组创建. 只接受三维和四维.
    pub fn from_dyn(raw: ArrayD<u16>) -> PdResult<Self> {
        let raw = match raw.ndim() {
            3 => raw.insert_axis(Axis(0)),
            4 => raw,
            n => {
                return Err(PdError::InvalidInput(format!(
                    "expected a 3D or 4D array, found {n} dimensions"
                )))
            }
        };
        Ok(Self {
            data: raw.into_dimensionality::<Ix4>()?,
        })
    }

    fn check(&self, series: usize) -> PdResult<()> {
        if series >= self.data.len_of(Axis(0)) {
            return Err(PdError::NoSuchSeries(series));
        }
        Ok(())
    }
}

impl VolumeSource for NpyStack {
    fn series(&self) -> Vec<usize> {
        (0..self.data.len_of(Axis(0))).collect()
    }

    fn zslices(&self, series: usize) -> PdResult<usize> {
        self.check(series)?;
        Ok(self.data.len_of(Axis(1)))
    }

    fn zslice(&self, series: usize, z: usize) -> PdResult<Array2<u16>> {
        self.check(series)?;
        if z >= self.data.len_of(Axis(1)) {
            return Err(PdError::NoSuchZSlice { series, z });
        }
        Ok(self
            .data
            .index_axis(Axis(0), series)
            .index_axis(Axis(0), z)
            .to_owned())
    }

    fn zstack(&self, series: usize) -> PdResult<IntensityVolume> {
        self.check(series)?;
        if self.data.len_of(Axis(1)) == 0 {
            return Err(PdError::EmptySeries(series));
        }
        Ok(IntensityVolume::new(
            self.data.index_axis(Axis(0), series).to_owned(),
        ))
    }
}
