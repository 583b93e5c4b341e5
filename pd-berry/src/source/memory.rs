use ndarray::{Array2, Axis};

use super::VolumeSource;
use crate::{IntensityVolume, PdError, PdResult};

/// 已经在内存中的若干 series. 第 `i` 个强度体即第 `i` 个 series.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollection {
    volumes: Vec<IntensityVolume>,
}

impl InMemoryCollection {
    /// 由强度体列表创建.
    #[inline]
    pub fn new(volumes: Vec<IntensityVolume>) -> Self {
        Self { volumes }
    }

    fn volume(&self, series: usize) -> PdResult<&IntensityVolume> {
        self.volumes.get(series).ok_or(PdError::NoSuchSeries(series))
    }
}

impl VolumeSource for InMemoryCollection {
    fn series(&self) -> Vec<usize> {
        (0..self.volumes.len()).collect()
    }

    fn zslices(&self, series: usize) -> PdResult<usize> {
        Ok(self.volume(series)?.len_z())
    }

    fn zslice(&self, series: usize, z: usize) -> PdResult<Array2<u16>> {
        let v = self.volume(series)?;
        if z >= v.len_z() {
            return Err(PdError::NoSuchZSlice { series, z });
        }
        Ok(v.data().index_axis(Axis(0), z).to_owned())
    }

    fn zstack(&self, series: usize) -> PdResult<IntensityVolume> {
        let v = self.volume(series)?;
        if v.len_z() == 0 {
            return Err(PdError::EmptySeries(series));
        }
        Ok(v.clone())
    }
}
