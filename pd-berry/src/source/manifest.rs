//! 外部转换工具的产物: 一个目录, 含 `manifest.json` 和每个平面一张 16 位灰度图.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::VolumeSource;
use crate::consts::names;
use crate::{PdError, PdResult};

/// 清单中的一项, 对应一张二维图像.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 图像文件名, 相对于清单所在目录.
    pub filename: String,
    /// series 索引.
    pub series: usize,
    /// 通道索引.
    #[serde(default)]
    pub channel: usize,
    /// z 切片索引.
    pub zslice: usize,
    /// 时间点索引.
    #[serde(default)]
    pub timepoint: usize,
}

/// 由清单描述的显微图像集合.
///
/// 默认只读取通道 0 和时间点 0.
#[derive(Debug, Clone)]
pub struct ManifestCollection {
    dir: PathBuf,
    entries: Vec<ManifestEntry>,
    channel: usize,
    timepoint: usize,
}

impl ManifestCollection {
    /// 读取 `dir/manifest.json`.
    pub fn open<P: AsRef<Path>>(dir: P) -> PdResult<Self> {
        let dir = dir.as_ref().to_owned();
        let file = std::fs::File::open(dir.join(names::MANIFEST))?;
        let entries: Vec<ManifestEntry> = serde_json::from_reader(std::io::BufReader::new(file))?;
        log::debug!("{} entries in {}", entries.len(), dir.display());
        Ok(Self::from_entries(dir, entries))
    }

    /// 由已有清单项创建.
    pub fn from_entries(dir: PathBuf, entries: Vec<ManifestEntry>) -> Self {
        Self {
            dir,
            entries,
            channel: 0,
            timepoint: 0,
        }
    }

    /// 改为读取通道 `channel`.
    #[inline]
    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    /// 改为读取时间点 `timepoint`.
    #[inline]
    pub fn with_timepoint(mut self, timepoint: usize) -> Self {
        self.timepoint = timepoint;
        self
    }

    /// 当前通道和时间点下的所有清单项.
    fn selected(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| e.channel == self.channel && e.timepoint == self.timepoint)
    }

    fn entry(&self, series: usize, z: usize) -> Option<&ManifestEntry> {
        self.selected().find(|e| e.series == series && e.zslice == z)
    }
}

impl VolumeSource for ManifestCollection {
    fn series(&self) -> Vec<usize> {
        self.selected().map(|e| e.series).sorted_unstable().dedup().collect()
    }

    fn zslices(&self, series: usize) -> PdResult<usize> {
        let zs: Vec<usize> = self
            .selected()
            .filter(|e| e.series == series)
            .map(|e| e.zslice)
            .collect();
        if zs.is_empty() {
            return Err(PdError::NoSuchSeries(series));
        }
        Ok(zs.into_iter().max().map_or(0, |m| m + 1))
    }

    fn zslice(&self, series: usize, z: usize) -> PdResult<Array2<u16>> {
        let entry = self
            .entry(series, z)
            .ok_or(PdError::NoSuchZSlice { series, z })?;
        let img = image::open(self.dir.join(&entry.filename))?.into_luma16();
        let (width, height) = img.dimensions();
        Ok(Array2::from_shape_vec(
            (height as usize, width as usize),
            img.into_raw(),
        )?)
    }
}
