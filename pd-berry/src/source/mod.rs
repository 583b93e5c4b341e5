//! 显微数据源.
//!
//! 一个数据源包含若干 series, 每个 series 是一组按 z 排列的 16 位二维切片.
//! 专有容器格式的解析由外部转换工具完成, 这里只读取其产物.

use std::path::Path;

use ndarray::Array2;

use crate::consts::names;
use crate::{IntensityVolume, PdError, PdResult};

mod manifest;
mod memory;
mod npy;

pub use manifest::{ManifestCollection, ManifestEntry};
pub use memory::InMemoryCollection;
pub use npy::NpyStack;

/// 能按 series / z 寻址的强度数据源.
pub trait VolumeSource {
    /// 所有 series 索引, 升序.
    fn series(&self) -> Vec<usize>;

    /// 第 `series` 个 series 的 z 切片个数.
    fn zslices(&self, series: usize) -> PdResult<usize>;

    /// 读取单个 z 切片.
    fn zslice(&self, series: usize, z: usize) -> PdResult<Array2<u16>>;

    /// 读取整个 z-stack.
    ///
    /// series 不含任何切片时返回 [`PdError::EmptySeries`].
    fn zstack(&self, series: usize) -> PdResult<IntensityVolume> {
        let n = self.zslices(series)?;
        if n == 0 {
            return Err(PdError::EmptySeries(series));
        }
        let slices = (0..n)
            .map(|z| self.zslice(series, z))
            .collect::<PdResult<Vec<_>>>()?;
        IntensityVolume::from_slices(&slices)
    }
}

/// 可跨线程共享的数据源.
pub type BoxedSource = Box<dyn VolumeSource + Send + Sync>;

/// 判断 `path` 能否作为数据源打开, 而不实际读取.
pub fn is_source<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if path.is_dir() {
        path.join(names::MANIFEST).is_file()
    } else {
        path.is_file() && path.extension().is_some_and(|e| e == "npy")
    }
}

/// 按路径打开数据源.
///
/// 含 `manifest.json` 的目录被视为 [`ManifestCollection`], `.npy` 文件被视为
/// [`NpyStack`]. 其他路径返回 [`PdError::InvalidInput`].
pub fn open_source<P: AsRef<Path>>(path: P) -> PdResult<BoxedSource> {
    let path = path.as_ref();
    if path.is_dir() && path.join(names::MANIFEST).is_file() {
        Ok(Box::new(ManifestCollection::open(path)?))
    } else if is_source(path) {
        Ok(Box::new(NpyStack::open(path)?))
    } else {
        Err(PdError::InvalidInput(format!(
            "`{}` is neither a manifest directory nor a .npy file",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_source_rejects_unknown_paths() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_source(dir.path()));
        assert!(matches!(
            open_source(dir.path()),
            Err(PdError::InvalidInput(_))
        ));
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();
        assert!(!is_source(&txt));
    }

    #[test]
    fn test_default_zstack() {
        let src = InMemoryCollection::new(vec![IntensityVolume::new(ndarray::Array3::from_elem(
            (2, 3, 3),
            9u16,
        ))]);
        let v = src.zstack(0).unwrap();
        assert_eq!(v.shape(), (2, 3, 3));
        assert!(matches!(src.zstack(4), Err(PdError::NoSuchSeries(4))));
    }
}
