//! 运行时错误.

use thiserror::Error;

/// 光斑识别流程中可能出现的所有错误.
#[derive(Debug, Error)]
pub enum PdError {
    /// 标记图像中不存在给定标签的区域.
    #[error("no region with identifier {0}")]
    NotFound(u32),

    /// 两个本应共同配准的数组形状不一致.
    ///
    /// 两个参数依次为期望形状和实际形状.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 期望形状.
        expected: Vec<usize>,
        /// 实际形状.
        found: Vec<usize>,
    },

    /// 直接由区域坐标计算的值与独立的区域属性计算结果不一致.
    /// 这说明标记图像与强度图像没有正确配准, 整批测量作废.
    #[error("cross validation failed for label {label}: {field} is {direct} by region lookup but {props} by region properties")]
    CrossValidation {
        /// 区域标签.
        label: u32,
        /// 不一致的字段.
        field: &'static str,
        /// 直接计算的值.
        direct: u64,
        /// 区域属性计算的值.
        props: u64,
    },

    /// 区域属性列表中第 `index` 项的标签与第 `index` 个标识符不对应.
    #[error("label mapping broken at index {index}: identifier {identifier}, properties label {props_label}")]
    LabelMapping {
        /// 在列表中的位置 (从 0 开始).
        index: usize,
        /// 标记图像给出的标识符.
        identifier: u32,
        /// 区域属性给出的标签.
        props_label: u32,
    },

    /// 外部标签数组中存在小于背景值, 或相对背景值平移后超出 `u32` 范围的标签.
    #[error("label {label} cannot be normalised against the background marker {background}")]
    InvalidLabel {
        /// 非法标签.
        label: i64,
        /// 背景值.
        background: i64,
    },

    /// 数据源中不存在该 series.
    #[error("no such series: {0}")]
    NoSuchSeries(usize),

    /// 数据源中不存在该 z 切片.
    #[error("no z-slice {z} in series {series}")]
    NoSuchZSlice {
        /// series 索引.
        series: usize,
        /// z 切片索引.
        z: usize,
    },

    /// series 不含任何 z 切片.
    #[error("series {0} has no z-slices")]
    EmptySeries(usize),

    /// 清单或数组文件的内容不合法.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 流程配置不合法.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 文件系统错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 图像编解码错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// CSV 写出错误.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// 清单解析错误.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// `.npy` 读取错误.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// 数组形状错误.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

/// 光斑识别流程的运行结果.
pub type PdResult<T> = Result<T, PdError>;

impl PdError {
    /// 由两个数组形状构造 [`PdError::ShapeMismatch`].
    #[inline]
    pub(crate) fn shape_mismatch(expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
