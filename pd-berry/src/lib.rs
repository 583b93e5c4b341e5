#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从荧光显微 z-stack 中识别胞间连丝 (plasmodesmata) 光斑,
//! 并输出逐光斑的定量信息 (位置, 强度, 形状) 与标注图像.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 不负责解析显微镜厂商的私有容器格式. 输入由 [`source::VolumeSource`]
//!   抽象提供; crate 内置了 `manifest.json` + 单张 16-bit 图像目录 (外部转换工具的产物),
//!   `.npy` 数组以及内存数据三种来源.
//! 2. 输入数据不合法时返回 [`PdError`], 而不会 panic.
//!   程序内部一致性仍以 `debug_assert!` 检查.
//!
//! # 开发计划
//!
//! ### 连通域标记 ✅
//!
//! 4/8-邻域 (三维为 6/26-邻域) BFS 标记, 背景恒为 0, 区域标签从 1 开始,
//! 行优先扫描保证多次运行结果一致. 外部 `-1` 背景约定的标签数组可通过
//! `from_signed` 规范化.
//!
//! 实现位于 `pd-berry/src/segment`.
//!
//! ### 区域访问与几何操作 ✅
//!
//! 面积, 凸包, n 步膨胀, 腐蚀与边缘.
//!
//! 实现位于 `pd-berry/src/data/region.rs`.
//!
//! ### 尺寸过滤 ✅
//!
//! 1. 二维: 大目标取凸包后膨胀 30 步整体去除, 小目标直接去除. ✅
//! 2. 三维: 按体素数把标记体划分为 "保留" 和 "剔除" 两部分. ✅
//!
//! 实现位于 `pd-berry/src/filter.rs`.
//!
//! ### 最大强度投影与阈值化 ✅
//!
//! 绝对阈值与 Otsu 自动阈值.
//!
//! 实现位于 `pd-berry/src/projection.rs`.
//!
//! ### 光斑测量 ✅
//!
//! 质心, 面积, 强度统计, 二阶矩椭圆长短轴. 两套独立计算相互校验,
//! 不一致时整批失败.
//!
//! 实现位于 `pd-berry/src/measure`.
//!
//! ### 标注图像 ✅
//!
//! 灰度背景 + 按标签着色的区域边缘.
//!
//! 实现位于 `pd-berry/src/annotate.rs`.
//!
//! ### 流程编排 ✅
//!
//! 单 series 的二维/三维流程, 以及 "全部 series", "目录", "目录的目录"
//! 三级批处理. 已存在的输出目录会被跳过, 以支持断点续跑.
//!
//! 实现位于 `pd-berry/src/pipeline`.
//!
//! ### 按 series 并行 ✅
//!
//! 需要 `rayon` feature. series 之间没有共享状态.

/// 二维索引 `(row, col)`, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引 `(z, row, col)`.
pub type Idx3d = (usize, usize, usize);

/// 二维二值掩膜. `true` 为前景.
pub type BinaryMask = ndarray::Array2<bool>;

/// 三维二值掩膜, 以 `(z, row, col)` 组织. `true` 为前景.
pub type BinaryMask3d = ndarray::Array3<bool>;

/// 强度体, 标记图像, 区域等基础数据结构.
pub mod data;

pub mod consts;

mod error;

pub use error::{PdError, PdResult};

pub mod neighbour;

pub use neighbour::Connectivity;

pub use data::{IntensityVolume, LabeledImage, LabeledVolume, Region};

pub use data::{ImgWriteRaw, ImgWriteVis};

pub mod segment;

pub mod filter;

pub mod projection;

pub mod measure;

pub mod annotate;

pub mod source;

pub mod pipeline;

pub mod prelude;
