//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{BinaryMask, BinaryMask3d, Idx2d, Idx3d};

pub use crate::data::{ImgWriteRaw, ImgWriteVis};
pub use crate::data::{IntensityVolume, LabeledImage, LabeledVolume, Region};

pub use crate::consts::{BACKGROUND_LABEL, DEFAULT_DIR_THRESHOLD, DEFAULT_THRESHOLD};
pub use crate::neighbour::Connectivity;
pub use crate::{PdError, PdResult};

pub use crate::segment::{connected_components, label, label_3d};

pub use crate::filter::{filter_large_3d, filter_volume_3d, remove_large, remove_small};

pub use crate::projection::{max_intensity_projection, threshold_abs, threshold_otsu};

pub use crate::measure::{measure, measure_3d, SpotRecord, VoxelRecord};

pub use crate::annotate::{annotate, annotate_3d, pretty_color};

pub use crate::source::{open_source, VolumeSource};

pub use crate::pipeline::{
    analyse_all_series, analyse_dir, analyse_lines, BatchReport, OutputDir, PipelineConfig,
    ThresholdMethod, Workflow,
};
