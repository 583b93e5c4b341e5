use std::fmt;

use crate::consts::*;
use crate::{Connectivity, PdError, PdResult};

/// 阈值化方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMethod {
    /// 强度严格大于给定值的像素为前景.
    Absolute(u16),

    /// 自动 (Otsu) 阈值.
    Otsu,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Absolute(DEFAULT_THRESHOLD)
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(t) => write!(f, "absolute({t})"),
            Self::Otsu => write!(f, "otsu"),
        }
    }
}

/// 流程配置.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 阈值化方式.
    pub threshold: ThresholdMethod,
    /// 二维流程中光斑允许的最大像素数.
    pub max_size: usize,
    /// 二维流程中光斑允许的最小像素数.
    pub min_size: usize,
    /// 三维流程中光斑允许的最大体素数.
    pub max_voxel: usize,
    /// 三维流程中光斑允许的最小体素数.
    pub min_voxel: usize,
    /// 连通规则.
    pub connectivity: Connectivity,
    /// 去除大目标时凸包的膨胀步数.
    pub dilation_margin: usize,
    /// 是否保存投影, 阈值化和过滤的中间结果.
    pub write_intermediates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::default(),
            max_size: DEFAULT_MAX_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            max_voxel: DEFAULT_MAX_VOXEL,
            min_voxel: DEFAULT_MIN_VOXEL,
            connectivity: Connectivity::N8,
            dilation_margin: DILATION_MARGIN,
            write_intermediates: false,
        }
    }
}

impl PipelineConfig {
    /// 检查尺寸上下界是否自洽.
    pub fn validate(&self) -> PdResult<()> {
        if self.min_size > self.max_size {
            return Err(PdError::InvalidConfig(format!(
                "min_size ({}) is larger than max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.min_voxel > self.max_voxel {
            return Err(PdError::InvalidConfig(format!(
                "min_voxel ({}) is larger than max_voxel ({})",
                self.min_voxel, self.max_voxel
            )));
        }
        Ok(())
    }

    /// 在日志中记录所有配置项.
    pub fn log(&self) {
        log::info!("Threshold               : {}", self.threshold);
        log::info!("Max size                : {}", self.max_size);
        log::info!("Min size                : {}", self.min_size);
        log::info!("Max voxel               : {}", self.max_voxel);
        log::info!("Min voxel               : {}", self.min_voxel);
        log::debug!("Connectivity            : {:?}", self.connectivity);
        log::debug!("Dilation margin         : {}", self.dilation_margin);
    }
}
