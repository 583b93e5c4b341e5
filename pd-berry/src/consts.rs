//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 掩膜像素的可视化灰度值. 前景为白色, 背景为黑色.
    #[inline]
    pub const fn from_mask(p: bool) -> u8 {
        if p {
            WHITE
        } else {
            BLACK
        }
    }
}

/// 标记图像中背景的标签值. 所有真实区域的标签都不小于 1.
pub const BACKGROUND_LABEL: u32 = 0;

/// 去除大目标时, 对其凸包进行膨胀的步数.
pub const DILATION_MARGIN: usize = 30;

/// 二维流程中光斑允许的最大像素数.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// 二维流程中光斑允许的最小像素数.
pub const DEFAULT_MIN_SIZE: usize = 2;

/// 三维流程中光斑允许的最大体素数.
pub const DEFAULT_MAX_VOXEL: usize = 50;

/// 三维流程中光斑允许的最小体素数. 默认不设下限, 只按最大体素数过滤.
pub const DEFAULT_MIN_VOXEL: usize = 0;

/// 目录批处理入口 (目录, 目录的目录) 的最小体素数.
pub const DEFAULT_DIR_MIN_VOXEL: usize = 2;

/// 单文件 / 全部 series / 目录的目录 三种入口的默认绝对阈值.
pub const DEFAULT_THRESHOLD: u16 = 15000;

/// 目录批处理入口的默认绝对阈值.
///
/// 两种默认值的差异没有文档说明, 应视为按部署调整的参数.
pub const DEFAULT_DIR_THRESHOLD: u16 = 500;

/// 文件名相关常量.
pub mod names {
    /// 外部转换工具生成的清单文件名.
    pub const MANIFEST: &str = "manifest.json";

    /// 二维流程的光斑 CSV 文件名.
    pub const SPOTS_CSV: &str = "spots.csv";

    /// 三维流程的光斑 CSV 文件名.
    pub const PLASMODESMATA_CSV: &str = "plasmodesmata.csv";

    /// 被剔除区域的命名空间前缀.
    pub const REMOVED_NAMESPACE: &str = "removed.";

    /// 被大目标过滤忽略的像素掩膜.
    pub const IGNORED_PNG: &str = "ignored.png";

    /// 二维流程的标注图像.
    pub const ANNOTATED_PNG: &str = "annotated.png";
}

/// CSV 表头.
pub mod header {
    /// 二维流程.
    pub const SPOT: [&str; 9] = [
        "id",
        "centroid_row",
        "centroid_col",
        "area",
        "sum_intensity",
        "max_intensity",
        "mean_intensity",
        "major_axis_length",
        "minor_axis_length",
    ];

    /// 三维流程.
    pub const VOXEL: [&str; 7] = ["id", "rgb", "voxels", "sum", "min", "max", "mean"];
}
