//! 邻域定义.
//!
//! 所有函数都不检查越界. 负方向使用 `wrapping_sub`, 因此越界的邻居会变成
//! 一个极大的索引, 调用方通过 `get` 或形状检查将其过滤掉即可.

use crate::{Idx2d, Idx3d};
use either::Either;

/// 连通规则.
///
/// 二维时分别为 4-邻域和 8-邻域; 三维时分别为前后上下左右 6-邻域 ("钻石型")
/// 和 26-邻域.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Connectivity {
    /// 4-邻域 (三维为 6-邻域).
    N4,

    /// 8-邻域 (三维为 26-邻域).
    #[default]
    N8,
}

impl Connectivity {
    /// 由邻居个数构造. 仅接受 4 和 8.
    pub fn from_neighbours(n: u32) -> Option<Self> {
        match n {
            4 => Some(Self::N4),
            8 => Some(Self::N8),
            _ => None,
        }
    }

    /// 二维邻居个数.
    #[inline]
    pub fn neighbours(&self) -> u32 {
        match self {
            Self::N4 => 4,
            Self::N8 => 8,
        }
    }

    /// 获得 `pos` 的二维邻居索引. 不检查越界.
    #[inline]
    pub fn neighbours_2d(self, pos: Idx2d) -> impl Iterator<Item = Idx2d> {
        match self {
            Self::N4 => Either::Left(neighbour4(pos).into_iter()),
            Self::N8 => Either::Right(neighbour8(pos).into_iter()),
        }
    }

    /// 获得 `pos` 的三维邻居索引. 不检查越界.
    #[inline]
    pub fn neighbours_3d(self, pos: Idx3d) -> impl Iterator<Item = Idx3d> {
        match self {
            Self::N4 => Either::Left(diamond6(pos).into_iter()),
            Self::N8 => Either::Right(full26(pos).into_iter()),
        }
    }
}

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

/// 获得 `(z, h, w)` 前后上下左右六个点的坐标. 不检查越界.
#[inline]
pub(crate) fn diamond6((z, h, w): Idx3d) -> [Idx3d; 6] {
    [
        (z.wrapping_sub(1), h, w),
        (z.saturating_add(1), h, w),
        (z, h.wrapping_sub(1), w),
        (z, h.saturating_add(1), w),
        (z, h, w.wrapping_sub(1)),
        (z, h, w.saturating_add(1)),
    ]
}

/// 获得 `(z, h, w)` 的 26-邻居索引. 不检查越界.
pub(crate) fn full26((z, h, w): Idx3d) -> [Idx3d; 26] {
    // usize::MAX 在 wrapping_add 下等价于 -1.
    const OFFSETS: [usize; 3] = [usize::MAX, 0, 1];

    let mut ans = [(0, 0, 0); 26];
    let mut i = 0;
    for dz in OFFSETS {
        for dh in OFFSETS {
            for dw in OFFSETS {
                if dz == 0 && dh == 0 && dw == 0 {
                    continue;
                }
                ans[i] = (z.wrapping_add(dz), h.wrapping_add(dh), w.wrapping_add(dw));
                i += 1;
            }
        }
    }
    debug_assert_eq!(i, 26);
    ans
}
