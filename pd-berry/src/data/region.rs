//! 区域: 标记图像中共享同一标签的坐标集合, 以及其上的几何操作.

use std::collections::VecDeque;

use ndarray::Array2;

use crate::{Connectivity, Idx2d};

/// 标记图像中的一个区域.
///
/// 区域只在其所属的标记图像中有意义: 它记录了图像形状 `shape`
/// 和标记时使用的连通规则, 所有几何操作的结果都被裁剪到图像范围内,
/// 并沿用同一连通规则.
///
/// 内部坐标按行优先升序存储且无重复.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region<P = Idx2d> {
    coords: Vec<P>,
    shape: P,
    connectivity: Connectivity,
}

impl<P: Copy + Ord> Region<P> {
    /// 由坐标集合创建区域. 会对坐标排序并去重.
    pub fn new(mut coords: Vec<P>, shape: P, connectivity: Connectivity) -> Self {
        coords.sort_unstable();
        coords.dedup();
        Self {
            coords,
            shape,
            connectivity,
        }
    }

    /// 面积 (二维为像素个数, 三维为体素个数).
    #[inline]
    pub fn area(&self) -> usize {
        self.coords.len()
    }

    /// 是否为空区域.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// 所有坐标, 行优先升序.
    #[inline]
    pub fn coords(&self) -> &[P] {
        &self.coords
    }

    /// 获取能迭代所有坐标的迭代器.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = P> + '_ {
        self.coords.iter().copied()
    }

    /// 区域是否包含 `pos`.
    #[inline]
    pub fn contains(&self, pos: &P) -> bool {
        self.coords.binary_search(pos).is_ok()
    }

    /// 所属图像的形状.
    #[inline]
    pub fn shape(&self) -> P {
        self.shape
    }

    /// 该区域使用的连通规则.
    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// 以同样的图像形状和连通规则包装新的坐标集合.
    #[inline]
    fn derive(&self, coords: Vec<P>) -> Self {
        Self::new(coords, self.shape, self.connectivity)
    }
}

/// 二维几何操作.
impl Region<Idx2d> {
    /// 外接矩形 `(左上, 右下)`, 均为闭区间端点. 空区域返回 `None`.
    pub fn bounding_box(&self) -> Option<(Idx2d, Idx2d)> {
        let first = *self.coords.first()?;
        let last = *self.coords.last()?;
        // 行优先存储, 行的最值可直接得到.
        let (min_w, max_w) = self
            .coords
            .iter()
            .fold((usize::MAX, 0), |(lo, hi), &(_, w)| (lo.min(w), hi.max(w)));
        Some(((first.0, min_w), (last.0, max_w)))
    }

    /// 判断一个索引是否在所属图像内.
    #[inline]
    fn check(&self, (h, w): Idx2d) -> bool {
        h < self.shape.0 && w < self.shape.1
    }

    /// 按连通规则膨胀 `n` 步: 返回所有到区域距离不超过 `n` 步的像素.
    ///
    /// 4-邻域对应曼哈顿距离 (十字形结构元), 8-邻域对应切比雪夫距离
    /// (方形结构元). 结果被裁剪到图像范围内. `dilate(0)` 返回自身的拷贝.
    pub fn dilate(&self, n: usize) -> Self {
        if n == 0 || self.is_empty() {
            return self.clone();
        }
        let Some(((top, left), (bottom, right))) = self.bounding_box() else {
            return self.clone();
        };
        // 局部窗口, 避免在整幅图像上分配.
        let (oh, ow) = (top.saturating_sub(n), left.saturating_sub(n));
        let eh = bottom.saturating_add(n).min(self.shape.0 - 1);
        let ew = right.saturating_add(n).min(self.shape.1 - 1);
        let mut visited = Array2::from_elem((eh - oh + 1, ew - ow + 1), false);

        let mut q: VecDeque<(Idx2d, usize)> = VecDeque::with_capacity(self.area() * 2);
        let mut ans = Vec::with_capacity(self.area() * 2);
        for &(h, w) in self.coords.iter() {
            visited[(h - oh, w - ow)] = true;
            q.push_back(((h, w), 0));
        }
        while let Some((pos, depth)) = q.pop_front() {
            ans.push(pos);
            if depth == n {
                continue;
            }
            for neigh in self.connectivity.neighbours_2d(pos) {
                if !self.check(neigh) {
                    continue;
                }
                let local = (neigh.0 - oh, neigh.1 - ow);
                if !visited[local] {
                    visited[local] = true;
                    q.push_back((neigh, depth + 1));
                }
            }
        }
        self.derive(ans)
    }

    /// 判断区域内的 `pos` 是否有邻居落在区域外. 图像外的邻居视为区域外.
    fn touches_outside(&self, pos: Idx2d) -> bool {
        self.connectivity
            .neighbours_2d(pos)
            .any(|p| !self.check(p) || !self.contains(&p))
    }

    /// 按连通规则腐蚀 1 步. 图像边缘之外视为背景.
    pub fn inner(&self) -> Self {
        self.derive(
            self.iter()
                .filter(|p| !self.touches_outside(*p))
                .collect(),
        )
    }

    /// 按连通规则腐蚀 `n` 步. `erode(0)` 返回自身的拷贝.
    pub fn erode(&self, n: usize) -> Self {
        let mut ans = self.clone();
        for _ in 0..n {
            if ans.is_empty() {
                break;
            }
            ans = ans.inner();
        }
        ans
    }

    /// 区域边缘: 属于区域但不属于其 1 步腐蚀的像素, 即 `self - self.inner()`.
    pub fn border(&self) -> Self {
        self.derive(self.iter().filter(|p| self.touches_outside(*p)).collect())
    }

    /// 凸包: 所有中心落在区域像素角点所张成凸多边形之内 (含边上) 的像素.
    ///
    /// 结果总是区域的超集, 且不会超出区域的外接矩形.
    pub fn convex_hull(&self) -> Self {
        let Some(((top, left), (bottom, right))) = self.bounding_box() else {
            return self.clone();
        };

        // 坐标放大两倍, 像素 (h, w) 的中心为 (2h, 2w), 角点为 (2h ± 1, 2w ± 1).
        // 每行只需最左和最右像素的角点.
        let mut rows: Vec<(usize, usize)> = vec![(usize::MAX, 0); bottom - top + 1];
        for &(h, w) in self.coords.iter() {
            let slot = &mut rows[h - top];
            slot.0 = slot.0.min(w);
            slot.1 = slot.1.max(w);
        }
        let mut corners = Vec::with_capacity(rows.len() * 4);
        for (i, &(lo, hi)) in rows.iter().enumerate() {
            if lo == usize::MAX {
                continue;
            }
            let h = 2 * (top + i) as i64;
            let (l, r) = (2 * lo as i64 - 1, 2 * hi as i64 + 1);
            corners.extend([(h - 1, l), (h + 1, l), (h - 1, r), (h + 1, r)]);
        }
        let hull = monotone_chain(corners);
        debug_assert!(hull.len() >= 3);

        let mut ans = Vec::with_capacity(self.area());
        for h in top..=bottom {
            for w in left..=right {
                if inside_convex(&hull, (2 * h as i64, 2 * w as i64)) {
                    ans.push((h, w));
                }
            }
        }
        self.derive(ans)
    }
}

type Point = (i64, i64);

/// `(a - o) x (b - o)`.
#[inline]
fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Andrew 单调链算法. 返回逆时针顺序的凸包顶点, 不含共线点.
fn monotone_chain(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_unstable();
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points.iter() {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// 判断 `p` 是否在逆时针凸多边形 `hull` 之内 (含边上).
fn inside_convex(hull: &[Point], p: Point) -> bool {
    (0..hull.len()).all(|i| cross(hull[i], hull[(i + 1) % hull.len()], p) >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(top: usize, left: usize, side: usize, shape: Idx2d, c: Connectivity) -> Region {
        let coords = (top..top + side)
            .flat_map(|h| (left..left + side).map(move |w| (h, w)))
            .collect();
        Region::new(coords, shape, c)
    }

    #[test]
    fn test_area_matches_coords() {
        let r = Region::new(vec![(1, 1), (0, 0), (1, 1)], (4, 4), Connectivity::N8);
        assert_eq!(r.area(), 2);
        assert_eq!(r.area(), r.coords().len());
        assert_eq!(r.coords(), &[(0, 0), (1, 1)]);
    }

    #[test]
    fn test_dilate_zero_is_identity() {
        let r = square(2, 3, 3, (10, 10), Connectivity::N8);
        assert_eq!(r.dilate(0), r);
    }

    #[test]
    fn test_dilate_shapes() {
        let dot = Region::new(vec![(5, 5)], (11, 11), Connectivity::N8);
        // 切比雪夫距离: (2n + 1)^2.
        assert_eq!(dot.dilate(2).area(), 25);

        let dot = Region::new(vec![(5, 5)], (11, 11), Connectivity::N4);
        // 曼哈顿距离: 2n^2 + 2n + 1.
        assert_eq!(dot.dilate(2).area(), 13);
        assert!(dot.dilate(2).contains(&(3, 5)));
        assert!(dot.dilate(2).contains(&(4, 4)));
        assert!(!dot.dilate(2).contains(&(3, 4)));
    }

    #[test]
    fn test_dilate_is_clipped() {
        let corner = Region::new(vec![(0, 0)], (5, 5), Connectivity::N8);
        let d = corner.dilate(30);
        assert_eq!(d.area(), 25);
        assert!(d.iter().all(|(h, w)| h < 5 && w < 5));
    }

    #[test]
    fn test_border_and_inner_partition_region() {
        let r = square(1, 1, 4, (8, 8), Connectivity::N4);
        let inner = r.inner();
        let border = r.border();
        assert_eq!(inner.area(), 4);
        assert_eq!(border.area(), 12);
        assert_eq!(inner.area() + border.area(), r.area());
        assert!(inner.iter().all(|p| !border.contains(&p)));
        assert_eq!(r.erode(1), inner);
        assert!(r.erode(2).is_empty());
    }

    #[test]
    fn test_border_on_image_edge() {
        // 贴满整幅图像时, 图像边缘像素仍然是边缘.
        let r = square(0, 0, 3, (3, 3), Connectivity::N8);
        assert_eq!(r.border().area(), 8);
        assert_eq!(r.inner().coords(), &[(1, 1)]);
    }

    #[test]
    fn test_dilated_border_surrounds_region() {
        let r = square(3, 3, 2, (10, 10), Connectivity::N8);
        let ring = r.dilate(1).border();
        assert_eq!(ring.area(), 12);
        assert!(r.iter().all(|p| !ring.contains(&p)));
    }

    #[test]
    fn test_convex_hull_fills_concavity() {
        // L 形.
        let coords = vec![(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)];
        let r = Region::new(coords, (5, 5), Connectivity::N8);
        let hull = r.convex_hull();
        assert!(r.iter().all(|p| hull.contains(&p)));
        assert!(hull.contains(&(1, 1)));
        // 中心落在凸包边上的像素也属于凸包.
        assert!(hull.contains(&(0, 1)));
        assert!(hull.contains(&(1, 2)));
        assert!(!hull.contains(&(0, 2)));
        assert_eq!(hull.area(), 8);
    }

    #[test]
    fn test_convex_hull_of_convex_region_is_itself() {
        let r = square(2, 2, 3, (8, 8), Connectivity::N8);
        assert_eq!(r.convex_hull(), r);
        let dot = Region::new(vec![(4, 4)], (8, 8), Connectivity::N8);
        assert_eq!(dot.convex_hull(), dot);
    }

    #[test]
    fn test_bounding_box() {
        let r = Region::new(vec![(3, 7), (1, 2), (2, 9)], (10, 10), Connectivity::N8);
        assert_eq!(r.bounding_box(), Some(((1, 2), (3, 9))));
        let empty: Region = Region::new(vec![], (10, 10), Connectivity::N8);
        assert_eq!(empty.bounding_box(), None);
    }
}
