use super::{neighbour4, neighbour8, Connectivity};
use crate::consts::binary::*;
use crate::{Area2d, Areas2d, Idx2d};
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

/// 像素谓词.
type Predicate = fn(bool) -> bool;

/// 不可变、借用的二维掩膜切片.
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Mask`].
    data: ArrayView2<'a, bool>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维掩膜切片.
///
/// 既可以是水平切片 `(Y, X)`, 也可以是 XZ 平面 `(Z, X)`.
pub struct MaskSliceMut<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Mask`].
    data: ArrayViewMut2<'a, bool>,
}

/// 可变方法集合.
impl<'a> MaskSliceMut<'a> {
    /// 将 `it` 中的每个索引对应的像素改为 `new`.
    pub fn fill_batch<I: IntoIterator<Item = Idx2d>>(&mut self, it: I, new: bool) {
        for pos in it.into_iter() {
            self[pos] = new;
        }
    }

    /// 将图像中的背景空洞 (即 4-连通且不接触图像边缘的背景区域)
    /// 填充为前景. 返回被填充的空洞个数.
    pub fn fill_background_hollow(&mut self) -> usize {
        let mut filled = 0usize;
        for area in self.areas(is_background, Connectivity::N4) {
            if area.iter().all(|p| !self.is_at_border(*p)) {
                self.fill_batch(area, FOREGROUND);
                filled += 1;
            }
        }
        filled
    }

    /// 将接触图像边缘的 8-连通前景区域清除为背景. 返回被清除的区域个数.
    pub fn clear_border(&mut self) -> usize {
        let mut cleared = 0usize;
        for area in self.areas(is_foreground, Connectivity::N8) {
            if area.iter().any(|p| self.is_at_border(*p)) {
                self.fill_batch(area, BACKGROUND);
                cleared += 1;
            }
        }
        cleared
    }
}

impl Index<Idx2d> for MaskSliceMut<'_> {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for MaskSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// mask 不可变方法集合.
macro_rules! impl_mask_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 获得图像的高.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 获得图像的宽.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 判断一个索引是否位于图像的边缘.
            #[inline]
            pub fn is_at_border(&self, (h, w): Idx2d) -> bool {
                h == 0
                    || h.saturating_add(1) == self.height()
                    || w == 0
                    || w.saturating_add(1) == self.width()
            }

            /// 获得 `pos` 的 4-邻域像素索引. 保证返回的索引都不越界.
            pub fn n4_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
                neighbour4(pos)
                    .into_iter()
                    .filter(|p| self.check(*p))
                    .collect()
            }

            /// 获得 `pos` 的 8-邻域像素索引. 保证返回的索引都不越界.
            pub fn n8_positions(&self, pos: Idx2d) -> Vec<Idx2d> {
                neighbour8(pos)
                    .into_iter()
                    .filter(|p| self.check(*p))
                    .collect()
            }

            /// 以行优先规则, 获取能迭代图像所有索引的迭代器.
            #[inline]
            pub fn pos_iter(&self) -> impl Iterator<Item = Idx2d> {
                super::iter::PosIter::new(self.shape())
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &bool)> {
                self.data.indexed_iter()
            }

            /// 按照 `conn` 相邻规则获取所有区域. 两个像素 `p1` 和 `p2` 属于同一个区域,
            /// 当且仅当存在一条从 `p1` 到 `p2` 的相邻路径, 且路径上的所有像素
            /// (包括 `p1` 和 `p2`) 都满足谓词 `pred`.
            ///
            /// 区域按其首个像素的行优先顺序排列.
            #[inline]
            pub fn areas(&self, pred: Predicate, conn: Connectivity) -> Areas2d {
                self.areas_from_local(self.pos_iter(), pred, conn)
            }

            /// 按照 `conn` 相邻规则获取所有区域, 但区域起点范围由 `it` 指定.
            pub fn areas_from_local<I: IntoIterator<Item = Idx2d>>(
                &self,
                it: I,
                pred: Predicate,
                conn: Connectivity,
            ) -> Areas2d {
                let mut ans = Areas2d::with_capacity(1);
                let mut bfs_q = VecDeque::with_capacity(4);
                let mut visited = Array2::from_elem(self.shape(), false);

                for pos in it.into_iter() {
                    if visited[pos] || !pred(self[pos]) {
                        continue;
                    }
                    visited[pos] = true;
                    bfs_q.push_back(pos);
                    let mut this_area = Area2d::with_capacity(1);
                    while let Some(cur_pos) = bfs_q.pop_front() {
                        this_area.push(cur_pos);
                        let neighbours = match conn {
                            Connectivity::N4 => self.n4_positions(cur_pos),
                            Connectivity::N8 => self.n8_positions(cur_pos),
                        };
                        for neigh in neighbours {
                            if !visited[neigh] && pred(self[neigh]) {
                                visited[neigh] = true;
                                bfs_q.push_back(neigh);
                            }
                        }
                    }
                    ans.push(this_area);
                }
                ans
            }
        }
    };
}
impl_mask_slice_immut!('a, MaskSlice<'a>, ArrayView2<'a, bool>);
impl_mask_slice_immut!('a, MaskSliceMut<'a>, ArrayViewMut2<'a, bool>);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fill_enclosed_hollow_only() {
        // 左侧 3×3 环围住一个空洞; 右侧 U 形的开口接触边缘.
        let mut img = array![
            [false, false, false, false, false, false, false],
            [false, true, true, true, false, true, false],
            [false, true, false, true, false, true, false],
            [false, true, true, true, false, true, false],
            [false, false, false, false, false, false, false],
        ];
        let filled = MaskSliceMut::new(img.view_mut()).fill_background_hollow();
        assert_eq!(filled, 1);
        assert!(img[(2, 2)]);
        assert!(!img[(2, 4)]);
        assert!(!img[(0, 0)]);
    }

    #[test]
    fn test_diagonal_gap_is_not_a_hole_wall() {
        // 背景以 4-连通计算, 对角缺口不会让内部泄漏.
        let mut img = array![
            [false, false, false, false, false],
            [false, true, true, false, false],
            [false, true, false, true, false],
            [false, false, true, true, false],
            [false, false, false, false, false],
        ];
        assert_eq!(MaskSliceMut::new(img.view_mut()).fill_background_hollow(), 1);
        assert!(img[(2, 2)]);
    }

    #[test]
    fn test_clear_border_keeps_inner_objects() {
        let mut img = array![
            [true, false, false, false, false],
            [false, true, false, false, false],
            [false, false, false, false, false],
            [false, false, false, true, false],
            [false, false, false, false, false],
        ];
        // (0,0) 与 (1,1) 对角相连, 整体接触边缘.
        let cleared = MaskSliceMut::new(img.view_mut()).clear_border();
        assert_eq!(cleared, 1);
        assert!(!img[(0, 0)] && !img[(1, 1)]);
        assert!(img[(3, 3)]);
    }

    #[test]
    fn test_areas_connectivity() {
        let img = array![[true, false], [false, true]];
        let s = MaskSlice::new(img.view());
        assert_eq!(s.areas(is_foreground, Connectivity::N4).len(), 2);
        assert_eq!(s.areas(is_foreground, Connectivity::N8).len(), 1);
    }
}
