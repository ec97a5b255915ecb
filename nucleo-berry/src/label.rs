//! 连通域标记.

use crate::consts::binary::is_foreground;
use crate::consts::LABEL_BACKGROUND;
use crate::{Idx3d, LabelVolume, Mask};
use ndarray::Array3;
use std::collections::VecDeque;

/// 26-邻域偏移量 (不含自身).
fn offsets26() -> impl Iterator<Item = (isize, isize, isize)> {
    itertools::iproduct!(-1isize..=1, -1isize..=1, -1isize..=1)
        .filter(|&d| d != (0, 0, 0))
}

/// 获得 `pos` 的 26-邻居. 保证返回的索引都不越界.
fn neighbour26((z, h, w): Idx3d, (zl, hl, wl): Idx3d) -> impl Iterator<Item = Idx3d> {
    offsets26().filter_map(move |(dz, dh, dw)| {
        let nz = z.checked_add_signed(dz)?;
        let nh = h.checked_add_signed(dh)?;
        let nw = w.checked_add_signed(dw)?;
        (nz < zl && nh < hl && nw < wl).then_some((nz, nh, nw))
    })
}

/// 标记前景连通域. 三维使用 26-邻接, 二维 (单切片) 退化为 8-邻接.
///
/// 编号从 1 开始连续分配, 顺序为各连通域首个体素的行优先 (Z, Y, X) 顺序.
pub fn label(mask: &Mask) -> LabelVolume {
    let shape = mask.shape();
    let mut labels = Array3::from_elem(shape, LABEL_BACKGROUND);
    let mut bfs_q = VecDeque::with_capacity(16);
    let mut next = LABEL_BACKGROUND;

    for (pos, &p) in mask.data().indexed_iter() {
        if !is_foreground(p) || labels[pos] != LABEL_BACKGROUND {
            continue;
        }
        next += 1;
        labels[pos] = next;
        bfs_q.push_back(pos);
        while let Some(cur) = bfs_q.pop_front() {
            for neigh in neighbour26(cur, shape) {
                if is_foreground(mask[neigh]) && labels[neigh] == LABEL_BACKGROUND {
                    labels[neigh] = next;
                    bfs_q.push_back(neigh);
                }
            }
        }
    }
    LabelVolume::from_parts(mask.rank(), labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s, Array3};

    #[test]
    fn test_diagonal_3d_is_connected() {
        let mut data = Array3::from_elem((2, 3, 3), false);
        data[(0, 0, 0)] = true;
        data[(1, 1, 1)] = true;
        data[(0, 2, 2)] = true;
        let l = label(&Mask::new_3d(data));
        assert_eq!(l.max_label(), 1);
        assert_eq!(l.sizes(), vec![15, 3]);
    }

    #[test]
    fn test_planar_8_connectivity_and_order() {
        let img = array![
            [false, false, true, false],
            [true, false, false, true],
            [false, true, false, false],
        ];
        let l = label(&Mask::new_2d(img));
        // (0,2)-(1,3) 对角相连; (1,0)-(2,1) 对角相连.
        assert_eq!(l.max_label(), 2);
        assert_eq!(l[(0, 0, 2)], 1);
        assert_eq!(l[(0, 1, 3)], 1);
        assert_eq!(l[(0, 1, 0)], 2);
        assert_eq!(l[(0, 2, 1)], 2);
    }

    #[test]
    fn test_labels_dense() {
        let mut data = Array3::from_elem((4, 10, 10), false);
        data.slice_mut(s![0..2, 0..2, 0..2]).fill(true);
        data.slice_mut(s![3, 5..8, 5..8]).fill(true);
        data.slice_mut(s![0, 8.., 8..]).fill(true);
        let l = label(&Mask::new_3d(data));
        assert_eq!(l.max_label(), 3);
        assert!(l.is_dense());
        assert_eq!(l.to_mask().count_foreground(), 8 + 9 + 4);
    }

    #[test]
    fn test_empty_mask() {
        let m = Mask::background(crate::Rank::Volumetric, (2, 4, 4));
        let l = label(&m);
        assert_eq!(l.max_label(), 0);
        assert!(l.is_dense());
    }
}
