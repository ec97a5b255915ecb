//! 拓扑清理: 清除接触边缘的前景, 填充背景空洞.
//!
//! 两个操作都只在二维平面内进行, 且都返回新的掩膜.

use crate::{Mask, MaskSliceMut};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        fn for_each_slice_mut<F>(mask: &mut Mask, op: F)
        where
            F: Fn(MaskSliceMut<'_>) + Sync + Send,
        {
            mask.par_for_each_slice_mut(op);
        }
    } else {
        fn for_each_slice_mut<F>(mask: &mut Mask, op: F)
        where
            F: Fn(MaskSliceMut<'_>),
        {
            mask.slice_iter_mut().for_each(op);
        }
    }
}

/// 对每个水平切片执行 `op`, 返回各切片改动的区域个数之和.
fn sum_over_slices<F>(mask: &mut Mask, op: F) -> usize
where
    F: Fn(&mut MaskSliceMut<'_>) -> usize + Sync + Send,
{
    let total = AtomicUsize::new(0);
    for_each_slice_mut(mask, |mut slice| {
        total.fetch_add(op(&mut slice), Ordering::Relaxed);
    });
    total.into_inner()
}

/// 逐水平切片清除接触 XY 边缘的 8-连通前景区域.
///
/// 若 `clear_z` 为真, 则还在每个 XZ 平面 (固定 Y) 上清除接触该平面边缘的区域,
/// 从而去掉接触首尾切片的对象.
pub fn clear_border(mask: &Mask, clear_z: bool) -> Mask {
    let mut ans = mask.clone();
    let mut cleared = sum_over_slices(&mut ans, |s| s.clear_border());
    if clear_z && !mask.rank().is_planar() {
        for mut plane in ans.xz_plane_iter_mut() {
            cleared += plane.clear_border();
        }
    }
    debug!("cleared {cleared} border-touching regions");
    ans
}

/// 逐水平切片填充背景空洞. 不做三维空洞填充.
pub fn fill_holes(mask: &Mask) -> Mask {
    let mut ans = mask.clone();
    let filled = sum_over_slices(&mut ans, |s| s.fill_background_hollow());
    debug!("filled {filled} holes");
    ans
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array2, Array3};

    #[test]
    fn test_clear_border_per_slice() {
        let mut data = Array3::from_elem((3, 8, 8), false);
        // 接触 X 边缘的柱子.
        data.slice_mut(s![.., 2..4, 0..2]).fill(true);
        // 内部立方体, 贯穿所有切片.
        data.slice_mut(s![.., 3..6, 4..7]).fill(true);
        let m = Mask::new_3d(data);
        let c = clear_border(&m, false);
        assert!(!c[(1, 2, 0)]);
        assert_eq!(c.count_foreground(), 3 * 3 * 3);
        assert!(!m.is_background());
    }

    #[test]
    fn test_no_foreground_left_on_xy_border() {
        let mut data = Array3::from_elem((4, 23, 17), false);
        for ((z, y, x), p) in data.indexed_iter_mut() {
            *p = (z * 31 + y * 17 + x * 7) % 5 < 2;
        }
        let c = clear_border(&Mask::new_3d(data), false);
        let (zl, h, w) = c.shape();
        for z in 0..zl {
            let s = c.slice_at(z);
            assert!(s.indexed_iter().all(|(pos, &p)| !p || !s.is_at_border(pos)));
        }
        assert_eq!(h * w * zl, c.size());
    }

    #[test]
    fn test_z_boundary_only_with_flag() {
        let mut data = Array3::from_elem((5, 8, 8), false);
        // 触及首切片的对象.
        data.slice_mut(s![0..2, 3..5, 3..5]).fill(true);
        // 不触及首尾切片的对象.
        data.slice_mut(s![2..4, 3..5, 6..7]).fill(true);
        let m = Mask::new_3d(data);
        assert_eq!(clear_border(&m, false), m);

        let c = clear_border(&m, true);
        assert!(!c[(0, 3, 3)] && !c[(1, 4, 4)]);
        assert!(c[(2, 3, 6)]);
    }

    #[test]
    fn test_clear_z_ignored_for_planar() {
        let mut img = Array2::from_elem((6, 6), false);
        img.slice_mut(s![2..4, 2..4]).fill(true);
        let m = Mask::new_2d(img);
        assert_eq!(clear_border(&m, true), m);
    }

    #[test]
    fn test_fill_holes_is_per_slice() {
        let mut data = Array3::from_elem((3, 7, 7), false);
        // 中间切片上的闭合环.
        data.slice_mut(s![1, 1..6, 1..6]).fill(true);
        data[(1, 3, 3)] = false;
        // 首切片上开口的环, 其空洞经开口连到边缘.
        data.slice_mut(s![0, 1..6, 1..6]).fill(true);
        data.slice_mut(s![0, 2..4, 3]).fill(false);
        data[(0, 1, 3)] = false;
        let m = Mask::new_3d(data);
        let f = fill_holes(&m);
        assert!(f[(1, 3, 3)]);
        assert!(!f[(0, 3, 3)]);
        assert_eq!(f.count_foreground(), m.count_foreground() + 1);
    }
}
