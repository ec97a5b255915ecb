//! 3×3×3 (或单切片上的 3×3) 二值闭运算.
//!
//! 完整立方体结构元可按轴分解, 因此依次沿 Z, Y, X 做长度为 3 的一维极值滤波.
//! 越界坐标钳位到最近的边缘体素.

use crate::Mask;
use ndarray::{Array3, Axis, Zip};

/// 沿 `axis` 做长度为 3 的一维滤波. `dilate` 为真时取或, 否则取与.
fn pass(data: &Array3<bool>, axis: Axis, dilate: bool) -> Array3<bool> {
    let mut out = data.clone();
    Zip::from(out.lanes_mut(axis))
        .and(data.lanes(axis))
        .for_each(|mut dst, src| {
            let n = src.len();
            for (i, d) in dst.iter_mut().enumerate() {
                let lo = i.saturating_sub(1);
                let hi = (i + 1).min(n - 1);
                let mut it = (lo..=hi).map(|j| src[j]);
                *d = if dilate { it.any(|p| p) } else { it.all(|p| p) };
            }
        });
    out
}

fn filter(mask: &Mask, dilate: bool) -> Mask {
    let data = (0..3).fold(mask.data().to_owned(), |acc, ax| pass(&acc, Axis(ax), dilate));
    Mask::from_parts(mask.rank(), data)
}

/// 膨胀.
#[inline]
pub fn dilate(mask: &Mask) -> Mask {
    filter(mask, true)
}

/// 腐蚀.
#[inline]
pub fn erode(mask: &Mask) -> Mask {
    filter(mask, false)
}

/// 闭运算: 先膨胀后腐蚀.
pub fn closing(mask: &Mask) -> Mask {
    erode(&dilate(mask))
}
