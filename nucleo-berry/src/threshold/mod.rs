//! 阈值融合: 全局 Otsu 掩膜与逐切片局部自适应掩膜取交集.

use crate::{Mask, Stack};
use log::debug;
use ndarray::{Array3, ArrayView2, ArrayViewMut2, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod local;
mod morph;
mod otsu;

pub use local::{local_foreground, threshold_map};
pub use morph::{closing, dilate, erode};
pub use otsu::otsu;

/// 局部阈值所用的邻域统计量.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LocalMethod {
    /// 高斯加权均值, σ = (side - 1) / 6.
    #[default]
    Gaussian,

    /// 邻域算术均值.
    Mean,
}

/// 局部阈值参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocalParams {
    /// 邻域边长. 偶数会被加 1.
    pub side: usize,

    /// 邻域统计量.
    pub method: LocalMethod,

    /// 从统计量中减去的常数.
    pub offset: f64,
}

impl Default for LocalParams {
    fn default() -> Self {
        Self {
            side: crate::consts::DEFAULT_NEIGHBOUR_SIDE,
            method: LocalMethod::default(),
            offset: 0.0,
        }
    }
}

/// 强制为奇数: 偶数加 1.
#[inline]
pub const fn odd_side(side: usize) -> usize {
    if side % 2 == 0 {
        side + 1
    } else {
        side
    }
}

/// 阈值融合的结果.
#[derive(Debug, Clone)]
pub struct Fusion {
    /// 全局 Otsu 阈值.
    pub global_threshold: f64,

    /// 融合后的前景掩膜.
    pub mask: Mask,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        fn for_each_slice<F>(out: &mut Array3<bool>, stack: &Stack, op: F)
        where
            F: Fn(ArrayViewMut2<bool>, ArrayView2<f64>) + Sync + Send,
        {
            Zip::from(out.axis_iter_mut(Axis(0)))
                .and(stack.data().axis_iter(Axis(0)))
                .par_for_each(op);
        }
    } else {
        fn for_each_slice<F>(out: &mut Array3<bool>, stack: &Stack, op: F)
        where
            F: Fn(ArrayViewMut2<bool>, ArrayView2<f64>),
        {
            Zip::from(out.axis_iter_mut(Axis(0)))
                .and(stack.data().axis_iter(Axis(0)))
                .for_each(op);
        }
    }
}

/// 全局掩膜: `intensity > otsu` 的闭运算. 同时返回阈值.
pub fn global_mask(stack: &Stack) -> (f64, Mask) {
    let threshold = otsu(stack.data()).unwrap_or(0.0);
    (threshold, closing(&stack.above(threshold)))
}

/// 局部掩膜: 逐切片自适应阈值的闭运算.
pub fn local_mask(stack: &Stack, params: &LocalParams) -> Mask {
    let side = odd_side(params.side);
    let (method, offset) = (params.method, params.offset);
    let mut out = Array3::from_elem(stack.shape(), false);
    for_each_slice(&mut out, stack, |mut dst, src| {
        dst.assign(&local_foreground(src, side, method, offset));
    });
    closing(&Mask::from_parts(stack.rank(), out))
}

/// 全局掩膜与局部掩膜取交集.
pub fn fuse(stack: &Stack, params: &LocalParams) -> Fusion {
    let (global_threshold, global) = global_mask(stack);
    debug!(
        "global threshold {global_threshold:.4}, {} voxels above",
        global.count_foreground()
    );
    let local = local_mask(stack, params);
    debug!(
        "local threshold (side {}), {} voxels above",
        odd_side(params.side),
        local.count_foreground()
    );
    Fusion {
        global_threshold,
        mask: global.and(&local),
    }
}
