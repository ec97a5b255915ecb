//! 几何适配: 将任意秩的输入数组规范为 2D 或 3D 强度体.

use crate::{SegError, SegResult, Stack};
use log::debug;
use ndarray::{ArrayD, Axis};

/// 对四维输入选择时间帧.
///
/// 1. 第 0 轴长度为 1 时视为 TZYX, 原样返回;
/// 2. 否则视为 ZYXT, 返回第 3 轴上第一个最大值非 0 的帧.
///
/// 其它秩原样返回. 所有帧都为空时返回 [`SegError::EmptyTimeSeries`].
pub fn select_time_frame(raw: ArrayD<f64>) -> SegResult<ArrayD<f64>> {
    if raw.ndim() != 4 || raw.shape()[0] == 1 {
        return Ok(raw);
    }
    let frames = raw.shape()[3];
    let selected = raw.axis_iter(Axis(3)).position(|frame| {
        frame
            .iter()
            .copied()
            .reduce(f64::max)
            .map_or(false, |m| m != 0.0)
    });
    match selected {
        Some(t) => {
            debug!("selected time frame {t} of {frames}");
            Ok(raw.index_axis_move(Axis(3), t))
        }
        None => Err(SegError::EmptyTimeSeries { frames }),
    }
}

/// 保留最后 `k` 个轴, 被丢弃的前导轴均取下标 0. 秩不超过 `k` 时原样返回.
pub fn keep_trailing_axes(mut raw: ArrayD<f64>, k: usize) -> ArrayD<f64> {
    while raw.ndim() > k {
        raw = raw.index_axis_move(Axis(0), 0);
    }
    raw
}

/// 完整的几何适配: 选择时间帧, 降到至多三维, 除以拉伸系数 `factor`,
/// 再将单切片的三维体折叠为 2D.
pub fn adapt(raw: ArrayD<f64>, factor: f64) -> SegResult<Stack> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(SegError::InvalidRescaleFactor(factor));
    }
    let mut data = keep_trailing_axes(select_time_frame(raw)?, 3);
    if data.ndim() < 2 {
        return Err(SegError::UnsupportedRank(data.ndim()));
    }
    if factor != 1.0 {
        data.mapv_inplace(|v| v / factor);
    }
    if data.ndim() == 3 && data.shape()[0] == 1 {
        data = data.index_axis_move(Axis(0), 0);
    }
    Stack::from_dyn(data)
}
