//! 全局 Otsu 阈值.

use crate::consts::OTSU_BINS;
use ndarray::ArrayView3;

/// 在 `[lo, hi]` 上等宽分箱, 最后一个箱为闭区间.
fn histogram(data: &ArrayView3<f64>, lo: f64, hi: f64) -> Vec<f64> {
    let mut hist = vec![0.0; OTSU_BINS];
    let scale = OTSU_BINS as f64 / (hi - lo);
    for &v in data.iter() {
        let bin = ((v - lo) * scale).floor();
        let bin = if bin < 0.0 { 0 } else { (bin as usize).min(OTSU_BINS - 1) };
        hist[bin] += 1.0;
    }
    hist
}

/// 计算 `data` 的 Otsu 阈值, 即类间方差最大的分箱中心. 并列时取第一个.
///
/// 常数体直接返回该常数. 空体返回 `None`.
pub fn otsu(data: ArrayView3<f64>) -> Option<f64> {
    let mut it = data.iter().copied();
    let first = it.next()?;
    let (lo, hi) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo == hi {
        return Some(lo);
    }

    let hist = histogram(&data, lo, hi);
    let step = (hi - lo) / OTSU_BINS as f64;
    let centers: Vec<f64> = (0..OTSU_BINS)
        .map(|i| lo + (i as f64 + 0.5) * step)
        .collect();

    // 前缀 (w1, m1) 与后缀 (w2, m2) 的类权重与类均值.
    let mut w1 = vec![0.0; OTSU_BINS];
    let mut m1 = vec![0.0; OTSU_BINS];
    let (mut acc_w, mut acc_s) = (0.0, 0.0);
    for i in 0..OTSU_BINS {
        acc_w += hist[i];
        acc_s += hist[i] * centers[i];
        w1[i] = acc_w;
        m1[i] = acc_s / acc_w;
    }
    let mut w2 = vec![0.0; OTSU_BINS];
    let mut m2 = vec![0.0; OTSU_BINS];
    let (mut acc_w, mut acc_s) = (0.0, 0.0);
    for i in (0..OTSU_BINS).rev() {
        acc_w += hist[i];
        acc_s += hist[i] * centers[i];
        w2[i] = acc_w;
        m2[i] = acc_s / acc_w;
    }

    let mut best = (0usize, f64::NEG_INFINITY);
    for i in 0..OTSU_BINS - 1 {
        let var = w1[i] * w2[i + 1] * (m1[i] - m2[i + 1]).powi(2);
        if var > best.1 {
            best = (i, var);
        }
    }
    Some(centers[best.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_two_level_split() {
        let mut data = Array3::<f64>::from_elem((2, 8, 8), 10.0);
        data.slice_mut(ndarray::s![.., 2..6, 2..6]).fill(200.0);
        let t = otsu(data.view()).unwrap();
        assert!(t > 10.0 && t < 200.0, "threshold {t}");
    }

    #[test]
    fn test_constant_returns_value() {
        let data = Array3::<f64>::from_elem((3, 4, 4), 7.5);
        assert_eq!(otsu(data.view()), Some(7.5));
        let zeros = Array3::<f64>::zeros((1, 4, 4));
        assert_eq!(otsu(zeros.view()), Some(0.0));
    }

    #[test]
    fn test_scales_with_intensity() {
        let mut data = Array3::<f64>::zeros((1, 16, 16));
        for ((_, y, x), v) in data.indexed_iter_mut() {
            // 取值范围 [0, 512], 分箱宽度为 2 的幂.
            *v = ((y * 16 + x) % 129) as f64 * 4.0;
        }
        let t = otsu(data.view()).unwrap();
        let scaled = data.mapv(|v| v / 4.0);
        let t_scaled = otsu(scaled.view()).unwrap();
        assert_eq!(t / 4.0, t_scaled);
    }

    #[test]
    fn test_empty_is_none() {
        let data = Array3::<f64>::zeros((0, 4, 4));
        assert_eq!(otsu(data.view()), None);
    }
}
