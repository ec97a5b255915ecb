//! 逐切片局部自适应阈值.
//!
//! 边界按半样本对称方式反射, 即 `d c b a | a b c d | d c b a`.

use super::LocalMethod;
use ndarray::{Array2, ArrayView2, Axis, Zip};

/// 截断半径与标准差的比值.
const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// 将越界下标反射回 `[0, n)`.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let m = i.rem_euclid(2 * n);
    (if m >= n { 2 * n - 1 - m } else { m }) as usize
}

/// 归一化的一维高斯核, 半径为 `int(4σ + 0.5)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-(radius as isize)..=radius as isize)
        .map(|x| (-((x * x) as f64) / denom).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// 长度为 `side` 的均值核. `side` 须为奇数.
fn box_kernel(side: usize) -> Vec<f64> {
    vec![1.0 / side as f64; side]
}

/// 沿 `axis` 以中心对齐的奇数长度核 `weights` 做一维相关.
fn correlate1d(input: ArrayView2<f64>, weights: &[f64], axis: Axis) -> Array2<f64> {
    debug_assert!(weights.len() % 2 == 1);
    let radius = (weights.len() / 2) as isize;
    let mut out = Array2::<f64>::zeros(input.raw_dim());
    let mut buf = Vec::new();
    Zip::from(out.lanes_mut(axis))
        .and(input.lanes(axis))
        .for_each(|mut dst, src| {
            let n = src.len();
            buf.clear();
            buf.extend(src.iter().copied());
            for (i, d) in dst.iter_mut().enumerate() {
                let i = i as isize;
                *d = weights
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * buf[reflect(i + k as isize - radius, n)])
                    .sum();
            }
        });
    out
}

/// 可分离二维滤波: 先沿行 (Y), 再沿列 (X).
fn separable(slice: ArrayView2<f64>, kernel: &[f64]) -> Array2<f64> {
    let tmp = correlate1d(slice, kernel, Axis(0));
    correlate1d(tmp.view(), kernel, Axis(1))
}

/// 计算单个切片的局部阈值图. `side` 须为奇数.
pub fn threshold_map(
    slice: ArrayView2<f64>,
    side: usize,
    method: LocalMethod,
    offset: f64,
) -> Array2<f64> {
    let kernel = match method {
        LocalMethod::Gaussian => gaussian_kernel((side as f64 - 1.0) / 6.0),
        LocalMethod::Mean => box_kernel(side),
    };
    let mut map = separable(slice, &kernel);
    if offset != 0.0 {
        map.mapv_inplace(|v| v - offset);
    }
    map
}

/// 单个切片上严格大于局部阈值的像素为前景.
pub fn local_foreground(
    slice: ArrayView2<f64>,
    side: usize,
    method: LocalMethod,
    offset: f64,
) -> Array2<bool> {
    let map = threshold_map(slice, side, method, offset);
    Zip::from(&slice).and(&map).map_collect(|&v, &t| v > t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_reflect_half_sample() {
        let n = 4;
        let got: Vec<usize> = (-5..9).map(|i| reflect(i, n)).collect();
        assert_eq!(got, vec![3, 3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let k = gaussian_kernel(100.0 / 6.0);
        assert_eq!(k.len(), 2 * 67 + 1);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(k[0], k[k.len() - 1]);
    }

    #[test]
    fn test_constant_slice_equals_constant() {
        let img = Array2::<f64>::from_elem((9, 7), 42.0);
        for method in [LocalMethod::Gaussian, LocalMethod::Mean] {
            let map = threshold_map(img.view(), 5, method, 0.0);
            assert!(map.iter().all(|t| (t - 42.0).abs() < 1e-9));
            let fg = local_foreground(img.view(), 5, method, -1e-6);
            assert!(fg.iter().all(|p| !p));
        }
    }

    #[test]
    fn test_mean_with_offset() {
        let img = array![[0.0, 0.0, 0.0], [0.0, 9.0, 0.0], [0.0, 0.0, 0.0]];
        let map = threshold_map(img.view(), 3, LocalMethod::Mean, 0.5);
        assert!((map[(1, 1)] - 0.5).abs() < 1e-12);
        let fg = local_foreground(img.view(), 3, LocalMethod::Mean, 0.0);
        assert!(fg[(1, 1)]);
        assert_eq!(fg.iter().filter(|p| **p).count(), 1);
    }
}
