//! 栅格文件读写.
//!
//! 支持两种容器:
//!
//! 1. NumPy `.npy`, 任意秩, 常见数值类型;
//! 2. 多页灰度 TIFF (`.tif` / `.tiff`), 每页一个 Z 切片.
//!
//! 读入统一转换为 `f64`; 标签体以 `u32` 写出, 容器与输入相同.

use crate::{LabelVolume, SegError, SegResult};
use ndarray::ArrayD;
use num::traits::AsPrimitive;
use std::path::Path;

mod npy;
mod tif;

/// 栅格容器格式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Format {
    /// NumPy `.npy`.
    Npy,

    /// 多页 TIFF.
    Tiff,
}

impl Format {
    /// 按扩展名 (不区分大小写) 判断格式.
    pub fn from_path(path: &Path) -> SegResult<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "npy" => Ok(Format::Npy),
            "tif" | "tiff" => Ok(Format::Tiff),
            _ => Err(SegError::UnsupportedFormat(format!(
                "file extension {ext:?} of {}",
                path.display()
            ))),
        }
    }
}

/// 逐元素转换为 `f64`.
#[inline]
fn to_f64<T: AsPrimitive<f64>>(data: ArrayD<T>) -> ArrayD<f64> {
    data.mapv(|v| v.as_())
}

/// 读取栅格文件为 `f64` 动态维数组. TIFF 单页为 `(Y, X)`, 多页为 `(Z, Y, X)`.
pub fn read_volume(path: &Path) -> SegResult<ArrayD<f64>> {
    match Format::from_path(path)? {
        Format::Npy => npy::read(path),
        Format::Tiff => tif::read(path),
    }
}

/// 按 `path` 的扩展名写出标签体. 2D 标签体写出为二维数组 / 单页 TIFF.
pub fn write_labels(path: &Path, labels: &LabelVolume) -> SegResult<()> {
    match Format::from_path(path)? {
        Format::Npy => npy::write(path, labels),
        Format::Tiff => tif::write(path, labels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn sample_3d() -> LabelVolume {
        let mut data = Array3::<u32>::zeros((3, 5, 4));
        data[(0, 1, 1)] = 1;
        data[(2, 4, 3)] = 70_000;
        LabelVolume::new_3d(data)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.TIF")).unwrap(), Format::Tiff);
        assert_eq!(Format::from_path(Path::new("b.tiff")).unwrap(), Format::Tiff);
        assert_eq!(Format::from_path(Path::new("b.npy")).unwrap(), Format::Npy);
        assert!(matches!(
            Format::from_path(Path::new("b.png")),
            Err(SegError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_npy_labels_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask_a.npy");
        let labels = sample_3d();
        write_labels(&path, &labels).unwrap();
        let back = read_volume(&path).unwrap();
        assert_eq!(back.shape(), &[3, 5, 4]);
        assert_eq!(back, to_f64(labels.into_dyn()));
    }

    #[test]
    fn test_tiff_labels_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask_a.tif");
        let labels = sample_3d();
        write_labels(&path, &labels).unwrap();
        let back = read_volume(&path).unwrap();
        assert_eq!(back.shape(), &[3, 5, 4]);
        assert_eq!(back, to_f64(labels.into_dyn()));

        // 单页 TIFF 读为 2D.
        let planar = LabelVolume::new_2d(Array2::from_elem((2, 3), 7));
        write_labels(&path, &planar).unwrap();
        assert_eq!(read_volume(&path).unwrap().shape(), &[2, 3]);
    }
}
