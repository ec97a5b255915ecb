//! NumPy `.npy` 读写.

use super::to_f64;
use crate::{LabelVolume, Rank, SegError, SegResult};
use ndarray::{ArrayD, Axis};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use std::path::Path;

/// 依次尝试以给定元素类型读取, 类型不符时继续尝试下一个.
macro_rules! read_as_any {
    ($path: expr, $($t: ty),+ $(,)?) => {{
        $(
            match read_npy::<_, ArrayD<$t>>($path) {
                Ok(data) => return Ok(to_f64(data)),
                Err(ReadNpyError::WrongDescriptor(_)) => {}
                Err(e) => return Err(e.into()),
            }
        )+
    }};
}

/// 读取任意秩的数值 `.npy`.
pub(super) fn read(path: &Path) -> SegResult<ArrayD<f64>> {
    read_as_any!(path, u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
    Err(SegError::UnsupportedFormat(format!(
        "element type of {}",
        path.display()
    )))
}

/// 以 `u32` 写出标签体.
pub(super) fn write(path: &Path, labels: &LabelVolume) -> SegResult<()> {
    let data = labels.data();
    match labels.rank() {
        Rank::Planar => write_npy(path, &data.index_axis(Axis(0), 0))?,
        Rank::Volumetric => write_npy(path, &data)?,
    }
    Ok(())
}
