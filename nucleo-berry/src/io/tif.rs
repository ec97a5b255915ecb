//! 多页灰度 TIFF 读写.

use crate::{LabelVolume, SegError, SegResult};
use ndarray::{ArrayD, Axis, IxDyn};
use num::traits::AsPrimitive;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::ColorType;

#[inline]
fn cast<T: AsPrimitive<f64>>(v: Vec<T>) -> Vec<f64> {
    v.into_iter().map(|p| p.as_()).collect()
}

/// 将一页的解码结果转换为 `f64`.
fn page_to_f64(page: DecodingResult) -> SegResult<Vec<f64>> {
    #[allow(unreachable_patterns)]
    let ans = match page {
        DecodingResult::U8(v) => cast(v),
        DecodingResult::U16(v) => cast(v),
        DecodingResult::U32(v) => cast(v),
        DecodingResult::U64(v) => cast(v),
        DecodingResult::I8(v) => cast(v),
        DecodingResult::I16(v) => cast(v),
        DecodingResult::I32(v) => cast(v),
        DecodingResult::I64(v) => cast(v),
        DecodingResult::F32(v) => cast(v),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(SegError::UnsupportedFormat(
                "TIFF sample type".to_string(),
            ))
        }
    };
    Ok(ans)
}

/// 读取全部页. 单页为 `(Y, X)`, 多页为 `(Z, Y, X)`. 各页尺寸必须一致.
pub(super) fn read(path: &Path) -> SegResult<ArrayD<f64>> {
    let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
    let mut expected = None;
    let mut pages = 0usize;
    let mut buf = Vec::new();
    loop {
        let (w, h) = decoder.dimensions()?;
        let found = (h as usize, w as usize);
        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => {
                return Err(SegError::UnsupportedFormat(format!(
                    "TIFF color type {other:?} in {}",
                    path.display()
                )))
            }
        }
        let expected = *expected.get_or_insert(found);
        if expected != found {
            return Err(SegError::ShapeMismatch {
                page: pages,
                expected,
                found,
            });
        }
        buf.extend(page_to_f64(decoder.read_image()?)?);
        pages += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }
    let (h, w) = expected.unwrap_or((0, 0));
    let shape = if pages == 1 {
        IxDyn(&[h, w])
    } else {
        IxDyn(&[pages, h, w])
    };
    ArrayD::from_shape_vec(shape, buf)
        .map_err(|e| SegError::UnsupportedFormat(format!("TIFF layout: {e}")))
}

/// 以 `Gray32` 逐页写出标签体.
pub(super) fn write(path: &Path, labels: &LabelVolume) -> SegResult<()> {
    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(path)?))?;
    let (h, w) = labels.slice_shape();
    for slice in labels.data().axis_iter(Axis(0)) {
        let page: Vec<u32> = slice.iter().copied().collect();
        encoder.write_image::<colortype::Gray32>(w as u32, h as u32, &page)?;
    }
    Ok(())
}
