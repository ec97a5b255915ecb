//! 数据集操作: 扫描输入目录, 加载原始图像与拉伸系数.

use crate::{io, sidecar, SegError, SegResult};
use ndarray::ArrayD;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 原始图像: 未经几何适配的数组, 以及其 sidecar 中的拉伸系数.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// 源文件路径.
    pub path: PathBuf,

    /// 任意秩的强度数组.
    pub data: ArrayD<f64>,

    /// 反卷积拉伸系数, 无 sidecar 时为 1.0.
    pub factor: f64,
}

impl RawImage {
    /// 读取图像文件及其 sidecar.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let path = path.as_ref().to_owned();
        let data = io::read_volume(&path)?;
        let factor = sidecar::rescale_factor(&path)?;
        Ok(Self { path, data, factor })
    }
}

/// `pattern` 是否在 `name` 的开头处匹配.
#[inline]
fn matches_from_start(pattern: &Regex, name: &str) -> bool {
    pattern.find(name).is_some_and(|m| m.start() == 0)
}

/// 列出 `dir` 下文件名匹配 `pattern` 的普通文件, 按文件名升序排列.
///
/// 匹配锚定在文件名开头, `pattern` 不必以 `^` 起始.
///
/// `dir` 不是目录时返回 [`SegError::MissingInputDir`].
pub fn collect_images<P: AsRef<Path>>(dir: P, pattern: &Regex) -> SegResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(SegError::MissingInputDir(dir.to_owned()));
    }
    let mut ans = Vec::new();
    for entry in dir.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matches_from_start(pattern, &entry.file_name().to_string_lossy()) {
            ans.push(entry.path());
        }
    }
    ans.sort_unstable();
    Ok(ans)
}
