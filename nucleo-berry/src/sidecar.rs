//! 反卷积历史文件 (sidecar): 读取强度拉伸系数.
//!
//! 对于 `abc_cmle.tif`, 依次查找同目录下的 `abc_history.txt`, `abc_hystory.txt`
//! 与 `abc-history`, 取第一个存在的文件;
//! 对于其它文件名 `abc.tif`, 词干为 `abc.tif`.

use crate::consts::{HISTORY_MARKER, HISTORY_SUFFIXES};
use crate::{SegError, SegResult};
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 反卷积输出文件名的后缀.
fn cmle_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*)_cmle\.tiff?$").expect("valid literal regex"))
}

/// 由图像路径推出全部候选历史文件路径, 按查找顺序排列.
pub fn history_candidates(image: &Path) -> Vec<PathBuf> {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = cmle_suffix().replace(&name, "$1");
    HISTORY_SUFFIXES
        .iter()
        .map(|suffix| image.with_file_name(format!("{stem}{suffix}")))
        .collect()
}

/// 第一个存在的候选历史文件.
pub fn history_path(image: &Path) -> Option<PathBuf> {
    history_candidates(image).into_iter().find(|p| p.is_file())
}

/// 从历史文件内容中解析拉伸系数. 没有标记行时返回 `Ok(None)`.
///
/// 只看第一个含有标记的行, 取其最后一个空白分隔的词.
pub fn parse_factor<R: BufRead>(reader: R, path: &Path) -> SegResult<Option<f64>> {
    for line in reader.lines() {
        let line = line?;
        if !line.contains(HISTORY_MARKER) {
            continue;
        }
        return line
            .split_whitespace()
            .last()
            .and_then(|tok| tok.parse::<f64>().ok())
            .map(Some)
            .ok_or_else(|| SegError::SidecarParse {
                path: path.to_path_buf(),
                line: line.clone(),
            });
    }
    Ok(None)
}

/// 读取图像 `image` 的拉伸系数. 历史文件或标记行不存在时返回 1.0.
pub fn rescale_factor(image: &Path) -> SegResult<f64> {
    let Some(path) = history_path(image) else {
        return Ok(1.0);
    };
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(1.0),
        Err(e) => return Err(e.into()),
    };
    let factor = parse_factor(BufReader::new(file), &path)?.unwrap_or(1.0);
    debug!("rescaling factor {factor} from {}", path.display());
    Ok(factor)
}
