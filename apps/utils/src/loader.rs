//! 对 `nucleo-berry::dataset` 的更一层封装. 提供更直接的输入定位方式.

use nucleo_berry::dataset;
use nucleo_berry::{SegError, SegResult};
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};

/// 输入目录环境变量.
pub const INPUT_DIR_VAR: &str = "NUCLEO_INPUT_DIR";

/// 输出目录环境变量.
pub const OUTPUT_DIR_VAR: &str = "NUCLEO_OUTPUT_DIR";

/// 获取目录路径.
///
/// 1. 若 `arg` 非空, 则返回其值;
/// 2. 否则若环境变量 `var` 非空, 则返回其值;
/// 3. 否则返回 `None`.
pub fn dir_from_arg_or_env(arg: Option<PathBuf>, var: &str) -> Option<PathBuf> {
    arg.or_else(|| {
        env::var_os(var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// 编译文件名正则.
pub fn compile_pattern(pattern: &str) -> SegResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| SegError::InvalidConfig(format!("bad file name pattern {pattern:?}: {e}")))
}

/// 列出 `dir` 下文件名匹配 `pattern` 的图像.
pub fn image_list<P: AsRef<Path>>(dir: P, pattern: &str) -> SegResult<Vec<PathBuf>> {
    dataset::collect_images(dir, &compile_pattern(pattern)?)
}
