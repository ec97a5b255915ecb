//! 批处理程序依赖的通用组件.

use std::io::{self, Write};

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 向 `w` 写入一条简单分隔线.
#[inline]
pub fn sep_to<W: Write>(mut w: W) -> io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 将请求的线程数限制在 `[1, cpus()]` 内. 返回 (实际线程数, 是否被下调).
pub fn clamp_threads(requested: usize) -> (usize, bool) {
    let max = cpus().max(1);
    if requested > max {
        (max, true)
    } else {
        (requested.max(1), false)
    }
}
