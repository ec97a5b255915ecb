//! 通用常量.

/// 二值掩膜取值.
pub mod binary {
    /// 背景.
    pub const BACKGROUND: bool = false;

    /// 前景.
    pub const FOREGROUND: bool = true;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: bool) -> bool {
        p
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: bool) -> bool {
        !p
    }
}

/// 标签体中背景的编号.
pub const LABEL_BACKGROUND: u32 = 0;

/// 默认局部阈值邻域边长 (像素). 偶数会被加 1.
pub const DEFAULT_NEIGHBOUR_SIDE: usize = 101;

/// 默认细胞核半径下限 (体素).
pub const DEFAULT_RADIUS_MIN: f64 = 10.0;

/// 默认细胞核半径上限 (体素).
pub const DEFAULT_RADIUS_MAX: f64 = f64::INFINITY;

/// 默认最小 Z 跨度. 不大于 1 时为相对堆栈深度的比例.
pub const DEFAULT_MIN_Z: f64 = 0.25;

/// 默认输出文件名前缀.
pub const DEFAULT_OUT_PREFIX: &str = "mask_";

/// 默认输入文件名正则.
pub const DEFAULT_IN_PATTERN: &str = r"^.*\.tiff?$";

/// Otsu 直方图的分箱数.
pub const OTSU_BINS: usize = 256;

/// 反卷积历史文件中记录拉伸系数的行所包含的标记.
pub const HISTORY_MARKER: &str = "Stretched to Integer type";

/// 反卷积历史文件的候选后缀, 按查找顺序排列.
///
/// `_hystory.txt` 是旧版批处理脚本写出的拼写.
pub const HISTORY_SUFFIXES: [&str; 3] = ["_history.txt", "_hystory.txt", "-history"];
