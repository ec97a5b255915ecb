//! 运行时错误.

use std::path::PathBuf;

/// 分割流程的运行时错误.
///
/// 除 [`SegError::MissingInputDir`] 与 [`SegError::InvalidConfig`] 外,
/// 其余错误都只影响单个文件, 批处理时应跳过该文件并继续.
#[derive(Debug, thiserror::Error)]
pub enum SegError {
    /// 输入目录不存在.
    #[error("input folder not found: {}", .0.display())]
    MissingInputDir(PathBuf),

    /// 参数不合法.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 四维 ZYXT 输入中没有任何非空时间帧. 参数为时间帧个数.
    #[error("no non-empty time frame among {frames} frames")]
    EmptyTimeSeries {
        /// 时间轴长度.
        frames: usize,
    },

    /// 适配后的秩不是 2 或 3.
    #[error("unsupported image rank {0}, expected 2 or 3")]
    UnsupportedRank(usize),

    /// 拉伸系数非有限或不为正.
    #[error("invalid rescaling factor {0}")]
    InvalidRescaleFactor(f64),

    /// 反卷积历史文件中标记行的最后一项不是数值.
    #[error("cannot parse rescaling factor from {}: {line:?}", .path.display())]
    SidecarParse {
        /// 历史文件路径.
        path: PathBuf,

        /// 标记行原文.
        line: String,
    },

    /// 不支持的文件格式或像素类型.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 多页 TIFF 的各页尺寸不一致.
    #[error("page {page} is {found:?}, expected {expected:?}")]
    ShapeMismatch {
        /// 页序号.
        page: usize,

        /// 第一页的 (高, 宽).
        expected: (usize, usize),

        /// 该页的 (高, 宽).
        found: (usize, usize),
    },

    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 读取 npy 文件错误.
    #[error(transparent)]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// 写入 npy 文件错误.
    #[error(transparent)]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// TIFF 编解码错误.
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),
}

/// 分割运行时结果.
pub type SegResult<T> = Result<T, SegError>;
