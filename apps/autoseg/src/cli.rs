//! 命令行参数.

use clap::{Parser, ValueEnum};
use nucleo_berry::prelude::LocalMethod;
use std::path::PathBuf;

/// 三维细胞核批量分割.
///
/// 对输入目录中每个匹配的图像执行阈值融合、拓扑清理与对象过滤,
/// 并将 `u32` 标签体以相同格式写入输出目录.
#[derive(Debug, Parser)]
#[command(name = "autoseg", version)]
pub struct Cli {
    /// 输入目录. 缺省时读取配置文件或 `NUCLEO_INPUT_DIR`.
    pub input_dir: Option<PathBuf>,

    /// 输出目录. 缺省时读取配置文件或 `NUCLEO_OUTPUT_DIR`.
    pub output_dir: Option<PathBuf>,

    /// TOML 配置文件.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输入文件名正则, 从文件名开头匹配. 默认 `^.*\.tiff?$`.
    #[arg(long)]
    pub pattern: Option<String>,

    /// 输出文件名前缀. 默认 `mask_`.
    #[arg(long)]
    pub prefix: Option<String>,

    /// 局部阈值邻域边长. 默认 101.
    #[arg(long)]
    pub side: Option<usize>,

    /// 局部阈值统计量.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// 局部阈值偏移量.
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<f64>,

    /// 最小半径. 默认 10.
    #[arg(long)]
    pub radius_min: Option<f64>,

    /// 最大半径. 默认无穷.
    #[arg(long)]
    pub radius_max: Option<f64>,

    /// 最小 Z 跨度. 不超过 1 时视为占切片数的比例. 默认 0.25.
    #[arg(long)]
    pub min_z: Option<f64>,

    /// 同时清除接触首尾切片的对象.
    #[arg(long)]
    pub clear_z: bool,

    /// 并行处理的文件数. 默认 1.
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 输出调试日志.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Gaussian,
    Mean,
}

impl From<MethodArg> for LocalMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Gaussian => LocalMethod::Gaussian,
            MethodArg::Mean => LocalMethod::Mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let c = Cli::try_parse_from([
            "autoseg", "in", "out", "--method", "mean", "--offset", "-2.5", "-j", "4", "-v",
        ])
        .unwrap();
        assert_eq!(c.input_dir, Some(PathBuf::from("in")));
        assert_eq!(c.method.map(LocalMethod::from), Some(LocalMethod::Mean));
        assert_eq!(c.offset, Some(-2.5));
        assert_eq!(c.threads, Some(4));
        assert!(c.verbose && !c.clear_z);
    }
}
