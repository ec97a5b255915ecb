//! 运行配置: 命令行参数覆盖 TOML 配置文件, 配置文件覆盖默认值.

use crate::cli::Cli;
use anyhow::{bail, Context as _, Result};
use nucleo_berry::consts::{DEFAULT_IN_PATTERN, DEFAULT_OUT_PREFIX};
use nucleo_berry::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use utils::loader::{self, INPUT_DIR_VAR, OUTPUT_DIR_VAR};

/// TOML 配置文件. 所有字段可缺省.
///
/// ```toml
/// input_dir = "data/deconvolved"
/// threads = 4
///
/// [segment]
/// clear_z = true
/// min_z = 0.3
///
/// [segment.local]
/// side = 81
/// method = "mean"
///
/// [segment.radius]
/// min = 8.0
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub pattern: Option<String>,
    pub prefix: Option<String>,
    pub threads: Option<usize>,
    pub segment: SegmentConfig,
}

impl FileConfig {
    /// 读取并解析配置文件.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// 合并后的运行配置.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output: OutputSpec,
    pub pattern: String,
    pub threads: usize,
    pub segment: SegmentConfig,
}

impl RunConfig {
    /// 依次以 `file` 和 `cli` 覆盖默认值. 目录缺省时再查环境变量.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let Some(input_dir) =
            loader::dir_from_arg_or_env(cli.input_dir.or(file.input_dir), INPUT_DIR_VAR)
        else {
            bail!("No input directory given (argument, config file or ${INPUT_DIR_VAR})");
        };
        let Some(output_dir) =
            loader::dir_from_arg_or_env(cli.output_dir.or(file.output_dir), OUTPUT_DIR_VAR)
        else {
            bail!("No output directory given (argument, config file or ${OUTPUT_DIR_VAR})");
        };

        let mut segment = file.segment;
        let local = &mut segment.local;
        if let Some(side) = cli.side {
            local.side = side;
        }
        if let Some(method) = cli.method {
            local.method = method.into();
        }
        if let Some(offset) = cli.offset {
            local.offset = offset;
        }
        if let Some(min) = cli.radius_min {
            segment.radius.min = min;
        }
        if let Some(max) = cli.radius_max {
            segment.radius.max = max;
        }
        if let Some(min_z) = cli.min_z {
            segment.min_z = MinZExtent(min_z);
        }
        segment.clear_z |= cli.clear_z;
        segment.validate()?;

        let prefix = cli
            .prefix
            .or(file.prefix)
            .unwrap_or_else(|| DEFAULT_OUT_PREFIX.to_string());
        Ok(Self {
            input_dir,
            output: OutputSpec {
                dir: output_dir,
                prefix,
            },
            pattern: cli
                .pattern
                .or(file.pattern)
                .unwrap_or_else(|| DEFAULT_IN_PATTERN.to_string()),
            threads: cli.threads.or(file.threads).unwrap_or(1),
            segment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("autoseg").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_partial_file() {
        let text = r#"
            threads = 3

            [segment]
            clear_z = true

            [segment.local]
            method = "mean"

            [segment.radius]
            min = 4.0
        "#;
        let f = FileConfig::parse(text).unwrap();
        assert_eq!(f.threads, Some(3));
        assert!(f.input_dir.is_none());
        assert!(f.segment.clear_z);
        assert_eq!(f.segment.local.method, LocalMethod::Mean);
        assert_eq!(f.segment.local.side, 101);
        assert_eq!(f.segment.radius.min, 4.0);
        assert_eq!(f.segment.radius.max, f64::INFINITY);
        assert_eq!(f.segment.min_z, MinZExtent(0.25));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileConfig::parse("thread = 3").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let f = FileConfig::parse(
            r#"
            input_dir = "/from/file"
            output_dir = "/out/file"
            prefix = "seg_"
            [segment.local]
            side = 51
            "#,
        )
        .unwrap();
        let c = cli(&["/from/cli", "--side", "31", "--min-z", "4", "--clear-z"]);
        let r = RunConfig::resolve(c, f).unwrap();
        assert_eq!(r.input_dir, PathBuf::from("/from/cli"));
        assert_eq!(r.output.dir, PathBuf::from("/out/file"));
        assert_eq!(r.output.prefix, "seg_");
        assert_eq!(r.pattern, DEFAULT_IN_PATTERN);
        assert_eq!(r.threads, 1);
        assert_eq!(r.segment.local.side, 31);
        assert_eq!(r.segment.min_z, MinZExtent(4.0));
        assert!(r.segment.clear_z);
    }

    #[test]
    fn test_bad_radius_rejected() {
        let c = cli(&["/in", "/out", "--radius-min", "12", "--radius-max", "3"]);
        assert!(RunConfig::resolve(c, FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoseg.toml");
        fs::write(&path, "pattern = '\\.npy$'\n").unwrap();
        let f = FileConfig::load(&path).unwrap();
        assert_eq!(f.pattern.as_deref(), Some(r"\.npy$"));
        assert!(FileConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
