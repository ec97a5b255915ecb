//! 分割流程驱动.
//!
//! 几何适配 -> 阈值融合 -> 拓扑清理 -> 对象过滤 -> 最终标记.
//! 每一步都是纯函数, 不修改输入.

use crate::cleanup::{clear_border, fill_holes};
use crate::dataset::RawImage;
use crate::filter::{filter_objects, MinZExtent, RadiusInterval};
use crate::label::label;
use crate::threshold::{fuse, LocalParams};
use crate::{geometry, io, LabelVolume, SegError, SegResult, Stack};
use log::{debug, info};
use ndarray::ArrayD;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 分割参数. 作为不可变值传入流程入口.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// 局部阈值参数.
    pub local: LocalParams,

    /// 细胞核半径区间.
    pub radius: RadiusInterval,

    /// 最小 Z 跨度.
    pub min_z: MinZExtent,

    /// 是否同时清除接触首尾切片的对象.
    pub clear_z: bool,
}

impl SegmentConfig {
    /// 检查参数合法性.
    pub fn validate(&self) -> SegResult<()> {
        self.radius.validate()?;
        self.min_z.validate()?;
        if self.local.side == 0 {
            return Err(SegError::InvalidConfig(
                "neighbourhood side must be positive".to_string(),
            ));
        }
        if !self.local.offset.is_finite() {
            return Err(SegError::InvalidConfig(format!(
                "invalid local threshold offset {}",
                self.local.offset
            )));
        }
        Ok(())
    }
}

/// 单个体的分割摘要.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentReport {
    /// 全局 Otsu 阈值.
    pub global_threshold: f64,

    /// 清理后、过滤前的连通域个数.
    pub components: usize,

    /// 按体素个数剔除的个数.
    pub size_discarded: usize,

    /// 按 Z 跨度剔除的个数.
    pub z_discarded: usize,

    /// 最终对象个数.
    pub objects: usize,
}

impl fmt::Display for SegmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "threshold {:.4}, {} components, -{} by size, -{} by Z, {} nuclei",
            self.global_threshold,
            self.components,
            self.size_discarded,
            self.z_discarded,
            self.objects
        )
    }
}

/// 分割结果.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// 最终标签体.
    pub labels: LabelVolume,

    /// 摘要.
    pub report: SegmentReport,
}

/// 对规范强度体执行阈值融合、拓扑清理、对象过滤与最终标记.
pub fn segment(stack: &Stack, config: &SegmentConfig) -> Segmentation {
    let fusion = fuse(stack, &config.local);
    let mask = clear_border(&fusion.mask, config.clear_z);
    let mask = fill_holes(&mask);
    let filtered = filter_objects(&mask, &config.radius, config.min_z);
    let labels = label(&filtered.mask);
    let report = SegmentReport {
        global_threshold: fusion.global_threshold,
        components: filtered.components,
        size_discarded: filtered.size_discarded,
        z_discarded: filtered.z_discarded,
        objects: labels.max_label() as usize,
    };
    debug!("{report}");
    Segmentation { labels, report }
}

/// 对任意秩的原始数组先做几何适配 (含除以拉伸系数 `factor`), 再分割.
pub fn segment_raw(
    raw: ArrayD<f64>,
    factor: f64,
    config: &SegmentConfig,
) -> SegResult<Segmentation> {
    config.validate()?;
    let stack = geometry::adapt(raw, factor)?;
    debug!("adapted to {:?} {:?}", stack.rank(), stack.shape());
    Ok(segment(&stack, config))
}

/// 输出位置.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// 输出目录, 不存在时自动创建.
    pub dir: PathBuf,

    /// 输出文件名前缀.
    pub prefix: String,
}

impl OutputSpec {
    /// 以默认前缀创建.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
            prefix: crate::consts::DEFAULT_OUT_PREFIX.to_string(),
        }
    }

    /// `<dir>/<prefix><输入文件名>`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir.join(format!("{}{name}", self.prefix))
    }
}

/// 读取文件及其 sidecar, 分割, 并以相同容器格式写出 `u32` 标签体. 返回输出路径.
pub fn segment_file(
    input: &Path,
    output: &OutputSpec,
    config: &SegmentConfig,
) -> SegResult<PathBuf> {
    let out_path = output.output_path(input);
    // 先检查输出格式, 避免白白计算.
    io::Format::from_path(&out_path)?;

    let raw = RawImage::open(input)?;
    let seg = segment_raw(raw.data, raw.factor, config)?;
    fs::create_dir_all(&output.dir)?;
    io::write_labels(&out_path, &seg.labels)?;
    info!(
        "{} -> {}: {}",
        input.display(),
        out_path.display(),
        seg.report
    );
    Ok(out_path)
}
