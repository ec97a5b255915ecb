//! 对象过滤: 按体素个数与 Z 跨度剔除连通域.
//!
//! 每一轮都先重新标记, 因此标签始终稠密.

use crate::consts::LABEL_BACKGROUND;
use crate::label::label;
use crate::{LabelVolume, Mask, Rank, SegError, SegResult};
use itertools::Itertools;
use log::debug;
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 细胞核半径区间 (体素), `0 <= min <= max`, `max` 可为正无穷.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadiusInterval {
    /// 下限.
    pub min: f64,

    /// 上限.
    pub max: f64,
}

impl Default for RadiusInterval {
    fn default() -> Self {
        Self {
            min: crate::consts::DEFAULT_RADIUS_MIN,
            max: crate::consts::DEFAULT_RADIUS_MAX,
        }
    }
}

impl RadiusInterval {
    /// 创建并检查区间.
    pub fn new(min: f64, max: f64) -> SegResult<Self> {
        let ans = Self { min, max };
        ans.validate()?;
        Ok(ans)
    }

    /// 检查: 两端非 NaN, 非负, 且 `min <= max`.
    pub fn validate(&self) -> SegResult<()> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err(SegError::InvalidConfig("radius is NaN".to_string()));
        }
        if self.min < 0.0 {
            return Err(SegError::InvalidConfig(format!(
                "negative minimum radius {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(SegError::InvalidConfig(format!(
                "radius interval [{}, {}] is inverted",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// 按圆面积 (2D) 或球体积 (3D) 换算成体素个数区间.
    pub fn to_sizes(&self, rank: Rank) -> SizeInterval {
        let f = |r: f64| match rank {
            Rank::Planar => PI * r * r,
            Rank::Volumetric => 4.0 / 3.0 * PI * r.powi(3),
        };
        SizeInterval {
            min: f(self.min),
            max: f(self.max),
        }
    }
}

/// 允许的体素个数闭区间.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizeInterval {
    /// 下限.
    pub min: f64,

    /// 上限.
    pub max: f64,
}

impl SizeInterval {
    /// `count` 是否落在闭区间内. 恰好等于端点时保留.
    #[inline]
    pub fn contains(&self, count: usize) -> bool {
        let c = count as f64;
        c >= self.min && c <= self.max
    }
}

/// 最小 Z 跨度. 不大于 1 时为相对堆栈深度的比例, 否则为绝对切片数. 均向上取整.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MinZExtent(pub f64);

impl Default for MinZExtent {
    fn default() -> Self {
        Self(crate::consts::DEFAULT_MIN_Z)
    }
}

impl MinZExtent {
    /// 检查: 非 NaN 且非负.
    pub fn validate(&self) -> SegResult<()> {
        if self.0.is_nan() || self.0 < 0.0 {
            return Err(SegError::InvalidConfig(format!(
                "invalid minimum Z-extent {}",
                self.0
            )));
        }
        Ok(())
    }

    /// 该设置是否关闭 Z 跨度过滤.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.0.ceil() <= 0.0
    }

    /// 对深度为 `depth` 的堆栈求出最小切片数.
    pub fn resolve(&self, depth: usize) -> usize {
        let v = if self.0 <= 1.0 {
            (self.0 * depth as f64).ceil()
        } else {
            self.0.ceil()
        };
        v.max(0.0) as usize
    }
}

/// 标签选择. 二者对同一标签体产生相同的掩膜.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    /// 删除这些标签, 保留其余.
    Discard(Vec<u32>),

    /// 只保留这些标签.
    Keep(Vec<u32>),
}

/// 给定标签总数 `n_labels` 与待删除标签, 选择代价更小的表示:
/// 待删除的标签多于一半时, 改为记录需保留的补集.
pub fn resolve_selection(n_labels: u32, mut discard: Vec<u32>) -> Selection {
    discard.sort_unstable();
    discard.dedup();
    if discard.len() * 2 > n_labels as usize {
        let keep = (1..=n_labels)
            .filter(|l| discard.binary_search(l).is_err())
            .collect();
        Selection::Keep(keep)
    } else {
        Selection::Discard(discard)
    }
}

/// 按 `selection` 生成新的掩膜.
pub fn apply_selection(labels: &LabelVolume, selection: &Selection) -> Mask {
    let n = labels.max_label() as usize;
    let (listed, keep_listed) = match selection {
        Selection::Discard(v) => (v, false),
        Selection::Keep(v) => (v, true),
    };
    let mut keep = vec![!keep_listed; n + 1];
    for &l in listed {
        if let Some(k) = keep.get_mut(l as usize) {
            *k = keep_listed;
        }
    }
    keep[LABEL_BACKGROUND as usize] = false;
    Mask::from_parts(labels.rank(), labels.data().mapv(|l| keep[l as usize]))
}

/// 单轮过滤结果.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    /// 过滤后的掩膜.
    pub mask: Mask,

    /// 本轮前的连通域个数.
    pub before: usize,

    /// 被剔除的连通域个数.
    pub discarded: usize,
}

fn run_pass(labels: &LabelVolume, discard: Vec<u32>) -> PassOutcome {
    let before = labels.max_label();
    let discarded = discard.len();
    let selection = resolve_selection(before, discard);
    PassOutcome {
        mask: apply_selection(labels, &selection),
        before: before as usize,
        discarded,
    }
}

/// 按体素总数过滤. 严格落在 `sizes` 之外的连通域被剔除.
pub fn xy_size_pass(mask: &Mask, sizes: &SizeInterval) -> PassOutcome {
    let labels = label(mask);
    let discard = labels
        .sizes()
        .into_iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, c)| !sizes.contains(c))
        .map(|(l, _)| l as u32)
        .collect_vec();
    run_pass(&labels, discard)
}

/// 各标签的 Z 跨度: 在所有 (Y, X) 列中, 该标签出现的最多切片数.
pub fn z_extents(labels: &LabelVolume) -> Vec<usize> {
    let n = labels.max_label() as usize;
    let mut ext = vec![0usize; n + 1];
    let mut counts = vec![0usize; n + 1];
    let mut touched = Vec::new();
    let data = labels.data();
    let (_, h, w) = labels.shape();
    for (y, x) in itertools::iproduct!(0..h, 0..w) {
        for &l in data.slice(ndarray::s![.., y, x]).iter() {
            if l == LABEL_BACKGROUND {
                continue;
            }
            let l = l as usize;
            if counts[l] == 0 {
                touched.push(l);
            }
            counts[l] += 1;
        }
        for l in touched.drain(..) {
            ext[l] = ext[l].max(counts[l]);
            counts[l] = 0;
        }
    }
    ext
}

/// 按 Z 跨度过滤. 2D 数据或关闭该过滤时原样返回.
pub fn z_extent_pass(mask: &Mask, min_z: MinZExtent) -> PassOutcome {
    if mask.rank().is_planar() || min_z.is_disabled() {
        return PassOutcome {
            mask: mask.clone(),
            before: 0,
            discarded: 0,
        };
    }
    let min_slices = min_z.resolve(mask.len_z());
    let labels = label(mask);
    let discard = z_extents(&labels)
        .into_iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, e)| e < min_slices)
        .map(|(l, _)| l as u32)
        .collect_vec();
    debug!("minimum Z-extent {min_slices} slices");
    run_pass(&labels, discard)
}

/// 两轮过滤的汇总结果.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// 最终掩膜.
    pub mask: Mask,

    /// 过滤前的连通域个数.
    pub components: usize,

    /// 按体素个数剔除的个数.
    pub size_discarded: usize,

    /// 按 Z 跨度剔除的个数.
    pub z_discarded: usize,
}

/// 依次执行体素个数过滤与 Z 跨度过滤.
pub fn filter_objects(mask: &Mask, radii: &RadiusInterval, min_z: MinZExtent) -> FilterOutcome {
    let sizes = radii.to_sizes(mask.rank());
    let by_size = xy_size_pass(mask, &sizes);
    debug!(
        "size pass [{:.1}, {:.1}] voxels: {} of {} discarded",
        sizes.min, sizes.max, by_size.discarded, by_size.before
    );
    let by_z = z_extent_pass(&by_size.mask, min_z);
    debug!("Z-extent pass: {} discarded", by_z.discarded);
    FilterOutcome {
        mask: by_z.mask,
        components: by_size.before,
        size_discarded: by_size.discarded,
        z_discarded: by_z.discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array2, Array3};

    /// 在 (1, 40, 40) 平面上放置若干互不相连的 1×k 横条.
    fn bars(lens: &[usize]) -> Mask {
        let mut img = Array2::from_elem((40, 40), false);
        for (i, &k) in lens.iter().enumerate() {
            img.slice_mut(s![2 * i + 1, 1..1 + k]).fill(true);
        }
        Mask::new_2d(img)
    }

    #[test]
    fn test_size_ties_kept() {
        let sizes = SizeInterval {
            min: 4.0,
            max: 6.0,
        };
        let out = xy_size_pass(&bars(&[3, 4, 5, 6, 7]), &sizes);
        assert_eq!(out.before, 5);
        assert_eq!(out.discarded, 2);
        let kept = label(&out.mask).sizes();
        assert_eq!(kept, vec![40 * 40 - 15, 4, 5, 6]);
    }

    #[test]
    fn test_radius_to_sizes() {
        let r = RadiusInterval::new(1.0, 2.0).unwrap();
        let s2 = r.to_sizes(Rank::Planar);
        assert!((s2.min - PI).abs() < 1e-12 && (s2.max - 4.0 * PI).abs() < 1e-12);
        let s3 = r.to_sizes(Rank::Volumetric);
        assert!((s3.max - 32.0 / 3.0 * PI).abs() < 1e-12);
        assert!(RadiusInterval::default().to_sizes(Rank::Volumetric).max.is_infinite());
        assert!(RadiusInterval::new(3.0, 2.0).is_err());
        assert!(RadiusInterval::new(-1.0, 2.0).is_err());
    }

    #[test]
    fn test_complement_path_equivalence() {
        let labels = label(&bars(&[1, 2, 3, 4, 5, 6, 7, 8]));
        let discard = vec![1, 2, 3, 5, 8];
        let keep = vec![4, 6, 7];
        assert_eq!(
            resolve_selection(8, discard.clone()),
            Selection::Keep(keep.clone())
        );
        assert_eq!(
            resolve_selection(8, vec![2, 3]),
            Selection::Discard(vec![2, 3])
        );
        let a = apply_selection(&labels, &Selection::Discard(discard));
        let b = apply_selection(&labels, &Selection::Keep(keep));
        assert_eq!(a, b);
        assert_eq!(a.count_foreground(), 4 + 6 + 7);
    }

    #[test]
    fn test_min_z_resolve() {
        assert_eq!(MinZExtent(0.25).resolve(20), 5);
        assert_eq!(MinZExtent(0.26).resolve(20), 6);
        assert_eq!(MinZExtent(1.0).resolve(7), 7);
        assert_eq!(MinZExtent(2.5).resolve(20), 3);
        assert!(MinZExtent(0.0).is_disabled());
        assert!(!MinZExtent(0.01).is_disabled());
    }

    #[test]
    fn test_z_extent_ties_kept() {
        let mut data = Array3::from_elem((8, 12, 12), false);
        // 跨 2 个切片.
        data.slice_mut(s![0..2, 1..3, 1..3]).fill(true);
        // 跨 3 个切片, 但任一列只出现 2 次: 阶梯形.
        data.slice_mut(s![3..5, 6..8, 1..3]).fill(true);
        data.slice_mut(s![5, 7..9, 1..3]).fill(true);
        data.slice_mut(s![4, 7, 1..3]).fill(false);
        // 跨 4 个切片.
        data.slice_mut(s![2..6, 6..8, 8..10]).fill(true);
        let m = Mask::new_3d(data);
        let ext = z_extents(&label(&m));
        assert_eq!(ext, vec![0, 2, 4, 2]);

        // 8 × 0.25 = 2, 恰好等于 2 的保留.
        let out = z_extent_pass(&m, MinZExtent(0.25));
        assert_eq!(out.discarded, 0);
        let out = z_extent_pass(&m, MinZExtent(3.0));
        assert_eq!(out.discarded, 2);
        assert_eq!(out.mask.count_foreground(), 16);
    }

    #[test]
    fn test_z_pass_skipped_for_planar() {
        let m = bars(&[2, 3]);
        let out = z_extent_pass(&m, MinZExtent(5.0));
        assert_eq!(out.mask, m);
        assert_eq!(out.discarded, 0);
    }

    #[test]
    fn test_filter_idempotent_and_dense() {
        let mut data = Array3::from_elem((6, 20, 20), false);
        data.slice_mut(s![0..6, 2..6, 2..6]).fill(true);
        data.slice_mut(s![0..1, 10..12, 10..12]).fill(true);
        data.slice_mut(s![1..3, 12..16, 3..7]).fill(true);
        let m = Mask::new_3d(data);
        let radii = RadiusInterval::new(1.0, 3.0).unwrap();
        let once = filter_objects(&m, &radii, MinZExtent(0.5));
        // 4/3·π ≈ 4.19 <= n <= 36π ≈ 113.1; 最小跨度 3 个切片.
        assert_eq!(once.components, 3);
        assert_eq!(once.size_discarded, 1);
        assert_eq!(once.z_discarded, 1);
        let twice = filter_objects(&once.mask, &radii, MinZExtent(0.5));
        assert_eq!(twice.mask, once.mask);
        assert_eq!(twice.size_discarded + twice.z_discarded, 0);
        assert!(label(&twice.mask).is_dense());
    }
}
