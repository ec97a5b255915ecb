use std::ops::{Index, IndexMut};

use ndarray::{Array2, Array3, ArrayD, ArrayView3, Axis, Ix3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::binary::*;
use crate::consts::LABEL_BACKGROUND;
use crate::{Idx2d, Idx3d, SegError, SegResult};

pub mod slice;

pub use slice::{Connectivity, MaskSlice, MaskSliceMut};

/// 数据的几何秩.
///
/// 2D 图像在内部统一以单切片 `(1, Y, X)` 形式存储, 以便所有逐切片操作共用一份实现.
/// 所有 3×3×3 邻域操作在体边缘处钳位, 因此在单切片上与 3×3 操作完全等价.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rank {
    /// 2D 图像 `(Y, X)`.
    Planar,

    /// 3D 堆栈 `(Z, Y, X)`.
    Volumetric,
}

impl Rank {
    /// 对外表现的维数 (2 或 3).
    #[inline]
    pub const fn ndim(&self) -> usize {
        match self {
            Rank::Planar => 2,
            Rank::Volumetric => 3,
        }
    }

    /// 是否为 2D.
    #[inline]
    pub const fn is_planar(&self) -> bool {
        matches!(self, Rank::Planar)
    }
}

/// 将 `ArrayD` 按秩转换为内部 `Array3` 表示.
fn canonical<T>(data: ArrayD<T>) -> SegResult<(Rank, Array3<T>)> {
    let ndim = data.ndim();
    let (rank, data) = match ndim {
        2 => (Rank::Planar, data.insert_axis(Axis(0))),
        3 => (Rank::Volumetric, data),
        _ => return Err(SegError::UnsupportedRank(ndim)),
    };
    let data = data
        .into_dimensionality::<Ix3>()
        .map_err(|_| SegError::UnsupportedRank(ndim))?;
    Ok((rank, data))
}

/// 强度体、掩膜、标签体的共用方法.
macro_rules! impl_volume_common {
    ($vol: ty, $elem: ty) => {
        impl $vol {
            /// 从 3D 数组 `(Z, Y, X)` 直接创建.
            #[inline]
            pub fn new_3d(data: Array3<$elem>) -> Self {
                Self::from_parts(Rank::Volumetric, data)
            }

            /// 从 2D 数组 `(Y, X)` 直接创建.
            #[inline]
            pub fn new_2d(data: Array2<$elem>) -> Self {
                Self::from_parts(Rank::Planar, data.insert_axis(Axis(0)))
            }

            /// 从 2D 或 3D 的动态维数组创建. 其它秩返回 `Err`.
            pub fn from_dyn(data: ArrayD<$elem>) -> SegResult<Self> {
                let (rank, data) = canonical(data)?;
                Ok(Self::from_parts(rank, data))
            }

            /// 几何秩.
            #[inline]
            pub fn rank(&self) -> Rank {
                self.rank
            }

            /// 内部形状 `(Z, Y, X)`. 2D 数据的 `Z` 恒为 1.
            #[inline]
            pub fn shape(&self) -> Idx3d {
                self.data.dim()
            }

            /// 水平切片形状 `(Y, X)`.
            #[inline]
            pub fn slice_shape(&self) -> Idx2d {
                let (_, h, w) = self.shape();
                (h, w)
            }

            /// 水平切片个数.
            #[inline]
            pub fn len_z(&self) -> usize {
                self.shape().0
            }

            /// 体素个数.
            #[inline]
            pub fn size(&self) -> usize {
                self.data.len()
            }

            /// 获得数据的一份不可变 shallow copy, 形状为 `(Z, Y, X)`.
            #[inline]
            pub fn data(&self) -> ArrayView3<'_, $elem> {
                self.data.view()
            }

            /// 消费自我, 以对外秩 (2 或 3) 返回底层数据.
            pub fn into_dyn(self) -> ArrayD<$elem> {
                match self.rank {
                    Rank::Planar => self.data.index_axis_move(Axis(0), 0).into_dyn(),
                    Rank::Volumetric => self.data.into_dyn(),
                }
            }
        }

        impl Index<Idx3d> for $vol {
            type Output = $elem;

            #[inline]
            fn index(&self, index: Idx3d) -> &Self::Output {
                &self.data[index]
            }
        }

        impl IndexMut<Idx3d> for $vol {
            #[inline]
            fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
                &mut self.data[index]
            }
        }
    };
}

/// 规范强度体. 强度以 `f64` 保存.
#[derive(Debug, Clone)]
pub struct Stack {
    rank: Rank,
    data: Array3<f64>,
}

impl_volume_common!(Stack, f64);

impl Stack {
    #[inline]
    pub(crate) fn from_parts(rank: Rank, data: Array3<f64>) -> Self {
        Self { rank, data }
    }

    /// 严格大于 `threshold` 的体素为前景.
    pub fn above(&self, threshold: f64) -> Mask {
        Mask::from_parts(self.rank, self.data.mapv(|v| v > threshold))
    }
}

/// 二值掩膜.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    rank: Rank,
    data: Array3<bool>,
}

impl_volume_common!(Mask, bool);

impl Mask {
    #[inline]
    pub(crate) fn from_parts(rank: Rank, data: Array3<bool>) -> Self {
        Self { rank, data }
    }

    /// 创建全背景掩膜.
    pub fn background(rank: Rank, shape: Idx3d) -> Self {
        Self::from_parts(rank, Array3::from_elem(shape, BACKGROUND))
    }

    /// 前景体素个数.
    #[inline]
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|p| is_foreground(**p)).count()
    }

    /// 该掩膜是否全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 逐体素逻辑与. 两者形状必须一致, 否则 panic.
    pub fn and(&self, other: &Mask) -> Mask {
        assert_eq!(self.shape(), other.shape(), "掩膜形状不一致");
        let mut data = self.data.clone();
        data.zip_mut_with(&other.data, |a, &b| *a = *a && b);
        Self::from_parts(self.rank, data)
    }

    /// 获取第 `z_index` 层不可变切片. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取能按升序迭代水平可变切片的迭代器.
    #[inline]
    pub fn slice_iter_mut(&mut self) -> impl ExactSizeIterator<Item = MaskSliceMut<'_>> {
        self.data.axis_iter_mut(Axis(0)).map(MaskSliceMut::new)
    }

    /// 获取能按升序迭代 XZ 平面 (固定 Y, 形状 `(Z, X)`) 可变切片的迭代器.
    #[inline]
    pub fn xz_plane_iter_mut(&mut self) -> impl ExactSizeIterator<Item = MaskSliceMut<'_>> {
        self.data.axis_iter_mut(Axis(1)).map(MaskSliceMut::new)
    }
}

/// 连通域标签体. 0 为背景, 正整数为连通域编号.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVolume {
    rank: Rank,
    data: Array3<u32>,
}

impl_volume_common!(LabelVolume, u32);

impl LabelVolume {
    #[inline]
    pub(crate) fn from_parts(rank: Rank, data: Array3<u32>) -> Self {
        Self { rank, data }
    }

    /// 最大标签编号. 对于稠密标签体, 即连通域个数.
    #[inline]
    pub fn max_label(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(LABEL_BACKGROUND)
    }

    /// 统计各标签的体素个数. 返回值下标即标签编号, 长度为 `max_label + 1`.
    pub fn sizes(&self) -> Vec<usize> {
        let mut ans = vec![0usize; self.max_label() as usize + 1];
        for &l in self.data.iter() {
            ans[l as usize] += 1;
        }
        ans
    }

    /// 标签是否稠密, 即出现的编号恰为 `{0, 1, ..., k}` 的一个前缀 (0 可能不出现).
    pub fn is_dense(&self) -> bool {
        self.sizes().iter().skip(1).all(|&c| c > 0)
    }

    /// 非背景体素为前景.
    pub fn to_mask(&self) -> Mask {
        Mask::from_parts(self.rank, self.data.mapv(|l| l != LABEL_BACKGROUND))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl Mask {
    /// 借助 `rayon`, 并行地对每个水平可变切片实施 `op` 操作.
    pub fn par_for_each_slice_mut<F>(&mut self, op: F)
    where
        F: Fn(MaskSliceMut<'_>) + Sync + Send,
    {
        self.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|v| {
                op(MaskSliceMut::new(v));
            });
    }
}
