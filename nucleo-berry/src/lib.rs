#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对显微镜 3D (或 2D) 细胞核染色图像进行自动分割, 输出带编号的细胞核标签体.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 分割流程只依赖阈值与形态学操作, 不包含任何学习模型.
//! 2. 对于不合法的输入 (秩不对, 时间帧全空, sidecar 损坏等),
//!   库函数返回 [`SegError`], 不会 panic.
//!
//! # 开发计划
//!
//! ### 几何适配 ✅
//!
//! 任意秩的输入数组 -> 规范 2D/3D 强度体. 包括时间帧自动选择、
//! 冗余轴剥离以及反卷积拉伸系数的还原.
//!
//! 实现位于 `nucleo-berry/src/geometry.rs` 与 `nucleo-berry/src/sidecar.rs`.
//!
//! ### 阈值融合 ✅
//!
//! 全局 Otsu 阈值与逐切片局部自适应阈值取交集, 两者都先经过 3×3(×3) 闭运算.
//!
//! 实现位于 `nucleo-berry/src/threshold`.
//!
//! ### 拓扑清理 ✅
//!
//! 逐切片清除接触 XY 边缘的前景, 逐切片填充背景空洞.
//!
//! 实现位于 `nucleo-berry/src/cleanup.rs` 与 `nucleo-berry/src/data/slice`.
//!
//! ### 对象过滤 ✅
//!
//! 连通域标记, 按体素个数和 Z 跨度过滤, 每一轮之后重新标记.
//!
//! 实现位于 `nucleo-berry/src/label.rs` 与 `nucleo-berry/src/filter.rs`.
//!
//! ### 流程驱动与文件读写 ✅
//!
//! 1. 单个体的完整流程: `nucleo-berry/src/pipeline.rs`.
//! 2. `.npy` 与多页 TIFF 的读写: `nucleo-berry/src/io`.
//! 3. 输入目录扫描: `nucleo-berry/src/dataset`.
//!
//! ### 球体 Z 跨度 ⌛️
//!
//! 目前以 "单个 (Y, X) 列上出现的最多切片数" 近似对象的 Z 跨度.
//! 对倾斜的细胞核该值偏小, 可考虑改为 z 范围 `max_z - min_z + 1`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// 强度体、二值掩膜和标签体的基础数据结构.
mod data;

pub use data::{Connectivity, LabelVolume, Mask, MaskSlice, MaskSliceMut, Rank, Stack};

pub mod consts;

mod error;

pub use error::{SegError, SegResult};

pub mod cleanup;
pub mod dataset;
pub mod filter;
pub mod geometry;
pub mod io;
pub mod label;
pub mod pipeline;
pub mod prelude;
pub mod sidecar;
pub mod threshold;
