//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{Connectivity, LabelVolume, Mask, MaskSlice, MaskSliceMut, Rank, Stack};

pub use crate::consts::binary::{BACKGROUND, FOREGROUND};
pub use crate::consts::LABEL_BACKGROUND;

pub use crate::dataset::{collect_images, RawImage};
pub use crate::filter::{MinZExtent, RadiusInterval};
pub use crate::io::{read_volume, write_labels};
pub use crate::pipeline::{
    segment, segment_file, segment_raw, OutputSpec, SegmentConfig, SegmentReport, Segmentation,
};
pub use crate::threshold::{LocalMethod, LocalParams};

pub use crate::{SegError, SegResult};
