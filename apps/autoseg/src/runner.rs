//! 程序运行函数.

use crate::config::RunConfig;
use crate::result::{BatchResult, FileOutcome};
use anyhow::Result;
use log::{error, info, warn};
use nucleo_berry::pipeline::segment_file;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use utils::loader;

/// 处理单个文件. 失败只记录, 不影响其他文件.
fn process(input: PathBuf, config: &RunConfig) -> FileOutcome {
    let start = Instant::now();
    let result = segment_file(&input, &config.output, &config.segment);
    if let Err(e) = &result {
        error!("{}: {e}", input.display());
    }
    FileOutcome {
        input,
        result,
        elapsed: start.elapsed(),
    }
}

/// 实际运行.
pub fn run(config: &RunConfig) -> Result<BatchResult> {
    let images = loader::image_list(&config.input_dir, &config.pattern)?;
    if images.is_empty() {
        warn!(
            "No file in {} matches {:?}",
            config.input_dir.display(),
            config.pattern
        );
    }

    let (threads, lowered) = utils::clamp_threads(config.threads);
    if lowered {
        warn!("Lowered number of threads to {threads}");
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    info!(
        "Segmenting {} images from {} with {threads} threads",
        images.len(),
        config.input_dir.display()
    );
    let start = Instant::now();
    let data = pool.install(|| {
        images
            .into_par_iter()
            .map(|p| process(p, config))
            .collect()
    });
    Ok(BatchResult::new(data, start.elapsed()))
}
