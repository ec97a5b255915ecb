//! 批处理结果.

use nucleo_berry::SegError;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// 单个文件的处理结果.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<PathBuf, SegError>,
    pub elapsed: Duration,
}

/// 一次批处理的最终结果.
#[derive(Debug, Default)]
pub struct BatchResult {
    data: Vec<FileOutcome>,
    wall: Duration,
}

impl BatchResult {
    pub fn new(data: Vec<FileOutcome>, wall: Duration) -> Self {
        Self { data, wall }
    }

    pub fn total(&self) -> usize {
        self.data.len()
    }

    /// 失败文件个数.
    pub fn failed(&self) -> usize {
        self.data.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.total() - self.failed()
    }

    /// 将汇总写进 `w` 中.
    pub fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        const S4: &str = "    ";

        writeln!(w, "Batch summary:")?;
        writeln!(w, "{S4}Images found: {}", self.total())?;
        writeln!(w, "{S4}Segmented: {}", self.succeeded())?;
        writeln!(w, "{S4}Failed: {}", self.failed())?;
        let busy: Duration = self.data.iter().map(|o| o.elapsed).sum();
        writeln!(w, "{S4}Total machine time: {} ms", busy.as_millis())?;
        let slowest = self
            .data
            .iter()
            .max_by_key(|o| o.elapsed)
            .map_or_else(|| "/".to_string(), |o| o.elapsed.as_millis().to_string());
        writeln!(w, "{S4}Most time-consuming image costs {slowest} ms")?;
        write!(w, "{S4}Wall time: {} ms", self.wall.as_millis())?;
        for o in self.data.iter() {
            if let Err(e) = &o.result {
                write!(w, "\n{S4}{S4}{}: {e}", o.input.display())?;
            }
        }
        Ok(())
    }

    /// 打印汇总.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        utils::sep_to(&mut out)?;
        self.describe_into(&mut out)?;
        writeln!(out)?;
        utils::sep_to(&mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let r = BatchResult::new(
            vec![
                FileOutcome {
                    input: "a.tif".into(),
                    result: Ok("out/mask_a.tif".into()),
                    elapsed: Duration::from_millis(30),
                },
                FileOutcome {
                    input: "b.tif".into(),
                    result: Err(SegError::UnsupportedRank(1)),
                    elapsed: Duration::from_millis(5),
                },
            ],
            Duration::from_millis(31),
        );
        assert_eq!((r.total(), r.succeeded(), r.failed()), (2, 1, 1));

        let mut buf = Vec::new();
        r.describe_into(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Segmented: 1"));
        assert!(text.contains("Total machine time: 35 ms"));
        assert!(text.contains("costs 30 ms"));
        assert!(text.contains("b.tif: "));
        assert!(!text.contains("a.tif: "));
    }

    #[test]
    fn test_empty_batch() {
        let r = BatchResult::default();
        let mut buf = Vec::new();
        r.describe_into(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("costs / ms"));
    }
}
