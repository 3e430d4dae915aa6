//! 主机端检测器替身: JSON Lines 回放与内存脚本
//!
//! 回放文件每行对应一帧,内容为该帧的JSON数组; 空行视为无目标帧。

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::info;
use serde::de::DeserializeOwned;

use super::scale::{FrameScale, RawDetection};
use super::Detector;
use crate::detection::Candidate;

/// 按行读取的JSON帧
struct JsonLines<T> {
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
    interval: Option<Duration>,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonLines<T> {
    fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("打开回放文件失败: {}", path.display()))?;
        Ok(Self {
            lines: Some(BufReader::new(file).lines()),
            line_no: 0,
            interval: None,
            _marker: PhantomData,
        })
    }

    fn next_frame(&mut self) -> Result<Option<Vec<T>>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        let Some(line) = lines.next() else {
            return Ok(None);
        };
        self.line_no += 1;
        if let Some(interval) = self.interval {
            std::thread::sleep(interval);
        }

        let line = line.with_context(|| format!("读取第 {} 行失败", self.line_no))?;
        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(Vec::new()));
        }
        serde_json::from_str(line)
            .map(Some)
            .with_context(|| format!("第 {} 行JSON解析失败", self.line_no))
    }

    fn close(&mut self) {
        if self.lines.take().is_some() {
            info!("📁 回放文件已关闭 (共 {} 帧)", self.line_no);
        }
    }
}

/// 矩形检测回放: 每行 `[{"rect":[x,y,w,h],"corners":[[x,y],...]}, ...]`
pub struct ReplayDetector {
    frames: JsonLines<Candidate>,
}

impl ReplayDetector {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            frames: JsonLines::open(path.as_ref())?,
        })
    }

    /// 按固定帧间隔回放
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.frames.interval = Some(interval);
        self
    }
}

impl Detector for ReplayDetector {
    fn poll(&mut self) -> Result<Option<Vec<Candidate>>> {
        self.frames.next_frame()
    }

    fn release(&mut self) {
        self.frames.close();
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// NN后处理输出回放: 每行 `[[class_id, conf, x1, y1, x2, y2], ...]` (AI通道坐标)
pub struct NnReplayDetector {
    frames: JsonLines<RawDetection>,
    scale: FrameScale,
}

impl NnReplayDetector {
    pub fn open(path: impl AsRef<Path>, scale: FrameScale) -> Result<Self> {
        Ok(Self {
            frames: JsonLines::open(path.as_ref())?,
            scale,
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.frames.interval = Some(interval);
        self
    }
}

impl Detector for NnReplayDetector {
    fn poll(&mut self) -> Result<Option<Vec<Candidate>>> {
        Ok(self.frames.next_frame()?.map(|dets| {
            dets.iter()
                .map(|d| self.scale.candidate(d))
                .collect::<Vec<_>>()
        }))
    }

    fn release(&mut self) {
        self.frames.close();
    }

    fn name(&self) -> &str {
        "nn-replay"
    }
}

/// 内存脚本检测器; `None` 条目模拟一次检测失败
pub struct ScriptedDetector {
    frames: VecDeque<Option<Vec<Candidate>>>,
    releases: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    pub fn new(frames: impl IntoIterator<Item = Vec<Candidate>>) -> Self {
        Self {
            frames: frames.into_iter().map(Some).collect(),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push_frame(&mut self, frame: Vec<Candidate>) {
        self.frames.push_back(Some(frame));
    }

    pub fn push_failure(&mut self) {
        self.frames.push_back(None);
    }

    /// 释放次数计数 (用于确认资源只释放一次)
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl Detector for ScriptedDetector {
    fn poll(&mut self) -> Result<Option<Vec<Candidate>>> {
        match self.frames.pop_front() {
            Some(Some(frame)) => Ok(Some(frame)),
            Some(None) => Err(anyhow!("scripted detector failure")),
            None => Ok(None),
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Rect;
    use std::io::Write;

    #[test]
    fn test_replay_frames() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"rect":[10,10,40,40],"corners":[[10,10],[50,10],[50,50],[10,50]]}}]"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, "[]").unwrap();
        writeln!(file, "not json").unwrap();

        let mut det = ReplayDetector::open(file.path()).unwrap();
        let first = det.poll().unwrap().unwrap();
        assert_eq!(first[0].rect, Rect::new(10, 10, 40, 40));
        assert!(det.poll().unwrap().unwrap().is_empty());
        assert!(det.poll().unwrap().unwrap().is_empty());
        assert!(det.poll().is_err());
        assert!(det.poll().unwrap().is_none());

        det.release();
        assert!(det.poll().unwrap().is_none());
    }

    #[test]
    fn test_nn_replay_scales() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[1, 0.9, 64, 36, 128, 90]]").unwrap();

        let scale = FrameScale::new((640, 360), (800, 480));
        let mut det = NnReplayDetector::open(file.path(), scale).unwrap();
        let frame = det.poll().unwrap().unwrap();
        assert_eq!(frame[0].rect, Rect::new(80, 48, 80, 72));
        assert_eq!(frame[0].class_id(), Some(1));
        assert!(det.poll().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(ReplayDetector::open("/nonexistent/replay.jsonl").is_err());
    }

    #[test]
    fn test_scripted() {
        let mut det = ScriptedDetector::new(vec![vec![]]);
        det.push_failure();
        assert!(det.poll().unwrap().unwrap().is_empty());
        assert!(det.poll().is_err());
        assert!(det.poll().unwrap().is_none());
        let counter = det.release_counter();
        det.release();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
