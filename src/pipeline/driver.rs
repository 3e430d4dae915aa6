//! 主循环驱动
//! 职责: 检测 → 跟踪 → 绘制 → 编码 → 发送,每tick上报一次

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, error, info, warn};

use super::resources::Resources;
use super::stats::{ScopedTiming, TickStats};
use super::{ShutdownReason, TickOutcome};
use crate::detection::{id_to_color, TrackReport, Tracker};
use crate::output::Overlay;
use crate::protocol::{FrameCodec, ProtocolMode};

/// 单目标默认绘制颜色 (绿)
const TRACK_COLOR: [u8; 4] = [0, 255, 0, 255];

/// 主循环参数
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub protocol: ProtocolMode,
    /// 连续检测失败上限,超过则视为资源故障
    pub max_detector_failures: u32,
    pub max_ticks: Option<u64>,
    /// 输出每个tick耗时
    pub timing: bool,
    /// 类别名 (仅用于日志)
    pub labels: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            protocol: ProtocolMode::Binary,
            max_detector_failures: 30,
            max_ticks: None,
            timing: false,
            labels: Vec::new(),
        }
    }
}

/// 运行结束汇总
#[derive(Debug)]
pub struct RunSummary {
    pub reason: ShutdownReason,
    pub stats: TickStats,
}

pub struct Pipeline {
    resources: Resources,
    tracker: Box<dyn Tracker>,
    shutdown: Receiver<ShutdownReason>,
    options: PipelineOptions,
    stats: TickStats,
}

impl Pipeline {
    pub fn new(
        resources: Resources,
        tracker: Box<dyn Tracker>,
        shutdown: Receiver<ShutdownReason>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            resources,
            tracker,
            shutdown,
            options,
            stats: TickStats::default(),
        }
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn tracker(&self) -> &dyn Tracker {
        self.tracker.as_ref()
    }

    /// 执行一个完整的tick
    pub fn tick(&mut self) -> TickOutcome {
        if let Some(max) = self.options.max_ticks {
            if self.stats.ticks >= max {
                return TickOutcome::Shutdown(ShutdownReason::TickLimit(max));
            }
        }
        match self.shutdown.try_recv() {
            Ok(reason) => return TickOutcome::Shutdown(reason),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }

        let _timing = ScopedTiming::new("tick", self.options.timing);

        // 1. 检测
        let candidates = match self.resources.detector.poll() {
            Ok(Some(candidates)) => {
                self.stats.consecutive_detector_failures = 0;
                candidates
            }
            Ok(None) => return TickOutcome::Shutdown(ShutdownReason::SourceExhausted),
            Err(e) => {
                self.stats.detector_failures += 1;
                self.stats.consecutive_detector_failures += 1;
                let n = self.stats.consecutive_detector_failures;
                if n > self.options.max_detector_failures {
                    return TickOutcome::Fatal(e.context(format!("检测器连续失败 {} 次", n)));
                }
                warn!("⚠️ 检测失败,本帧按无目标处理: {:#}", e);
                Vec::new()
            }
        };

        // 2. 跟踪
        let reports = self.tracker.update(&candidates);
        debug!(
            "tick {}: {} 个候选 → {} 个输出",
            self.stats.ticks,
            candidates.len(),
            reports.len()
        );

        // 3. 绘制
        self.render(&reports);

        // 4. 编码并发送
        self.transmit(&reports);

        self.stats.tick();
        TickOutcome::Continue
    }

    fn render(&mut self, reports: &[TrackReport]) {
        let renderer = &mut self.resources.renderer;
        renderer.begin_frame();
        for report in reports {
            let color = report.class_id().map_or(TRACK_COLOR, id_to_color);
            renderer.draw(&Overlay {
                rect: report.rect,
                center: Some(report.center()),
                corners: &report.corners,
                color,
            });
            if let Some(id) = report.id {
                let label = self
                    .options
                    .labels
                    .get(id.class_id as usize)
                    .map(String::as_str)
                    .unwrap_or("?");
                debug!(
                    "{} 坐标: x={}, y={}, w={}, h={}",
                    label, report.rect.x, report.rect.y, report.rect.w, report.rect.h
                );
            }
        }
        if let Err(e) = renderer.present() {
            warn!("⚠️ OSD提交失败: {:#}", e);
        }
    }

    fn transmit(&mut self, reports: &[TrackReport]) {
        let frames: Vec<Vec<u8>> = if reports.is_empty() {
            vec![FrameCodec::encode(self.options.protocol, None)]
        } else {
            reports
                .iter()
                .map(|r| FrameCodec::encode(self.options.protocol, Some(r.rect)))
                .collect()
        };

        for frame in frames {
            match self.resources.transport.send(&frame) {
                Ok(()) => self.stats.reports += 1,
                Err(e) => {
                    self.stats.send_failures += 1;
                    warn!("⚠️ 发送失败 ({}): {}", self.resources.transport.name(), e);
                }
            }
        }
    }

    /// 运行直到退出; 任何退出路径都会释放资源
    pub fn run(mut self) -> anyhow::Result<RunSummary> {
        info!("▶️ 主循环启动");
        let result = loop {
            match self.tick() {
                TickOutcome::Continue => {}
                TickOutcome::Shutdown(reason) => {
                    info!("⏹️ 主循环退出: {:?}", reason);
                    break Ok(reason);
                }
                TickOutcome::Fatal(e) => {
                    error!("❌ 致命错误: {:#}", e);
                    break Err(e);
                }
            }
        };
        self.resources.release();

        info!(
            "📊 共 {} 帧, 上报 {} 次, 发送失败 {} 次, 检测失败 {} 次",
            self.stats.ticks,
            self.stats.reports,
            self.stats.send_failures,
            self.stats.detector_failures
        );

        let reason = result?;
        Ok(RunSummary {
            reason,
            stats: self.stats,
        })
    }
}
