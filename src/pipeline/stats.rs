use std::time::{Duration, Instant};

use log::debug;

/// 运行统计
#[derive(Clone, Debug)]
pub struct TickStats {
    pub ticks: u64,
    pub reports: u64,
    pub send_failures: u64,
    pub detector_failures: u64,
    /// 连续检测失败次数
    pub consecutive_detector_failures: u32,

    // FPS统计
    count: u64,
    last: Instant,
    current_fps: f64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self {
            ticks: 0,
            reports: 0,
            send_failures: 0,
            detector_failures: 0,
            consecutive_detector_failures: 0,
            count: 0,
            last: Instant::now(),
            current_fps: 0.0,
        }
    }
}

impl TickStats {
    /// 每个tick结束时调用; 每秒刷新一次FPS
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.count += 1;
        let elapsed = self.last.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.current_fps = self.count as f64 / elapsed.as_secs_f64();
            self.count = 0;
            self.last = Instant::now();
            debug!("📊 FPS: {:.1}", self.current_fps);
        }
    }

    pub fn fps(&self) -> f64 {
        self.current_fps
    }
}

/// 作用域计时,离开作用域时输出耗时
pub struct ScopedTiming {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl ScopedTiming {
    pub fn new(label: &'static str, enabled: bool) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled,
        }
    }
}

impl Drop for ScopedTiming {
    fn drop(&mut self) {
        if self.enabled {
            debug!(
                "⏱️ {} took {:.2} ms",
                self.label,
                self.start.elapsed().as_secs_f64() * 1000.0
            );
        }
    }
}
