//! 单目标跟踪 (Single-object track)
//!
//! 每帧: 校验 → 取面积最大的有效候选 → 指数滤波; 丢失时保持上一帧结果,
//! 连续丢失超过 `max_skip` 帧后复位。

use log::{debug, info, trace};

use super::filter::smooth_or_seed;
use super::tracker::{TrackReport, Tracker};
use super::types::{Candidate, Point, Rect};
use super::validator::CandidateValidator;

/// 单目标跟踪参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SingleTrackParams {
    pub validator: CandidateValidator,
    /// 滤波系数 (0,1]
    pub alpha: f64,
    /// 最大连续丢失帧数
    pub max_skip: u32,
}

impl Default for SingleTrackParams {
    fn default() -> Self {
        Self {
            validator: CandidateValidator::new(625, 320 * 240 / 5, 0.2),
            alpha: 0.6,
            max_skip: 5,
        }
    }
}

/// 跟踪状态
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackState {
    pub smoothed: Option<Rect>,
    pub miss_count: u32,
}

/// 跟踪阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackPhase {
    Uninitialized,
    Tracking,
    /// 超过丢失预算后复位,直到再次捕获
    Lost,
}

/// 单帧更新产生的事件
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackEvent {
    /// 首次(或丢失后)捕获目标
    Acquired,
    Updated,
    /// 本帧无有效候选,保持上一帧结果
    Holding { misses: u32 },
    /// 本帧由跟踪转为丢失
    Lost,
    /// 无目标且未在跟踪
    Idle,
}

pub struct SingleTrack {
    params: SingleTrackParams,
    state: TrackState,
    phase: TrackPhase,
    selected: Option<Candidate>,
}

impl SingleTrack {
    pub fn new(params: SingleTrackParams) -> Self {
        Self {
            params,
            state: TrackState::default(),
            phase: TrackPhase::Uninitialized,
            selected: None,
        }
    }

    pub fn params(&self) -> &SingleTrackParams {
        &self.params
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// 当前上报值; 仅在未初始化/丢失时为 `None`
    pub fn current_report(&self) -> Option<Rect> {
        self.state.smoothed
    }

    /// 只滤波中心点的视图
    pub fn smoothed_center(&self) -> Option<Point> {
        self.state.smoothed.map(|r| r.center())
    }

    /// 本帧被采纳的原始候选
    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    /// 选出面积最大的有效候选,面积相同取先出现者
    pub fn select_best<'a>(&self, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        let mut best: Option<&Candidate> = None;
        for c in candidates {
            if let Err(reason) = self.params.validator.check(c) {
                trace!("候选框被过滤 {}: {:?}", c.rect, reason);
                continue;
            }
            match best {
                Some(b) if c.rect.area() <= b.rect.area() => {}
                _ => best = Some(c),
            }
        }
        best
    }

    /// 每帧调用一次
    pub fn update(&mut self, candidates: &[Candidate]) -> TrackEvent {
        let best = self.select_best(candidates).cloned();

        let event = match best {
            Some(candidate) => {
                let was_tracking = self.state.smoothed.is_some();
                self.state.miss_count = 0;
                self.state.smoothed = Some(smooth_or_seed(
                    self.state.smoothed,
                    candidate.rect,
                    self.params.alpha,
                ));
                self.phase = TrackPhase::Tracking;
                self.selected = Some(candidate);
                if was_tracking {
                    TrackEvent::Updated
                } else {
                    TrackEvent::Acquired
                }
            }
            None => {
                self.selected = None;
                if self.state.smoothed.is_some() && self.state.miss_count < self.params.max_skip {
                    self.state.miss_count += 1;
                    TrackEvent::Holding {
                        misses: self.state.miss_count,
                    }
                } else {
                    let was_tracking = self.state.smoothed.is_some();
                    self.state = TrackState::default();
                    if was_tracking {
                        self.phase = TrackPhase::Lost;
                        TrackEvent::Lost
                    } else {
                        TrackEvent::Idle
                    }
                }
            }
        };

        match event {
            TrackEvent::Acquired => info!("🎯 目标捕获: {:?}", self.state.smoothed),
            TrackEvent::Lost => info!(
                "⚠️ 目标丢失 (连续 {} 帧无有效候选)",
                self.params.max_skip + 1
            ),
            TrackEvent::Holding { misses } => debug!("目标暂失 {}/{}", misses, self.params.max_skip),
            _ => {}
        }

        event
    }
}

impl Tracker for SingleTrack {
    fn update(&mut self, candidates: &[Candidate]) -> Vec<TrackReport> {
        SingleTrack::update(self, candidates);
        match self.state.smoothed {
            Some(rect) => vec![TrackReport {
                id: None,
                rect,
                corners: self
                    .selected
                    .as_ref()
                    .map(|c| c.corners.clone())
                    .unwrap_or_default(),
            }],
            None => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.state = TrackState::default();
        self.phase = TrackPhase::Uninitialized;
        self.selected = None;
    }

    fn track_count(&self) -> usize {
        usize::from(self.state.smoothed.is_some())
    }
}
