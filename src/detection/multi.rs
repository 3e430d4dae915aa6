//! 多目标平滑 (Multi-object smoothing)
//!
//! 每个ID维护最近 `window_size` 帧历史,输出整数均值; 新值相对均值跳变过大时
//! 直接采用新值并只保留最近2帧。本帧未出现的ID立即删除。

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use super::filter::window_mean;
use super::tracker::{TrackReport, Tracker};
use super::types::{Candidate, Rect, TrackId};

/// 跳变后保留的历史长度
const JUMP_KEEP: usize = 2;

/// 多目标平滑参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiTrackParams {
    /// 窗口大小,保存最近N帧
    pub window_size: usize,
    /// 新值与平均值的最大差异比例,超过则认为是跳变
    pub smooth_threshold: f64,
    /// 低于此置信度的检测不参与跟踪 (0 表示不过滤)
    pub min_confidence: f32,
}

impl Default for MultiTrackParams {
    fn default() -> Self {
        Self {
            window_size: 5,
            smooth_threshold: 0.5,
            min_confidence: 0.0,
        }
    }
}

pub struct MultiTrack {
    params: MultiTrackParams,
    table: HashMap<TrackId, Vec<Rect>>,
}

impl MultiTrack {
    pub fn new(params: MultiTrackParams) -> Self {
        Self {
            params,
            table: HashMap::new(),
        }
    }

    pub fn params(&self) -> &MultiTrackParams {
        &self.params
    }

    pub fn history(&self, id: &TrackId) -> Option<&[Rect]> {
        self.table.get(id).map(Vec::as_slice)
    }

    /// 当前所有ID (排序后)
    pub fn ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = self.table.keys().copied().collect();
        ids.sort();
        ids
    }

    /// 每帧调用一次,返回每个ID的平滑结果
    pub fn update(&mut self, observations: &[(TrackId, Rect)]) -> BTreeMap<TrackId, Rect> {
        let mut out = BTreeMap::new();

        for &(id, rect) in observations {
            let history = self.table.entry(id).or_default();
            let had_history = !history.is_empty();

            history.push(rect);
            if history.len() > self.params.window_size {
                let excess = history.len() - self.params.window_size;
                history.drain(..excess);
            }

            let avg = match window_mean(history) {
                Some(avg) => avg,
                None => rect,
            };

            let mut reported = avg;
            if had_history {
                // i64 避免极端坐标相减溢出
                let x_diff = (rect.x as i64 - avg.x as i64).abs() as f64 / avg.w.max(1) as f64;
                let y_diff = (rect.y as i64 - avg.y as i64).abs() as f64 / avg.h.max(1) as f64;

                if x_diff > self.params.smooth_threshold || y_diff > self.params.smooth_threshold {
                    debug!(
                        "ID {} 跳变 (dx={:.2}, dy={:.2}), 重置历史",
                        id, x_diff, y_diff
                    );
                    if history.len() > JUMP_KEEP {
                        let excess = history.len() - JUMP_KEEP;
                        history.drain(..excess);
                    }
                    reported = rect;
                }
            }

            trace!("ID {} 观测 {} → 输出 {}", id, rect, reported);
            out.insert(id, reported);
        }

        // 清除已经消失的物体的历史记录
        let before = self.table.len();
        self.table.retain(|id, _| out.contains_key(id));
        if self.table.len() < before {
            debug!("清除 {} 个消失的ID", before - self.table.len());
        }

        out
    }

    /// 按检测数组位置分配ID: `(class_id, 序号)`
    pub fn observations(&self, candidates: &[Candidate]) -> Vec<(TrackId, Rect)> {
        candidates
            .iter()
            .filter(|c| {
                c.label
                    .map_or(true, |l| l.confidence >= self.params.min_confidence)
            })
            .enumerate()
            .map(|(slot, c)| {
                let class_id = c.class_id().unwrap_or(0);
                (TrackId::new(class_id, slot as u32), c.rect)
            })
            .collect()
    }
}

impl Tracker for MultiTrack {
    fn update(&mut self, candidates: &[Candidate]) -> Vec<TrackReport> {
        let observations = self.observations(candidates);
        MultiTrack::update(self, &observations)
            .into_iter()
            .map(|(id, rect)| TrackReport {
                id: Some(id),
                rect,
                corners: Vec::new(),
            })
            .collect()
    }

    fn reset(&mut self) {
        self.table.clear();
    }

    fn track_count(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: u32, s: u32) -> TrackId {
        TrackId::new(c, s)
    }

    #[test]
    fn test_first_observation_reported_as_is() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        let out = m.update(&[(id(0, 0), Rect::new(5, 6, 7, 8))]);
        assert_eq!(out[&id(0, 0)], Rect::new(5, 6, 7, 8));
        assert_eq!(m.history(&id(0, 0)).unwrap().len(), 1);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        for i in 0..8 {
            m.update(&[(id(1, 0), Rect::new(100 + i, 100, 50, 50))]);
        }
        let hist = m.history(&id(1, 0)).unwrap();
        assert_eq!(hist.len(), 5);
        assert_eq!(hist[0].x, 103);
    }

    #[test]
    fn test_small_motion_is_averaged() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        m.update(&[(id(0, 0), Rect::new(100, 100, 40, 40))]);
        let out = m.update(&[(id(0, 0), Rect::new(103, 101, 42, 40))]);
        assert_eq!(out[&id(0, 0)], Rect::new(101, 100, 41, 40));
    }

    #[test]
    fn test_jump_resets_history() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        for _ in 0..4 {
            m.update(&[(id(0, 0), Rect::new(0, 0, 10, 10))]);
        }
        assert_eq!(m.history(&id(0, 0)).unwrap().len(), 4);

        let out = m.update(&[(id(0, 0), Rect::new(100, 100, 10, 10))]);
        assert_eq!(out[&id(0, 0)], Rect::new(100, 100, 10, 10));
        let hist = m.history(&id(0, 0)).unwrap();
        assert_eq!(hist, &[Rect::new(0, 0, 10, 10), Rect::new(100, 100, 10, 10)]);
    }

    #[test]
    fn test_jump_across_full_coordinate_range() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        m.update(&[(id(0, 0), Rect::new(i32::MIN, 0, 10, 10))]);
        let out = m.update(&[(id(0, 0), Rect::new(i32::MAX, 0, 10, 10))]);
        assert_eq!(out[&id(0, 0)], Rect::new(i32::MAX, 0, 10, 10));
        assert_eq!(m.history(&id(0, 0)).unwrap().len(), 2);

        let out = m.update(&[(id(0, 0), Rect::new(0, i32::MIN, 10, 10))]);
        assert_eq!(out[&id(0, 0)], Rect::new(0, i32::MIN, 10, 10));
    }

    #[test]
    fn test_stale_ids_evicted() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        m.update(&[
            (id(0, 0), Rect::new(0, 0, 10, 10)),
            (id(2, 1), Rect::new(50, 50, 10, 10)),
        ]);
        assert_eq!(m.ids(), vec![id(0, 0), id(2, 1)]);

        m.update(&[(id(2, 1), Rect::new(51, 50, 10, 10))]);
        assert_eq!(m.ids(), vec![id(2, 1)]);
        assert!(m.history(&id(0, 0)).is_none());

        m.update(&[]);
        assert_eq!(m.track_count(), 0);
    }

    #[test]
    fn test_identity_follows_array_position() {
        let m = MultiTrack::new(MultiTrackParams {
            min_confidence: 0.3,
            ..Default::default()
        });
        let cands = vec![
            Candidate::from_rect(Rect::new(0, 0, 10, 10)).with_label(4, 0.9),
            Candidate::from_rect(Rect::new(0, 0, 10, 10)).with_label(1, 0.1),
            Candidate::from_rect(Rect::new(9, 9, 10, 10)).with_label(1, 0.8),
        ];
        let obs = m.observations(&cands);
        assert_eq!(
            obs,
            vec![
                (id(4, 0), Rect::new(0, 0, 10, 10)),
                (id(1, 1), Rect::new(9, 9, 10, 10)),
            ]
        );
    }

    #[test]
    fn test_tracker_trait_sorted_reports() {
        let mut m = MultiTrack::new(MultiTrackParams::default());
        let cands = vec![
            Candidate::from_rect(Rect::new(0, 0, 10, 10)).with_label(3, 0.9),
            Candidate::from_rect(Rect::new(20, 0, 10, 10)).with_label(0, 0.9),
        ];
        let reports = Tracker::update(&mut m, &cands);
        let ids: Vec<_> = reports.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(ids, vec![id(0, 1), id(3, 0)]);
        assert_eq!(reports[0].class_id(), Some(0));
    }
}
