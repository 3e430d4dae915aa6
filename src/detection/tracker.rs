//! 跟踪器公共组件
//! Common components shared by the single- and multi-object trackers

use super::types::{Candidate, Point, Rect, TrackId};

// ========== 公共数据结构 ==========

/// 跟踪输出 (每帧上报给绘制与串口的结果)
#[derive(Clone, Debug, PartialEq)]
pub struct TrackReport {
    /// 多目标跟踪的ID; 单目标跟踪为 `None`
    pub id: Option<TrackId>,

    /// 平滑后的矩形
    pub rect: Rect,

    /// 本帧被采纳的原始检测角点 (保持帧时为空)
    pub corners: Vec<Point>,
}

impl TrackReport {
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn class_id(&self) -> Option<u32> {
        self.id.map(|id| id.class_id)
    }
}

// ========== 跟踪器统一接口 ==========

/// 跟踪器 Trait
///
/// 单目标(SingleTrack)与多目标(MultiTrack)都实现此接口,主循环不关心具体算法
pub trait Tracker {
    /// 用当前帧的候选框更新,返回本帧的上报结果
    fn update(&mut self, candidates: &[Candidate]) -> Vec<TrackReport>;

    /// 重置跟踪器 (清除所有跟踪)
    fn reset(&mut self);

    /// 获取当前跟踪数量
    fn track_count(&self) -> usize;
}

// ========== 工具函数 ==========

/// 根据类别ID生成不同颜色 (RGBA)
pub fn id_to_color(id: u32) -> [u8; 4] {
    let hue = (id as f32 * 137.508) % 360.0; // 黄金角度采样
    let (r, g, b) = hsv_to_rgb(hue, 0.8, 0.9);
    [r, g, b, 255]
}

/// 为 `n` 个类别生成调色板
pub fn palette(n: usize) -> Vec<[u8; 4]> {
    (0..n as u32).map(id_to_color).collect()
}

/// HSV转RGB
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
