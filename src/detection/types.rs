/// 跟踪系统数据结构定义
/// Data structures for the tracking layer
use serde::{Deserialize, Serialize};

// ========== 几何类型 ==========

/// 像素坐标点 (Pixel point)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// 轴对齐矩形 (Axis-aligned rectangle)
///
/// `x, y` 为左上角, `w, h` 为宽高。JSON中以 `[x, y, w, h]` 表示。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// 面积 (i64 避免大框溢出)
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// 中心点 (整数向下取整,极端坐标饱和)
    pub fn center(&self) -> Point {
        Point {
            x: self.x.saturating_add(self.w.div_euclid(2)),
            y: self.y.saturating_add(self.h.div_euclid(2)),
        }
    }

    /// 长宽比 `max(w,h) / min(w,h)`; 退化矩形返回 `None`
    pub fn aspect(&self) -> Option<f64> {
        let short = self.w.min(self.h);
        if short <= 0 {
            return None;
        }
        Some(self.w.max(self.h) as f64 / short as f64)
    }

    /// 四个角点: 左上, 右上, 右下, 左下
    pub fn corners(&self) -> [Point; 4] {
        let (x2, y2) = (self.x.saturating_add(self.w), self.y.saturating_add(self.h));
        [
            Point::new(self.x, self.y),
            Point::new(x2, self.y),
            Point::new(x2, y2),
            Point::new(self.x, y2),
        ]
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x, y, w, h]: [i32; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.w, self.h)
    }
}

// ========== 检测候选 ==========

/// NN检测的类别与置信度
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub class_id: u32,
    pub confidence: f32,
}

/// 检测候选框 (Candidate) - 每帧由检测器新生成,不可变
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub rect: Rect,

    /// 检测器给出的角点 (矩形检测应为4个)
    #[serde(default)]
    pub corners: Vec<Point>,

    /// 仅NN检测路径携带
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Candidate {
    /// 由矩形构造,角点取矩形四角
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            rect,
            corners: rect.corners().to_vec(),
            label: None,
        }
    }

    pub fn with_label(mut self, class_id: u32, confidence: f32) -> Self {
        self.label = Some(Label {
            class_id,
            confidence,
        });
        self
    }

    pub fn class_id(&self) -> Option<u32> {
        self.label.map(|l| l.class_id)
    }
}

// ========== 跟踪标识 ==========

/// 多目标跟踪ID: (类别, 检测序号)
///
/// 序号即该帧检测数组中的位置,检测顺序变化时同一物体可能换ID。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId {
    pub class_id: u32,
    pub slot: u32,
}

impl TrackId {
    pub fn new(class_id: u32, slot: u32) -> Self {
        Self { class_id, slot }
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.class_id, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_derived() {
        let r = Rect::new(10, 20, 31, 41);
        assert_eq!(r.area(), 31 * 41);
        assert_eq!(r.center(), Point::new(25, 40));
        assert!((r.aspect().unwrap() - 41.0 / 31.0).abs() < 1e-12);
        assert_eq!(Rect::new(0, 0, 0, 5).aspect(), None);
    }

    #[test]
    fn test_extreme_rect_saturates() {
        let r = Rect::new(i32::MAX - 5, i32::MIN, i32::MAX, -20);
        assert_eq!(r.center(), Point::new(i32::MAX, i32::MIN));
        let c = r.corners();
        assert_eq!(c[0], Point::new(i32::MAX - 5, i32::MIN));
        assert_eq!(c[2], Point::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_rect_json_is_tuple() {
        let json = serde_json::to_string(&Rect::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let c: Candidate =
            serde_json::from_str(r#"{"rect":[5,6,7,8],"corners":[[5,6],[12,6],[12,14],[5,14]]}"#)
                .unwrap();
        assert_eq!(c.rect, Rect::new(5, 6, 7, 8));
        assert_eq!(c.corners.len(), 4);
        assert!(c.label.is_none());
    }

    #[test]
    fn test_track_id_display() {
        assert_eq!(TrackId::new(3, 1).to_string(), "3_1");
    }
}
