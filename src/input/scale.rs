//! NN检测框坐标映射: AI通道分辨率 → 显示分辨率

use serde::{Deserialize, Serialize};

use crate::detection::{Candidate, Rect};

/// NN后处理输出的一行: `[class_id, confidence, x1, y1, x2, y2]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u32, f32, f32, f32, f32, f32)")]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl From<(u32, f32, f32, f32, f32, f32)> for RawDetection {
    fn from((class_id, confidence, x1, y1, x2, y2): (u32, f32, f32, f32, f32, f32)) -> Self {
        Self {
            class_id,
            confidence,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// 分辨率缩放
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameScale {
    pub src: (u32, u32),
    pub dst: (u32, u32),
}

impl FrameScale {
    pub fn new(src: (u32, u32), dst: (u32, u32)) -> Self {
        Self { src, dst }
    }

    // v * dst // src, 与板端整数换算一致
    fn map(v: f32, dst: u32, src: u32) -> i32 {
        (v as f64 * dst as f64 / src.max(1) as f64).floor() as i32
    }

    pub fn rect(&self, d: &RawDetection) -> Rect {
        let (sw, sh) = self.src;
        let (dw, dh) = self.dst;
        Rect {
            x: Self::map(d.x1, dw, sw),
            y: Self::map(d.y1, dh, sh),
            w: Self::map(d.x2 - d.x1, dw, sw),
            h: Self::map(d.y2 - d.y1, dh, sh),
        }
    }

    pub fn candidate(&self, d: &RawDetection) -> Candidate {
        Candidate::from_rect(self.rect(d)).with_label(d.class_id, d.confidence)
    }
}
