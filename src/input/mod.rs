/// 检测输入 (Detection Input)
///
/// 采集与检测由板端媒体/AI栈完成,这里只约定接口与主机端替身:
/// - Detector:        每帧产出候选框
/// - ReplayDetector:  从JSON Lines回放矩形检测结果
/// - NnReplayDetector: 从JSON Lines回放NN后处理输出 (按显示分辨率缩放)
/// - ScriptedDetector: 内存脚本 (测试/嵌入)
pub mod replay;
pub mod scale;

pub use replay::{NnReplayDetector, ReplayDetector, ScriptedDetector};
pub use scale::{FrameScale, RawDetection};

use crate::detection::Candidate;

/// 检测器接口
pub trait Detector {
    /// 每帧调用一次
    ///
    /// - `Ok(Some(v))`: 本帧候选 (可为空)
    /// - `Ok(None)`:    输入源已结束
    /// - `Err(_)`:      本帧检测失败,按无目标处理
    fn poll(&mut self) -> anyhow::Result<Option<Vec<Candidate>>>;

    /// 释放采集资源
    fn release(&mut self) {}

    fn name(&self) -> &str {
        "detector"
    }
}
