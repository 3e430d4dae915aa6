/// 跟踪系统 (Tracking System)
///
/// 将每帧噪声较大的检测框转换为平滑、连续的跟踪结果
/// - Validator: 候选框合理性校验
/// - Filter:    几何滤波 (指数滤波 / 窗口均值)
/// - Single:    单目标跟踪 (带丢失容忍)
/// - Multi:     多目标平滑 (按ID维护历史)
pub mod filter;
pub mod multi;
pub mod single;
pub mod tracker;
pub mod types;
pub mod validator;

pub use multi::{MultiTrack, MultiTrackParams};
pub use single::{SingleTrack, SingleTrackParams, TrackEvent, TrackPhase, TrackState};
pub use tracker::{id_to_color, palette, TrackReport, Tracker};
pub use types::{Candidate, Label, Point, Rect, TrackId};
pub use validator::{CandidateValidator, Rejection};
