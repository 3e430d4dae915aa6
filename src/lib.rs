// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod cli; // 命令行公共参数
pub mod config; // 跟踪/部署配置
pub mod detection; // 跟踪系统
pub mod error; // 错误类型
pub mod input; // 检测输入
pub mod output; // 上报与OSD
pub mod pipeline; // 主循环
pub mod protocol; // 上报帧编码

pub use crate::config::{DeployConfig, DisplayMode, TrackConfig};
pub use crate::detection::{Candidate, Point, Rect, TrackId, TrackReport, Tracker};
pub use crate::pipeline::{Pipeline, PipelineOptions, RunSummary, ShutdownReason};
pub use crate::protocol::{FrameCodec, ProtocolMode};

/// 本地时间字符串,字段间以 `delimiter` 分隔
pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}

/// 初始化日志; 未设置 `RUST_LOG` 时默认 info
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_time_string() {
        let plain = gen_time_string("");
        assert!(plain.chars().all(|c| c.is_ascii_digit()));
        assert!(plain.len() >= 14);

        let dashed = gen_time_string("-");
        assert_eq!(dashed.matches('-').count(), 6);
    }
}
