/// 多目标检测平滑 (Multi-Object Smoothing)
///
/// 流程: NN检测回放 → 坐标映射到显示分辨率 → 按ID窗口平滑 → 上报
///
/// 部署配置 (deploy_config.json) 不可读时直接退出。
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use vision_track::cli::OutputArgs;
use vision_track::config::{OUT_RGB888P_HEIGHT, OUT_RGB888P_WIDTH};
use vision_track::detection::MultiTrack;
use vision_track::input::{FrameScale, NnReplayDetector};
use vision_track::output::{NullRenderer, OsdRenderer, Renderer};
use vision_track::pipeline::{self, Pipeline, PipelineOptions, Resources};
use vision_track::{DeployConfig, DisplayMode, TrackConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "多目标检测平滑", long_about = None)]
struct Args {
    /// 模型部署配置
    #[arg(short, long, default_value = "deploy_config.json")]
    deploy: PathBuf,

    /// 跟踪参数文件 (不存在时写入默认值)
    #[arg(short, long, default_value = "track_config.json")]
    config: PathBuf,

    /// NN检测回放文件 (JSON Lines, 每行 [[class, score, x1, y1, x2, y2], ...])
    #[arg(short, long)]
    source: PathBuf,

    /// 显示设备
    #[arg(long, value_enum, default_value_t = DisplayMode::Lcd)]
    display: DisplayMode,

    /// 回放帧间隔 (毫秒)
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,

    /// OSD快照目录
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// 快照间隔 (帧)
    #[arg(long, default_value_t = 30)]
    snapshot_every: u64,

    /// 运行的最大tick数
    #[arg(long)]
    max_ticks: Option<u64>,

    /// 输出每个tick耗时
    #[arg(long)]
    timing: bool,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> anyhow::Result<()> {
    vision_track::init_logging();
    let args = Args::parse();

    info!("🚀 多目标检测启动");
    let deploy = DeployConfig::load(&args.deploy)?;
    deploy.print_summary();
    let config = TrackConfig::load(&args.config)?;
    config.print_summary();

    let display = args.display.size();
    info!("🖥️ 显示: {:?} {}x{}", args.display, display.0, display.1);
    let scale = FrameScale::new((OUT_RGB888P_WIDTH, OUT_RGB888P_HEIGHT), display);
    let mut detector = NnReplayDetector::open(&args.source, scale)?;
    if args.interval_ms > 0 {
        detector = detector.with_interval(Duration::from_millis(args.interval_ms));
    }

    let renderer: Box<dyn Renderer> = match &args.snapshots {
        Some(dir) => Box::new(
            OsdRenderer::new(display.0, display.1).with_snapshots(dir, args.snapshot_every)?,
        ),
        None => Box::new(NullRenderer),
    };
    let transport = args.output.open_transport()?;
    let resources = Resources::new(Box::new(detector), renderer, transport);

    let (handle, shutdown) = pipeline::shutdown_channel();
    pipeline::spawn_stdin_watcher(handle);

    let labels = (0..deploy.num_classes as u32)
        .map(|id| deploy.label(id))
        .collect();
    let options = PipelineOptions {
        protocol: args.output.protocol(config.protocol),
        max_detector_failures: config.max_detector_failures,
        max_ticks: args.max_ticks,
        timing: args.timing,
        labels,
    };
    let tracker = Box::new(MultiTrack::new(
        config.multi_params(deploy.confidence_threshold),
    ));

    let summary = Pipeline::new(resources, tracker, shutdown, options).run()?;
    info!("✅ 已退出: {:?}, 共 {} 帧", summary.reason, summary.stats.ticks);
    Ok(())
}
