/// 单目标跟踪 (Single-Object Tracker)
///
/// 流程: 检测回放 → 校验 → 选最大目标 → 指数滤波 → 上报
///
/// 每个tick上报一次: 有目标时为平滑后的矩形,否则为空帧。
/// 标准输入键入 `q` 退出。
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use vision_track::cli::OutputArgs;
use vision_track::detection::SingleTrack;
use vision_track::input::ReplayDetector;
use vision_track::output::{NullRenderer, OsdRenderer, Renderer};
use vision_track::pipeline::{self, Pipeline, PipelineOptions, Resources};
use vision_track::TrackConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "单目标矩形跟踪", long_about = None)]
struct Args {
    /// 跟踪参数文件 (不存在时写入默认值)
    #[arg(short, long, default_value = "track_config.json")]
    config: PathBuf,

    /// 检测回放文件 (JSON Lines)
    #[arg(short, long)]
    source: PathBuf,

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

    /// 画面宽度
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// 画面高度
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// 输出每个tick耗时
    #[arg(long)]
    timing: bool,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> anyhow::Result<()> {
    vision_track::init_logging();
    let args = Args::parse();

    info!("🚀 单目标跟踪启动");
    let config = TrackConfig::load(&args.config)?;
    config.print_summary();

    let mut detector = ReplayDetector::open(&args.source)?;
    if args.interval_ms > 0 {
        detector = detector.with_interval(Duration::from_millis(args.interval_ms));
    }

    let renderer: Box<dyn Renderer> = match &args.snapshots {
        Some(dir) => Box::new(
            OsdRenderer::new(args.width, args.height).with_snapshots(dir, args.snapshot_every)?,
        ),
        None => Box::new(NullRenderer),
    };
    let transport = args.output.open_transport()?;
    let resources = Resources::new(Box::new(detector), renderer, transport);

    let (handle, shutdown) = pipeline::shutdown_channel();
    pipeline::spawn_stdin_watcher(handle);

    let options = PipelineOptions {
        protocol: args.output.protocol(config.protocol),
        max_detector_failures: config.max_detector_failures,
        max_ticks: args.max_ticks,
        timing: args.timing,
        labels: Vec::new(),
    };
    let tracker = Box::new(SingleTrack::new(config.single_params()));

    let summary = Pipeline::new(resources, tracker, shutdown, options).run()?;
    info!("✅ 已退出: {:?}, 共 {} 帧", summary.reason, summary.stats.ticks);
    Ok(())
}
