/// 主循环 (Tick Loop)
///
/// 单线程: 每个tick依次完成 采集检测 → 跟踪 → 绘制 → 编码 → 发送,
/// 完成后才进入下一个tick。
pub mod driver;
pub mod resources;
pub mod stats;

pub use driver::{Pipeline, PipelineOptions, RunSummary};
pub use resources::Resources;
pub use stats::{ScopedTiming, TickStats};

use crossbeam_channel::{Receiver, Sender};

/// 退出原因
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 外部请求 (按键/信号)
    Requested,
    /// 输入源结束
    SourceExhausted,
    /// 达到设定的tick上限
    TickLimit(u64),
}

/// 单个tick的结果
#[derive(Debug)]
pub enum TickOutcome {
    Continue,
    Shutdown(ShutdownReason),
    Fatal(anyhow::Error),
}

/// 退出请求发送端,可跨线程克隆
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Sender<ShutdownReason>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        // 接收端已退出时无需处理
        let _ = self.tx.try_send(ShutdownReason::Requested);
    }
}

/// 创建退出通道
pub fn shutdown_channel() -> (ShutdownHandle, Receiver<ShutdownReason>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (ShutdownHandle { tx }, rx)
}

/// 监听标准输入,输入 `q` 时请求退出
pub fn spawn_stdin_watcher(handle: ShutdownHandle) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let cmd = line.trim();
                    if cmd.eq_ignore_ascii_case("q") || cmd.eq_ignore_ascii_case("quit") {
                        log::info!("⏹️ 收到退出指令");
                        handle.request();
                        break;
                    }
                }
            }
        }
    });
}
