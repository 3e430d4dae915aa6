/// 输出系统 (Output System)
///
/// - Transport: 上报字节流 (串口 / 标准输出 / 文件)
/// - Renderer:  OSD叠加绘制
pub mod renderer;
pub mod transport;

pub use renderer::{NullRenderer, OsdRenderer, Overlay, Renderer};
#[cfg(feature = "serial")]
pub use transport::SerialTransport;
pub use transport::{Transport, WriterTransport};
