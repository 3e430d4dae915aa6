//! 两个可执行程序共用的输出参数

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::output::{Transport, WriterTransport};
use crate::protocol::ProtocolMode;

/// 上报通道参数
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// 串口设备 (如 /dev/ttyS1),需启用 `serial` 特性
    #[arg(long)]
    pub port: Option<String>,

    /// 串口波特率
    #[arg(long, default_value_t = 115200)]
    pub baud: u32,

    /// 输出文件,`-` 为标准输出 (未指定串口时生效)
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// 覆盖配置文件中的上报协议
    #[arg(long, value_enum)]
    pub mode: Option<ProtocolMode>,
}

impl OutputArgs {
    /// 命令行优先,其次配置文件
    pub fn protocol(&self, configured: ProtocolMode) -> ProtocolMode {
        self.mode.unwrap_or(configured)
    }

    pub fn open_transport(&self) -> Result<Box<dyn Transport>> {
        if let Some(port) = &self.port {
            return open_serial(port, self.baud);
        }
        if self.output.as_os_str() == "-" {
            return Ok(Box::new(WriterTransport::stdout()));
        }
        let transport = WriterTransport::file(&self.output)
            .with_context(|| format!("无法创建输出文件: {}", self.output.display()))?;
        Ok(Box::new(transport))
    }
}

#[cfg(feature = "serial")]
fn open_serial(port: &str, baud: u32) -> Result<Box<dyn Transport>> {
    let transport = crate::output::SerialTransport::open(port, baud)
        .with_context(|| format!("无法打开串口: {}", port))?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "serial"))]
fn open_serial(port: &str, _baud: u32) -> Result<Box<dyn Transport>> {
    anyhow::bail!("串口 {} 不可用: 编译时未启用 `serial` 特性", port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        output: OutputArgs,
    }

    #[test]
    fn test_defaults_and_override() {
        let cli = Cli::parse_from(["test"]);
        assert_eq!(cli.output.baud, 115200);
        assert_eq!(cli.output.protocol(ProtocolMode::Binary), ProtocolMode::Binary);

        let cli = Cli::parse_from(["test", "--mode", "text"]);
        assert_eq!(cli.output.protocol(ProtocolMode::Binary), ProtocolMode::Text);
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let cli = Cli::parse_from(["test", "-o", path.to_str().unwrap()]);
        let mut transport = cli.output.open_transport().unwrap();
        transport.send(&[1, 2, 3]).unwrap();
        transport.release();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[cfg(not(feature = "serial"))]
    #[test]
    fn test_serial_requires_feature() {
        let cli = Cli::parse_from(["test", "--port", "/dev/ttyS1"]);
        assert!(cli.output.open_transport().is_err());
    }
}
