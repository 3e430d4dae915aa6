use std::path::PathBuf;

use thiserror::Error;

/// 二进制帧解析错误 (接收端)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("frame length {0}, expected 11 bytes")]
    Length(usize),
    #[error("bad header {0:#04x} {1:#04x}, expected 0xa5 0xa6")]
    Header(u8, u8),
    #[error("bad footer {0:#04x}, expected 0x5b")]
    Footer(u8),
}

/// 发送失败 (不致命,记录后继续)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("transport already released")]
    Closed,
}

/// 启动配置错误 (致命)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot serialize config {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}
