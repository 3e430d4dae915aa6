//! 上报通道: 只负责把编码后的字节写出去

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::TransportError;

/// 发送接口
pub trait Transport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// 释放底层资源; 之后的发送返回 `TransportError::Closed`
    fn release(&mut self) {}

    fn name(&self) -> &str {
        "transport"
    }
}

/// 任意 `Write` 之上的发送通道 (标准输出 / 文件)
pub struct WriterTransport<W: Write> {
    writer: Option<W>,
    name: String,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Some(writer),
            name: name.into(),
        }
    }
}

impl WriterTransport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), "stdout")
    }
}

impl WriterTransport<BufWriter<File>> {
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), path.display().to_string()))
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let writer = self.writer.as_mut().ok_or(TransportError::Closed)?;
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
            info!("🔌 输出通道已关闭: {}", self.name);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 串口发送 (8N1)
#[cfg(feature = "serial")]
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
}

#[cfg(feature = "serial")]
impl SerialTransport {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(std::time::Duration::from_millis(50))
            .open()?;
        info!("✅ 串口已打开: {} @ {}", path, baud_rate);
        Ok(Self {
            port: Some(port),
            name: path.to_string(),
        })
    }
}

#[cfg(feature = "serial")]
impl Transport for SerialTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(bytes)?;
        Ok(())
    }

    fn release(&mut self) {
        if self.port.take().is_some() {
            info!("🔌 串口已释放: {}", self.name);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_transport() {
        let mut t = WriterTransport::new(Vec::new(), "mem");
        t.send(b"None\n").unwrap();
        t.send(&[0xA5, 0xA6]).unwrap();
        assert_eq!(t.writer.as_ref().unwrap().as_slice(), b"None\n\xA5\xA6");
        t.release();
        assert!(matches!(t.send(b"x"), Err(TransportError::Closed)));
    }

    #[test]
    fn test_file_transport() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let mut t = WriterTransport::file(&path).unwrap();
        t.send(&[1, 2, 3]).unwrap();
        t.release();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }
}
