//! 串口上报协议 (Wire protocol)
//!
//! 二进制帧定长 (2字节帧头 + 4个u16小端字段 + 1字节帧尾 = 11字节):
//!
//! | 0    | 1    | 2..4  | 4..6  | 6..8  | 8..10 | 10   |
//! |------|------|-------|-------|-------|-------|------|
//! | 0xA5 | 0xA6 | x LE  | y LE  | w LE  | h LE  | 0x5B |
//!
//! 几何字段全零表示无目标。文本模式输出 `"(x, y, w, h)\n"` 或 `"None\n"`。
//!
//! 每个tick的上报帧数:
//! - 单目标: 恰好1帧 (跟踪中为平滑结果,否则为空帧)
//! - 多目标: 每个 `TrackId` 1帧,按 `(class_id, slot)` 升序; 无目标时1个空帧
//!
//! 帧内不携带ID,接收端只能按顺序对应; 两种模式均无tick分隔符。

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::detection::Rect;
use crate::error::FramingError;

pub const HEADER1: u8 = 0xA5;
pub const HEADER2: u8 = 0xA6;
pub const FOOTER: u8 = 0x5B;
pub const FRAME_LEN: usize = 11;

/// 上报编码方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    #[default]
    Binary,
    Text,
}

/// 解码后的二进制帧
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinaryFrame {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl BinaryFrame {
    /// 全零帧视为无目标
    pub fn rect(&self) -> Option<Rect> {
        if *self == Self::default() {
            return None;
        }
        Some(Rect::new(
            self.x as i32,
            self.y as i32,
            self.w as i32,
            self.h as i32,
        ))
    }
}

fn clamp_u16(v: i32) -> u16 {
    v.clamp(0, u16::MAX as i32) as u16
}

pub struct FrameCodec;

impl FrameCodec {
    pub fn encode_binary(rect: Option<Rect>) -> [u8; FRAME_LEN] {
        let r = rect.unwrap_or_default();
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = HEADER1;
        frame[1] = HEADER2;
        for (i, v) in [r.x, r.y, r.w, r.h].into_iter().enumerate() {
            let off = 2 + i * 2;
            frame[off..off + 2].copy_from_slice(&clamp_u16(v).to_le_bytes());
        }
        frame[FRAME_LEN - 1] = FOOTER;
        frame
    }

    pub fn decode_binary(bytes: &[u8]) -> Result<BinaryFrame, FramingError> {
        if bytes.len() != FRAME_LEN {
            return Err(FramingError::Length(bytes.len()));
        }
        if bytes[0] != HEADER1 || bytes[1] != HEADER2 {
            return Err(FramingError::Header(bytes[0], bytes[1]));
        }
        if bytes[FRAME_LEN - 1] != FOOTER {
            return Err(FramingError::Footer(bytes[FRAME_LEN - 1]));
        }
        let field = |i: usize| u16::from_le_bytes([bytes[2 + i * 2], bytes[3 + i * 2]]);
        Ok(BinaryFrame {
            x: field(0),
            y: field(1),
            w: field(2),
            h: field(3),
        })
    }

    pub fn encode_text(rect: Option<Rect>) -> String {
        match rect {
            Some(r) => format!("{}\n", r),
            None => "None\n".to_string(),
        }
    }

    pub fn encode(mode: ProtocolMode, rect: Option<Rect>) -> Vec<u8> {
        match mode {
            ProtocolMode::Binary => Self::encode_binary(rect).to_vec(),
            ProtocolMode::Text => Self::encode_text(rect).into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_layout() {
        let frame = FrameCodec::encode_binary(Some(Rect::new(100, 50, 30, 40)));
        assert_eq!(frame, [0xA5, 0xA6, 100, 0, 50, 0, 30, 0, 40, 0, 0x5B]);
    }

    #[test]
    fn test_binary_round_trip() {
        let rect = Rect::new(100, 50, 30, 40);
        let frame = FrameCodec::decode_binary(&FrameCodec::encode_binary(Some(rect))).unwrap();
        assert_eq!(frame.rect(), Some(rect));
    }

    #[test]
    fn test_none_is_all_zero() {
        let bytes = FrameCodec::encode_binary(None);
        assert_eq!(bytes, [0xA5, 0xA6, 0, 0, 0, 0, 0, 0, 0, 0, 0x5B]);
        let frame = FrameCodec::decode_binary(&bytes).unwrap();
        assert_eq!(frame, BinaryFrame::default());
        assert_eq!(frame.rect(), None);
    }

    #[test]
    fn test_little_endian_and_clamp() {
        let bytes = FrameCodec::encode_binary(Some(Rect::new(0x1234, -5, 70_000, 1)));
        assert_eq!(&bytes[2..4], &[0x34, 0x12]);
        assert_eq!(&bytes[4..6], &[0, 0]);
        assert_eq!(&bytes[6..8], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        let good = FrameCodec::encode_binary(Some(Rect::new(1, 2, 3, 4)));
        assert_eq!(
            FrameCodec::decode_binary(&good[..9]),
            Err(FramingError::Length(9))
        );
        let mut bad = good;
        bad[1] = 0x00;
        assert_eq!(
            FrameCodec::decode_binary(&bad),
            Err(FramingError::Header(0xA5, 0x00))
        );
        let mut bad = good;
        bad[10] = 0x5C;
        assert_eq!(
            FrameCodec::decode_binary(&bad),
            Err(FramingError::Footer(0x5C))
        );
    }

    #[test]
    fn test_text_mode() {
        assert_eq!(
            FrameCodec::encode_text(Some(Rect::new(10, 20, 30, 40))),
            "(10, 20, 30, 40)\n"
        );
        assert_eq!(FrameCodec::encode_text(None), "None\n");
        assert_eq!(FrameCodec::encode(ProtocolMode::Text, None), b"None\n");
        assert_eq!(FrameCodec::encode(ProtocolMode::Binary, None).len(), FRAME_LEN);
    }
}
