//! OSD叠加绘制
//!
//! 每帧: `begin_frame` 清屏 → 若干 `draw` → `present` 提交。绘制失败不影响跟踪。

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;
use log::{debug, info};

use crate::detection::{Point, Rect};
use crate::gen_time_string;

/// 角点标记颜色 (品红)
const CORNER_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);
const CORNER_RADIUS: i32 = 2;
const RECT_THICKNESS: i32 = 2;

/// 单个叠加元素
#[derive(Clone, Debug)]
pub struct Overlay<'a> {
    pub rect: Rect,
    pub center: Option<Point>,
    pub corners: &'a [Point],
    pub color: [u8; 4],
}

/// 绘制接口 (即发即弃)
pub trait Renderer {
    fn begin_frame(&mut self) {}

    fn draw(&mut self, overlay: &Overlay<'_>);

    fn present(&mut self) -> Result<()> {
        Ok(())
    }

    /// 释放显示资源
    fn release(&mut self) {}
}

/// 不绘制
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _overlay: &Overlay<'_>) {}
}

/// 绘制到RGBA OSD图层,可按间隔保存PNG快照
pub struct OsdRenderer {
    osd: RgbaImage,
    snapshot_dir: Option<PathBuf>,
    save_every: u64,
    frame_no: u64,
    drawn: usize,
}

impl OsdRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            osd: RgbaImage::new(width, height),
            snapshot_dir: None,
            save_every: 1,
            frame_no: 0,
            drawn: 0,
        }
    }

    /// 每 `every` 帧保存一次快照到 `dir`
    pub fn with_snapshots(mut self, dir: impl Into<PathBuf>, every: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("创建快照目录失败: {}", dir.display()))?;
        info!("📸 OSD快照: {} (每 {} 帧)", dir.display(), every.max(1));
        self.snapshot_dir = Some(dir);
        self.save_every = every.max(1);
        Ok(self)
    }

    pub fn osd(&self) -> &RgbaImage {
        &self.osd
    }

    fn clear(&mut self) {
        for p in self.osd.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
        self.drawn = 0;
    }

    /// 点是否落在画布内 (外扩线宽)
    fn on_canvas(&self, p: &Point) -> bool {
        let margin = RECT_THICKNESS as i64;
        let (w, h) = (self.osd.width() as i64, self.osd.height() as i64);
        let (x, y) = (p.x as i64, p.y as i64);
        x >= -margin && x < w + margin && y >= -margin && y < h + margin
    }
}

impl Renderer for OsdRenderer {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw(&mut self, overlay: &Overlay<'_>) {
        let color = Rgba(overlay.color);
        let r = overlay.rect;

        // 先裁剪到画布 (外扩线宽),极端坐标不会在绘制时溢出
        let margin = RECT_THICKNESS as i64;
        let (width, height) = (self.osd.width() as i64, self.osd.height() as i64);
        let left = (r.x as i64).max(-margin);
        let top = (r.y as i64).max(-margin);
        let right = (r.x as i64 + r.w as i64).min(width + margin);
        let bottom = (r.y as i64 + r.h as i64).min(height + margin);

        // 线宽通过内缩多次描边实现
        for t in 0..margin {
            let (w, h) = (right - left - 2 * t, bottom - top - 2 * t);
            if w <= 0 || h <= 0 {
                break;
            }
            let rect =
                PixelRect::at((left + t) as i32, (top + t) as i32).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.osd, rect, color);
        }

        for pt in overlay.corners {
            if self.on_canvas(pt) {
                draw_hollow_circle_mut(&mut self.osd, (pt.x, pt.y), CORNER_RADIUS, CORNER_COLOR);
            }
        }

        if let Some(c) = overlay.center {
            if self.on_canvas(&c) {
                draw_cross_mut(&mut self.osd, color, c.x, c.y);
            }
        }

        self.drawn += 1;
    }

    fn present(&mut self) -> Result<()> {
        self.frame_no += 1;
        let Some(dir) = &self.snapshot_dir else {
            return Ok(());
        };
        if self.frame_no % self.save_every != 0 {
            return Ok(());
        }

        let path = dir.join(format!(
            "osd_{}_{:06}.png",
            gen_time_string(""),
            self.frame_no
        ));
        self.osd
            .save(&path)
            .with_context(|| format!("保存快照失败: {}", path.display()))?;
        debug!("快照已保存: {} ({} 个目标)", path.display(), self.drawn);
        Ok(())
    }

    fn release(&mut self) {
        info!("🖥️ OSD已释放 (共 {} 帧)", self.frame_no);
    }
}
