//! 外部资源守卫: 任一退出路径 (含出错/提前返回) 都释放采集、显示与输出通道

use log::info;

use crate::input::Detector;
use crate::output::{Renderer, Transport};

pub struct Resources {
    pub detector: Box<dyn Detector>,
    pub renderer: Box<dyn Renderer>,
    pub transport: Box<dyn Transport>,
    released: bool,
}

impl Resources {
    pub fn new(
        detector: Box<dyn Detector>,
        renderer: Box<dyn Renderer>,
        transport: Box<dyn Transport>,
    ) -> Self {
        info!(
            "🔗 资源就绪: 检测={} 输出={}",
            detector.name(),
            transport.name()
        );
        Self {
            detector,
            renderer,
            transport,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// 幂等: 只释放一次
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // 与获取顺序相反
        self.transport.release();
        self.renderer.release();
        self.detector.release();
        info!("✅ 资源已全部释放");
    }
}

impl Drop for Resources {
    fn drop(&mut self) {
        self.release();
    }
}
