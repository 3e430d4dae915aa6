//! 跟踪器配置 - 通过JSON文件调整参数

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::detection::{CandidateValidator, MultiTrackParams, SingleTrackParams};
use crate::error::ConfigError;
use crate::protocol::ProtocolMode;

/// 跟踪器参数配置 (启动时确定,运行期不可修改)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    // === 候选框校验 ===
    pub min_rect_area: u32,     // 最小面积
    pub max_rect_area: u32,     // 最大面积 (常取画面面积的 1/8 ~ 1/5)
    pub aspect_tolerance: f64,  // 长宽比容差,上限为 2 + 容差

    // === 单目标跟踪 ===
    pub alpha: f64,    // 指数滤波系数
    pub max_skip: u32, // 最大丢失帧数

    // === 多目标平滑 ===
    pub window_size: usize,    // 历史窗口大小
    pub smooth_threshold: f64, // 跳变判定比例

    // === 输出 ===
    pub protocol: ProtocolMode,

    // === 运行 ===
    pub max_detector_failures: u32, // 连续检测失败上限,超过则退出
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_rect_area: 625,
            max_rect_area: 320 * 240 / 5,
            aspect_tolerance: 0.2,

            alpha: 0.6,
            max_skip: 5,

            window_size: 5,
            smooth_threshold: 0.5,

            protocol: ProtocolMode::Binary,

            max_detector_failures: 30,
        }
    }
}

impl TrackConfig {
    /// 从JSON文件加载配置; 文件不存在时写入并使用默认值
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("📝 配置文件不存在,创建默认配置: {}", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("✅ 配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        write_json(self, path)?;
        info!("💾 配置已保存到 {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if self.min_rect_area > self.max_rect_area {
            return Err(ConfigError::Invalid(format!(
                "min_rect_area {} exceeds max_rect_area {}",
                self.min_rect_area, self.max_rect_area
            )));
        }
        if !(self.aspect_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "aspect_tolerance must be >= 0, got {}",
                self.aspect_tolerance
            )));
        }
        if self.window_size == 0 {
            return Err(ConfigError::Invalid("window_size must be >= 1".into()));
        }
        if !(self.smooth_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "smooth_threshold must be >= 0, got {}",
                self.smooth_threshold
            )));
        }
        Ok(())
    }

    pub fn validator(&self) -> CandidateValidator {
        CandidateValidator::new(self.min_rect_area, self.max_rect_area, self.aspect_tolerance)
    }

    pub fn single_params(&self) -> SingleTrackParams {
        SingleTrackParams {
            validator: self.validator(),
            alpha: self.alpha,
            max_skip: self.max_skip,
        }
    }

    pub fn multi_params(&self, min_confidence: f32) -> MultiTrackParams {
        MultiTrackParams {
            window_size: self.window_size,
            smooth_threshold: self.smooth_threshold,
            min_confidence,
        }
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        info!("🎛️  当前跟踪器配置:");
        info!(
            "  面积范围: {} ~ {}, 长宽比上限: {:.2}",
            self.min_rect_area,
            self.max_rect_area,
            2.0 + self.aspect_tolerance
        );
        info!("  滤波系数: {:.2}, 最大丢失帧: {}", self.alpha, self.max_skip);
        info!(
            "  窗口大小: {}, 跳变阈值: {:.2}",
            self.window_size, self.smooth_threshold
        );
        info!("  上报协议: {:?}", self.protocol);
    }
}

/// 序列化为格式化JSON并写入文件
fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ========== NN部署配置 ==========

/// 模型部署配置 (deploy_config.json)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub kmodel_path: String,
    pub categories: Vec<String>,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    pub img_size: [u32; 2],
    pub num_classes: usize,
    #[serde(default)]
    pub nms_option: bool,
    pub model_type: String,
    #[serde(default)]
    pub anchors: Vec<Vec<f32>>,
}

impl DeployConfig {
    /// 部署配置不可读即致命
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.categories.len() < config.num_classes {
            return Err(ConfigError::Invalid(format!(
                "num_classes {} but only {} categories",
                config.num_classes,
                config.categories.len()
            )));
        }
        Ok(config)
    }

    /// 类别名,越界时返回 `class_{id}`
    pub fn label(&self, class_id: u32) -> String {
        self.categories
            .get(class_id as usize)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }

    pub fn print_summary(&self) {
        info!("📦 模型: {} ({})", self.kmodel_path, self.model_type);
        info!(
            "  类别数: {}, 置信度阈值: {:.2}, NMS阈值: {:.2}, 输入 {}x{}",
            self.num_classes,
            self.confidence_threshold,
            self.nms_threshold,
            self.img_size[0],
            self.img_size[1]
        );
    }
}

// ========== 显示参数 ==========

/// 向上对齐到 `align` 的整数倍
pub const fn align_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}

/// AI通道输出尺寸
pub const OUT_RGB888P_WIDTH: u32 = align_up(640, 16);
pub const OUT_RGB888P_HEIGHT: u32 = 360;

/// 显示设备
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// ST7701 屏, 800x480
    #[default]
    Lcd,
    /// LT9611 HDMI, 1920x1080
    Hdmi,
}

impl DisplayMode {
    pub fn size(&self) -> (u32, u32) {
        match self {
            DisplayMode::Lcd => (align_up(800, 16), 480),
            DisplayMode::Hdmi => (align_up(1920, 16), 1080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_config_default() {
        let config = TrackConfig::default();
        assert_eq!(config.min_rect_area, 625);
        assert_eq!(config.max_rect_area, 15360);
        assert_eq!(config.max_skip, 5);
        assert_eq!(config.window_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        let config = TrackConfig::load(&path).unwrap();
        assert_eq!(config, TrackConfig::default());
        assert!(path.exists());
        assert_eq!(TrackConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_unserializable_value_reported_as_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // JSON对象的键必须是字符串
        let value: BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into_iter().collect();
        assert!(matches!(
            write_json(&value, &path),
            Err(ConfigError::Serialize { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        fs::write(&path, r#"{"alpha": 0.3, "protocol": "text"}"#).unwrap();
        let config = TrackConfig::load(&path).unwrap();
        assert_eq!(config.alpha, 0.3);
        assert_eq!(config.protocol, ProtocolMode::Text);
        assert_eq!(config.max_skip, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.json");
        fs::write(&path, r#"{"alpha": 0.0}"#).unwrap();
        assert!(matches!(
            TrackConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, r#"{"min_rect_area": 900, "max_rect_area": 800}"#).unwrap();
        assert!(matches!(
            TrackConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            TrackConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_deploy_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy_config.json");
        fs::write(
            &path,
            r#"{
                "kmodel_path": "det.kmodel",
                "categories": ["red", "green"],
                "confidence_threshold": 0.5,
                "nms_threshold": 0.2,
                "img_size": [320, 320],
                "num_classes": 2,
                "nms_option": false,
                "model_type": "AnchorBaseDet",
                "anchors": [[10, 13, 16, 30], [33, 23], [116, 90]]
            }"#,
        )
        .unwrap();
        let config = DeployConfig::load(&path).unwrap();
        assert_eq!(config.label(1), "green");
        assert_eq!(config.label(7), "class_7");

        assert!(matches!(
            DeployConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_display_sizes() {
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(640, 16), 640);
        assert_eq!(DisplayMode::Lcd.size(), (800, 480));
        assert_eq!(DisplayMode::Hdmi.size(), (1920, 1080));
    }
}
