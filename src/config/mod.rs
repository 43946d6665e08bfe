/// 统一配置系统
///
/// 提供TOML/JSON配置文件和环境变量覆盖
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod graphics;
pub mod simulation;

pub use graphics::{BloomConfig, RenderConfig, WindowConfig};
pub use simulation::SimulationConfig;

/// 引擎配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 引擎主配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 模拟配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 渲染配置
    #[serde(default)]
    pub render: RenderConfig,

    /// Bloom 配置
    #[serde(default)]
    pub bloom: BloomConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 按扩展名加载（`.json` 为 JSON，其余按 TOML）
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        tracing::info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// 保存为TOML字符串
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// 用任意键值来源覆盖配置，无法解析的值被忽略
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            let raw = lookup(key)?;
            match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(target: "config", "Ignoring invalid value for {}: '{}'", key, raw);
                    None
                }
            }
        }

        if let Some(width) = parsed(&lookup, "LP2D_WINDOW_WIDTH") {
            self.window.width = width;
        }
        if let Some(height) = parsed(&lookup, "LP2D_WINDOW_HEIGHT") {
            self.window.height = height;
        }
        if let Some(seed) = parsed(&lookup, "LP2D_SEED") {
            self.simulation.seed = seed;
        }
        if let Some(frames) = parsed(&lookup, "LP2D_FRAMES") {
            self.simulation.frames = frames;
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.window.validate()?;
        self.simulation.validate()?;
        self.render.validate()?;
        self.bloom.validate()?;
        Ok(())
    }

    /// 加载配置文件；未找到时使用默认配置
    ///
    /// 按以下顺序查找：
    /// 1. ./lite_particles2d.toml
    /// 2. ./lite_particles2d.json
    /// 3. 使用默认配置
    pub fn load_or_default() -> ConfigResult<Self> {
        for candidate in ["lite_particles2d.toml", "lite_particles2d.json"] {
            if Path::new(candidate).exists() {
                return Self::from_file(candidate);
            }
        }
        tracing::info!(target: "config", "Using default configuration");
        Ok(Self::default())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// `EnvFilter` 指令
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::targets::GpuProfile;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.bloom.iterations, 9);
        assert_eq!(config.bloom.intensity, 1.0);
    }

    #[test]
    fn test_toml_serialization() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [window]
            width = 640

            [render]
            gpu_profile = "Gles3"

            [simulation]
            max_tick_delta = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.render.gpu_profile, GpuProfile::Gles3);
        assert_eq!(config.simulation.clamp_delta(1.0), 0.1);
        assert_eq!(config.simulation.fixed_delta, 1.0 / 60.0);
    }

    #[test]
    fn test_json_config() {
        let config =
            EngineConfig::from_json_str(r#"{ "bloom": { "iterations": 4 }, "logging": { "level": "Debug" } }"#)
                .unwrap();
        assert_eq!(config.bloom.iterations, 4);
        assert_eq!(config.logging.level.as_filter(), "debug");
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = EngineConfig::default();
        config.bloom.iterations = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = EngineConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.simulation.fixed_delta = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = EngineConfig::default();
        config.apply_overrides(|key| match key {
            "LP2D_WINDOW_WIDTH" => Some("320".to_string()),
            "LP2D_SEED" => Some("7".to_string()),
            "LP2D_FRAMES" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.window.width, 320);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.frames, 600);
    }
}
