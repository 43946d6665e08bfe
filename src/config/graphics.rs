use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::render::targets::{GpuProfile, WindowSize};
use crate::render::particles::system::DEFAULT_MAX_PARTICLES;
use serde::{Deserialize, Serialize};

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
}

impl_default!(WindowConfig {
    width: 1280,
    height: 720,
});

impl WindowConfig {
    pub fn size(&self) -> WindowSize {
        WindowSize::new(self.width, self.height)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid window size {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// 渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// 离屏目标相对窗口的缩放
    pub render_scale: f32,

    /// GPU 能力档位
    pub gpu_profile: GpuProfile,

    /// 存活粒子上限
    pub max_particles: usize,
}

impl_default!(RenderConfig {
    render_scale: 1.0,
    gpu_profile: GpuProfile::Desktop,
    max_particles: DEFAULT_MAX_PARTICLES,
});

impl RenderConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.render_scale.is_finite() || self.render_scale <= 0.0 || self.render_scale > 4.0 {
            return Err(ConfigError::ValidationError(format!(
                "render_scale must be in (0, 4], got {}",
                self.render_scale
            )));
        }
        if self.max_particles == 0 {
            return Err(ConfigError::ValidationError(
                "max_particles must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bloom 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// 模糊级数
    pub iterations: u32,
    /// 强度
    pub intensity: f32,
}

impl_default!(BloomConfig {
    iterations: 9,
    intensity: 1.0,
});

impl BloomConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.iterations == 0 || self.iterations > 16 {
            return Err(ConfigError::ValidationError(format!(
                "bloom iterations must be in 1..=16, got {}",
                self.iterations
            )));
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "bloom intensity must be finite and non-negative, got {}",
                self.intensity
            )));
        }
        Ok(())
    }
}
