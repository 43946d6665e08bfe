use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 区间采样器种子
    pub seed: u64,

    /// 无窗口运行时每帧的时间步长（秒）
    pub fixed_delta: f32,

    /// 无窗口运行的帧数
    pub frames: u64,

    /// 单个 tick 的最大时间步长，`None` 表示不截断
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tick_delta: Option<f32>,
}

impl_default!(SimulationConfig {
    seed: 42,
    fixed_delta: 1.0 / 60.0,
    frames: 600,
    max_tick_delta: None,
});

impl SimulationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.fixed_delta.is_finite() || self.fixed_delta <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "fixed_delta must be positive, got {}",
                self.fixed_delta
            )));
        }
        if let Some(max) = self.max_tick_delta {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "max_tick_delta must be positive, got {}",
                    max
                )));
            }
        }
        Ok(())
    }

    /// 按 `max_tick_delta` 截断
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        match self.max_tick_delta {
            Some(max) => dt.min(max),
            None => dt,
        }
    }
}
