//! 统一错误处理模块
//!
//! 提供粒子演示范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **配置错误** (`ParticleTypeError`): 粒子类型文档格式错误或字段缺失，加载时致命
//! - **资源设置错误** (`RenderError`): 渲染目标无法绑定、格式不受支持等，首帧之前上报
//! - **解析缺失**: 渲染时遇到未注册的粒子类型，仅记录日志并丢弃，不构成错误类型
//!
//! `EngineError` 聚合以上所有错误。

use thiserror::Error;

use crate::config::ConfigError;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Particle type error: {0}")]
    ParticleType(#[from] ParticleTypeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid time delta: {0} (must be finite and non-negative)")]
    InvalidTimeDelta(f32),
}

/// 粒子类型（声明式文档）错误
#[derive(Error, Debug)]
pub enum ParticleTypeError {
    #[error("Failed to parse particle type document for '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for '{name}': field '{field}' is not finite")]
    NonFinite { name: String, field: &'static str },

    #[error("Particle type name must not be empty")]
    EmptyName,
}

/// 渲染系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Texture not found: {0}")]
    UnknownTexture(String),

    #[error("Render target not found: {0}")]
    UnknownTarget(String),

    #[error("Texture format {format:?} for '{texture}' is not supported by the {profile:?} profile")]
    UnsupportedFormat {
        texture: String,
        format: wgpu::TextureFormat,
        profile: crate::render::targets::GpuProfile,
    },

    #[error("Render target '{0}' has no attachments")]
    EmptyTarget(String),

    #[error("Invalid render task parameters: {0}")]
    InvalidTask(String),

    #[error("Frame submission error: {0}")]
    FrameSubmission(String),
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type ParticleTypeResult<T> = Result<T, ParticleTypeError>;
pub type RenderResult<T> = Result<T, RenderError>;
