//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 引擎入口和单帧流程
//! - `error` - 错误类型定义
//! - `random` - 区间采样器
#[macro_use]
pub mod macros;

pub mod engine;
pub mod error;
pub mod random;

// 重新导出错误类型
pub use error::{
    EngineError, EngineResult, ParticleTypeError, ParticleTypeResult, RenderError, RenderResult,
};

// 重新导出主要类型
pub use engine::Engine;
pub use random::{RangeSampler, RangeValue, ScalarRange2};
