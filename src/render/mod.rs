//! 渲染模块
//!
//! - `particles` - 粒子类型、发射器、生成队列和存活粒子
//! - `targets` - 纹理与命名渲染目标
//! - `backend` - 渲染后端抽象和无窗口记录后端
//! - `graph` - 渲染任务和有序管线
//! - `tasks` - 清除、粒子、合成、叠加层任务
//! - `postprocess` - Bloom

pub mod backend;
pub mod graph;
pub mod particles;
pub mod postprocess;
pub mod targets;
pub mod tasks;

pub use backend::{ClearFlags, RecordingBackend, RenderBackend, RenderCommand};
pub use graph::{FrameContext, FrameStats, RenderPipeline, RenderTask};
pub use targets::{GpuProfile, RenderResources, RenderTargets, TextureRegistry, WindowSize};
