//! 场景管理
//!
//! 一个场景拥有自己的 ECS World 和系统调度。切换场景时旧场景整体丢弃，
//! 其中的发射器状态和未处理的生成队列随之销毁。

pub mod manager;

pub use manager::{Scene, SceneId, SceneService};
