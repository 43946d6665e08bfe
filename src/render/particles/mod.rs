//! 2D 粒子模块
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Lite Particles 2D                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Emission (simulation tick, ECS system)               │
//! │     - 发射器累加器 -> burst                               │
//! │     - 区间采样位置、方向、速度、初始年龄                    │
//! │     - 写入 SpawnQueue                                     │
//! │                                                          │
//! │  2. Upload (ParticleRender task, once per frame)         │
//! │     - drain SpawnQueue                                   │
//! │     - 按类型表解析，未注册类型丢弃并记录                    │
//! │                                                          │
//! │  3. Simulation + Rendering                               │
//! │     - 固定步长计算（力、湍流、阻尼、年龄）                   │
//! │     - 颜色/大小随年龄插值                                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let emitter = ParticleEmitter2D::new("MM::fade_demo")
//!     .with_rate(60.0)
//!     .with_count(1, 2)
//!     .with_direction(0.0, 1.0)
//!     .with_force(0.0, 2.0);
//!
//! world.spawn((Position2D::new(0.0, -20.0), emitter));
//! ```

pub mod emitter;
pub mod queue;
pub mod system;
pub mod types;

pub use emitter::{
    direction_angle, particle_emitter_system, ParticleEmitter2D, MAX_BURSTS_PER_TICK,
};
pub use queue::{SpawnEvent, SpawnQueue};
pub use system::{LiveParticle, ParticleBuffer, ParticleInstance, SIMULATION_STEP};
pub use types::{
    ParticleComputeParams, ParticleRenderParams, ParticleType, ParticleTypeDocument,
    ParticleTypeId, ParticleTypeTable,
};
