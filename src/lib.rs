//! # Lite Particles 2D
//!
//! A small 2D particle demo built on an ECS emitter simulation and a
//! name-addressed render task pipeline.
//!
//! ## Architecture
//!
//! - **Emission**: per-entity `ParticleEmitter2D` components advance a
//!   fixed-point accumulator every tick and push `SpawnEvent`s into the
//!   scene's `SpawnQueue`, drawing randomized parameters from a seeded
//!   `RangeSampler`.
//! - **Rendering**: an ordered `RenderPipeline` of tasks (clear, particles,
//!   bloom, composition, overlay) bound to named render targets. The particle
//!   task drains the queue once per frame and resolves each event against the
//!   `ParticleTypeTable`.
//! - **Backends**: tasks submit `RenderCommand`s to a `RenderBackend`; the
//!   headless `RecordingBackend` records them.
//!
//! ### Example
//!
//! ```no_run
//! use lite_particles2d::{config::EngineConfig, core::Engine, demo};
//!
//! let mut engine = Engine::headless(EngineConfig::default())?;
//! demo::start(&mut engine)?;
//! for _ in 0..60 {
//!     engine.frame(1.0 / 60.0)?;
//! }
//! # Ok::<(), lite_particles2d::core::EngineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Engine, errors and the range sampler
//! - [`ecs`]: Shared components and resources
//! - [`render`]: Particles, render targets, tasks and backends
//! - [`scene`]: Scenes and the scene service
//! - [`config`]: Engine configuration
//! - [`demo`]: The sample mode

/// Core engine functionality: engine, errors, random sampling
pub mod core;
/// Configuration system
pub mod config;
/// The sample particle mode
pub mod demo;
/// Shared ECS components and resources
pub mod ecs;
/// Particle simulation and render pipeline
pub mod render;
/// Scene management
pub mod scene;

pub use crate::core::{Engine, EngineError, EngineResult};
