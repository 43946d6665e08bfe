//! 引擎主入口
//!
//! 定义 Engine 结构和单帧流程：先推进场景（发射），再按顺序执行渲染任务
//! （drain 生成队列、粒子、Bloom、合成、叠加层）。

use tracing_subscriber::EnvFilter;

use super::error::{EngineError, EngineResult};
use crate::config::{EngineConfig, LogLevel};
use crate::render::backend::{RecordingBackend, RenderBackend};
use crate::render::graph::{FrameContext, FrameStats, RenderPipeline};
use crate::render::particles::ParticleTypeTable;
use crate::render::targets::{RenderResources, WindowSize};
use crate::scene::{Scene, SceneService};

/// 引擎主结构
///
/// 持有粒子类型表、渲染资源、任务管线、场景服务和渲染后端。
/// 这些都是显式的上下文对象，没有进程级单例。
///
/// # 示例
///
/// ```no_run
/// use lite_particles2d::config::EngineConfig;
/// use lite_particles2d::core::Engine;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut engine = Engine::headless(EngineConfig::default())?;
///     lite_particles2d::demo::start(&mut engine)?;
///     engine.frame(1.0 / 60.0)?;
///     Ok(())
/// }
/// ```
pub struct Engine<B: RenderBackend = RecordingBackend> {
    config: EngineConfig,
    particle_types: ParticleTypeTable,
    resources: RenderResources,
    pipeline: RenderPipeline,
    scenes: SceneService,
    backend: B,
    frame: u64,
    last_stats: FrameStats,
}

impl Engine<RecordingBackend> {
    /// 使用无窗口后端创建引擎
    pub fn headless(config: EngineConfig) -> EngineResult<Self> {
        let backend = RecordingBackend::new(config.render.gpu_profile);
        Self::new(config, backend)
    }

    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先；未设置时使用配置的级别。
    pub fn initialize_logging(level: LogLevel) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

impl<B: RenderBackend> Engine<B> {
    pub fn new(config: EngineConfig, backend: B) -> EngineResult<Self> {
        config.validate()?;
        let resources = RenderResources::new(backend.profile(), config.window.size());
        tracing::info!(
            target: "engine",
            "Engine created: backend '{}', profile {:?}, window {}x{}",
            backend.name(),
            backend.profile(),
            config.window.width,
            config.window.height
        );
        Ok(Self {
            config,
            particle_types: ParticleTypeTable::new(),
            resources,
            pipeline: RenderPipeline::new(),
            scenes: SceneService::new(),
            backend,
            frame: 0,
            last_stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn particle_types(&self) -> &ParticleTypeTable {
        &self.particle_types
    }

    pub fn particle_types_mut(&mut self) -> &mut ParticleTypeTable {
        &mut self.particle_types
    }

    pub fn resources(&self) -> &RenderResources {
        &self.resources
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// 设置阶段同时访问资源和管线
    pub fn render_setup(&mut self) -> (&mut RenderResources, &mut RenderPipeline) {
        (&mut self.resources, &mut self.pipeline)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scenes.current()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.current_mut()
    }

    /// 创建场景，种子取自配置
    pub fn create_scene(&mut self, name: &str) -> Scene {
        self.scenes.create_scene(name, self.config.simulation.seed)
    }

    /// 切换场景，旧场景（发射器和未处理的队列）整体丢弃
    pub fn change_scene(&mut self, scene: Scene) {
        drop(self.scenes.change_scene(scene));
    }

    /// 已渲染的帧数
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// 窗口尺寸变化
    pub fn resize(&mut self, window: WindowSize) -> EngineResult<()> {
        if window.width == 0 || window.height == 0 {
            tracing::debug!(target: "engine", "Ignoring zero-sized window");
            return Ok(());
        }
        self.resources.resize(window)?;
        Ok(())
    }

    /// 运行一帧
    ///
    /// `dt` 必须有限且非负，否则在修改任何状态之前返回错误。
    pub fn frame(&mut self, dt: f32) -> EngineResult<FrameStats> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(EngineError::InvalidTimeDelta(dt));
        }
        let dt = self.config.simulation.clamp_delta(dt);

        if let Some(scene) = self.scenes.current_mut() {
            scene.tick(dt);
        }

        let spawn_queue = self.scenes.current_mut().and_then(Scene::spawn_queue_mut);
        let mut ctx = FrameContext::new(
            self.frame,
            dt,
            &self.resources,
            &self.particle_types,
            spawn_queue,
            &mut self.backend,
        );
        self.pipeline.execute(&mut ctx)?;
        let stats = ctx.stats;

        tracing::trace!(
            target: "engine",
            "Frame {}: spawned {}, dropped {}, live {}",
            stats.frame,
            stats.spawned,
            stats.dropped,
            stats.live
        );
        self.frame += 1;
        self.last_stats = stats;
        Ok(stats)
    }

    /// 以固定步长连续运行多帧，返回累计统计
    pub fn run_frames(&mut self, frames: u64, dt: f32) -> EngineResult<FrameStats> {
        let mut total = FrameStats::default();
        for _ in 0..frames {
            let stats = self.frame(dt)?;
            total.frame = stats.frame;
            total.spawned += stats.spawned;
            total.dropped += stats.dropped;
            total.live = stats.live;
            total.tasks_executed += stats.tasks_executed;
        }
        Ok(total)
    }
}
