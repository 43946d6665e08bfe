//! 示例模式：一个 `MM::fade_demo` 发射器 + HDR 粒子渲染 + Bloom
//!
//! 进入该模式时先清空并重建渲染管线，再切换到新场景。

use glam::Vec4;
use wgpu::TextureFormat;

use crate::core::engine::Engine;
use crate::core::error::{EngineResult, ParticleTypeResult};
use crate::ecs::Position2D;
use crate::render::backend::{ClearFlags, RenderBackend};
use crate::render::particles::{
    particle_emitter_system, ParticleEmitter2D, ParticleTypeId, ParticleTypeTable,
};
use crate::render::postprocess::{setup_bloom, BLOOM_OUTPUT};
use crate::render::targets::{RenderTargetBuilder, DISPLAY_TARGET};
use crate::render::tasks::{ClearTask, CompositionTask, OverlayTask, ParticleRenderTask};
use crate::scene::Scene;

pub const FADE_DEMO_NAME: &str = "MM::fade_demo";

/// `MM::fade_demo` 的声明式文档
pub const FADE_DEMO_JSON: &str = r#"{
  "compute": {
    "age_delta": 0.02,
    "force_vec": { "x": 0.0, "y": 0.9 },
    "turbulence": 4.0,
    "turbulence_individuality": 0.03,
    "turbulence_noise_scale": 0.05,
    "turbulence_time_scale": 0.6,
    "dampening": 1.0
  },
  "render": {
    "color_start": { "x": 1.8, "y": 3.0, "z": 7.0, "w": 1.0 },
    "color_end": { "x": 6.3, "y": 0.4, "z": 3.5, "w": 1.0 },
    "size_start": 0.1,
    "size_end": 0.02
  }
}"#;

pub const GAME_VIEW: &str = "game_view";
pub const HDR_COLOR: &str = "hdr_color";
pub const DEPTH: &str = "depth";

/// 注册示例粒子类型
pub fn setup_particle_types(types: &mut ParticleTypeTable) -> ParticleTypeResult<ParticleTypeId> {
    types.register_json(FADE_DEMO_NAME, FADE_DEMO_JSON)
}

/// 示例发射器：实体下方 20 单位，每秒 60 次 burst
pub fn default_emitter() -> ParticleEmitter2D {
    ParticleEmitter2D::new(FADE_DEMO_NAME)
        .with_rate(60.0)
        .with_count(1, 2)
        .with_direction(0.0, 1.0)
        .with_force(0.0, 2.0)
        .with_initial_age(0.0, 0.2)
}

/// 重建渲染目标和任务
///
/// 旧的目标、纹理和任务全部清除，不保留上一次配置的任何状态。
pub fn setup_render_pipeline<B: RenderBackend>(engine: &mut Engine<B>) -> EngineResult<()> {
    let render = engine.config().render.clone();
    let bloom = engine.config().bloom.clone();
    let (resources, pipeline) = engine.render_setup();

    pipeline.clear();
    resources.clear();

    let scale = render.render_scale;
    let (width, height) = resources.window().scaled(glam::Vec2::splat(scale));
    let depth_format = resources.profile().depth_format();
    resources.textures.reload_empty(DEPTH, depth_format, width, height)?;
    resources
        .textures
        .reload_empty(HDR_COLOR, TextureFormat::Rgba16Float, width, height)?;

    let game_view = RenderTargetBuilder::start(GAME_VIEW)
        .attach_color(HDR_COLOR)
        .attach_depth(DEPTH)
        .set_resize_factors(scale, scale)
        .set_resize(true)
        .finish(&resources.textures)?;
    resources.targets.insert(game_view);

    pipeline.add_task(ClearTask::new(
        GAME_VIEW,
        Vec4::new(0.0, 0.0, 0.0, 1.0),
        ClearFlags::COLOR | ClearFlags::DEPTH,
    ));
    pipeline.add_task(ParticleRenderTask::new(GAME_VIEW, render.max_particles));
    setup_bloom(resources, pipeline, HDR_COLOR, bloom.iterations, bloom.intensity)?;
    pipeline.add_task(CompositionTask::new(HDR_COLOR, BLOOM_OUTPUT, DISPLAY_TARGET));
    pipeline.add_task(OverlayTask::new(DISPLAY_TARGET));

    pipeline.validate(resources)?;
    tracing::info!(
        target: "render",
        "Render pipeline ready: {:?}",
        pipeline.task_names()
    );
    Ok(())
}

/// 创建示例场景：发射系统 + 一个发射器实体
pub fn create_scene<B: RenderBackend>(engine: &mut Engine<B>) -> Scene {
    let mut scene = engine.create_scene("lite_particles2d");
    scene.add_systems(particle_emitter_system);
    scene.spawn((Position2D::new(0.0, -20.0), default_emitter()));
    scene
}

/// 进入示例模式
pub fn start<B: RenderBackend>(engine: &mut Engine<B>) -> EngineResult<()> {
    setup_particle_types(engine.particle_types_mut())?;
    setup_render_pipeline(engine)?;
    let scene = create_scene(engine);
    engine.change_scene(scene);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::render::targets::GpuProfile;

    #[test]
    fn test_pipeline_task_order() {
        let mut engine = Engine::headless(EngineConfig::default()).unwrap();
        start(&mut engine).unwrap();
        assert_eq!(
            engine.pipeline().task_names(),
            vec!["clear", "particle_render", "bloom", "composition", "overlay"]
        );
        let game_view = engine.resources().targets.get(GAME_VIEW).unwrap();
        assert_eq!(game_view.depth_attachment.as_deref(), Some(DEPTH));
        assert!(game_view.resize);
    }

    #[test]
    fn test_depth_format_follows_profile() {
        let mut config = EngineConfig::default();
        config.render.gpu_profile = GpuProfile::Gles3;
        let mut engine = Engine::headless(config).unwrap();
        start(&mut engine).unwrap();
        assert_eq!(
            engine.resources().textures.get(DEPTH).unwrap().format,
            TextureFormat::Depth24Plus
        );
    }

    #[test]
    fn test_setup_twice_replaces_previous_configuration() {
        let mut engine = Engine::headless(EngineConfig::default()).unwrap();
        start(&mut engine).unwrap();
        let targets = engine.resources().targets.len();
        start(&mut engine).unwrap();
        assert_eq!(engine.pipeline().len(), 5);
        assert_eq!(engine.resources().targets.len(), targets);
        assert_eq!(engine.particle_types().len(), 1);
    }
}
