//! 基础渲染任务：清除、粒子、合成、叠加层

use std::collections::BTreeMap;

use glam::{Mat4, Vec4};

use super::backend::{ClearFlags, RenderCommand};
use super::graph::FrameContext;
use super::particles::{ParticleBuffer, ParticleTypeId};
use crate::core::error::RenderResult;

/// 正交相机默认的水平可视范围（世界单位）
pub const DEFAULT_VIEW_SIZE: f32 = 100.0;

/// 2D 正交相机，原点居中
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera2D {
    pub horizontal_view_size: f32,
}

impl Default for OrthoCamera2D {
    fn default() -> Self {
        Self {
            horizontal_view_size: DEFAULT_VIEW_SIZE,
        }
    }
}

impl OrthoCamera2D {
    /// 按宽高比计算 view-projection
    pub fn view_proj(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let half_w = self.horizontal_view_size * 0.5;
        let half_h = half_w / aspect;
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, -1.0, 1.0)
    }
}

// ============================================================================
// Clear
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClearTask {
    pub target: String,
    pub color: Vec4,
    pub flags: ClearFlags,
}

impl ClearTask {
    pub fn new(target: &str, color: Vec4, flags: ClearFlags) -> Self {
        Self {
            target: target.to_string(),
            color,
            flags,
        }
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        ctx.backend.submit(RenderCommand::Clear {
            target: self.target.clone(),
            color: self.color,
            flags: self.flags,
        })
    }
}

// ============================================================================
// ParticleRender
// ============================================================================

/// 粒子渲染任务
///
/// 每帧 drain 一次生成队列；类型未注册的事件被丢弃并记录，不中断本帧。
#[derive(Debug)]
pub struct ParticleRenderTask {
    pub target: String,
    pub camera: OrthoCamera2D,
    buffer: ParticleBuffer,
}

impl ParticleRenderTask {
    pub fn new(target: &str, max_particles: usize) -> Self {
        Self {
            target: target.to_string(),
            camera: OrthoCamera2D::default(),
            buffer: ParticleBuffer::new(max_particles),
        }
    }

    pub fn with_camera(mut self, camera: OrthoCamera2D) -> Self {
        self.camera = camera;
        self
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        let types = ctx.particle_types;
        let mut spawned = 0;
        let mut missing: BTreeMap<ParticleTypeId, usize> = BTreeMap::new();

        if let Some(queue) = ctx.spawn_queue.as_deref_mut() {
            for event in queue.drain() {
                if types.contains(event.type_id) {
                    self.buffer.spawn(&event);
                    spawned += 1;
                } else {
                    *missing.entry(event.type_id).or_default() += 1;
                }
            }
        }

        let mut dropped = 0;
        for (type_id, count) in missing {
            tracing::warn!(
                target: "particles",
                "Dropped {} spawn events with unregistered particle type {}",
                count,
                type_id
            );
            dropped += count;
        }

        self.buffer.update(ctx.delta, types);

        let (width, height) = ctx.resources.target_size(&self.target)?;
        ctx.backend.submit(RenderCommand::DrawParticles {
            target: self.target.clone(),
            view_proj: self.camera.view_proj(width, height),
            instances: self.buffer.instances(types),
        })?;

        ctx.stats.spawned += spawned;
        ctx.stats.dropped += dropped;
        ctx.stats.live = self.buffer.len();
        Ok(())
    }
}

// ============================================================================
// Composition
// ============================================================================

/// 把颜色和辉光合成到最终目标
#[derive(Debug, Clone)]
pub struct CompositionTask {
    pub color: String,
    pub bloom: String,
    pub target: String,
}

impl CompositionTask {
    pub fn new(color: &str, bloom: &str, target: &str) -> Self {
        Self {
            color: color.to_string(),
            bloom: bloom.to_string(),
            target: target.to_string(),
        }
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        ctx.backend.submit(RenderCommand::Composite {
            color: self.color.clone(),
            bloom: self.bloom.clone(),
            target: self.target.clone(),
        })
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// 文本叠加层（帧号、存活粒子、丢弃事件）
#[derive(Debug, Clone)]
pub struct OverlayTask {
    pub target: String,
    dropped_total: u64,
}

impl OverlayTask {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            dropped_total: 0,
        }
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        self.dropped_total += ctx.stats.dropped as u64;
        let lines = vec![
            format!("frame: {}", ctx.frame),
            format!("particles: {}", ctx.stats.live),
            format!("dropped: {}", self.dropped_total),
        ];
        ctx.backend.submit(RenderCommand::Overlay {
            target: self.target.clone(),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{FADE_DEMO_JSON, FADE_DEMO_NAME};
    use crate::render::backend::{RecordingBackend, RenderBackend};
    use crate::render::particles::{ParticleTypeTable, SpawnEvent, SpawnQueue};
    use crate::render::targets::{GpuProfile, RenderResources, WindowSize};
    use glam::Vec2;

    fn event(type_id: ParticleTypeId) -> SpawnEvent {
        SpawnEvent {
            type_id,
            position: Vec2::ZERO,
            velocity: Vec2::Y,
            initial_age: 0.0,
        }
    }

    #[test]
    fn test_unknown_types_dropped_without_error() {
        let resources = RenderResources::new(GpuProfile::Desktop, WindowSize::new(200, 100));
        let mut types = ParticleTypeTable::new();
        let known = types.register_json(FADE_DEMO_NAME, FADE_DEMO_JSON).unwrap();
        let unknown = ParticleTypeId::from_name("nope");

        let mut queue = SpawnQueue::new();
        queue.push(event(known));
        queue.push(event(unknown));
        queue.push(event(known));

        let mut backend = RecordingBackend::default();
        backend.begin_frame(0, resources.window()).unwrap();
        let mut task = ParticleRenderTask::new("display", 16);
        let mut ctx = FrameContext::new(
            0,
            1.0 / 60.0,
            &resources,
            &types,
            Some(&mut queue),
            &mut backend,
        );
        task.execute(&mut ctx).unwrap();
        assert_eq!(ctx.stats.spawned, 2);
        assert_eq!(ctx.stats.dropped, 1);
        assert_eq!(ctx.stats.live, 2);
        backend.end_frame().unwrap();

        assert!(queue.is_empty());
        match &backend.last_frame().unwrap().commands[0] {
            RenderCommand::DrawParticles { instances, .. } => assert_eq!(instances.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_camera_keeps_horizontal_view_size() {
        let camera = OrthoCamera2D::default();
        let m = camera.view_proj(200, 100);
        let right = m.project_point3(glam::Vec3::new(50.0, 0.0, 0.0));
        let top = m.project_point3(glam::Vec3::new(0.0, 25.0, 0.0));
        assert!((right.x - 1.0).abs() < 1e-5);
        assert!((top.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_overlay_reports_totals() {
        let resources = RenderResources::new(GpuProfile::Desktop, WindowSize::new(8, 8));
        let types = ParticleTypeTable::new();
        let mut backend = RecordingBackend::default();
        backend.begin_frame(7, resources.window()).unwrap();

        let mut task = OverlayTask::new("display");
        let mut ctx = FrameContext::new(7, 0.0, &resources, &types, None, &mut backend);
        ctx.stats.live = 12;
        ctx.stats.dropped = 3;
        task.execute(&mut ctx).unwrap();
        backend.end_frame().unwrap();

        match &backend.last_frame().unwrap().commands[0] {
            RenderCommand::Overlay { lines, .. } => {
                assert_eq!(lines, &["frame: 7", "particles: 12", "dropped: 3"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
