//! Bloom（辉光）后处理
//!
//! 对外是一个组合任务，内部是固定的通道序列：
//!
//! 1. 亮度提取：源纹理 -> `bloom_0`
//! 2. 每一级：降采样（第 0 级除外）、水平模糊、垂直模糊
//! 3. 升采样：从最小级逐级叠加回上一级
//! 4. 合成：`bloom_0` 按强度写入输出纹理 `blur_tmp1`

use crate::core::error::{RenderError, RenderResult};
use crate::render::backend::{BlurDirection, RenderCommand};
use crate::render::graph::{FrameContext, RenderPipeline};
use crate::render::targets::RenderResources;

/// 输出纹理名称
pub const BLOOM_OUTPUT: &str = "blur_tmp1";

/// 单级的目标与中间纹理
#[derive(Debug, Clone, PartialEq)]
pub struct BloomPhase {
    pub target: String,
    pub tmp: String,
}

impl BloomPhase {
    fn new(index: u32) -> Self {
        Self {
            target: format!("bloom_{index}"),
            tmp: format!("bloom_{index}_tmp"),
        }
    }
}

/// Bloom 组合任务
#[derive(Debug, Clone)]
pub struct BloomTask {
    pub source: String,
    pub output: String,
    pub intensity: f32,
    phases: Vec<BloomPhase>,
}

impl BloomTask {
    pub fn iterations(&self) -> usize {
        self.phases.len()
    }

    pub fn phases(&self) -> &[BloomPhase] {
        &self.phases
    }

    pub(crate) fn reads(&self) -> Vec<&str> {
        let mut reads = vec![self.source.as_str()];
        for phase in &self.phases {
            reads.push(phase.target.as_str());
            reads.push(phase.tmp.as_str());
        }
        reads
    }

    pub(crate) fn writes(&self) -> Vec<&str> {
        let mut writes = Vec::with_capacity(self.phases.len() * 2 + 1);
        for phase in &self.phases {
            writes.push(phase.target.as_str());
            writes.push(phase.tmp.as_str());
        }
        writes.push(self.output.as_str());
        writes
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        let Some(first) = self.phases.first() else {
            return Err(RenderError::InvalidTask(
                "bloom has no iterations".to_string(),
            ));
        };

        ctx.backend.submit(RenderCommand::Extract {
            source: self.source.clone(),
            target: first.target.clone(),
        })?;

        for (i, phase) in self.phases.iter().enumerate() {
            if i > 0 {
                ctx.backend.submit(RenderCommand::Downsample {
                    source: self.phases[i - 1].target.clone(),
                    target: phase.target.clone(),
                })?;
            }
            ctx.backend.submit(RenderCommand::Blur {
                source: phase.target.clone(),
                target: phase.tmp.clone(),
                direction: BlurDirection::Horizontal,
            })?;
            ctx.backend.submit(RenderCommand::Blur {
                source: phase.tmp.clone(),
                target: phase.target.clone(),
                direction: BlurDirection::Vertical,
            })?;
        }

        for pair in self.phases.windows(2).rev() {
            ctx.backend.submit(RenderCommand::Combine {
                sources: vec![pair[1].target.clone(), pair[0].target.clone()],
                target: pair[0].target.clone(),
                intensity: 1.0,
            })?;
        }

        ctx.backend.submit(RenderCommand::Combine {
            sources: vec![first.target.clone()],
            target: self.output.clone(),
            intensity: self.intensity,
        })
    }
}

/// 注册 Bloom 所需的纹理和目标，并把组合任务追加到管线
///
/// 第 `i` 级的尺寸为窗口的 `2^-(i+1)`，输出纹理为半分辨率，格式与源纹理一致。
pub fn setup_bloom(
    resources: &mut RenderResources,
    pipeline: &mut RenderPipeline,
    source: &str,
    iterations: u32,
    intensity: f32,
) -> RenderResult<()> {
    if iterations == 0 {
        return Err(RenderError::InvalidTask(
            "bloom iterations must be at least 1".to_string(),
        ));
    }
    if !intensity.is_finite() || intensity < 0.0 {
        return Err(RenderError::InvalidTask(format!(
            "bloom intensity must be finite and non-negative, got {intensity}"
        )));
    }

    let format = resources.textures.get_texture(source)?.format;

    let mut phases = Vec::with_capacity(iterations as usize);
    for i in 0..iterations {
        let phase = BloomPhase::new(i);
        let scale = 0.5_f32.powi(i as i32 + 1);
        resources.register_color_target(&phase.target, format, scale)?;
        resources.register_color_target(&phase.tmp, format, scale)?;
        phases.push(phase);
    }
    resources.register_color_target(BLOOM_OUTPUT, format, 0.5)?;

    tracing::info!(
        target: "render",
        "Bloom on '{}': {} iterations, intensity {}",
        source,
        iterations,
        intensity
    );

    pipeline.add_task(BloomTask {
        source: source.to_string(),
        output: BLOOM_OUTPUT.to_string(),
        intensity,
        phases,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::RecordingBackend;
    use crate::render::graph::RenderTask;
    use crate::render::particles::ParticleTypeTable;
    use crate::render::targets::{GpuProfile, WindowSize};
    use wgpu::TextureFormat;

    fn resources() -> RenderResources {
        let mut res = RenderResources::new(GpuProfile::Desktop, WindowSize::new(1024, 512));
        res.textures
            .reload_empty("hdr_color", TextureFormat::Rgba16Float, 1024, 512)
            .unwrap();
        res
    }

    #[test]
    fn test_setup_registers_phase_targets() {
        let mut res = resources();
        let mut pipeline = RenderPipeline::new();
        setup_bloom(&mut res, &mut pipeline, "hdr_color", 3, 1.0).unwrap();

        assert_eq!(pipeline.task_names(), vec!["bloom"]);
        assert_eq!(res.target_size("bloom_0").unwrap(), (512, 256));
        assert_eq!(res.target_size("bloom_2_tmp").unwrap(), (128, 64));
        assert_eq!(res.target_size(BLOOM_OUTPUT).unwrap(), (512, 256));
        assert_eq!(
            res.textures.get("bloom_1").unwrap().format,
            TextureFormat::Rgba16Float
        );
        pipeline.validate(&res).unwrap();
    }

    #[test]
    fn test_setup_rejects_bad_parameters() {
        let mut res = resources();
        let mut pipeline = RenderPipeline::new();
        assert!(matches!(
            setup_bloom(&mut res, &mut pipeline, "hdr_color", 0, 1.0),
            Err(RenderError::InvalidTask(_))
        ));
        assert!(setup_bloom(&mut res, &mut pipeline, "hdr_color", 2, f32::NAN).is_err());
        assert_eq!(
            setup_bloom(&mut res, &mut pipeline, "missing", 2, 1.0),
            Err(RenderError::UnknownTexture("missing".to_string()))
        );
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_pass_sequence() {
        let mut res = resources();
        let mut pipeline = RenderPipeline::new();
        setup_bloom(&mut res, &mut pipeline, "hdr_color", 9, 0.5).unwrap();
        if let RenderTask::Bloom(task) = &pipeline.tasks()[0] {
            assert_eq!(task.iterations(), 9);
        }

        let types = ParticleTypeTable::new();
        let mut backend = RecordingBackend::default();
        let mut ctx = FrameContext::new(0, 0.0, &res, &types, None, &mut backend);
        pipeline.execute(&mut ctx).unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.commands.len(), 4 * 9);
        assert_eq!(frame.kinds()[..4], ["extract", "blur", "blur", "downsample"]);
        match frame.commands.last().unwrap() {
            RenderCommand::Combine {
                sources,
                target,
                intensity,
            } => {
                assert_eq!(sources, &["bloom_0"]);
                assert_eq!(target, BLOOM_OUTPUT);
                assert_eq!(*intensity, 0.5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
