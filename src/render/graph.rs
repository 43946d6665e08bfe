//! 渲染任务管线
//!
//! 任务在设置阶段按顺序追加，每帧按列表顺序执行一次，不重排、不并行。
//! 每个任务声明读取的纹理和写入的目标；执行前检查这些名称都已注册。

use serde::Serialize;

use super::backend::RenderBackend;
use super::particles::{ParticleTypeTable, SpawnQueue};
use super::postprocess::bloom::BloomTask;
use super::targets::RenderResources;
use super::tasks::{ClearTask, CompositionTask, OverlayTask, ParticleRenderTask};
use crate::core::error::RenderResult;

/// 单帧统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frame: u64,
    /// 本帧上传的生成事件
    pub spawned: usize,
    /// 因类型未注册而丢弃的生成事件
    pub dropped: usize,
    /// 存活粒子数
    pub live: usize,
    pub tasks_executed: usize,
}

/// 任务执行时可见的帧上下文
pub struct FrameContext<'a> {
    pub frame: u64,
    pub delta: f32,
    pub resources: &'a RenderResources,
    pub particle_types: &'a ParticleTypeTable,
    /// 当前场景的生成队列，没有场景时为 `None`
    pub spawn_queue: Option<&'a mut SpawnQueue>,
    pub backend: &'a mut dyn RenderBackend,
    pub stats: FrameStats,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        frame: u64,
        delta: f32,
        resources: &'a RenderResources,
        particle_types: &'a ParticleTypeTable,
        spawn_queue: Option<&'a mut SpawnQueue>,
        backend: &'a mut dyn RenderBackend,
    ) -> Self {
        Self {
            frame,
            delta,
            resources,
            particle_types,
            spawn_queue,
            backend,
            stats: FrameStats {
                frame,
                ..Default::default()
            },
        }
    }
}

/// 渲染任务
#[derive(Debug)]
pub enum RenderTask {
    Clear(ClearTask),
    ParticleRender(ParticleRenderTask),
    Bloom(BloomTask),
    Composition(CompositionTask),
    Overlay(OverlayTask),
}

impl RenderTask {
    pub fn name(&self) -> &'static str {
        match self {
            RenderTask::Clear(_) => "clear",
            RenderTask::ParticleRender(_) => "particle_render",
            RenderTask::Bloom(_) => "bloom",
            RenderTask::Composition(_) => "composition",
            RenderTask::Overlay(_) => "overlay",
        }
    }

    /// 读取的纹理
    pub fn reads(&self) -> Vec<&str> {
        match self {
            RenderTask::Clear(_) | RenderTask::ParticleRender(_) | RenderTask::Overlay(_) => {
                Vec::new()
            }
            RenderTask::Bloom(task) => task.reads(),
            RenderTask::Composition(task) => vec![task.color.as_str(), task.bloom.as_str()],
        }
    }

    /// 写入的渲染目标
    pub fn writes(&self) -> Vec<&str> {
        match self {
            RenderTask::Clear(task) => vec![task.target.as_str()],
            RenderTask::ParticleRender(task) => vec![task.target.as_str()],
            RenderTask::Bloom(task) => task.writes(),
            RenderTask::Composition(task) => vec![task.target.as_str()],
            RenderTask::Overlay(task) => vec![task.target.as_str()],
        }
    }

    /// 检查引用的名称都可解析
    pub fn check(&self, resources: &RenderResources) -> RenderResult<()> {
        for texture in self.reads() {
            resources.textures.get_texture(texture)?;
        }
        for target in self.writes() {
            resources.targets.get(target)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        match self {
            RenderTask::Clear(task) => task.execute(ctx),
            RenderTask::ParticleRender(task) => task.execute(ctx),
            RenderTask::Bloom(task) => task.execute(ctx),
            RenderTask::Composition(task) => task.execute(ctx),
            RenderTask::Overlay(task) => task.execute(ctx),
        }
    }
}

impl From<ClearTask> for RenderTask {
    fn from(task: ClearTask) -> Self {
        RenderTask::Clear(task)
    }
}

impl From<ParticleRenderTask> for RenderTask {
    fn from(task: ParticleRenderTask) -> Self {
        RenderTask::ParticleRender(task)
    }
}

impl From<BloomTask> for RenderTask {
    fn from(task: BloomTask) -> Self {
        RenderTask::Bloom(task)
    }
}

impl From<CompositionTask> for RenderTask {
    fn from(task: CompositionTask) -> Self {
        RenderTask::Composition(task)
    }
}

impl From<OverlayTask> for RenderTask {
    fn from(task: OverlayTask) -> Self {
        RenderTask::Overlay(task)
    }
}

/// 有序任务列表
#[derive(Debug, Default)]
pub struct RenderPipeline {
    tasks: Vec<RenderTask>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到末尾
    pub fn add_task(&mut self, task: impl Into<RenderTask>) {
        let task = task.into();
        tracing::debug!(target: "render", "Render task '{}' added", task.name());
        self.tasks.push(task);
    }

    /// 移除所有任务
    pub fn clear(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(target: "render", "Clearing {} render tasks", self.tasks.len());
        }
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[RenderTask] {
        &self.tasks
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(RenderTask::name).collect()
    }

    /// 在首帧之前检查所有任务
    pub fn validate(&self, resources: &RenderResources) -> RenderResult<()> {
        self.tasks.iter().try_for_each(|task| task.check(resources))
    }

    /// 执行一帧
    ///
    /// 任何任务失败都会结束本帧并返回错误；后端的帧总是被关闭。
    pub fn execute(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        ctx.backend.begin_frame(ctx.frame, ctx.resources.window())?;
        let result = self.run_tasks(ctx);
        let end = ctx.backend.end_frame();
        result?;
        end
    }

    fn run_tasks(&mut self, ctx: &mut FrameContext<'_>) -> RenderResult<()> {
        for task in &mut self.tasks {
            task.check(ctx.resources)?;
            task.execute(ctx)?;
            ctx.stats.tasks_executed += 1;
        }
        Ok(())
    }
}
