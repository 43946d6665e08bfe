//! 渲染后端抽象
//!
//! 渲染任务不直接调用 GPU API，而是向后端提交 [`RenderCommand`]。
//! 真实后端把命令翻译成 wgpu 调用；[`RecordingBackend`] 只记录命令，
//! 用于无窗口运行和测试。

use glam::{Mat4, Vec4};

use super::particles::ParticleInstance;
use super::targets::{GpuProfile, WindowSize};
use crate::core::error::{RenderError, RenderResult};

/// 清除标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearFlags(pub u32);

impl ClearFlags {
    pub const COLOR: Self = Self(1);
    pub const DEPTH: Self = Self(2);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ClearFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// 模糊方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurDirection {
    Horizontal,
    Vertical,
}

/// 渲染命令
///
/// `target` 是渲染目标名称，`source` 是纹理名称。
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Clear {
        target: String,
        color: Vec4,
        flags: ClearFlags,
    },
    DrawParticles {
        target: String,
        view_proj: Mat4,
        instances: Vec<ParticleInstance>,
    },
    /// 提取亮部
    Extract {
        source: String,
        target: String,
    },
    Downsample {
        source: String,
        target: String,
    },
    Blur {
        source: String,
        target: String,
        direction: BlurDirection,
    },
    /// 叠加多张纹理
    Combine {
        sources: Vec<String>,
        target: String,
        intensity: f32,
    },
    /// 颜色与辉光合成到最终目标
    Composite {
        color: String,
        bloom: String,
        target: String,
    },
    Overlay {
        target: String,
        lines: Vec<String>,
    },
}

impl RenderCommand {
    /// 命令写入的目标
    pub fn target(&self) -> &str {
        match self {
            RenderCommand::Clear { target, .. }
            | RenderCommand::DrawParticles { target, .. }
            | RenderCommand::Extract { target, .. }
            | RenderCommand::Downsample { target, .. }
            | RenderCommand::Blur { target, .. }
            | RenderCommand::Combine { target, .. }
            | RenderCommand::Composite { target, .. }
            | RenderCommand::Overlay { target, .. } => target,
        }
    }

    /// 命令类型名
    pub fn kind(&self) -> &'static str {
        match self {
            RenderCommand::Clear { .. } => "clear",
            RenderCommand::DrawParticles { .. } => "draw_particles",
            RenderCommand::Extract { .. } => "extract",
            RenderCommand::Downsample { .. } => "downsample",
            RenderCommand::Blur { .. } => "blur",
            RenderCommand::Combine { .. } => "combine",
            RenderCommand::Composite { .. } => "composite",
            RenderCommand::Overlay { .. } => "overlay",
        }
    }
}

/// 渲染后端 trait
pub trait RenderBackend: Send {
    /// 后端名称
    fn name(&self) -> &str;

    /// GPU 能力档位
    fn profile(&self) -> GpuProfile;

    /// 开始一帧
    fn begin_frame(&mut self, frame: u64, window: WindowSize) -> RenderResult<()>;

    /// 提交一条命令
    fn submit(&mut self, command: RenderCommand) -> RenderResult<()>;

    /// 结束并呈现当前帧
    fn end_frame(&mut self) -> RenderResult<()>;

    fn supports_format(&self, format: wgpu::TextureFormat) -> bool {
        self.profile().supports(format)
    }
}

/// 一帧内记录的命令
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub frame: u64,
    pub window: WindowSize,
    pub commands: Vec<RenderCommand>,
}

impl RecordedFrame {
    /// 按顺序列出命令类型
    pub fn kinds(&self) -> Vec<&'static str> {
        self.commands.iter().map(RenderCommand::kind).collect()
    }
}

/// 记录命令的无窗口后端
#[derive(Debug)]
pub struct RecordingBackend {
    profile: GpuProfile,
    current: Option<RecordedFrame>,
    frames: Vec<RecordedFrame>,
    history: usize,
    total_commands: u64,
}

impl RecordingBackend {
    /// 默认保留的帧数
    pub const DEFAULT_HISTORY: usize = 8;

    pub fn new(profile: GpuProfile) -> Self {
        Self::with_history(profile, Self::DEFAULT_HISTORY)
    }

    /// 只保留最近 `history` 帧
    pub fn with_history(profile: GpuProfile, history: usize) -> Self {
        Self {
            profile,
            current: None,
            frames: Vec::new(),
            history: history.max(1),
            total_commands: 0,
        }
    }

    /// 已完成的帧（从旧到新）
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    pub fn total_commands(&self) -> u64 {
        self.total_commands
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(GpuProfile::default())
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn profile(&self) -> GpuProfile {
        self.profile
    }

    fn begin_frame(&mut self, frame: u64, window: WindowSize) -> RenderResult<()> {
        if let Some(open) = &self.current {
            return Err(RenderError::FrameSubmission(format!(
                "frame {} is still open",
                open.frame
            )));
        }
        self.current = Some(RecordedFrame {
            frame,
            window,
            commands: Vec::new(),
        });
        Ok(())
    }

    fn submit(&mut self, command: RenderCommand) -> RenderResult<()> {
        let current = self.current.as_mut().ok_or_else(|| {
            RenderError::FrameSubmission(format!("'{}' submitted outside a frame", command.kind()))
        })?;
        tracing::trace!(target: "render", "{} -> {}", command.kind(), command.target());
        current.commands.push(command);
        self.total_commands += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        let frame = self
            .current
            .take()
            .ok_or_else(|| RenderError::FrameSubmission("no frame in progress".to_string()))?;
        if self.frames.len() == self.history {
            self.frames.remove(0);
        }
        self.frames.push(frame);
        Ok(())
    }
}
