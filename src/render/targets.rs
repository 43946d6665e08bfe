//! 纹理与命名渲染目标
//!
//! 渲染任务只通过名称引用目标。目标可以标记为随窗口自动缩放，
//! 每帧执行任务前按当前窗口尺寸同步。

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use wgpu::TextureFormat;

use crate::core::error::{RenderError, RenderResult};

/// 默认帧缓冲（窗口表面）的名称
pub const DISPLAY_TARGET: &str = "display";

/// 窗口尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 宽高比
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// 按比例缩放，每个维度至少 1 像素
    pub fn scaled(&self, factors: Vec2) -> (u32, u32) {
        let w = (self.width as f32 * factors.x).floor() as u32;
        let h = (self.height as f32 * factors.y).floor() as u32;
        (w.max(1), h.max(1))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// GPU 能力档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GpuProfile {
    /// 桌面 GPU
    #[default]
    Desktop,
    /// GLES 3 / WebGL 2
    Gles3,
}

impl GpuProfile {
    /// 是否可以作为渲染附件
    pub fn supports(&self, format: TextureFormat) -> bool {
        use TextureFormat as F;
        match self {
            GpuProfile::Desktop => matches!(
                format,
                F::Rgba8Unorm
                    | F::Rgba8UnormSrgb
                    | F::Bgra8Unorm
                    | F::Bgra8UnormSrgb
                    | F::Rgba16Float
                    | F::Rgba32Float
                    | F::Depth24Plus
                    | F::Depth24PlusStencil8
                    | F::Depth32Float
            ),
            GpuProfile::Gles3 => matches!(
                format,
                F::Rgba8Unorm
                    | F::Rgba8UnormSrgb
                    | F::Rgba16Float
                    | F::Depth24Plus
                    | F::Depth24PlusStencil8
            ),
        }
    }

    /// 该档位下首选的深度格式
    pub fn depth_format(&self) -> TextureFormat {
        match self {
            GpuProfile::Desktop => TextureFormat::Depth32Float,
            GpuProfile::Gles3 => TextureFormat::Depth24Plus,
        }
    }
}

/// 纹理句柄，名称 -> 句柄的映射在重新加载后保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// 纹理描述
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub name: String,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
}

/// 纹理注册表
#[derive(Debug)]
pub struct TextureRegistry {
    textures: HashMap<String, Texture>,
    next_handle: u32,
    profile: GpuProfile,
}

impl TextureRegistry {
    pub fn new(profile: GpuProfile) -> Self {
        Self {
            textures: HashMap::new(),
            next_handle: 1,
            profile,
        }
    }

    pub fn profile(&self) -> GpuProfile {
        self.profile
    }

    /// 创建或替换一张空纹理
    ///
    /// 格式不被当前档位支持时失败，注册表保持不变。
    pub fn reload_empty(
        &mut self,
        name: &str,
        format: TextureFormat,
        width: u32,
        height: u32,
    ) -> RenderResult<TextureHandle> {
        if !self.profile.supports(format) {
            return Err(RenderError::UnsupportedFormat {
                texture: name.to_string(),
                format,
                profile: self.profile,
            });
        }

        let handle = match self.textures.get(name) {
            Some(existing) => existing.handle,
            None => {
                let handle = TextureHandle(self.next_handle);
                self.next_handle += 1;
                handle
            }
        };
        self.textures.insert(
            name.to_string(),
            Texture {
                handle,
                name: name.to_string(),
                format,
                width: width.max(1),
                height: height.max(1),
            },
        );
        tracing::debug!(
            target: "render",
            "Texture '{}' {:?} {}x{}",
            name,
            format,
            width,
            height
        );
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    /// 按名称解析纹理
    pub fn get_texture(&self, name: &str) -> RenderResult<&Texture> {
        self.get(name)
            .ok_or_else(|| RenderError::UnknownTexture(name.to_string()))
    }

    /// 调整尺寸
    pub fn resize(&mut self, name: &str, width: u32, height: u32) -> RenderResult<()> {
        let texture = self
            .textures
            .get_mut(name)
            .ok_or_else(|| RenderError::UnknownTexture(name.to_string()))?;
        texture.width = width.max(1);
        texture.height = height.max(1);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// 命名渲染目标（一组附件）
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub name: String,
    pub color_attachments: Vec<String>,
    pub depth_attachment: Option<String>,
    /// 是否随窗口自动缩放
    pub resize: bool,
    pub resize_factors: Vec2,
}

impl RenderTarget {
    /// 默认帧缓冲
    fn display() -> Self {
        Self {
            name: DISPLAY_TARGET.to_string(),
            color_attachments: Vec::new(),
            depth_attachment: None,
            resize: true,
            resize_factors: Vec2::ONE,
        }
    }

    pub fn is_display(&self) -> bool {
        self.name == DISPLAY_TARGET
    }

    /// 所有附件名称
    pub fn attachments(&self) -> impl Iterator<Item = &str> {
        self.color_attachments
            .iter()
            .map(String::as_str)
            .chain(self.depth_attachment.as_deref())
    }
}

/// 渲染目标构建器
#[derive(Debug, Clone)]
pub struct RenderTargetBuilder {
    target: RenderTarget,
}

impl RenderTargetBuilder {
    pub fn start(name: &str) -> Self {
        Self {
            target: RenderTarget {
                name: name.to_string(),
                color_attachments: Vec::new(),
                depth_attachment: None,
                resize: false,
                resize_factors: Vec2::ONE,
            },
        }
    }

    pub fn attach_color(mut self, texture: &str) -> Self {
        self.target.color_attachments.push(texture.to_string());
        self
    }

    pub fn attach_depth(mut self, texture: &str) -> Self {
        self.target.depth_attachment = Some(texture.to_string());
        self
    }

    pub fn set_resize_factors(mut self, x: f32, y: f32) -> Self {
        self.target.resize_factors = Vec2::new(x, y);
        self
    }

    pub fn set_resize(mut self, resize: bool) -> Self {
        self.target.resize = resize;
        self
    }

    /// 校验附件并完成构建
    pub fn finish(self, textures: &TextureRegistry) -> RenderResult<RenderTarget> {
        let target = self.target;
        if target.color_attachments.is_empty() && target.depth_attachment.is_none() {
            return Err(RenderError::EmptyTarget(target.name));
        }
        for name in target.attachments() {
            textures.get_texture(name)?;
        }
        Ok(target)
    }
}

/// 命名渲染目标集合
///
/// 总是包含 `display`。
#[derive(Debug)]
pub struct RenderTargets {
    targets: HashMap<String, RenderTarget>,
}

impl Default for RenderTargets {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTargets {
    pub fn new() -> Self {
        let mut targets = HashMap::new();
        targets.insert(DISPLAY_TARGET.to_string(), RenderTarget::display());
        Self { targets }
    }

    /// 注册或替换
    pub fn insert(&mut self, target: RenderTarget) {
        tracing::debug!(target: "render", "Render target '{}' registered", target.name);
        self.targets.insert(target.name.clone(), target);
    }

    pub fn get(&self, name: &str) -> RenderResult<&RenderTarget> {
        self.targets
            .get(name)
            .ok_or_else(|| RenderError::UnknownTarget(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 移除除 `display` 以外的所有目标
    pub fn clear(&mut self) {
        self.targets.retain(|name, _| name == DISPLAY_TARGET);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

/// 渲染资源：纹理 + 目标 + 当前窗口尺寸
#[derive(Debug)]
pub struct RenderResources {
    pub textures: TextureRegistry,
    pub targets: RenderTargets,
    window: WindowSize,
}

impl RenderResources {
    pub fn new(profile: GpuProfile, window: WindowSize) -> Self {
        Self {
            textures: TextureRegistry::new(profile),
            targets: RenderTargets::new(),
            window,
        }
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }

    pub fn profile(&self) -> GpuProfile {
        self.textures.profile()
    }

    /// 创建同名的纹理和单色附件目标，按窗口比例缩放
    pub fn register_color_target(
        &mut self,
        name: &str,
        format: TextureFormat,
        scale: f32,
    ) -> RenderResult<()> {
        let (w, h) = self.window.scaled(Vec2::splat(scale));
        self.textures.reload_empty(name, format, w, h)?;
        let target = RenderTargetBuilder::start(name)
            .attach_color(name)
            .set_resize_factors(scale, scale)
            .set_resize(true)
            .finish(&self.textures)?;
        self.targets.insert(target);
        Ok(())
    }

    /// 目标的像素尺寸
    pub fn target_size(&self, name: &str) -> RenderResult<(u32, u32)> {
        let target = self.targets.get(name)?;
        if target.is_display() {
            return Ok((self.window.width, self.window.height));
        }
        let first = target
            .attachments()
            .next()
            .ok_or_else(|| RenderError::EmptyTarget(name.to_string()))?;
        let texture = self.textures.get_texture(first)?;
        Ok((texture.width, texture.height))
    }

    /// 同步窗口尺寸，自动缩放的目标重建附件
    ///
    /// 尺寸未变化时返回 `false`。
    pub fn resize(&mut self, window: WindowSize) -> RenderResult<bool> {
        if window == self.window {
            return Ok(false);
        }
        // 先解析全部附件，任何一个缺失都不修改状态
        let mut pending = Vec::new();
        for target in self.targets.targets.values() {
            if !target.resize || target.is_display() {
                continue;
            }
            let (w, h) = window.scaled(target.resize_factors);
            for attachment in target.attachments() {
                self.textures.get_texture(attachment)?;
                pending.push((attachment.to_string(), w, h));
            }
        }
        for (name, w, h) in pending {
            self.textures.resize(&name, w, h)?;
        }
        self.window = window;
        tracing::info!(
            target: "render",
            "Resized render targets to {}x{}",
            window.width,
            window.height
        );
        Ok(true)
    }

    /// 清除全部目标和纹理（保留 `display`）
    pub fn clear(&mut self) {
        self.targets.clear();
        self.textures.clear();
    }
}
