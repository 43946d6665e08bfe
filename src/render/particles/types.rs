//! 粒子类型表
//!
//! 类型标识符 -> 不可变的计算/渲染参数。类型在启动时从声明式 JSON 文档注册，
//! 运行期间不再修改。
//!
//! 文档格式：
//!
//! ```json
//! {
//!   "compute": {
//!     "age_delta": 0.02,
//!     "force_vec": { "x": 0.0, "y": 0.9 },
//!     "turbulence": 4.0,
//!     "turbulence_individuality": 0.03,
//!     "turbulence_noise_scale": 0.05,
//!     "turbulence_time_scale": 0.6,
//!     "dampening": 1.0
//!   },
//!   "render": {
//!     "color_start": { "x": 1.8, "y": 3.0, "z": 7.0, "w": 1.0 },
//!     "color_end": { "x": 6.3, "y": 0.4, "z": 3.5, "w": 1.0 },
//!     "size_start": 0.1,
//!     "size_end": 0.02
//!   }
//! }
//! ```
//!
//! 未知字段被忽略，缺失字段导致注册失败。

use std::collections::HashMap;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::core::error::{ParticleTypeError, ParticleTypeResult};

/// 粒子类型标识符（名称的 FNV-1a 32 位哈希）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleTypeId(pub u32);

impl ParticleTypeId {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    /// 由名称计算标识符，结果在进程间稳定
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl std::fmt::Display for ParticleTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// 计算参数（每个模拟步应用）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleComputeParams {
    /// 每步增加的年龄，年龄到 1 时粒子消亡
    pub age_delta: f32,
    pub force_vec: Vec2,
    pub turbulence: f32,
    pub turbulence_individuality: f32,
    pub turbulence_noise_scale: f32,
    pub turbulence_time_scale: f32,
    pub dampening: f32,
}

/// 渲染参数（按年龄在起止值之间线性插值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRenderParams {
    pub color_start: Vec4,
    pub color_end: Vec4,
    pub size_start: f32,
    pub size_end: f32,
}

impl ParticleRenderParams {
    /// 指定年龄下的颜色
    pub fn color_at(&self, age: f32) -> Vec4 {
        self.color_start.lerp(self.color_end, age.clamp(0.0, 1.0))
    }

    /// 指定年龄下的尺寸
    pub fn size_at(&self, age: f32) -> f32 {
        let t = age.clamp(0.0, 1.0);
        self.size_start + (self.size_end - self.size_start) * t
    }
}

/// 一种粒子的全部参数
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleType {
    pub name: String,
    pub compute: ParticleComputeParams,
    pub render: ParticleRenderParams,
}

// 文档中的向量以对象形式书写：{ "x": .., "y": .. }
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct XyDoc {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct XyzwDoc {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComputeDoc {
    age_delta: f32,
    force_vec: XyDoc,
    turbulence: f32,
    turbulence_individuality: f32,
    turbulence_noise_scale: f32,
    turbulence_time_scale: f32,
    dampening: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RenderDoc {
    color_start: XyzwDoc,
    color_end: XyzwDoc,
    size_start: f32,
    size_end: f32,
}

/// 粒子类型声明式文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleTypeDocument {
    compute: ComputeDoc,
    render: RenderDoc,
}

impl ParticleTypeDocument {
    /// 解析 JSON 文本
    pub fn from_json_str(name: &str, json: &str) -> ParticleTypeResult<Self> {
        serde_json::from_str(json).map_err(|source| ParticleTypeError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// 从已解析的 JSON 值转换
    pub fn from_json_value(name: &str, value: serde_json::Value) -> ParticleTypeResult<Self> {
        serde_json::from_value(value).map_err(|source| ParticleTypeError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// 校验并转换为运行时参数
    pub fn into_params(
        self,
        name: &str,
    ) -> ParticleTypeResult<(ParticleComputeParams, ParticleRenderParams)> {
        let c = &self.compute;
        let r = &self.render;
        let fields: [(&'static str, f32); 18] = [
            ("compute.age_delta", c.age_delta),
            ("compute.force_vec.x", c.force_vec.x),
            ("compute.force_vec.y", c.force_vec.y),
            ("compute.turbulence", c.turbulence),
            ("compute.turbulence_individuality", c.turbulence_individuality),
            ("compute.turbulence_noise_scale", c.turbulence_noise_scale),
            ("compute.turbulence_time_scale", c.turbulence_time_scale),
            ("compute.dampening", c.dampening),
            ("render.color_start.x", r.color_start.x),
            ("render.color_start.y", r.color_start.y),
            ("render.color_start.z", r.color_start.z),
            ("render.color_start.w", r.color_start.w),
            ("render.color_end.x", r.color_end.x),
            ("render.color_end.y", r.color_end.y),
            ("render.color_end.z", r.color_end.z),
            ("render.color_end.w", r.color_end.w),
            ("render.size_start", r.size_start),
            ("render.size_end", r.size_end),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParticleTypeError::NonFinite {
                name: name.to_string(),
                field,
            });
        }

        let compute = ParticleComputeParams {
            age_delta: c.age_delta,
            force_vec: Vec2::new(c.force_vec.x, c.force_vec.y),
            turbulence: c.turbulence,
            turbulence_individuality: c.turbulence_individuality,
            turbulence_noise_scale: c.turbulence_noise_scale,
            turbulence_time_scale: c.turbulence_time_scale,
            dampening: c.dampening,
        };
        let render = ParticleRenderParams {
            color_start: Vec4::new(r.color_start.x, r.color_start.y, r.color_start.z, r.color_start.w),
            color_end: Vec4::new(r.color_end.x, r.color_end.y, r.color_end.z, r.color_end.w),
            size_start: r.size_start,
            size_end: r.size_end,
        };
        Ok((compute, render))
    }
}

/// 粒子类型表
///
/// 重复注册同一标识符会原地覆盖。解析未知标识符返回 `None`，由调用方决定如何处理。
#[derive(Debug, Default, Clone)]
pub struct ParticleTypeTable {
    types: HashMap<ParticleTypeId, ParticleType>,
}

impl ParticleTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册或替换
    pub fn register(
        &mut self,
        name: &str,
        compute: ParticleComputeParams,
        render: ParticleRenderParams,
    ) -> ParticleTypeId {
        let id = ParticleTypeId::from_name(name);
        let entry = ParticleType {
            name: name.to_string(),
            compute,
            render,
        };
        match self.types.insert(id, entry) {
            Some(old) if old.name != name => {
                tracing::warn!(
                    target: "particles",
                    "Particle type id {} collision: '{}' replaced by '{}'",
                    id,
                    old.name,
                    name
                );
            }
            Some(_) => {
                tracing::debug!(target: "particles", "Particle type '{}' re-registered", name);
            }
            None => {
                tracing::info!(target: "particles", "Registered particle type '{}' ({})", name, id);
            }
        }
        id
    }

    /// 从 JSON 文本注册；失败时不会留下任何部分状态
    pub fn register_json(&mut self, name: &str, json: &str) -> ParticleTypeResult<ParticleTypeId> {
        if name.is_empty() {
            return Err(ParticleTypeError::EmptyName);
        }
        let (compute, render) = ParticleTypeDocument::from_json_str(name, json)?.into_params(name)?;
        Ok(self.register(name, compute, render))
    }

    /// 从已解析的 JSON 值注册
    pub fn register_value(
        &mut self,
        name: &str,
        value: serde_json::Value,
    ) -> ParticleTypeResult<ParticleTypeId> {
        if name.is_empty() {
            return Err(ParticleTypeError::EmptyName);
        }
        let (compute, render) =
            ParticleTypeDocument::from_json_value(name, value)?.into_params(name)?;
        Ok(self.register(name, compute, render))
    }

    pub fn resolve(&self, id: ParticleTypeId) -> Option<&ParticleType> {
        self.types.get(&id)
    }

    pub fn resolve_name(&self, name: &str) -> Option<&ParticleType> {
        self.resolve(ParticleTypeId::from_name(name))
    }

    pub fn contains(&self, id: ParticleTypeId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
