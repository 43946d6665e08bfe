//! 存活粒子缓冲区
//!
//! 把生成事件变成存活粒子，并按粒子类型的计算参数以固定步长推进。
//! 对应 GPU 上的 compute 阶段，输出可直接上传的实例数据。

use glam::Vec2;

use super::queue::SpawnEvent;
use super::types::{ParticleTypeId, ParticleTypeTable};

/// 固定模拟步长（秒）
pub const SIMULATION_STEP: f32 = 1.0 / 60.0;

/// 单次更新最多推进的步数，超出部分丢弃
const MAX_STEPS_PER_UPDATE: u32 = 8;

/// 默认容量
pub const DEFAULT_MAX_PARTICLES: usize = 1 << 16;

/// GPU 实例数据（对应 WGSL struct）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    pub age: f32,
    pub color: [f32; 4],
}

/// 存活粒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveParticle {
    pub type_id: ParticleTypeId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    /// 湍流个体差异的种子
    pub seed: u32,
}

/// 存活粒子缓冲区
///
/// 容量有限；满时按环形写指针覆盖旧粒子。
#[derive(Debug)]
pub struct ParticleBuffer {
    particles: Vec<LiveParticle>,
    capacity: usize,
    write_index: usize,
    step_accumulator: f32,
    time: f32,
    next_seed: u32,
}

impl ParticleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            particles: Vec::with_capacity(capacity.min(4096)),
            capacity,
            write_index: 0,
            step_accumulator: 0.0,
            time: 0.0,
            next_seed: 0,
        }
    }

    /// 由生成事件创建粒子
    pub fn spawn(&mut self, event: &SpawnEvent) {
        let particle = LiveParticle {
            type_id: event.type_id,
            position: event.position,
            velocity: event.velocity,
            age: event.initial_age,
            seed: self.next_seed,
        };
        self.next_seed = self.next_seed.wrapping_add(1);

        if self.particles.len() < self.capacity {
            self.particles.push(particle);
        } else {
            let index = self.write_index % self.capacity;
            self.particles[index] = particle;
            self.write_index = (index + 1) % self.capacity;
        }
    }

    /// 推进 `dt` 秒，返回执行的步数
    pub fn update(&mut self, dt: f32, types: &ParticleTypeTable) -> u32 {
        self.step_accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.step_accumulator >= SIMULATION_STEP {
            if steps == MAX_STEPS_PER_UPDATE {
                tracing::debug!(
                    target: "particles",
                    "Dropping {:.4}s of particle simulation time",
                    self.step_accumulator
                );
                self.step_accumulator = 0.0;
                break;
            }
            self.step(types);
            self.step_accumulator -= SIMULATION_STEP;
            steps += 1;
        }
        steps
    }

    /// 执行一个固定步
    pub fn step(&mut self, types: &ParticleTypeTable) {
        self.time += SIMULATION_STEP;
        let time = self.time;
        let dt = SIMULATION_STEP;

        for p in &mut self.particles {
            let Some(t) = types.resolve(p.type_id) else {
                // 类型已不存在
                p.age = f32::INFINITY;
                continue;
            };
            let c = &t.compute;

            let noise_t = time * c.turbulence_time_scale + p.seed as f32 * c.turbulence_individuality;
            let turbulence = turbulence_noise(p.position * c.turbulence_noise_scale, noise_t);

            p.velocity += c.force_vec * dt + turbulence * c.turbulence * dt;
            p.velocity *= (1.0 - c.dampening * dt).max(0.0);
            p.position += p.velocity * dt;
            p.age += c.age_delta;
        }

        let before = self.particles.len();
        self.particles.retain(|p| p.age < 1.0);
        if self.particles.len() != before && self.write_index >= self.particles.len() {
            self.write_index = 0;
        }
    }

    /// 生成实例数据
    pub fn instances(&self, types: &ParticleTypeTable) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .filter_map(|p| {
                let t = types.resolve(p.type_id)?;
                Some(ParticleInstance {
                    position: p.position.to_array(),
                    size: t.render.size_at(p.age),
                    age: p.age,
                    color: t.render.color_at(p.age).to_array(),
                })
            })
            .collect()
    }

    pub fn particles(&self) -> &[LiveParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 清空所有粒子
    pub fn clear(&mut self) {
        self.particles.clear();
        self.write_index = 0;
        self.step_accumulator = 0.0;
    }
}

impl Default for ParticleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARTICLES)
    }
}

/// 平滑的伪噪声向量场，分量范围 [-1, 1]
fn turbulence_noise(p: Vec2, t: f32) -> Vec2 {
    let x = (p.y * 1.7 + t * 1.3).sin() + (p.x * 0.9 - t * 0.7).cos() * 0.5;
    let y = (p.x * 1.9 - t * 1.1).cos() + (p.y * 0.8 + t * 0.5).sin() * 0.5;
    Vec2::new(x, y) / 1.5
}
