//! 粒子发射器组件和发射系统
//!
//! 每个 tick：`age += age_delta * dt`，每当 `age >= 1` 发射一次 burst 并减 1。
//! 这是定点累加器，发射频率与帧率无关；一次长帧会在同一 tick 内补齐多次 burst。
//! 单个 tick 最多发射 [`MAX_BURSTS_PER_TICK`] 次，超出部分丢弃并记录警告。

use std::f32::consts::TAU;

use bevy_ecs::prelude::*;
use glam::Vec2;

use super::queue::{SpawnEvent, SpawnQueue};
use super::types::ParticleTypeId;
use crate::core::random::{RangeSampler, ScalarRange2};
use crate::ecs::{Position2D, TimeDelta};

/// 单个 tick 的 burst 上限
pub const MAX_BURSTS_PER_TICK: u32 = 1 << 20;

// ============================================================================
// 粒子发射器组件
// ============================================================================

/// 粒子发射器组件
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ParticleEmitter2D {
    /// 累加器，`>= 1` 时发射
    pub age: f32,
    /// 每秒 burst 次数
    pub age_delta: f32,
    /// 每次 burst 的粒子数（闭区间）
    pub particle_count: ScalarRange2<u16>,
    /// 粒子类型
    pub particle_type: ParticleTypeId,
    /// 相对实体位置的偏移
    pub pos_x: ScalarRange2<f32>,
    pub pos_y: ScalarRange2<f32>,
    /// 方向，0-1 映射到 [0, 2π)
    pub dir: ScalarRange2<f32>,
    /// 初速度大小
    pub dir_force: ScalarRange2<f32>,
    /// 粒子初始年龄
    pub initial_age: ScalarRange2<f32>,
    /// 是否启用
    pub enabled: bool,
}

impl Default for ParticleEmitter2D {
    fn default() -> Self {
        Self {
            age: 0.0,
            age_delta: 1.0,
            particle_count: ScalarRange2::constant(1),
            particle_type: ParticleTypeId::from_name(""),
            pos_x: ScalarRange2::constant(0.0),
            pos_y: ScalarRange2::constant(0.0),
            dir: ScalarRange2::constant(0.0),
            dir_force: ScalarRange2::constant(0.0),
            initial_age: ScalarRange2::constant(0.0),
            enabled: true,
        }
    }
}

impl ParticleEmitter2D {
    pub fn new(particle_type: &str) -> Self {
        Self {
            particle_type: ParticleTypeId::from_name(particle_type),
            ..Default::default()
        }
    }

    /// 设置发射速率（每秒 burst 次数）
    pub fn with_rate(mut self, age_delta: f32) -> Self {
        self.age_delta = age_delta;
        self
    }

    /// 设置每次 burst 的粒子数
    pub fn with_count(mut self, min: u16, max: u16) -> Self {
        self.particle_count = ScalarRange2::new(min, max);
        self
    }

    /// 设置位置偏移
    pub fn with_offset(mut self, x: ScalarRange2<f32>, y: ScalarRange2<f32>) -> Self {
        self.pos_x = x;
        self.pos_y = y;
        self
    }

    /// 设置方向范围（0-1）
    pub fn with_direction(mut self, min: f32, max: f32) -> Self {
        self.dir = ScalarRange2::new(min, max);
        self
    }

    /// 设置初速度范围
    pub fn with_force(mut self, min: f32, max: f32) -> Self {
        self.dir_force = ScalarRange2::new(min, max);
        self
    }

    /// 设置初始年龄范围
    pub fn with_initial_age(mut self, min: f32, max: f32) -> Self {
        self.initial_age = ScalarRange2::new(min, max);
        self
    }

    /// 推进累加器，返回本 tick 应发射的 burst 数
    ///
    /// `dt` 必须非负，由调用方保证。
    pub fn advance(&mut self, dt: f32) -> u32 {
        debug_assert!(dt >= 0.0, "negative tick delta: {dt}");
        if !self.enabled {
            return 0;
        }

        self.age += self.age_delta * dt;
        if !self.age.is_finite() {
            tracing::warn!(
                target: "particles",
                "Emitter accumulator is not finite (age_delta = {}), resetting",
                self.age_delta
            );
            self.age = 0.0;
            return 0;
        }

        let whole = self.age.floor();
        if whole < 1.0 {
            return 0;
        }
        self.age -= whole;
        if whole > MAX_BURSTS_PER_TICK as f32 {
            tracing::warn!(
                target: "particles",
                "Emitter owes {} bursts this tick, emitting {}",
                whole,
                MAX_BURSTS_PER_TICK
            );
            return MAX_BURSTS_PER_TICK;
        }
        whole as u32
    }

    /// 发射一次 burst，返回生成的事件数
    pub fn emit_burst(
        &self,
        origin: Vec2,
        sampler: &mut RangeSampler,
        queue: &mut SpawnQueue,
    ) -> usize {
        let count = sampler.range(&self.particle_count) as usize;
        for _ in 0..count {
            let dir = direction_angle(sampler.range(&self.dir));
            let force = sampler.range(&self.dir_force);
            let offset = Vec2::new(sampler.range(&self.pos_x), sampler.range(&self.pos_y));
            let initial_age = sampler.range(&self.initial_age);

            queue.push(SpawnEvent {
                type_id: self.particle_type,
                position: origin + offset,
                velocity: Vec2::new(dir.cos(), dir.sin()) * force,
                initial_age,
            });
        }
        count
    }

    /// 一个完整 tick：推进累加器并发射所有 burst
    ///
    /// 返回 (burst 数, 事件数)。类型是否已注册不在这里检查，留到渲染阶段。
    pub fn update(
        &mut self,
        origin: Vec2,
        dt: f32,
        sampler: &mut RangeSampler,
        queue: &mut SpawnQueue,
    ) -> (u32, usize) {
        let bursts = self.advance(dt);
        let mut spawned = 0;
        for _ in 0..bursts {
            spawned += self.emit_burst(origin, sampler, queue);
        }
        (bursts, spawned)
    }

    /// 重置累加器
    pub fn reset(&mut self) {
        self.age = 0.0;
    }
}

/// 把 0-1 的方向映射到 [0, 2π)
pub fn direction_angle(unit: f32) -> f32 {
    let angle = (unit * TAU).rem_euclid(TAU);
    // 极小的负数经 rem_euclid 会舍入到 TAU
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

// ============================================================================
// ECS 系统
// ============================================================================

/// 粒子发射系统
pub fn particle_emitter_system(
    time: Res<TimeDelta>,
    mut sampler: ResMut<RangeSampler>,
    mut queue: ResMut<SpawnQueue>,
    mut emitters: Query<(&Position2D, &mut ParticleEmitter2D)>,
) {
    let dt = time.tick_delta;
    let mut total = 0;
    for (pos, mut emitter) in emitters.iter_mut() {
        let (_, spawned) = emitter.update(pos.pos, dt, &mut sampler, &mut queue);
        total += spawned;
    }
    if total > 0 {
        tracing::trace!(target: "particles", "Queued {} spawn events", total);
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_emitter() -> ParticleEmitter2D {
        ParticleEmitter2D::new("MM::fade_demo")
            .with_rate(60.0)
            .with_count(1, 2)
            .with_direction(0.0, 1.0)
            .with_force(0.0, 2.0)
            .with_initial_age(0.0, 0.2)
    }

    #[test]
    fn test_one_burst_per_tick_at_matching_rate() {
        let mut emitter = demo_emitter();
        let mut sampler = RangeSampler::new(42);
        let mut queue = SpawnQueue::new();

        // 1/60 的累加误差可能让某个 tick 少发射一次，下一个 tick 补回
        let mut total_bursts = 0;
        for _ in 0..600 {
            let (bursts, spawned) =
                emitter.update(Vec2::new(0.0, -20.0), 1.0 / 60.0, &mut sampler, &mut queue);
            assert!(bursts <= 2);
            assert!(spawned >= bursts as usize && spawned <= 2 * bursts as usize);
            total_bursts += bursts;
        }
        assert!((599..=600).contains(&total_bursts));

        for event in queue.drain() {
            let speed = event.velocity.length();
            assert!(speed <= 2.0 + 1e-5);
            assert!((0.0..=0.2).contains(&event.initial_age));
            assert_eq!(event.position, Vec2::new(0.0, -20.0));
        }
    }

    #[test]
    fn test_zero_rate_never_emits() {
        let mut emitter = demo_emitter().with_rate(0.0);
        let mut sampler = RangeSampler::new(1);
        let mut queue = SpawnQueue::new();
        for _ in 0..100 {
            emitter.update(Vec2::ZERO, 10.0, &mut sampler, &mut queue);
        }
        assert!(queue.is_empty());
        assert_eq!(emitter.age, 0.0);
    }

    #[test]
    fn test_long_frame_emits_multiple_bursts() {
        let mut emitter = demo_emitter().with_rate(10.0).with_count(1, 1);
        let mut sampler = RangeSampler::new(1);
        let mut queue = SpawnQueue::new();
        let (bursts, spawned) = emitter.update(Vec2::ZERO, 0.55, &mut sampler, &mut queue);
        assert_eq!(bursts, 5);
        assert_eq!(spawned, 5);
        assert!((emitter.age - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_huge_rate_terminates_with_capped_bursts() {
        let mut emitter = ParticleEmitter2D::new("t").with_rate(2.0e7).with_count(0, 0);
        let mut sampler = RangeSampler::new(1);
        let mut queue = SpawnQueue::new();
        let (bursts, spawned) = emitter.update(Vec2::ZERO, 1.0, &mut sampler, &mut queue);
        assert_eq!(bursts, MAX_BURSTS_PER_TICK);
        assert_eq!(spawned, 0);
        assert!((0.0..1.0).contains(&emitter.age));

        let mut emitter = ParticleEmitter2D::new("t").with_rate(5000.0);
        assert_eq!(emitter.advance(1.0), 5000);
        assert_eq!(emitter.age, 0.0);
    }

    #[test]
    fn test_direction_angle_stays_below_tau() {
        assert_eq!(direction_angle(-1.0e-9), 0.0);
        assert!(direction_angle(-0.25) >= 0.0 && direction_angle(-0.25) < TAU);
        assert_eq!(direction_angle(1.0), 0.0);
        assert!((direction_angle(0.5) - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_ranges_are_constant() {
        let emitter = ParticleEmitter2D::new("t")
            .with_count(3, 3)
            .with_direction(0.25, 0.25)
            .with_force(2.0, 2.0)
            .with_initial_age(0.1, 0.1)
            .with_offset(ScalarRange2::constant(1.0), ScalarRange2::constant(-1.0));
        let mut sampler = RangeSampler::new(9);
        let mut queue = SpawnQueue::new();
        assert_eq!(emitter.emit_burst(Vec2::ZERO, &mut sampler, &mut queue), 3);
        for event in queue.drain() {
            assert_eq!(event.position, Vec2::new(1.0, -1.0));
            assert!((event.velocity - Vec2::new(0.0, 2.0)).length() < 1e-5);
            assert_eq!(event.initial_age, 0.1);
        }
    }

    #[test]
    fn test_disabled_emitter_does_not_accumulate() {
        let mut emitter = demo_emitter();
        emitter.enabled = false;
        assert_eq!(emitter.advance(1.0), 0);
        assert_eq!(emitter.age, 0.0);
    }

    #[test]
    fn test_infinite_rate_is_reset() {
        let mut emitter = demo_emitter().with_rate(f32::INFINITY);
        assert_eq!(emitter.advance(1.0), 0);
        assert_eq!(emitter.age, 0.0);
    }

    #[test]
    fn test_emitter_system_runs_in_world() {
        let mut world = World::new();
        world.insert_resource(TimeDelta::default());
        world.insert_resource(RangeSampler::new(42));
        world.insert_resource(SpawnQueue::new());
        world.spawn((Position2D::new(0.0, -20.0), demo_emitter()));

        let mut schedule = Schedule::default();
        schedule.add_systems(particle_emitter_system);
        for _ in 0..10 {
            schedule.run(&mut world);
        }
        let queue = world.resource::<SpawnQueue>();
        assert!(queue.len() >= 9);
        assert!(queue.pending().iter().all(|e| e.position == Vec2::new(0.0, -20.0)));
    }
}
