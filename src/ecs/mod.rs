use bevy_ecs::prelude::*;
use glam::Vec2;

/// 实体的世界坐标（2D）
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position2D {
    pub pos: Vec2,
}

impl Position2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}

/// 本次 tick 的时间步长（秒）
#[derive(Resource, Clone, Copy, Debug)]
pub struct TimeDelta {
    pub tick_delta: f32,
    pub elapsed_seconds: f64,
    pub tick_count: u64,
}

impl Default for TimeDelta {
    fn default() -> Self {
        Self {
            tick_delta: 1.0 / 60.0,
            elapsed_seconds: 0.0,
            tick_count: 0,
        }
    }
}

impl TimeDelta {
    /// 推进一个 tick
    pub fn advance(&mut self, delta: f32) {
        self.tick_delta = delta;
        self.elapsed_seconds += delta as f64;
        self.tick_count += 1;
    }
}
