//! 粒子生成队列
//!
//! 模拟阶段写入、渲染阶段一次性读取并清空。两个阶段严格按顺序执行，不需要加锁。
//!
//! 队列没有容量上限：如果发射器配置异常且长时间未被 drain，队列会持续增长，
//! 这里不做截断。

use bevy_ecs::prelude::*;
use glam::Vec2;

use super::types::ParticleTypeId;

/// 生成一个粒子的完整请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnEvent {
    pub type_id: ParticleTypeId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub initial_age: f32,
}

/// 生成事件队列（场景资源）
#[derive(Resource, Debug, Default)]
pub struct SpawnQueue {
    events: Vec<SpawnEvent>,
    total_pushed: u64,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到队尾
    pub fn push(&mut self, event: SpawnEvent) {
        self.events.push(event);
        self.total_pushed += 1;
    }

    /// 按插入顺序取出全部事件，队列随即为空
    pub fn drain(&mut self) -> std::vec::Drain<'_, SpawnEvent> {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 查看未处理的事件
    pub fn pending(&self) -> &[SpawnEvent] {
        &self.events
    }

    /// 自创建以来推入的事件总数
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(i: u32) -> SpawnEvent {
        SpawnEvent {
            type_id: ParticleTypeId(i),
            position: Vec2::new(i as f32, 0.0),
            velocity: Vec2::ZERO,
            initial_age: 0.0,
        }
    }

    #[test]
    fn test_drain_returns_push_order_and_empties() {
        let mut queue = SpawnQueue::new();
        for i in 0..10 {
            queue.push(event(i));
        }
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 10);
        for (i, e) in drained.iter().enumerate() {
            assert_eq!(e.type_id, ParticleTypeId(i as u32));
        }
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 10);
    }

    #[test]
    fn test_no_deduplication() {
        let mut queue = SpawnQueue::new();
        queue.push(event(1));
        queue.push(event(1));
        assert_eq!(queue.drain().count(), 2);
    }

    #[test]
    fn test_drain_empty_queue() {
        let mut queue = SpawnQueue::new();
        assert_eq!(queue.drain().count(), 0);
    }
}
