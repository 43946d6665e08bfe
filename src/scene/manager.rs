//! 场景与场景服务

use bevy_ecs::prelude::*;

use crate::core::random::RangeSampler;
use crate::ecs::TimeDelta;
use crate::render::particles::SpawnQueue;

/// 场景ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(pub u64);

/// 场景：World + 每个 tick 运行一次的系统调度
///
/// 创建时插入 `TimeDelta`、`RangeSampler` 和空的 `SpawnQueue` 资源。
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    world: World,
    schedule: Schedule,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entities", &self.world.entities().len())
            .finish()
    }
}

impl Scene {
    pub fn new(id: SceneId, name: &str, seed: u64) -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta::default());
        world.insert_resource(RangeSampler::new(seed));
        world.insert_resource(SpawnQueue::new());
        Self {
            id,
            name: name.to_string(),
            world,
            schedule: Schedule::default(),
        }
    }

    /// 注册每个 tick 运行的系统
    pub fn add_systems<M>(&mut self, systems: impl IntoSystemConfigs<M>) -> &mut Self {
        self.schedule.add_systems(systems);
        self
    }

    /// 生成实体
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Entity {
        self.world.spawn(bundle).id()
    }

    /// 推进一个 tick
    pub fn tick(&mut self, dt: f32) {
        self.world.resource_mut::<TimeDelta>().advance(dt);
        self.schedule.run(&mut self.world);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn spawn_queue(&self) -> Option<&SpawnQueue> {
        self.world.get_resource::<SpawnQueue>()
    }

    pub fn spawn_queue_mut(&mut self) -> Option<&mut SpawnQueue> {
        self.world.get_resource_mut::<SpawnQueue>().map(Mut::into_inner)
    }

    pub fn entity_count(&self) -> u32 {
        self.world.entities().len()
    }

    pub fn tick_count(&self) -> u64 {
        self.world
            .get_resource::<TimeDelta>()
            .map_or(0, |time| time.tick_count)
    }
}

/// 场景服务，持有当前场景
#[derive(Debug, Default)]
pub struct SceneService {
    current: Option<Scene>,
    next_id: u64,
}

impl SceneService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建新场景（尚未激活）
    pub fn create_scene(&mut self, name: &str, seed: u64) -> Scene {
        self.next_id += 1;
        Scene::new(SceneId(self.next_id), name, seed)
    }

    /// 激活场景，返回被替换的旧场景
    pub fn change_scene(&mut self, scene: Scene) -> Option<Scene> {
        tracing::info!(target: "scene", "Changing scene to '{}' ({:?})", scene.name, scene.id);
        let previous = self.current.replace(scene);
        if let Some(old) = &previous {
            let pending = old.spawn_queue().map_or(0, SpawnQueue::len);
            tracing::debug!(
                target: "scene",
                "Scene '{}' torn down ({} entities, {} pending spawn events)",
                old.name,
                old.entity_count(),
                pending
            );
        }
        previous
    }

    pub fn current(&self) -> Option<&Scene> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        self.current.as_mut()
    }

    /// 卸载当前场景
    pub fn unload(&mut self) -> Option<Scene> {
        self.current.take()
    }
}
