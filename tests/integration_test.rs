use glam::Vec2;
use lite_particles2d::config::EngineConfig;
use lite_particles2d::core::Engine;
use lite_particles2d::demo::{self, FADE_DEMO_NAME, GAME_VIEW};
use lite_particles2d::ecs::Position2D;
use lite_particles2d::render::graph::RenderTask;
use lite_particles2d::render::particles::{
    particle_emitter_system, ParticleEmitter2D, ParticleTypeId, SpawnEvent,
};
use lite_particles2d::render::targets::WindowSize;
use lite_particles2d::scene::SceneService;

const DT: f32 = 1.0 / 60.0;

fn demo_engine() -> Engine {
    let mut engine = Engine::headless(EngineConfig::default()).unwrap();
    demo::start(&mut engine).unwrap();
    engine
}

fn record_events(seed: u64, deltas: &[f32]) -> Vec<SpawnEvent> {
    let mut service = SceneService::new();
    let mut scene = service.create_scene("determinism", seed);
    scene.add_systems(particle_emitter_system);
    scene.spawn((Position2D::new(0.0, -20.0), demo::default_emitter()));
    scene.spawn((
        Position2D::new(10.0, 5.0),
        demo::default_emitter().with_rate(13.5).with_count(0, 5),
    ));

    let mut events = Vec::new();
    for &dt in deltas {
        scene.tick(dt);
        events.extend(scene.spawn_queue_mut().unwrap().drain());
    }
    events
}

#[test]
fn test_same_seed_reproduces_spawn_events() {
    let deltas: Vec<f32> = (0..240).map(|i| 0.004 + (i % 7) as f32 * 0.003).collect();
    let a = record_events(42, &deltas);
    let b = record_events(42, &deltas);
    assert!(!a.is_empty());
    assert_eq!(a, b);

    let c = record_events(43, &deltas);
    assert_ne!(a, c);
}

#[test]
fn test_demo_frame_command_sequence() -> anyhow::Result<()> {
    let mut engine = demo_engine();
    let totals = engine.run_frames(60, DT)?;

    assert_eq!(engine.frame_count(), 60);
    assert!(totals.spawned >= 59 && totals.spawned <= 120);
    assert_eq!(totals.dropped, 0);
    assert!(totals.live > 0 && totals.live <= totals.spawned);
    assert_eq!(totals.tasks_executed, 60 * 5);

    let frame = engine
        .backend()
        .last_frame()
        .ok_or_else(|| anyhow::anyhow!("no frame recorded"))?;
    let kinds = frame.kinds();
    // clear + draw + 4 * 9 bloom passes + composite + overlay
    assert_eq!(kinds.len(), 40);
    assert_eq!(&kinds[..3], &["clear", "draw_particles", "extract"]);
    assert_eq!(&kinds[38..], &["composite", "overlay"]);
    assert_eq!(frame.commands[0].target(), GAME_VIEW);
    assert_eq!(frame.commands[39].target(), "display");
    Ok(())
}

#[test]
fn test_unregistered_type_is_dropped_and_reported() {
    let mut engine = demo_engine();
    engine.scene_mut().unwrap().spawn((
        Position2D::new(0.0, 0.0),
        ParticleEmitter2D::new("missing::type")
            .with_rate(60.0)
            .with_count(3, 3),
    ));

    let totals = engine.run_frames(10, DT).unwrap();
    assert!(totals.dropped >= 27);
    assert!(totals.spawned > 0);
    assert!(engine.scene().unwrap().spawn_queue().unwrap().is_empty());
    assert!(engine
        .particle_types()
        .resolve(ParticleTypeId::from_name(FADE_DEMO_NAME))
        .is_some());
}

#[test]
fn test_zero_rate_emitter_never_enqueues() {
    let mut engine = Engine::headless(EngineConfig::default()).unwrap();
    demo::setup_particle_types(engine.particle_types_mut()).unwrap();
    demo::setup_render_pipeline(&mut engine).unwrap();

    let mut scene = engine.create_scene("idle");
    scene.add_systems(particle_emitter_system);
    scene.spawn((
        Position2D::new(0.0, 0.0),
        demo::default_emitter().with_rate(0.0),
    ));
    engine.change_scene(scene);

    let totals = engine.run_frames(30, 0.5).unwrap();
    assert_eq!(totals.spawned, 0);
    assert_eq!(totals.live, 0);
    assert_eq!(engine.scene().unwrap().spawn_queue().unwrap().total_pushed(), 0);
}

#[test]
fn test_scene_change_discards_queue_and_tasks() {
    let mut engine = demo_engine();
    engine.run_frames(30, DT).unwrap();

    // 未经渲染的 tick 会在队列中留下事件
    engine.scene_mut().unwrap().tick(0.25);
    assert!(!engine.scene().unwrap().spawn_queue().unwrap().is_empty());
    let old_scene = engine.scene().unwrap().id;

    demo::start(&mut engine).unwrap();

    let scene = engine.scene().unwrap();
    assert_ne!(scene.id, old_scene);
    assert!(scene.spawn_queue().unwrap().is_empty());
    assert_eq!(engine.pipeline().len(), 5);
    for task in engine.pipeline().tasks() {
        if let RenderTask::ParticleRender(task) = task {
            assert!(task.buffer().is_empty());
        }
    }
}

#[test]
fn test_long_frame_preserves_bursts() {
    let mut engine = demo_engine();
    let stats = engine.frame(0.5).unwrap();
    // 60 burst/s * 0.5s，每次 1-2 个粒子
    assert!(stats.spawned >= 29 && stats.spawned <= 60);
}

#[test]
fn test_resize_updates_auto_resizing_targets() -> anyhow::Result<()> {
    let mut engine = demo_engine();
    engine.resize(WindowSize::new(640, 360))?;

    let resources = engine.resources();
    assert_eq!(resources.target_size(GAME_VIEW)?, (640, 360));
    assert_eq!(resources.target_size("display")?, (640, 360));
    assert_eq!(resources.target_size("bloom_0")?, (320, 180));
    assert_eq!(resources.target_size("blur_tmp1")?, (320, 180));

    engine.frame(DT)?;
    assert_eq!(
        engine.backend().last_frame().map(|f| f.window),
        Some(WindowSize::new(640, 360))
    );
    Ok(())
}

#[test]
fn test_particles_drift_upward_from_emitter() {
    let mut engine = demo_engine();
    engine.run_frames(20, DT).unwrap();
    let frame = engine.backend().last_frame().unwrap();
    let instances = frame
        .commands
        .iter()
        .find_map(|c| match c {
            lite_particles2d::render::RenderCommand::DrawParticles { instances, .. } => {
                Some(instances)
            }
            _ => None,
        })
        .unwrap();
    assert!(!instances.is_empty());
    let origin = Vec2::new(0.0, -20.0);
    for instance in instances {
        let p = Vec2::from(instance.position);
        assert!(p.distance(origin) < 10.0);
        assert!(instance.age < 1.0);
    }
}
