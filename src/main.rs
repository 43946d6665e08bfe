use lite_particles2d::config::EngineConfig;
use lite_particles2d::core::{Engine, EngineResult};
use lite_particles2d::demo;

fn run() -> EngineResult<()> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::load_or_default()?,
    };
    config.apply_env_overrides();
    Engine::initialize_logging(config.logging.level);

    let frames = config.simulation.frames;
    let dt = config.simulation.fixed_delta;

    let mut engine = Engine::headless(config)?;
    demo::start(&mut engine)?;
    let totals = engine.run_frames(frames, dt)?;

    tracing::info!(
        target: "engine",
        "Rendered {} frames: {} spawned, {} dropped, {} live, {} commands",
        engine.frame_count(),
        totals.spawned,
        totals.dropped,
        totals.live,
        engine.backend().total_commands()
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("lite_particles2d failed: {}", e);
        std::process::exit(1);
    }
}
