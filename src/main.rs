//! Particle Swarm
//!
//! Headless driver: runs the CPU particle swarm at display rate, steers it
//! with a scripted pointer and writes the last heat-map frame to a PNG.

use glam::Vec2;
use particle_renderer::HeatmapRenderer;
use particle_simulation::{
    env_var, DensityRenderer, FramePacer, ParticleSimulation, PointerEvent, PointerInput,
    SimulationConfig,
};
use std::error::Error;
use std::time::{Duration, Instant};

const REFRESH_HZ: f32 = 60.0;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_SNAPSHOT: &str = "swarm.png";
/// Frames per pointer gesture
const GESTURE_FRAMES: u64 = 180;

/// Scripted stand-in for a user: a held mouse circling the center, then a
/// two-finger touch, then nothing while the swarm relaxes home.
fn pointer_script(frame: u64, width: f32, height: f32) -> Vec<PointerEvent> {
    let center = Vec2::new(width, height) * 0.5;
    let radius = width.min(height) * 0.3;
    let angle = frame as f32 / GESTURE_FRAMES as f32 * std::f32::consts::TAU;
    let orbit = center + Vec2::new(angle.cos(), angle.sin()) * radius;

    match (frame / GESTURE_FRAMES, frame % GESTURE_FRAMES) {
        (0, 0) => vec![PointerEvent::MouseDown { x: orbit.x, y: orbit.y }],
        (0, _) => vec![PointerEvent::MouseMove { x: orbit.x, y: orbit.y }],
        (1, 0) => vec![
            PointerEvent::MouseUp,
            PointerEvent::TouchStart(vec![orbit, 2.0 * center - orbit]),
        ],
        (1, _) => vec![PointerEvent::TouchMove(vec![orbit, 2.0 * center - orbit])],
        (2, 0) => vec![PointerEvent::TouchEnd],
        _ => Vec::new(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting particle swarm...");

    let config = SimulationConfig::from_env()?;
    let frames: u64 = env_var("SWARM_FRAMES")?.unwrap_or(DEFAULT_FRAMES);
    let snapshot: String =
        env_var("SWARM_SNAPSHOT")?.unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string());

    let mut sim = ParticleSimulation::new(config)?;
    log::info!("✓ Simulation initialized");

    let mut renderer = HeatmapRenderer::new(sim.width(), sim.height());
    log::info!("✓ Renderer initialized");

    let mut input = PointerInput::new(sim.height());
    let mut pacer = FramePacer::new(REFRESH_HZ);

    let mut fps_frames = 0u32;
    let mut fps_timer = Instant::now();
    let mut sim_time = Duration::ZERO;

    for frame in 0..frames {
        for event in pointer_script(frame, sim.width() as f32, sim.height() as f32) {
            input.handle(event);
        }
        sim.set_attractors(input.attractors().iter().copied());

        let now = pacer.wait();
        let stats = sim.advance(now, &mut renderer)?;

        fps_frames += 1;
        sim_time += stats.simulate_time;
        let elapsed = fps_timer.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::info!(
                "FPS: {:.1} | sim: {:.2?}/frame | in view: {}/{} | attractors: {}",
                fps_frames as f32 / elapsed.as_secs_f32(),
                sim_time / fps_frames,
                stats.particles_in_view,
                sim.particle_count(),
                sim.attractors().len()
            );
            fps_frames = 0;
            sim_time = Duration::ZERO;
            fps_timer = Instant::now();
        }
    }

    // The last frame's counts are still settled; render them once more
    renderer.render(sim.settled_grid());
    renderer.save_png(&snapshot)?;

    log::info!("✓ Finished after {} frames", sim.frame());
    Ok(())
}
