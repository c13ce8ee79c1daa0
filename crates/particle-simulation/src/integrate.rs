//! Per-partition time step
//!
//! Particles never interact with each other; each one is advanced from its
//! own state, the frame's attractors and its home anchor.

use crate::grid::DensityGrid;
use crate::params::ForceParams;
use glam::Vec2;
use particle_physics::{square_restoring_force, Particle};
use std::sync::Arc;

/// Everything a worker needs for one frame, built once and shared by all
#[derive(Clone)]
pub struct FrameUpdate {
    pub frame: u64,
    /// Seconds since the previous frame, already clamped
    pub delta: f32,
    pub width: u32,
    pub height: u32,
    pub attractors: Vec<Vec2>,
    /// Grid in the active role for this frame
    pub grid: Arc<DensityGrid>,
}

/// Advance every particle in `particles` by one frame and scatter the new
/// positions into the frame's grid
///
/// Returns how many particles landed inside the viewport.
pub fn integrate_range(particles: &mut [Particle], update: &FrameUpdate, params: &ForceParams) -> usize {
    debug_assert_eq!(update.grid.width(), update.width);
    debug_assert_eq!(update.grid.height(), update.height);

    let delta = update.delta;
    let decay = 1.0 / (1.0 + delta * params.decay_rate);

    let mut deposited = 0;
    for particle in particles.iter_mut() {
        let position = step_particle(particle, &update.attractors, delta, decay, params);
        if update.grid.deposit(position) {
            deposited += 1;
        }
    }
    deposited
}

/// Semi-implicit Euler step for a single particle, returning its new position
#[inline]
pub fn step_particle(
    particle: &mut Particle,
    attractors: &[Vec2],
    delta: f32,
    decay: f32,
    params: &ForceParams,
) -> Vec2 {
    let position = particle.position();
    let mut velocity = particle.velocity() * decay;

    for &target in attractors {
        let force = params.attractor_law.force(
            target,
            position,
            params.attractor_strength,
            params.attractor_cap,
            params.min_distance,
        );
        velocity += force * delta * params.attractor_gain;
    }

    let leash = square_restoring_force(particle.home(), position, params.home_dead_zone, params.home_cap);
    velocity += leash * delta * params.home_gain;

    let next = position + velocity * delta;

    // A non-finite particle would drop out of every future grid
    if !(next.is_finite() && velocity.is_finite()) {
        particle.set_velocity(Vec2::ZERO);
        return position;
    }

    particle.set_velocity(velocity);
    particle.set_position(next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OverflowPolicy;
    use proptest::prelude::*;

    fn update(delta: f32, width: u32, height: u32, attractors: Vec<Vec2>) -> FrameUpdate {
        FrameUpdate {
            frame: 0,
            delta,
            width,
            height,
            attractors,
            grid: Arc::new(DensityGrid::new(width, height, OverflowPolicy::Wrap)),
        }
    }

    fn forces_off() -> ForceParams {
        ForceParams {
            decay_rate: 0.0,
            attractor_strength: 0.0,
            home_gain: 0.0,
            ..ForceParams::default()
        }
    }

    #[test]
    fn test_symmetric_pull_toward_attractor() {
        let mut particles = vec![Particle::spawn(Vec2::ZERO, Vec2::ZERO); 4];
        let frame = update(0.1, 200, 200, vec![Vec2::new(100.0, 100.0)]);

        let deposited = integrate_range(&mut particles, &frame, &ForceParams::default());
        assert_eq!(deposited, 4);

        let v0 = particles[0].velocity();
        assert!(v0.x > 0.0 && (v0.x - v0.y).abs() < 1e-3);
        // Capped at 1200, scaled by delta and gain: 1200 * 0.1 * 3
        assert!((v0.length() - 360.0).abs() < 1e-2);

        for p in &particles {
            assert_eq!(p.velocity(), v0);
        }

        let cell = particles[0].position();
        assert_eq!(frame.grid.count(cell.x as u32, cell.y as u32), Some(4));
        assert_eq!(frame.grid.total(), 4);
    }

    #[test]
    fn test_particle_at_home_stays_put() {
        let home = Vec2::new(50.0, 60.0);
        let mut particles = vec![Particle::spawn(home, Vec2::ZERO)];
        let frame = update(1.0 / 60.0, 100, 100, Vec::new());

        for _ in 0..200 {
            integrate_range(&mut particles, &frame, &ForceParams::default());
        }
        assert_eq!(particles[0].position(), home);
        assert_eq!(particles[0].velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_velocity_decays_monotonically_inside_dead_zone() {
        let home = Vec2::new(50.0, 50.0);
        let mut particles = vec![Particle::spawn(home, Vec2::new(0.2, 0.0))];
        let frame = update(1.0 / 60.0, 100, 100, Vec::new());

        let mut speed = particles[0].velocity().length();
        for _ in 0..300 {
            integrate_range(&mut particles, &frame, &ForceParams::default());
            let next = particles[0].velocity().length();
            assert!(next < speed);
            speed = next;
        }
        assert!(particles[0].position().distance(home) < ForceParams::default().home_dead_zone);
        assert!(speed < 0.2 * 0.01);
    }

    #[test]
    fn test_displaced_particle_returns_home() {
        let home = Vec2::new(50.0, 50.0);
        let mut particle = Particle::spawn(home, Vec2::ZERO);
        particle.set_position(home + Vec2::new(10.0, 0.0));
        let mut particles = vec![particle];
        let frame = update(1.0 / 60.0, 100, 100, Vec::new());

        for _ in 0..600 {
            integrate_range(&mut particles, &frame, &ForceParams::default());
            assert!(particles[0].is_finite());
            assert!(particles[0].position().distance(home) < 15.0);
        }
        assert!(particles[0].position().distance(home) < 5.0);
    }

    #[test]
    fn test_particle_on_attractor_stays_finite() {
        let target = Vec2::new(20.0, 20.0);
        let mut particles = vec![Particle::spawn(target, Vec2::ZERO)];
        let frame = update(0.1, 100, 100, vec![target]);

        integrate_range(&mut particles, &frame, &ForceParams::default());
        assert!(particles[0].is_finite());
        assert_eq!(particles[0].position(), target);
    }

    #[test]
    fn test_outside_particles_still_move() {
        let mut particles = vec![Particle::spawn(Vec2::new(-10.0, 5.0), Vec2::new(5.0, 0.0))];
        let frame = update(0.1, 100, 100, Vec::new());

        let deposited = integrate_range(&mut particles, &frame, &forces_off());
        assert_eq!(deposited, 0);
        assert!(frame.grid.is_clear());
        assert_eq!(particles[0].position(), Vec2::new(-9.5, 5.0));
    }

    #[test]
    fn test_inverse_cube_law_is_used() {
        let params = ForceParams::default().with_inverse_cube();
        let mut square = vec![Particle::spawn(Vec2::ZERO, Vec2::ZERO)];
        let mut cube = square.clone();
        let target = vec![Vec2::new(600.0, 0.0)];
        let frame = update(0.01, 1000, 10, target);

        integrate_range(&mut square, &frame, &ForceParams::default());
        integrate_range(&mut cube, &frame, &params);
        assert!(cube[0].velocity().x < square[0].velocity().x);
    }

    proptest! {
        #[test]
        fn grid_sum_equals_particle_count(
            positions in prop::collection::vec((0.0f32..63.99, 0.0f32..47.99), 1..500),
        ) {
            let mut particles: Vec<Particle> = positions
                .iter()
                .map(|&(x, y)| Particle::spawn(Vec2::new(x, y), Vec2::ZERO))
                .collect();
            let frame = update(0.05, 64, 48, Vec::new());

            let deposited = integrate_range(&mut particles, &frame, &forces_off());
            prop_assert_eq!(deposited, particles.len());
            prop_assert_eq!(frame.grid.total(), particles.len() as u64);
        }
    }
}
