//! Force laws acting on a single particle
//!
//! Every law is a pure function of two points. Nothing is accumulated between
//! calls, so workers evaluate them on their own stacks with no shared scratch.

use glam::Vec2;

/// Shape of the pull an attractor exerts on nearby particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttractorLaw {
    /// F = min(cap, strength / d²)
    #[default]
    InverseSquare,
    /// F = min(cap, strength / d³), a tighter, more local pull
    InverseCube,
}

impl AttractorLaw {
    /// Evaluate the law for a particle at `probe` pulled toward `target`
    #[inline]
    pub fn force(self, target: Vec2, probe: Vec2, strength: f32, cap: f32, min_distance: f32) -> Vec2 {
        match self {
            Self::InverseSquare => inverse_square_force(target, probe, strength, cap, min_distance),
            Self::InverseCube => inverse_cube_force(target, probe, strength, cap, min_distance),
        }
    }
}

/// Calculate the attraction of `probe` toward `target`
/// F = min(cap, strength / d²)
///
/// The distance used for the magnitude never drops below `min_distance`. When
/// both points coincide exactly there is no direction to pull in and the
/// result is zero.
#[inline]
pub fn inverse_square_force(
    target: Vec2,
    probe: Vec2,
    strength: f32,
    cap: f32,
    min_distance: f32,
) -> Vec2 {
    let r_vec = target - probe;
    let r = r_vec.length().max(min_distance);

    let force_magnitude = (strength / (r * r)).min(cap);
    r_vec.normalize_or_zero() * force_magnitude
}

/// Calculate the attraction of `probe` toward `target`
/// F = min(cap, strength / d³)
#[inline]
pub fn inverse_cube_force(
    target: Vec2,
    probe: Vec2,
    strength: f32,
    cap: f32,
    min_distance: f32,
) -> Vec2 {
    let r_vec = target - probe;
    let r = r_vec.length().max(min_distance);

    let force_magnitude = (strength / (r * r * r)).min(cap);
    r_vec.normalize_or_zero() * force_magnitude
}

/// Calculate the leash pulling `probe` back toward its `home` anchor
/// F = min(cap, d²) once d reaches `dead_zone`, zero inside it
#[inline]
pub fn square_restoring_force(home: Vec2, probe: Vec2, dead_zone: f32, cap: f32) -> Vec2 {
    let r_vec = home - probe;
    let r = r_vec.length();

    if r < dead_zone {
        return Vec2::ZERO;
    }

    let force_magnitude = (r * r).min(cap);
    r_vec.normalize_or_zero() * force_magnitude
}
