//! Particle record stored in the flat particle array

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A single swarm particle
///
/// Six packed floats: position, velocity and the home anchor the particle is
/// leashed to. A particle has no identity beyond its index in the store.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in viewport pixels, y up
    pub position: [f32; 2],
    /// Velocity in pixels per second
    pub velocity: [f32; 2],
    /// Anchor set at spawn, only changed by a full reset
    pub home: [f32; 2],
}

impl Particle {
    /// Spawn a particle whose home is its starting position
    pub fn spawn(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
            home: position.to_array(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }

    pub fn home(&self) -> Vec2 {
        Vec2::from_array(self.home)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position.to_array();
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity.to_array();
    }

    /// True when no component has been poisoned by NaN or infinity
    pub fn is_finite(&self) -> bool {
        self.position().is_finite() && self.velocity().is_finite() && self.home().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_sets_home() {
        let p = Particle::spawn(Vec2::new(4.0, 5.0), Vec2::new(-1.0, 2.0));
        assert_eq!(p.home(), Vec2::new(4.0, 5.0));
        assert_eq!(p.position(), p.home());
        assert_eq!(p.velocity(), Vec2::new(-1.0, 2.0));
    }

    #[test]
    fn test_record_is_six_floats() {
        assert_eq!(std::mem::size_of::<Particle>(), 6 * 4);
        let p = Particle::spawn(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&p));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_non_finite_detected() {
        let mut p = Particle::spawn(Vec2::ZERO, Vec2::ZERO);
        assert!(p.is_finite());
        p.set_velocity(Vec2::new(f32::NAN, 0.0));
        assert!(!p.is_finite());
    }
}
