//! Density grids and their double-buffer lifecycle
//!
//! A grid is a `width × height` array of 8-bit counters, one per device pixel,
//! row 0 at the bottom of the viewport. Every worker may increment any cell
//! during a frame, so cells are atomics updated with relaxed ordering; the
//! frame barrier orders those writes before anyone reads the grid.

use glam::Vec2;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// What a counter does when a 256th particle lands in its cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Roll over to zero
    #[default]
    Wrap,
    /// Stick at 255
    Saturate,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" => Ok(Self::Wrap),
            "saturate" => Ok(Self::Saturate),
            other => Err(format!("unknown overflow policy `{other}`")),
        }
    }
}

pub struct DensityGrid {
    width: u32,
    height: u32,
    policy: OverflowPolicy,
    cells: Box<[AtomicU8]>,
}

impl DensityGrid {
    pub fn new(width: u32, height: u32, policy: OverflowPolicy) -> Self {
        let cells = (0..width as usize * height as usize)
            .map(|_| AtomicU8::new(0))
            .collect();

        Self {
            width,
            height,
            policy,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Count one particle at `position`
    ///
    /// Returns false, leaving the grid untouched, when the position falls
    /// outside `[0, width) × [0, height)` or is not a number.
    #[inline]
    pub fn deposit(&self, position: Vec2) -> bool {
        let (w, h) = (self.width as f32, self.height as f32);
        if !(position.x >= 0.0 && position.x < w && position.y >= 0.0 && position.y < h) {
            return false;
        }

        // Truncation toward zero; the bounds check above makes it a floor
        let x = position.x as usize;
        let y = position.y as usize;
        if x >= self.width as usize || y >= self.height as usize {
            return false;
        }

        self.increment(y * self.width as usize + x);
        true
    }

    #[inline]
    fn increment(&self, index: usize) {
        let cell = &self.cells[index];
        match self.policy {
            OverflowPolicy::Wrap => {
                cell.fetch_add(1, Ordering::Relaxed);
            }
            OverflowPolicy::Saturate => {
                let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| c.checked_add(1));
            }
        }
    }

    /// Counter at cell `(x, y)`
    pub fn count(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        Some(self.cells[index].load(Ordering::Relaxed))
    }

    /// Counters in row-major order
    pub fn counts(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed))
    }

    /// Sum of every counter
    pub fn total(&self) -> u64 {
        self.counts().map(u64::from).sum()
    }

    /// Reset every counter to zero
    pub fn clear(&self) {
        for cell in self.cells.iter() {
            cell.store(0, Ordering::Relaxed);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.counts().all(|c| c == 0)
    }
}

/// Two same-sized grids alternating between the active and settled roles
pub struct DensityBuffers {
    grids: [Arc<DensityGrid>; 2],
    active: usize,
}

impl DensityBuffers {
    pub fn new(width: u32, height: u32, policy: OverflowPolicy) -> Self {
        Self {
            grids: [
                Arc::new(DensityGrid::new(width, height, policy)),
                Arc::new(DensityGrid::new(width, height, policy)),
            ],
            active: 0,
        }
    }

    pub fn active(&self) -> &Arc<DensityGrid> {
        &self.grids[self.active]
    }

    pub fn settled(&self) -> &Arc<DensityGrid> {
        &self.grids[1 - self.active]
    }

    /// The freshly filled active grid becomes settled, the drained settled
    /// grid becomes active
    pub fn swap(&mut self) {
        self.active = 1 - self.active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_truncates_coordinates() {
        let grid = DensityGrid::new(4, 3, OverflowPolicy::Wrap);
        assert!(grid.deposit(Vec2::new(2.9, 1.1)));
        assert!(grid.deposit(Vec2::new(0.0, 0.0)));
        assert_eq!(grid.count(2, 1), Some(1));
        assert_eq!(grid.count(0, 0), Some(1));
        assert_eq!(grid.total(), 2);
    }

    #[test]
    fn test_deposit_ignores_outside_and_nan() {
        let grid = DensityGrid::new(4, 3, OverflowPolicy::Wrap);
        assert!(!grid.deposit(Vec2::new(-0.1, 1.0)));
        assert!(!grid.deposit(Vec2::new(4.0, 1.0)));
        assert!(!grid.deposit(Vec2::new(1.0, 3.0)));
        assert!(!grid.deposit(Vec2::new(f32::NAN, 1.0)));
        assert!(!grid.deposit(Vec2::new(1.0, f32::INFINITY)));
        assert!(grid.is_clear());
    }

    #[test]
    fn test_wrap_policy_rolls_over() {
        let grid = DensityGrid::new(1, 1, OverflowPolicy::Wrap);
        for _ in 0..257 {
            grid.deposit(Vec2::new(0.5, 0.5));
        }
        assert_eq!(grid.count(0, 0), Some(1));
    }

    #[test]
    fn test_saturate_policy_sticks() {
        let grid = DensityGrid::new(1, 1, OverflowPolicy::Saturate);
        for _ in 0..300 {
            grid.deposit(Vec2::new(0.5, 0.5));
        }
        assert_eq!(grid.count(0, 0), Some(255));
    }

    #[test]
    fn test_clear() {
        let grid = DensityGrid::new(8, 8, OverflowPolicy::Wrap);
        grid.deposit(Vec2::new(3.0, 5.0));
        assert!(!grid.is_clear());
        grid.clear();
        assert!(grid.is_clear());
    }

    #[test]
    fn test_concurrent_deposits_are_exact() {
        let grid = Arc::new(DensityGrid::new(2, 2, OverflowPolicy::Wrap));
        std::thread::scope(|s| {
            for _ in 0..4 {
                let grid = &grid;
                s.spawn(move || {
                    for _ in 0..50 {
                        grid.deposit(Vec2::new(1.5, 1.5));
                    }
                });
            }
        });
        assert_eq!(grid.count(1, 1), Some(200));
    }

    #[test]
    fn test_buffers_alternate_roles() {
        let mut buffers = DensityBuffers::new(3, 3, OverflowPolicy::Wrap);
        let first = Arc::clone(buffers.active());
        assert!(!Arc::ptr_eq(buffers.active(), buffers.settled()));

        buffers.swap();
        assert!(Arc::ptr_eq(buffers.settled(), &first));
        assert!(!Arc::ptr_eq(buffers.active(), &first));

        buffers.swap();
        assert!(Arc::ptr_eq(buffers.active(), &first));
    }

    #[test]
    fn test_policy_parses() {
        assert_eq!("Wrap".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Wrap));
        assert_eq!("saturate".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Saturate));
        assert!("clamp".parse::<OverflowPolicy>().is_err());
    }
}
