//! Boundary to the rendering collaborator

use crate::grid::DensityGrid;

/// Consumer of settled density grids
///
/// `render` borrows the grid only for the duration of the call. Once it
/// returns, the simulation clears the grid and reuses it for a later frame.
pub trait DensityRenderer {
    fn render(&mut self, grid: &DensityGrid);

    /// Called by the driver when the viewport changes
    fn resize(&mut self, _width: u32, _height: u32) {}
}

impl<F: FnMut(&DensityGrid)> DensityRenderer for F {
    fn render(&mut self, grid: &DensityGrid) {
        self(grid)
    }
}
