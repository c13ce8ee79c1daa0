//! CPU heat-map renderer
//!
//! Each cell's count is normalized to `[0, 1]` (count / 255) and scaled by a
//! gradient across the viewport: red grows left to right, green bottom to top,
//! blue top to bottom. A handful of particles in one pixel already saturates it.

use image::{Rgba, RgbaImage};
use particle_simulation::{DensityGrid, DensityRenderer};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("no frame has been rendered yet")]
    EmptyFrame,
}

/// Heat-map color for a cell with `count` particles at pixel `(x, y)`
/// of a `width × height` viewport, y up
pub fn heat_color(count: u8, x: u32, y: u32, width: u32, height: u32) -> [u8; 4] {
    let density = count as f32 / 255.0;
    // Sample at the pixel center
    let u = (x as f32 + 0.5) / width as f32;
    let v = (y as f32 + 0.5) / height as f32;

    let channel = |scale: f32| ((density * scale).clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        channel(5.0 + 20.0 * u),
        channel(5.0 + 20.0 * v),
        channel(5.0 + 20.0 * (1.0 - v)),
        255,
    ]
}

/// Keeps the most recently rendered frame as RGBA pixels, row 0 at the bottom
pub struct HeatmapRenderer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    frames: u64,
}

impl HeatmapRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width as usize * height as usize],
            frames: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Raw RGBA bytes, ready for a texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// The last frame as an image with the top of the viewport on top
    pub fn to_image(&self) -> Result<RgbaImage, RenderError> {
        if self.frames == 0 {
            return Err(RenderError::EmptyFrame);
        }
        let (w, h) = (self.width as usize, self.height as usize);
        Ok(RgbaImage::from_fn(self.width, self.height, |x, y| {
            let row = h - 1 - y as usize;
            Rgba(self.pixels[row * w + x as usize])
        }))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.to_image()?.save(path)?;
        log::info!("Saved heatmap to {}", path.display());
        Ok(())
    }
}

impl DensityRenderer for HeatmapRenderer {
    fn render(&mut self, grid: &DensityGrid) {
        if grid.width() != self.width || grid.height() != self.height {
            self.resize(grid.width(), grid.height());
        }

        let (width, height) = (self.width, self.height);
        for (i, (pixel, count)) in self.pixels.iter_mut().zip(grid.counts()).enumerate() {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            *pixel = heat_color(count, x, y, width, height);
        }
        self.frames += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Heatmap resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.pixels = vec![[0, 0, 0, 255]; width as usize * height as usize];
    }
}
