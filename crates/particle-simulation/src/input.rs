//! Pointer and touch events mapped to attractor lists
//!
//! Window coordinates grow downward; the simulation's y axis grows upward, so
//! every point is flipped against the viewport height.

use glam::Vec2;

/// Window input, in window pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    MouseDown { x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseUp,
    TouchStart(Vec<Vec2>),
    TouchMove(Vec<Vec2>),
    TouchEnd,
    TouchCancel,
}

/// Tracks the current set of attractors implied by pointer input
#[derive(Debug, Clone)]
pub struct PointerInput {
    viewport_height: f32,
    mouse_down: bool,
    attractors: Vec<Vec2>,
}

impl PointerInput {
    pub fn new(viewport_height: u32) -> Self {
        Self {
            viewport_height: viewport_height as f32,
            mouse_down: false,
            attractors: Vec::new(),
        }
    }

    fn to_sim(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, self.viewport_height - y)
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::MouseDown { x, y } => {
                self.mouse_down = true;
                self.attractors = vec![self.to_sim(x, y)];
            }
            PointerEvent::MouseMove { x, y } => {
                if self.mouse_down {
                    self.attractors = vec![self.to_sim(x, y)];
                }
            }
            PointerEvent::MouseUp => {
                self.mouse_down = false;
                self.attractors.clear();
            }
            PointerEvent::TouchStart(touches) | PointerEvent::TouchMove(touches) => {
                self.attractors = touches.iter().map(|t| self.to_sim(t.x, t.y)).collect();
            }
            PointerEvent::TouchEnd | PointerEvent::TouchCancel => {
                self.attractors.clear();
            }
        }
    }

    /// A resized window invalidates every held point
    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height as f32;
        self.attractors.clear();
    }

    pub fn attractors(&self) -> &[Vec2] {
        &self.attractors
    }
}
