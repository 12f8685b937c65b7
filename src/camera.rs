use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::render::RenderNode;

/// View transform between canvas space (layout coordinates) and screen
/// space. Pan is in screen units, applied after zoom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub fn canvas_to_screen_pos(&self, pos: Pos2) -> Pos2 {
        (pos.to_vec2() * self.zoom + self.pan).to_pos2()
    }

    pub fn canvas_to_screen_size(&self, size: f32) -> f32 {
        size * self.zoom
    }

    pub fn screen_to_canvas_pos(&self, pos: Pos2) -> Pos2 {
        ((pos.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    /// Zooms by `delta` keeping `center` (screen space) fixed.
    pub fn zoom_by(&mut self, delta: f32, center: Pos2) {
        let graph_center = (center.to_vec2() - self.pan) / self.zoom;
        let new_zoom = self.zoom * (1.0 + delta);
        self.pan += graph_center * (self.zoom - new_zoom);
        self.zoom = new_zoom;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Sets zoom and pan so `bounds` (canvas space) fits `viewport`
    /// (screen space) with fractional `padding`, without distortion.
    pub fn fit_to_screen(&mut self, bounds: Rect, viewport: Rect, padding: f32) {
        if !bounds.is_positive() || !bounds.is_finite() {
            return;
        }
        let padded = bounds.size() * (1.0 + padding);
        let zoom_x = viewport.width() / padded.x;
        let zoom_y = viewport.height() / padded.y;
        self.zoom = zoom_x.min(zoom_y);
        self.pan = viewport.center().to_vec2() - bounds.center().to_vec2() * self.zoom;
    }

    /// Bounding rect of the node set in canvas space, radius included.
    pub fn bounds(nodes: &[RenderNode]) -> Rect {
        let mut min = Pos2::new(f32::MAX, f32::MAX);
        let mut max = Pos2::new(f32::MIN, f32::MIN);
        for n in nodes {
            min.x = min.x.min(n.pos.x - n.radius);
            min.y = min.y.min(n.pos.y - n.radius);
            max.x = max.x.max(n.pos.x + n.radius);
            max.y = max.y.max(n.pos.y + n.radius);
        }
        Rect::from_min_max(min, max)
    }

    /// Index of the topmost node whose screen-space circle contains
    /// `screen_pos`; later nodes win, matching draw order.
    pub fn hit_node(&self, nodes: &[RenderNode], screen_pos: Pos2) -> Option<usize> {
        nodes.iter().enumerate().rev().find_map(|(i, n)| {
            let center = self.canvas_to_screen_pos(n.pos);
            let radius = self.canvas_to_screen_size(n.radius);
            ((center - screen_pos).length() <= radius).then_some(i)
        })
    }
}
