use serde::{Deserialize, Serialize};

/// Pan position of a zoomed 2D art panel, in panel pixels. Never persisted
/// beyond the current skin selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

/// Symmetric clamp box for a pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    pub max_x: f32,
    pub max_y: f32,
}

/// Bounds for an image displayed with cover scaling inside a panel: the
/// image is scaled so it fully covers the panel, and the offset may shift
/// it by at most half the overhang on each axis.
pub fn cover_bounds(panel_w: f32, panel_h: f32, image_w: f32, image_h: f32) -> PanBounds {
    if panel_w <= 0.0 || panel_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
        return PanBounds { max_x: 0.0, max_y: 0.0 };
    }
    let scale = (panel_w / image_w).max(panel_h / image_h);
    let rendered_w = image_w * scale;
    let rendered_h = image_h * scale;
    PanBounds {
        max_x: ((rendered_w - panel_w) / 2.0).max(0.0),
        max_y: ((rendered_h - panel_h) / 2.0).max(0.0),
    }
}

pub fn clamp(offset: PanOffset, bounds: PanBounds) -> PanOffset {
    PanOffset {
        x: offset.x.clamp(-bounds.max_x, bounds.max_x),
        y: offset.y.clamp(-bounds.max_y, bounds.max_y),
    }
}
