//! Rectangle shape.

use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// A rectangle with optional rounded corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rectangle {
    /// Corner radius (0 = sharp corners).
    pub corner_radius: f64,
}

impl Rectangle {
    pub fn rounded(corner_radius: f64) -> Self {
        Self { corner_radius }
    }

    /// Outline in object space. The radius is clamped to half the shorter side.
    pub fn to_path(&self, local: Rect) -> BezPath {
        let max_radius = local.width().min(local.height()) / 2.0;
        let radius = self.corner_radius.clamp(0.0, max_radius.max(0.0));
        if radius > 0.0 {
            RoundedRect::from_rect(local, radius).to_path(0.1)
        } else {
            local.to_path(0.1)
        }
    }
}
