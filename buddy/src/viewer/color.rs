use serde::Serialize;

use crate::models::ClusterId;

/// Golden angle in degrees; consecutive clusters land far apart on the hue wheel.
const GOLDEN_ANGLE: f64 = 137.508;

pub const BASE_ALPHA: f64 = 0.2;
pub const HOVER_ALPHA: f64 = 0.4;
pub const BORDER_ALPHA: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HighlightColor {
    /// Neutral grey for unclustered chunks.
    Noise { alpha: f64 },
    Hue { hue: f64, alpha: f64 },
}

impl HighlightColor {
    pub fn for_cluster(cluster_id: ClusterId, alpha: f64) -> Self {
        if cluster_id.is_noise() {
            return Self::Noise { alpha };
        }
        let hue = (f64::from(cluster_id.0) * GOLDEN_ANGLE) % 360.0;
        Self::Hue { hue, alpha }
    }
}

/// CSS color string, e.g. `hsla(137.508, 70%, 50%, 0.2)`.
impl std::fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Noise { alpha } => write!(f, "rgba(158, 158, 158, {alpha})"),
            Self::Hue { hue, alpha } => write!(f, "hsla({hue}, 70%, 50%, {alpha})"),
        }
    }
}

/// The three shades a chunk is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterPalette {
    pub base: HighlightColor,
    pub hover: HighlightColor,
    pub border: HighlightColor,
}

impl ClusterPalette {
    pub fn for_cluster(cluster_id: ClusterId) -> Self {
        Self {
            base: HighlightColor::for_cluster(cluster_id, BASE_ALPHA),
            hover: HighlightColor::for_cluster(cluster_id, HOVER_ALPHA),
            border: HighlightColor::for_cluster(cluster_id, BORDER_ALPHA),
        }
    }
}
