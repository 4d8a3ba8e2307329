use serde::Serialize;

use crate::error::{BuddyError, Result};

/// Identity of a chunk, stable within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChunkId(pub u32);

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grouping label assigned by the clustering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClusterId(pub i32);

impl ClusterId {
    pub const NOISE: ClusterId = ClusterId(-1);

    pub fn is_noise(self) -> bool {
        self == Self::NOISE
    }
}

/// Axis-aligned rectangle in the document's native units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(BuddyError::Validation(format!(
                "Bounding box has non-finite coordinates: [{x0}, {y0}, {x1}, {y1}]"
            )));
        }
        if x0 > x1 || y0 > y1 {
            return Err(BuddyError::Validation(format!(
                "Bounding box corners are inverted: [{x0}, {y0}, {x1}, {y1}]"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A coordinate-anchored segment of document text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub page: u32,
    pub bbox: BoundingBox,
    pub text: String,
    pub cluster_id: ClusterId,
}

impl Chunk {
    pub fn new(
        id: ChunkId,
        page: u32,
        bbox: BoundingBox,
        text: impl Into<String>,
        cluster_id: ClusterId,
    ) -> Result<Self> {
        if page == 0 {
            return Err(BuddyError::Validation(format!(
                "Chunk {id} has page 0; pages are 1-based"
            )));
        }
        Ok(Self {
            id,
            page,
            bbox,
            text: text.into(),
            cluster_id,
        })
    }

    /// Label shown on list entries, e.g. "Chunk 3" for cluster 2.
    pub fn cluster_label(&self) -> String {
        format!("Chunk {}", i64::from(self.cluster_id.0) + 1)
    }
}
