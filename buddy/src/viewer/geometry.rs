use serde::Serialize;

use crate::error::{BuddyError, Result};
use crate::models::{BoundingBox, Chunk};

/// Extra margin to the left of a hit target.
pub const HIT_PAD_LEFT: f64 = 10.0;
/// Extra margin above a hit target.
pub const HIT_PAD_TOP: f64 = 15.0;
/// Growth applied to width and height of a hit target.
pub const HIT_GROW: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle in display pixels, origin at the top-left of the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Maps native page coordinates onto a page rendered at `display_width` pixels.
///
/// Scaling is uniform; the scale is derived from the two widths every time
/// and never cached, so a resize only needs a new mapper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMapper {
    native_width: f64,
    display_width: f64,
}

fn check_width(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BuddyError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(value)
}

impl GeometryMapper {
    pub fn new(native_width: f64, display_width: f64) -> Result<Self> {
        Ok(Self {
            native_width: check_width("Native page width", native_width)?,
            display_width: check_width("Display width", display_width)?,
        })
    }

    pub fn with_display_width(&self, display_width: f64) -> Result<Self> {
        Self::new(self.native_width, display_width)
    }

    pub fn native_width(&self) -> f64 {
        self.native_width
    }

    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    pub fn scale(&self) -> f64 {
        self.display_width / self.native_width
    }

    /// The box scaled into display space, without padding.
    pub fn scale_box(&self, bbox: &BoundingBox) -> DisplayRect {
        let s = self.scale();
        DisplayRect {
            left: bbox.x0 * s,
            top: bbox.y0 * s,
            width: bbox.width() * s,
            height: bbox.height() * s,
        }
    }

    /// The clickable region for a box: shifted up and left, and grown, so the
    /// target is a little larger than the text it covers.
    pub fn hit_target(&self, bbox: &BoundingBox) -> DisplayRect {
        let scaled = self.scale_box(bbox);
        DisplayRect {
            left: scaled.left - HIT_PAD_LEFT,
            top: scaled.top - HIT_PAD_TOP,
            width: scaled.width + HIT_GROW,
            height: scaled.height + HIT_GROW,
        }
    }

    /// Topmost chunk on `page` whose hit target contains `point`.
    ///
    /// Overlays are stacked in source order, so the last match is the one on top.
    pub fn hit_test<'a, I>(&self, page: u32, point: Point, chunks: I) -> Option<&'a Chunk>
    where
        I: IntoIterator<Item = &'a Chunk>,
    {
        chunks
            .into_iter()
            .filter(|chunk| chunk.page == page)
            .filter(|chunk| self.hit_target(&chunk.bbox).contains(point))
            .last()
    }
}
