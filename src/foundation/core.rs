use crate::foundation::error::{GhostError, GhostResult};

/// Column granularity of partial writes: the panel packs 8 horizontal pixels per byte.
pub const COLUMN_ALIGN: u32 = 8;

/// Panel dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PanelSize {
    /// Width in pixels, a multiple of [`COLUMN_ALIGN`].
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PanelSize {
    /// Create a validated panel size.
    pub fn new(width: u32, height: u32) -> GhostResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check that both sides are positive and the width is column aligned.
    pub fn validate(self) -> GhostResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GhostError::validation(
                "panel width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(COLUMN_ALIGN) {
            return Err(GhostError::validation(format!(
                "panel width {} must be a multiple of {COLUMN_ALIGN}",
                self.width
            )));
        }
        Ok(())
    }

    /// Whether `(x, y)` lies on the panel.
    pub fn contains(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// Half-open rectangle `[x0, x1) x [y0, y1)` in panel coordinates.
///
/// Regions produced by the geometry routines always have `x0` and `x1` on a
/// [`COLUMN_ALIGN`] boundary. A region with `x1 <= x0` or `y1 <= y0` is empty and carries no
/// refresh obligation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// Inclusive left edge.
    pub x0: u32,
    /// Inclusive top edge.
    pub y0: u32,
    /// Exclusive right edge.
    pub x1: u32,
    /// Exclusive bottom edge.
    pub y1: u32,
}

impl Region {
    /// Canonical empty region.
    pub const EMPTY: Region = Region {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    /// Create a region and check it against the panel and column alignment.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32, panel: PanelSize) -> GhostResult<Self> {
        let r = Self { x0, y0, x1, y1 };
        r.validate(panel)?;
        Ok(r)
    }

    /// Check ordering, panel bounds and column alignment.
    pub fn validate(self, panel: PanelSize) -> GhostResult<()> {
        if self.x0 > self.x1 || self.y0 > self.y1 {
            return Err(GhostError::validation(format!(
                "region {self:?} has inverted bounds"
            )));
        }
        if self.x1 > panel.width || self.y1 > panel.height {
            return Err(GhostError::validation(format!(
                "region {self:?} exceeds panel {}x{}",
                panel.width, panel.height
            )));
        }
        if !self.x0.is_multiple_of(COLUMN_ALIGN) || !self.x1.is_multiple_of(COLUMN_ALIGN) {
            return Err(GhostError::validation(format!(
                "region {self:?} is not aligned to {COLUMN_ALIGN} columns"
            )));
        }
        Ok(())
    }

    /// Width in pixels (zero for empty regions).
    pub fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in pixels (zero for empty regions).
    pub fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Return `true` when the region covers no pixels.
    pub fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Return `true` when `(x, y)` lies inside the region.
    pub fn contains(self, x: u32, y: u32) -> bool {
        self.x0 <= x && x < self.x1 && self.y0 <= y && y < self.y1
    }
}

/// Approximate circular footprint of one frame's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CircleFootprint {
    /// Center column.
    pub center_x: u32,
    /// Center row.
    pub center_y: u32,
    /// Radius in pixels.
    pub radius: u32,
}

impl CircleFootprint {
    /// Return `true` when `(x, y)` lies within `radius` of the center.
    pub fn contains(self, x: u32, y: u32) -> bool {
        let dx = i64::from(x) - i64::from(self.center_x);
        let dy = i64::from(y) - i64::from(self.center_y);
        let r = i64::from(self.radius);
        dx * dx + dy * dy <= r * r
    }

    /// Euclidean distance from the center to `(x, y)`.
    pub fn distance_to(self, x: u32, y: u32) -> f64 {
        let dx = f64::from(x) - f64::from(self.center_x);
        let dy = f64::from(y) - f64::from(self.center_y);
        dx.hypot(dy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
