use crate::foundation::core::{COLUMN_ALIGN, CircleFootprint, PanelSize, Region};

/// Inclusive bounding box of a pixel set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Smallest x.
    pub min_x: u32,
    /// Smallest y.
    pub min_y: u32,
    /// Largest x.
    pub max_x: u32,
    /// Largest y.
    pub max_y: u32,
}

impl PixelBounds {
    /// Bounding box of `pixels`, or `None` for an empty set.
    pub fn of(pixels: &[(u32, u32)]) -> Option<Self> {
        let (&(x, y), rest) = pixels.split_first()?;
        let mut b = Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        };
        for &(x, y) in rest {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

/// Smallest column-aligned region containing every pixel in `pixels`, grown by `margin` on all
/// sides and clamped to the panel.
///
/// Only x is aligned; rows are addressed per scanline. Returns [`Region::EMPTY`] for an empty set.
pub fn bounding_region(pixels: &[(u32, u32)], margin: u32, panel: PanelSize) -> Region {
    let Some(b) = PixelBounds::of(pixels) else {
        return Region::EMPTY;
    };
    aligned_region(
        i64::from(b.min_x),
        i64::from(b.min_y),
        i64::from(b.max_x) + 1,
        i64::from(b.max_y) + 1,
        margin,
        panel,
    )
}

/// Aligned region around the bounding square of `circle`, grown by `margin`.
pub fn circle_region(circle: CircleFootprint, margin: u32, panel: PanelSize) -> Region {
    let cx = i64::from(circle.center_x);
    let cy = i64::from(circle.center_y);
    let r = i64::from(circle.radius);
    aligned_region(cx - r, cy - r, cx + r + 1, cy + r + 1, margin, panel)
}

fn aligned_region(
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    margin: u32,
    panel: PanelSize,
) -> Region {
    let m = i64::from(margin);
    let align = i64::from(COLUMN_ALIGN);

    let x0 = (x0 - m).div_euclid(align) * align;
    let x1 = (x1 + m + align - 1).div_euclid(align) * align;
    let y0 = y0 - m;
    let y1 = y1 + m;

    let clamp = |v: i64, hi: u32| v.clamp(0, i64::from(hi)) as u32;
    let r = Region {
        x0: clamp(x0, panel.width),
        y0: clamp(y0, panel.height),
        x1: clamp(x1, panel.width),
        y1: clamp(y1, panel.height),
    };
    if r.is_empty() { Region::EMPTY } else { r }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/region.rs"]
mod tests;
