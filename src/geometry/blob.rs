use crate::canvas::plane::Plane;
use crate::foundation::core::{CircleFootprint, Region};
use crate::foundation::error::{GhostError, GhostResult};
use crate::geometry::region::PixelBounds;

/// Fixed padding added to the estimated radius so edge pixels are not clipped.
pub const CIRCLE_PADDING: u32 = 5;

/// Approximate all of `pixels` with a single circle.
///
/// The center is the midpoint of the bounding box (not the centroid of mass) and the radius is
/// the rounded mean distance to that center plus [`CIRCLE_PADDING`]. Content made of several
/// disjoint blobs comes back as one circle spanning all of them; callers targeting one object per
/// frame accept that.
pub fn estimate_circle(pixels: &[(u32, u32)]) -> Option<CircleFootprint> {
    let b = PixelBounds::of(pixels)?;
    let center_x = ((u64::from(b.min_x) + u64::from(b.max_x)) / 2) as u32;
    let center_y = ((u64::from(b.min_y) + u64::from(b.max_y)) / 2) as u32;

    let center = CircleFootprint {
        center_x,
        center_y,
        radius: 0,
    };
    let total: f64 = pixels
        .iter()
        .map(|&(x, y)| center.distance_to(x, y))
        .sum();
    let mean = total / pixels.len() as f64;

    Some(CircleFootprint {
        radius: mean.round() as u32 + CIRCLE_PADDING,
        ..center
    })
}

/// Combine two crops of the same region: cells inside `circle` come from `inside`, all other
/// cells from `outside`.
///
/// Both planes are region-local crops; `circle` is in panel coordinates.
pub fn mask_to_circle(
    inside: &Plane,
    outside: &Plane,
    region: Region,
    circle: CircleFootprint,
) -> GhostResult<Plane> {
    inside.check_same_size(outside)?;
    if inside.width() != region.width() || inside.height() != region.height() {
        return Err(GhostError::validation(format!(
            "slice is {}x{}, region {region:?} is {}x{}",
            inside.width(),
            inside.height(),
            region.width(),
            region.height()
        )));
    }

    let mut out = outside.clone();
    for dy in 0..region.height() {
        for dx in 0..region.width() {
            if circle.contains(region.x0 + dx, region.y0 + dy) {
                out.set(dx, dy, inside.get(dx, dy));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/blob.rs"]
mod tests;
