use rand::Rng;

use crate::classify::pixel::PixelClass;
use crate::foundation::core::PanelSize;

/// Keep circle centers this far from the panel edges when the panel is large enough.
const EDGE_INSET: f64 = 100.0;
const MIN_RADIUS: f64 = 30.0;
const MAX_RADIUS: f64 = 110.0;

/// One filled test circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawnCircle {
    /// Center x in pixels.
    pub x: f64,
    /// Center y in pixels.
    pub y: f64,
    /// Radius in pixels.
    pub radius: f64,
    /// Ink color; [`PixelClass::Black`] or [`PixelClass::Red`].
    pub ink: PixelClass,
}

/// Pick 1 to 3 random black or red circles for a panel of `panel`.
pub fn random_circles<R: Rng + ?Sized>(rng: &mut R, panel: PanelSize) -> Vec<DrawnCircle> {
    let count = rng.gen_range(1..=3);
    (0..count)
        .map(|_| DrawnCircle {
            x: inset_coord(rng, panel.width),
            y: inset_coord(rng, panel.height),
            radius: rng.gen_range(MIN_RADIUS..MAX_RADIUS),
            ink: if rng.gen_bool(0.5) {
                PixelClass::Black
            } else {
                PixelClass::Red
            },
        })
        .collect()
}

fn inset_coord<R: Rng + ?Sized>(rng: &mut R, extent: u32) -> f64 {
    let extent = f64::from(extent);
    if extent > 2.0 * EDGE_INSET {
        rng.gen_range(EDGE_INSET..extent - EDGE_INSET)
    } else {
        rng.gen_range(0.0..extent)
    }
}

/// Draw `circles` onto a fully transparent image; later circles paint over earlier ones.
pub fn render_circles(circles: &[DrawnCircle], panel: PanelSize) -> image::RgbaImage {
    let mut img = image::RgbaImage::new(panel.width, panel.height);
    for c in circles {
        let color = match c.ink {
            PixelClass::Red => image::Rgba([255, 0, 0, 255]),
            _ => image::Rgba([0, 0, 0, 255]),
        };
        let x0 = (c.x - c.radius).floor().max(0.0) as u32;
        let y0 = (c.y - c.radius).floor().max(0.0) as u32;
        let x1 = ((c.x + c.radius).ceil().max(0.0) as u32).min(panel.width);
        let y1 = ((c.y + c.radius).ceil().max(0.0) as u32).min(panel.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = f64::from(x) + 0.5 - c.x;
                let dy = f64::from(y) + 0.5 - c.y;
                if dx * dx + dy * dy <= c.radius * c.radius {
                    img.put_pixel(x, y, color);
                }
            }
        }
    }
    img
}
