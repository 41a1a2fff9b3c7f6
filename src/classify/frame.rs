use crate::canvas::plane::Plane;
use crate::classify::pixel::{PixelClass, classify_rgba};
use crate::foundation::core::PanelSize;
use crate::foundation::error::{GhostError, GhostResult};

/// Per-frame result of classifying a decoded, resized, orientation-normalized image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedFrame {
    black: Plane,
    red: Plane,
}

impl ClassifiedFrame {
    /// Frame with no ink.
    pub fn blank(size: PanelSize) -> Self {
        Self {
            black: Plane::new(size.width, size.height),
            red: Plane::new(size.width, size.height),
        }
    }

    /// Build a frame from already classified masks of equal size.
    pub fn from_masks(black: Plane, red: Plane) -> GhostResult<Self> {
        black.check_same_size(&red)?;
        Ok(Self { black, red })
    }

    /// Classify every pixel of a straight-alpha RGBA image.
    pub fn from_rgba(img: &image::RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let mut black = Plane::new(w, h);
        let mut red = Plane::new(w, h);
        for (x, y, px) in img.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            match classify_rgba(r, g, b, a) {
                PixelClass::Black => black.set(x, y, true),
                PixelClass::Red => red.set(x, y, true),
                PixelClass::Background => {}
            }
        }
        Self { black, red }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.black.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.black.height()
    }

    /// Black-ink mask.
    pub fn black(&self) -> &Plane {
        &self.black
    }

    /// Red-ink mask.
    pub fn red(&self) -> &Plane {
        &self.red
    }

    /// Mark one cell. Used to build frames by hand.
    pub fn set(&mut self, x: u32, y: u32, class: PixelClass) {
        self.black.set(x, y, class == PixelClass::Black);
        self.red.set(x, y, class == PixelClass::Red);
    }

    /// Union of both masks: every cell that carries ink of either color.
    pub fn content_mask(&self) -> Plane {
        let mut mask = self.black.clone();
        // Same size by construction.
        for (d, s) in mask.bytes_mut().iter_mut().zip(self.red.as_bytes()) {
            *d |= *s;
        }
        mask
    }

    /// Coordinates of every content cell in row-major order.
    pub fn content_pixels(&self) -> Vec<(u32, u32)> {
        self.content_mask().ink_pixels().collect()
    }

    /// Return `true` when neither mask holds ink.
    pub fn is_blank(&self) -> bool {
        self.black.is_blank() && self.red.is_blank()
    }

    /// Fail unless the frame matches the panel size.
    pub fn check_size(&self, size: PanelSize) -> GhostResult<()> {
        if self.width() != size.width || self.height() != size.height {
            return Err(GhostError::validation(format!(
                "frame is {}x{}, panel is {}x{}",
                self.width(),
                self.height(),
                size.width,
                size.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/classify/frame.rs"]
mod tests;
