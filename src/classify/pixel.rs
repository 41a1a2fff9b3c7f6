/// Ink class of one source pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelClass {
    /// Black ink.
    Black,
    /// Red ink.
    Red,
    /// No ink (white panel background).
    Background,
}

/// Alpha values below this are treated as "no content".
pub const ALPHA_CUTOFF: u8 = 128;

/// Classify an opaque RGB pixel.
///
/// Red wins over black: a strongly red pixel is red even when it is also dark.
pub fn classify_rgb(r: u8, g: u8, b: u8) -> PixelClass {
    if r > 150 && g < 80 && b < 80 {
        return PixelClass::Red;
    }
    // mean(r, g, b) < 100 without the division
    if u16::from(r) + u16::from(g) + u16::from(b) < 300 {
        return PixelClass::Black;
    }
    PixelClass::Background
}

/// Classify a straight-alpha RGBA pixel. Mostly transparent pixels are background so that
/// canvas content underneath shows through.
pub fn classify_rgba(r: u8, g: u8, b: u8, a: u8) -> PixelClass {
    if a < ALPHA_CUTOFF {
        return PixelClass::Background;
    }
    classify_rgb(r, g, b)
}
