use crate::canvas::plane::Plane;
use crate::foundation::error::GhostResult;

/// Both color planes packed for a full-panel write.
///
/// One bit per pixel, most significant bit first, rows padded to whole bytes, `1` meaning ink.
/// Hardware pixels are single-valued, so a cell inked in both source planes is resolved with
/// **red wins**: its black bit is cleared. A packed buffer never has both bits set for one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed black-ink rows.
    pub black: Vec<u8>,
    /// Packed red-ink rows.
    pub red: Vec<u8>,
}

impl PanelBuffer {
    /// Pack two same-sized planes, resolving conflicts in favour of red.
    pub fn pack(black: &Plane, red: &Plane) -> GhostResult<Self> {
        black.check_same_size(red)?;
        let red_bytes = red.as_bytes().to_vec();
        let black_bytes = black
            .as_bytes()
            .iter()
            .zip(&red_bytes)
            .map(|(b, r)| b & !r)
            .collect();
        Ok(Self {
            width: black.width(),
            height: black.height(),
            black: black_bytes,
            red: red_bytes,
        })
    }

    /// Bytes per packed row.
    pub fn stride(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Return `true` if any cell has both bits set.
    pub fn has_conflicts(&self) -> bool {
        self.black.iter().zip(&self.red).any(|(b, r)| b & r != 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/pack.rs"]
mod tests;
