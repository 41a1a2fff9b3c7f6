use crate::foundation::core::Region;
use crate::foundation::error::{GhostError, GhostResult};

/// A `width x height` grid of "ink present" cells.
///
/// Cells are packed one bit per pixel, most significant bit first, with every row padded to a
/// whole byte. This is the same layout the panel expects for a single color plane, so packing for
/// the wire never has to shuffle bits. Padding bits are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct Plane {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl Plane {
    /// Create a plane with every cell absent.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            stride,
            bits: vec![0u8; stride * height as usize],
        }
    }

    /// Wrap already-packed rows.
    pub fn from_packed(width: u32, height: u32, bits: Vec<u8>) -> GhostResult<Self> {
        let stride = width.div_ceil(8) as usize;
        if bits.len() != stride * height as usize {
            return Err(GhostError::validation(format!(
                "packed plane has {} bytes, expected {} for {width}x{height}",
                bits.len(),
                stride * height as usize
            )));
        }
        let mut plane = Self {
            width,
            height,
            stride,
            bits,
        };
        plane.zero_padding();
        Ok(plane)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per packed row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed rows, top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Packed bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.bits[start..start + self.stride]
    }

    /// Whether the cell at `(x, y)` holds ink. Out-of-range cells read as absent.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (i, mask) = self.locate(x, y);
        self.bits[i] & mask != 0
    }

    /// Set or clear the cell at `(x, y)`. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (i, mask) = self.locate(x, y);
        if ink {
            self.bits[i] |= mask;
        } else {
            self.bits[i] &= !mask;
        }
    }

    /// Merge `other` into `self` with a per-cell OR. Never clears a cell.
    pub fn union_with(&mut self, other: &Plane) -> GhostResult<()> {
        self.check_same_size(other)?;
        for (d, s) in self.bits.iter_mut().zip(&other.bits) {
            *d |= *s;
        }
        Ok(())
    }

    /// Reset every cell to absent.
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Return `true` when no cell holds ink.
    pub fn is_blank(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Number of cells holding ink.
    pub fn ink_count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterate the coordinates of inked cells in row-major order.
    pub fn ink_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let stride = self.stride;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b != 0)
            .flat_map(move |(i, &b)| {
                let y = (i / stride) as u32;
                let x_base = ((i % stride) * 8) as u32;
                (0..8u32)
                    .filter(move |bit| b & (0x80 >> bit) != 0)
                    .map(move |bit| (x_base + bit, y))
            })
    }

    /// Copy the cells inside `region` into a new plane of the region's size.
    pub fn crop(&self, region: Region) -> GhostResult<Plane> {
        if region.x1 > self.width || region.y1 > self.height {
            return Err(GhostError::validation(format!(
                "crop region {region:?} exceeds plane {}x{}",
                self.width, self.height
            )));
        }
        let mut out = Plane::new(region.width(), region.height());
        if region.is_empty() {
            return Ok(out);
        }

        if region.x0.is_multiple_of(8) {
            // Byte-aligned: rows can be copied directly.
            let first = (region.x0 / 8) as usize;
            for (dy, y) in (region.y0..region.y1).enumerate() {
                let src = &self.row(y)[first..first + out.stride];
                let dst_start = dy * out.stride;
                out.bits[dst_start..dst_start + out.stride].copy_from_slice(src);
            }
            out.zero_padding();
            return Ok(out);
        }

        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                if self.get(x, y) {
                    out.set(x - region.x0, y - region.y0, true);
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bits
    }

    pub(crate) fn check_same_size(&self, other: &Plane) -> GhostResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(GhostError::validation(format!(
                "plane size mismatch: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(())
    }

    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        let i = y as usize * self.stride + (x / 8) as usize;
        (i, 0x80u8 >> (x % 8))
    }

    fn zero_padding(&mut self) {
        let used = self.width % 8;
        if used == 0 {
            return;
        }
        let keep = 0xffu8 << (8 - used);
        for row in self.bits.chunks_exact_mut(self.stride) {
            if let Some(last) = row.last_mut() {
                *last &= keep;
            }
        }
    }
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plane")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("ink", &self.ink_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/plane.rs"]
mod tests;
