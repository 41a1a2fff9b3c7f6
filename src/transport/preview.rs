use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::canvas::plane::Plane;
use crate::classify::pixel::PixelClass;
use crate::foundation::core::{PanelSize, Region};
use crate::foundation::error::{GhostError, GhostResult};
use crate::transport::display::DisplayTransport;
use crate::transport::pack::PanelBuffer;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const RED: [u8; 3] = [200, 16, 16];

/// Options for [`PreviewTransport`].
#[derive(Clone, Debug)]
pub struct PreviewOpts {
    /// Directory the snapshots are written to.
    pub out_dir: PathBuf,
    /// Also keep a numbered snapshot per refresh (`panel-000001.png`, ...).
    pub keep_history: bool,
}

/// Simulated panel that renders its memory to PNG after every refresh.
///
/// The simulation keeps one [`PixelClass`] per cell, like the physical panel. Partial writes only
/// drive the black/white memory: cells in the region become black where the slice has ink and
/// white elsewhere, except cells currently red, which keep their red.
pub struct PreviewTransport {
    size: PanelSize,
    opts: PreviewOpts,
    cells: Vec<PixelClass>,
    partial_mode: bool,
    asleep: bool,
    refreshes: u64,
}

impl PreviewTransport {
    /// Create a preview for a panel of `size`.
    pub fn new(size: PanelSize, opts: PreviewOpts) -> Self {
        Self {
            size,
            opts,
            cells: vec![PixelClass::Background; (size.width * size.height) as usize],
            partial_mode: false,
            asleep: true,
            refreshes: 0,
        }
    }

    /// Current simulated color of `(x, y)`.
    pub fn cell(&self, x: u32, y: u32) -> PixelClass {
        if !self.size.contains(x, y) {
            return PixelClass::Background;
        }
        self.cells[self.index(x, y)]
    }

    /// Number of refreshes (clears and writes) applied so far.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Path of the always-current snapshot.
    pub fn latest_path(&self) -> PathBuf {
        self.opts.out_dir.join("panel.png")
    }

    /// Render the simulated panel into an RGB image.
    pub fn render(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.size.width, self.size.height, |x, y| {
            image::Rgb(match self.cell(x, y) {
                PixelClass::Black => BLACK,
                PixelClass::Red => RED,
                PixelClass::Background => WHITE,
            })
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.size.width + x) as usize
    }

    fn ensure_awake(&self) -> GhostResult<()> {
        if self.asleep {
            return Err(GhostError::transport("panel is asleep; call init first"));
        }
        Ok(())
    }

    fn commit(&mut self) -> GhostResult<()> {
        self.refreshes += 1;
        let img = self.render();
        save_png(&img, &self.latest_path())?;
        if self.opts.keep_history {
            let numbered = self
                .opts
                .out_dir
                .join(format!("panel-{:06}.png", self.refreshes));
            save_png(&img, &numbered)?;
        }
        Ok(())
    }
}

fn save_png(img: &image::RgbImage, path: &Path) -> GhostResult<()> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| GhostError::transport(format!("write '{}': {e}", path.display())))
}

impl DisplayTransport for PreviewTransport {
    fn init(&mut self) -> GhostResult<()> {
        std::fs::create_dir_all(&self.opts.out_dir)
            .with_context(|| {
                format!(
                    "create preview directory '{}'",
                    self.opts.out_dir.display()
                )
            })
            .map_err(|e| GhostError::device_init(format!("{e:#}")))?;
        self.asleep = false;
        self.partial_mode = false;
        Ok(())
    }

    fn clear(&mut self) -> GhostResult<()> {
        self.ensure_awake()?;
        self.cells.fill(PixelClass::Background);
        self.partial_mode = false;
        self.commit()
    }

    fn init_partial_mode(&mut self) -> GhostResult<()> {
        self.ensure_awake()?;
        self.partial_mode = true;
        Ok(())
    }

    fn display_full(&mut self, black: &Plane, red: &Plane) -> GhostResult<()> {
        self.ensure_awake()?;
        let buf = PanelBuffer::pack(black, red)?;
        if buf.width != self.size.width || buf.height != self.size.height {
            return Err(GhostError::validation(format!(
                "full write is {}x{}, panel is {}x{}",
                buf.width, buf.height, self.size.width, self.size.height
            )));
        }
        let packed_black = Plane::from_packed(buf.width, buf.height, buf.black)?;
        let packed_red = Plane::from_packed(buf.width, buf.height, buf.red)?;
        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let class = if packed_red.get(x, y) {
                    PixelClass::Red
                } else if packed_black.get(x, y) {
                    PixelClass::Black
                } else {
                    PixelClass::Background
                };
                let i = self.index(x, y);
                self.cells[i] = class;
            }
        }
        self.commit()
    }

    fn display_partial(&mut self, slice: &Plane, region: Region) -> GhostResult<()> {
        self.ensure_awake()?;
        if !self.partial_mode {
            return Err(GhostError::transport(
                "partial write issued outside partial mode",
            ));
        }
        region.validate(self.size)?;
        if slice.width() != region.width() || slice.height() != region.height() {
            return Err(GhostError::validation(format!(
                "slice is {}x{}, region {region:?}",
                slice.width(),
                slice.height()
            )));
        }
        for dy in 0..region.height() {
            for dx in 0..region.width() {
                let i = self.index(region.x0 + dx, region.y0 + dy);
                if slice.get(dx, dy) {
                    self.cells[i] = PixelClass::Black;
                } else if self.cells[i] == PixelClass::Black {
                    self.cells[i] = PixelClass::Background;
                }
            }
        }
        self.commit()
    }

    fn sleep(&mut self) -> GhostResult<()> {
        self.asleep = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "preview"
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/preview.rs"]
mod tests;
