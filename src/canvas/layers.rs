use crate::canvas::plane::Plane;
use crate::classify::frame::ClassifiedFrame;
use crate::foundation::core::PanelSize;
use crate::foundation::error::GhostResult;

/// Accumulated ink state ("memory canvas").
///
/// Successive frames are merged with a monotonic union: once a cell holds ink it keeps it until
/// [`Canvas::reset`]. Black and red are independent planes, so a cell may end up inked in both;
/// that conflict is resolved when buffers are packed for the panel, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    size: PanelSize,
    black: Plane,
    red: Plane,
    layer_count: u32,
}

impl Canvas {
    /// Create an all-background canvas.
    pub fn new(size: PanelSize) -> Self {
        Self {
            size,
            black: Plane::new(size.width, size.height),
            red: Plane::new(size.width, size.height),
            layer_count: 0,
        }
    }

    /// Canvas dimensions.
    pub fn size(&self) -> PanelSize {
        self.size
    }

    /// Accumulated black ink.
    pub fn black(&self) -> &Plane {
        &self.black
    }

    /// Accumulated red ink.
    pub fn red(&self) -> &Plane {
        &self.red
    }

    /// Number of frames merged since creation or the last reset.
    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Merge `frame` on top of the accumulated ink and count one more layer.
    ///
    /// A frame of the wrong size is rejected before anything is modified.
    pub fn overlay(&mut self, frame: &ClassifiedFrame) -> GhostResult<()> {
        frame.check_size(self.size)?;
        self.black.union_with(frame.black())?;
        self.red.union_with(frame.red())?;
        self.layer_count = self.layer_count.saturating_add(1);
        Ok(())
    }

    /// Drop all ink and restart layer counting.
    pub fn reset(&mut self) {
        self.black.clear();
        self.red.clear();
        self.layer_count = 0;
    }

    /// Whether the layer count has reached `threshold`.
    pub fn is_full(&self, threshold: u32) -> bool {
        self.layer_count >= threshold
    }

    /// Return `true` when both planes are empty.
    pub fn is_blank(&self) -> bool {
        self.black.is_blank() && self.red.is_blank()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/layers.rs"]
mod tests;
