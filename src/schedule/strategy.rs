use crate::foundation::error::{GhostError, GhostResult};

/// Refresh strategy, fixed for the lifetime of a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Full repaint of each raw frame; nothing accumulates in software.
    FullGhost,
    /// Full repaint of each raw frame with a maintenance clear every K frames.
    DirectBuffer,
    /// Accumulate on the canvas and repaint the whole canvas each frame.
    CanvasFull,
    /// Accumulate on the canvas and repaint only the aligned box around the new content.
    CanvasPartialRegion,
    /// Accumulate on the canvas and repaint only a circle around the new content.
    CanvasPartialCircle,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Strategy; 5] = [
        Strategy::FullGhost,
        Strategy::DirectBuffer,
        Strategy::CanvasFull,
        Strategy::CanvasPartialRegion,
        Strategy::CanvasPartialCircle,
    ];

    /// Whether frames are merged into the canvas.
    pub fn uses_canvas(self) -> bool {
        matches!(
            self,
            Self::CanvasFull | Self::CanvasPartialRegion | Self::CanvasPartialCircle
        )
    }

    /// Whether the panel must be kept in partial-refresh mode.
    pub fn uses_partial_mode(self) -> bool {
        matches!(self, Self::CanvasPartialRegion | Self::CanvasPartialCircle)
    }

    /// Stable kebab-case name, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullGhost => "full-ghost",
            Self::DirectBuffer => "direct-buffer",
            Self::CanvasFull => "canvas-full",
            Self::CanvasPartialRegion => "canvas-partial-region",
            Self::CanvasPartialCircle => "canvas-partial-circle",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = GhostError;

    fn from_str(s: &str) -> GhostResult<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| GhostError::validation(format!("unknown strategy '{s}'")))
    }
}

/// Numeric knobs of the refresh policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerPolicy {
    /// Canvas strategies reset once this many layers have accumulated.
    pub layer_threshold: u32,
    /// `DirectBuffer` issues a maintenance clear every this many frames.
    pub maintenance_interval: u32,
    /// Margin around new content for `CanvasPartialRegion`.
    pub region_margin: u32,
    /// Margin around the circle's bounding square for `CanvasPartialCircle`.
    pub circle_margin: u32,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            layer_threshold: 20,
            maintenance_interval: 25,
            region_margin: 20,
            circle_margin: 10,
        }
    }
}

impl SchedulerPolicy {
    /// Check that the counters are positive.
    pub fn validate(&self) -> GhostResult<()> {
        if self.layer_threshold == 0 {
            return Err(GhostError::validation("layer threshold must be > 0"));
        }
        if self.maintenance_interval == 0 {
            return Err(GhostError::validation("maintenance interval must be > 0"));
        }
        Ok(())
    }
}
