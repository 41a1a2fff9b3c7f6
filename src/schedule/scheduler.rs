use tracing::{debug, info, warn};

use crate::canvas::layers::Canvas;
use crate::canvas::plane::Plane;
use crate::classify::frame::ClassifiedFrame;
use crate::foundation::core::{CircleFootprint, PanelSize, Region};
use crate::foundation::error::{GhostError, GhostResult};
use crate::geometry::blob::{estimate_circle, mask_to_circle};
use crate::geometry::region::{bounding_region, circle_region};
use crate::schedule::strategy::{SchedulerPolicy, Strategy};
use crate::transport::display::DisplayTransport;

/// Refresh mode the panel was last initialised into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Not initialised, asleep, or in an unknown state after a failed clear.
    Uninitialized,
    /// Accepts full writes and clears.
    Full,
    /// Accepts partial writes.
    Partial,
}

/// What to send to the panel for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Flash the whole panel to background.
    FullClear,
    /// Write both planes to the whole panel.
    FullRepaint {
        /// Black ink, panel-sized.
        black: Plane,
        /// Red ink, panel-sized.
        red: Plane,
    },
    /// Write the canvas black plane inside `region`.
    PartialRegion {
        /// Aligned target region.
        region: Region,
        /// Region-local black slice.
        black: Plane,
    },
    /// Write a region whose cells outside `circle` repeat the previous canvas state.
    PartialCircle {
        /// Estimated footprint of the new content.
        circle: CircleFootprint,
        /// Aligned region around the footprint.
        region: Region,
        /// Region-local masked black slice.
        black: Plane,
    },
}

/// Variant tag of a [`RefreshDecision`], for reports and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    /// [`RefreshDecision::FullClear`].
    FullClear,
    /// [`RefreshDecision::FullRepaint`].
    FullRepaint,
    /// [`RefreshDecision::PartialRegion`].
    PartialRegion,
    /// [`RefreshDecision::PartialCircle`].
    PartialCircle,
}

impl RefreshDecision {
    /// Variant tag.
    pub fn kind(&self) -> DecisionKind {
        match self {
            Self::FullClear => DecisionKind::FullClear,
            Self::FullRepaint { .. } => DecisionKind::FullRepaint,
            Self::PartialRegion { .. } => DecisionKind::PartialRegion,
            Self::PartialCircle { .. } => DecisionKind::PartialCircle,
        }
    }
}

/// Periodic action taken after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Maintenance {
    /// The canvas reached its layer threshold and was reset together with the panel.
    CanvasReset,
    /// `DirectBuffer` flushed accumulated ghosting with a full clear.
    MaintenanceClear,
}

/// Outcome of [`RefreshScheduler::process_frame`].
///
/// Dispatch and maintenance are reported separately: a failed write does not hide a reset that
/// already happened, and a failed maintenance clear does not hide a frame that was written.
#[derive(Debug)]
pub struct FrameReport {
    /// Decision made for the frame; `None` when the frame had no content to refresh.
    pub decision: Option<DecisionKind>,
    /// Periodic action taken after the frame, if any. Set even when its panel clear failed.
    pub maintenance: Option<Maintenance>,
    /// Canvas layer count after the frame (and after any reset).
    pub layer_count: u32,
    /// Error of the abandoned write, if the frame's dispatch failed.
    pub dispatch_error: Option<GhostError>,
    /// Error of the panel clear (or partial re-init) that followed a maintenance reset.
    pub maintenance_error: Option<GhostError>,
}

impl FrameReport {
    fn skipped_frame(layer_count: u32) -> Self {
        Self {
            decision: None,
            maintenance: None,
            layer_count,
            dispatch_error: None,
            maintenance_error: None,
        }
    }

    /// Return `true` when the frame was skipped without dispatch.
    pub fn skipped(&self) -> bool {
        self.decision.is_none()
    }

    /// Return `true` when the frame's write reached the panel.
    pub fn shown(&self) -> bool {
        self.decision.is_some() && self.dispatch_error.is_none()
    }

    /// Dispatch and maintenance errors, in that order.
    pub fn errors(&self) -> impl Iterator<Item = &GhostError> {
        self.dispatch_error.iter().chain(self.maintenance_error.iter())
    }
}

/// Policy state machine that turns classified frames into panel writes.
///
/// Owns the [`Canvas`] and tracks the panel's [`DisplayMode`]. State changes (overlay, counters)
/// happen in [`decide`](Self::decide); [`dispatch`](Self::dispatch) only talks to the transport,
/// so a failed write never rolls the canvas back.
#[derive(Debug)]
pub struct RefreshScheduler {
    strategy: Strategy,
    policy: SchedulerPolicy,
    canvas: Canvas,
    mode: DisplayMode,
    frames_since_maintenance: u32,
}

impl RefreshScheduler {
    /// Create a scheduler for a panel of `size`.
    pub fn new(size: PanelSize, strategy: Strategy, policy: SchedulerPolicy) -> GhostResult<Self> {
        size.validate()?;
        policy.validate()?;
        Ok(Self {
            strategy,
            policy,
            canvas: Canvas::new(size),
            mode: DisplayMode::Uninitialized,
            frames_since_maintenance: 0,
        })
    }

    /// Configured strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Configured policy.
    pub fn policy(&self) -> SchedulerPolicy {
        self.policy
    }

    /// Accumulated canvas.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Mode the panel is believed to be in.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Frames written since the last `DirectBuffer` maintenance clear.
    pub fn frames_since_maintenance(&self) -> u32 {
        self.frames_since_maintenance
    }

    /// Initialise and clear the panel, then enter partial mode if the strategy needs it.
    ///
    /// Any failure here is reported as [`GhostError::DeviceInit`].
    pub fn start(&mut self, transport: &mut dyn DisplayTransport) -> GhostResult<()> {
        self.startup(transport).map_err(|e| match e {
            GhostError::DeviceInit(_) => e,
            other => GhostError::device_init(other.to_string()),
        })?;
        info!(
            strategy = %self.strategy,
            transport = transport.name(),
            mode = ?self.mode,
            "panel initialised"
        );
        Ok(())
    }

    /// Apply `frame` to the scheduler state and choose what to write.
    ///
    /// Returns `Ok(None)` when a partial strategy finds no content; in that case nothing is
    /// merged and the layer count is unchanged.
    pub fn decide(&mut self, frame: &ClassifiedFrame) -> GhostResult<Option<RefreshDecision>> {
        let size = self.canvas.size();
        frame.check_size(size)?;
        if self.strategy.uses_partial_mode() && frame.is_blank() {
            return Ok(None);
        }

        let decision = match self.strategy {
            Strategy::FullGhost => RefreshDecision::FullRepaint {
                black: frame.black().clone(),
                red: frame.red().clone(),
            },
            Strategy::DirectBuffer => {
                self.frames_since_maintenance = self.frames_since_maintenance.saturating_add(1);
                RefreshDecision::FullRepaint {
                    black: frame.black().clone(),
                    red: frame.red().clone(),
                }
            }
            Strategy::CanvasFull => {
                self.canvas.overlay(frame)?;
                RefreshDecision::FullRepaint {
                    black: self.canvas.black().clone(),
                    red: self.canvas.red().clone(),
                }
            }
            Strategy::CanvasPartialRegion => {
                let pixels = frame.content_pixels();
                let region = bounding_region(&pixels, self.policy.region_margin, size);
                if region.is_empty() {
                    return Ok(None);
                }
                self.canvas.overlay(frame)?;
                RefreshDecision::PartialRegion {
                    region,
                    black: self.canvas.black().crop(region)?,
                }
            }
            Strategy::CanvasPartialCircle => {
                let pixels = frame.content_pixels();
                let Some(circle) = estimate_circle(&pixels) else {
                    return Ok(None);
                };
                let region = circle_region(circle, self.policy.circle_margin, size);
                if region.is_empty() {
                    return Ok(None);
                }
                let before = self.canvas.black().crop(region)?;
                self.canvas.overlay(frame)?;
                let after = self.canvas.black().crop(region)?;
                RefreshDecision::PartialCircle {
                    circle,
                    region,
                    black: mask_to_circle(&after, &before, region, circle)?,
                }
            }
        };
        Ok(Some(decision))
    }

    /// Send `decision` to the panel, re-initialising the panel mode first when needed.
    pub fn dispatch(
        &mut self,
        decision: &RefreshDecision,
        transport: &mut dyn DisplayTransport,
    ) -> GhostResult<()> {
        match decision {
            RefreshDecision::FullClear => {
                self.ensure_mode(DisplayMode::Full, transport)?;
                if let Err(e) = transport.clear() {
                    self.mode = DisplayMode::Uninitialized;
                    return Err(e);
                }
                self.mode = DisplayMode::Full;
                Ok(())
            }
            RefreshDecision::FullRepaint { black, red } => {
                self.ensure_mode(DisplayMode::Full, transport)?;
                transport.display_full(black, red)
            }
            RefreshDecision::PartialRegion { region, black }
            | RefreshDecision::PartialCircle { region, black, .. } => {
                region.validate(self.canvas.size())?;
                self.ensure_mode(DisplayMode::Partial, transport)?;
                debug!(?region, "partial write");
                transport.display_partial(black, *region)
            }
        }
    }

    /// Whether a periodic action is due.
    pub fn maintenance_due(&self) -> bool {
        match self.strategy {
            Strategy::FullGhost => false,
            Strategy::DirectBuffer => {
                self.frames_since_maintenance >= self.policy.maintenance_interval
            }
            _ => self.canvas.is_full(self.policy.layer_threshold),
        }
    }

    /// Run the strategy's periodic action if it is due.
    ///
    /// Software state (canvas, counters) is reset before the panel is touched, so a failed clear
    /// still bounds accumulation.
    pub fn run_maintenance(
        &mut self,
        transport: &mut dyn DisplayTransport,
    ) -> GhostResult<Option<Maintenance>> {
        let Some(action) = self.reset_if_due() else {
            return Ok(None);
        };
        self.clear_after_reset(transport)?;
        Ok(Some(action))
    }

    /// Decide, dispatch and run maintenance for one frame.
    ///
    /// Transport failures of the write and of the maintenance clear are carried in the report.
    /// Maintenance runs even when the write failed, so the layer count never overshoots the
    /// threshold. Validation and device-init failures are returned as errors.
    #[tracing::instrument(skip_all, fields(strategy = %self.strategy))]
    pub fn process_frame(
        &mut self,
        frame: &ClassifiedFrame,
        transport: &mut dyn DisplayTransport,
    ) -> GhostResult<FrameReport> {
        let Some(decision) = self.decide(frame)? else {
            debug!("no content; frame skipped");
            return Ok(FrameReport::skipped_frame(self.canvas.layer_count()));
        };

        let kind = decision.kind();
        let mut dispatch_error = self.dispatch(&decision, transport).err();
        if let Some(e) = &dispatch_error {
            warn!(?kind, "dispatch abandoned: {e}");
        }

        let maintenance = self.reset_if_due();
        let mut maintenance_error = match maintenance {
            Some(_) => self.clear_after_reset(transport).err(),
            None => None,
        };
        if let Some(e) = &maintenance_error {
            warn!(?maintenance, "maintenance clear failed: {e}");
        }

        for slot in [&mut dispatch_error, &mut maintenance_error] {
            if let Some(fatal) = slot.take_if(|e| e.is_fatal()) {
                return Err(fatal);
            }
        }
        Ok(FrameReport {
            decision: Some(kind),
            maintenance,
            layer_count: self.canvas.layer_count(),
            dispatch_error,
            maintenance_error,
        })
    }

    fn reset_if_due(&mut self) -> Option<Maintenance> {
        if !self.maintenance_due() {
            return None;
        }
        if self.strategy.uses_canvas() {
            info!(
                layers = self.canvas.layer_count(),
                "canvas full; resetting for a fresh start"
            );
            self.canvas.reset();
            Some(Maintenance::CanvasReset)
        } else {
            info!(frames = self.frames_since_maintenance, "maintenance clear");
            self.frames_since_maintenance = 0;
            Some(Maintenance::MaintenanceClear)
        }
    }

    fn clear_after_reset(&mut self, transport: &mut dyn DisplayTransport) -> GhostResult<()> {
        self.dispatch(&RefreshDecision::FullClear, transport)?;
        if self.strategy.uses_partial_mode() {
            self.ensure_mode(DisplayMode::Partial, transport)?;
        }
        Ok(())
    }

    /// Put the panel to sleep. Failures are logged and swallowed.
    pub fn shutdown(&mut self, transport: &mut dyn DisplayTransport) {
        if let Err(e) = transport.sleep() {
            warn!("panel sleep failed: {e}");
        }
        self.mode = DisplayMode::Uninitialized;
    }

    fn startup(&mut self, transport: &mut dyn DisplayTransport) -> GhostResult<()> {
        self.mode = DisplayMode::Uninitialized;
        transport.init()?;
        self.mode = DisplayMode::Full;
        transport.clear()?;
        if self.strategy.uses_partial_mode() {
            transport.init_partial_mode()?;
            self.mode = DisplayMode::Partial;
        }
        Ok(())
    }

    fn ensure_mode(
        &mut self,
        target: DisplayMode,
        transport: &mut dyn DisplayTransport,
    ) -> GhostResult<()> {
        if self.mode == target {
            return Ok(());
        }
        match target {
            DisplayMode::Full => {
                debug!(from = ?self.mode, "re-initialising for full refresh");
                transport.init()?;
                self.mode = DisplayMode::Full;
            }
            DisplayMode::Partial => {
                if self.mode == DisplayMode::Uninitialized {
                    transport.init()?;
                    self.mode = DisplayMode::Full;
                }
                debug!("entering partial refresh mode");
                transport.init_partial_mode()?;
                self.mode = DisplayMode::Partial;
            }
            DisplayMode::Uninitialized => self.mode = DisplayMode::Uninitialized,
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
