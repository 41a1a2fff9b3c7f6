use crate::canvas::plane::Plane;
use crate::foundation::core::Region;
use crate::foundation::error::GhostResult;

/// Blocking driver contract for a black/red e-paper panel.
///
/// Every write call returns only after the panel reports completion. Implementations own the wire
/// protocol, busy signalling and power sequencing; the scheduler owns *what* gets written.
///
/// Mode contract: after [`init`](Self::init) or [`clear`](Self::clear) the panel accepts full
/// writes only; [`init_partial_mode`](Self::init_partial_mode) must be issued before any
/// [`display_partial`](Self::display_partial).
pub trait DisplayTransport {
    /// Wake and initialise the panel for full refreshes.
    ///
    /// Failure here is a [`crate::GhostError::DeviceInit`] and is fatal to the slideshow.
    fn init(&mut self) -> GhostResult<()>;

    /// Flash the whole panel to background.
    fn clear(&mut self) -> GhostResult<()>;

    /// Switch the panel into partial-refresh mode.
    fn init_partial_mode(&mut self) -> GhostResult<()>;

    /// Write both planes to the whole panel.
    ///
    /// Implementations pack with [`crate::PanelBuffer::pack`], which resolves cells inked in both
    /// planes in favour of red.
    fn display_full(&mut self, black: &Plane, red: &Plane) -> GhostResult<()>;

    /// Write `slice` (black ink, region-local) into `region`.
    ///
    /// `region.x0` and `region.x1` are multiples of 8; behaviour is undefined otherwise.
    fn display_partial(&mut self, slice: &Plane, region: Region) -> GhostResult<()>;

    /// Enter low-power sleep. Callers treat failures as best-effort.
    fn sleep(&mut self) -> GhostResult<()>;

    /// Short human-readable name used in logs.
    fn name(&self) -> &'static str {
        "display"
    }
}

impl<T: DisplayTransport + ?Sized> DisplayTransport for Box<T> {
    fn init(&mut self) -> GhostResult<()> {
        (**self).init()
    }

    fn clear(&mut self) -> GhostResult<()> {
        (**self).clear()
    }

    fn init_partial_mode(&mut self) -> GhostResult<()> {
        (**self).init_partial_mode()
    }

    fn display_full(&mut self, black: &Plane, red: &Plane) -> GhostResult<()> {
        (**self).display_full(black, red)
    }

    fn display_partial(&mut self, slice: &Plane, region: Region) -> GhostResult<()> {
        (**self).display_partial(slice, region)
    }

    fn sleep(&mut self) -> GhostResult<()> {
        (**self).sleep()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
