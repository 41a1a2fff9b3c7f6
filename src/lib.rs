//! ghostink composites images onto a black/red e-paper panel and decides how each frame is
//! refreshed.
//!
//! Tri-color panels take seconds to refresh and flash through inverted states on every full
//! update. ghostink keeps the accumulated picture in software ([`Canvas`]) and lets a
//! [`RefreshScheduler`] choose, per frame, between full repaints and partial writes of a small
//! column-aligned [`Region`].
//!
//! # Pipeline overview
//!
//! 1. **Load**: image file -> rotated, resized RGBA ([`load_frame`])
//! 2. **Classify**: RGBA -> black and red ink masks ([`ClassifiedFrame`])
//! 3. **Schedule**: frame -> [`RefreshDecision`] (overlay, region or circle estimate, resets)
//! 4. **Dispatch**: decision -> blocking [`DisplayTransport`] calls
//!
//! [`Slideshow`] drives these steps over a polled directory until stopped.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: every transport call blocks; cancellation is a shared flag.
//! - **Red wins**: cells inked in both planes are written red ([`PanelBuffer::pack`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod canvas;
mod classify;
mod foundation;
mod geometry;
mod schedule;
mod session;
mod source;
mod transport;

pub use canvas::layers::Canvas;
pub use canvas::plane::Plane;
pub use classify::frame::ClassifiedFrame;
pub use classify::pixel::{ALPHA_CUTOFF, PixelClass, classify_rgb, classify_rgba};
pub use foundation::core::{COLUMN_ALIGN, CircleFootprint, PanelSize, Region};
pub use foundation::error::{GhostError, GhostResult};
pub use geometry::blob::{CIRCLE_PADDING, estimate_circle, mask_to_circle};
pub use geometry::region::{PixelBounds, bounding_region, circle_region};
pub use schedule::scheduler::{
    DecisionKind, DisplayMode, FrameReport, Maintenance, RefreshDecision, RefreshScheduler,
};
pub use schedule::strategy::{SchedulerPolicy, Strategy};
pub use session::config::{MAX_WAIT_SECS, SlideshowConfig};
pub use session::slideshow::{RunStats, Slideshow, SlideshowOpts};
pub use source::circles::{DrawnCircle, random_circles, render_circles};
pub use source::images::{
    IMAGE_EXTENSIONS, decode_frame, fit_to_panel, has_image_extension, list_images, load_frame,
    plane_to_luma, write_layers,
};
pub use transport::display::DisplayTransport;
pub use transport::memory::{InMemoryTransport, TransportCall};
pub use transport::pack::PanelBuffer;
pub use transport::preview::{PreviewOpts, PreviewTransport};
