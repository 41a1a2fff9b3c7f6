use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::foundation::error::{GhostError, GhostResult};
use crate::schedule::scheduler::RefreshScheduler;
use crate::session::config::SlideshowConfig;
use crate::source::images::{list_images, load_frame};
use crate::transport::display::DisplayTransport;

/// Longest uninterrupted sleep while pacing; the stop flag is checked between slices.
const PACING_SLICE: Duration = Duration::from_millis(100);

/// Loop options that are not part of the persisted configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlideshowOpts {
    /// Stop after this many passes over the directory; `None` runs until stopped.
    pub max_passes: Option<u64>,
}

/// Counters reported when the loop returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Completed passes over the image directory (empty polls included).
    pub passes: u64,
    /// Frames written to the panel.
    pub frames_shown: u64,
    /// Frames skipped because they had no content.
    pub frames_empty: u64,
    /// Images that could not be loaded.
    pub decode_errors: u64,
    /// Writes abandoned after a transport error.
    pub transport_errors: u64,
    /// Canvas resets and maintenance clears.
    pub maintenance_runs: u64,
}

/// Single-threaded slideshow loop: poll the directory, show each image, pace, repeat.
///
/// Cancellation is cooperative through [`Slideshow::stop_handle`]; the flag is checked between
/// frames and while pacing.
pub struct Slideshow {
    cfg: SlideshowConfig,
    opts: SlideshowOpts,
    stop: Arc<AtomicBool>,
}

impl Slideshow {
    /// Validate `cfg` and build the loop.
    pub fn new(cfg: SlideshowConfig, opts: SlideshowOpts) -> GhostResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            opts,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &SlideshowConfig {
        &self.cfg
    }

    /// Shared flag; storing `true` makes [`run`](Self::run) return at the next check.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run until stopped or until `max_passes` passes are done.
    ///
    /// Only device-init failures are returned as errors; per-frame failures are logged and
    /// counted. The panel is put to sleep (best effort) before returning.
    pub fn run(&self, transport: &mut dyn DisplayTransport) -> GhostResult<RunStats> {
        let mut sched =
            RefreshScheduler::new(self.cfg.panel, self.cfg.strategy, self.cfg.policy())?;
        sched.start(transport)?;

        info!(
            dir = %self.cfg.image_dir.display(),
            strategy = %sched.strategy(),
            layer_threshold = sched.policy().layer_threshold,
            delay_s = self.cfg.delay_secs,
            "slideshow started"
        );

        let mut stats = RunStats::default();
        let outcome = self.run_passes(&mut sched, transport, &mut stats);
        sched.shutdown(transport);

        match outcome {
            Ok(()) => {
                info!(?stats, "slideshow stopped");
                Ok(stats)
            }
            Err(e) => {
                error!("slideshow aborted: {e}");
                Err(e)
            }
        }
    }

    fn run_passes(
        &self,
        sched: &mut RefreshScheduler,
        transport: &mut dyn DisplayTransport,
        stats: &mut RunStats,
    ) -> GhostResult<()> {
        while !self.stopped() {
            if self.opts.max_passes.is_some_and(|max| stats.passes >= max) {
                break;
            }

            let images = list_images(&self.cfg.image_dir).unwrap_or_else(|e| {
                warn!("listing images failed: {e}");
                Vec::new()
            });

            if images.is_empty() {
                stats.passes += 1;
                info!(dir = %self.cfg.image_dir.display(), "no images found, waiting");
                if self.opts.max_passes.is_some_and(|max| stats.passes >= max) {
                    break;
                }
                self.pace(self.cfg.empty_poll());
                continue;
            }

            let final_pass = self
                .opts
                .max_passes
                .is_some_and(|max| stats.passes + 1 >= max);
            for (i, path) in images.iter().enumerate() {
                if self.stopped() {
                    return Ok(());
                }
                self.show(path, sched, transport, stats)?;
                if !(final_pass && i + 1 == images.len()) {
                    self.pace(self.cfg.delay());
                }
            }
            stats.passes += 1;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    fn show(
        &self,
        path: &Path,
        sched: &mut RefreshScheduler,
        transport: &mut dyn DisplayTransport,
        stats: &mut RunStats,
    ) -> GhostResult<()> {
        let frame = match load_frame(path, self.cfg.panel) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("skipping image: {e}");
                stats.decode_errors += 1;
                return Ok(());
            }
        };

        let report = match sched.process_frame(&frame, transport) {
            Ok(report) => report,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("frame skipped: {e}");
                return Ok(());
            }
        };

        if report.skipped() {
            stats.frames_empty += 1;
        } else if report.shown() {
            stats.frames_shown += 1;
        }
        if report.maintenance.is_some() {
            stats.maintenance_runs += 1;
        }
        for e in report.errors() {
            match e {
                GhostError::Transport(_) => {
                    warn!("display write failed: {e}");
                    stats.transport_errors += 1;
                }
                _ => warn!("frame refresh failed: {e}"),
            }
        }
        debug!(
            decision = ?report.decision,
            maintenance = ?report.maintenance,
            layers = report.layer_count,
            "frame processed"
        );
        Ok(())
    }

    /// Sleep for `total` in stop-aware slices. A wait too long to represent as an `Instant`
    /// lasts until the stop flag is set.
    fn pace(&self, total: Duration) {
        let deadline = Instant::now().checked_add(total);
        while !self.stopped() {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    (deadline - now).min(PACING_SLICE)
                }
                None => PACING_SLICE,
            };
            std::thread::sleep(slice);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/slideshow.rs"]
mod tests;
