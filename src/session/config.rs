use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::core::PanelSize;
use crate::foundation::error::{GhostError, GhostResult};
use crate::schedule::strategy::{SchedulerPolicy, Strategy};

/// Longest accepted inter-frame delay or empty-directory poll interval: one day.
pub const MAX_WAIT_SECS: f64 = 86_400.0;

/// Slideshow configuration, as stored in JSON.
///
/// Every field has a default matching the stock 7.5" black/red deployment, so an empty object
/// (`{}`) is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideshowConfig {
    /// Directory polled for images.
    pub image_dir: PathBuf,
    /// Panel dimensions.
    pub panel: PanelSize,
    /// Refresh strategy.
    pub strategy: Strategy,
    /// Pause after each frame, in seconds.
    pub delay_secs: f64,
    /// Canvas strategies reset once this many layers have accumulated.
    pub layer_threshold: u32,
    /// `direct-buffer` maintenance clear interval, in frames.
    pub maintenance_interval: u32,
    /// Margin around new content for `canvas-partial-region`.
    pub region_margin: u32,
    /// Margin around the circle's bounding square for `canvas-partial-circle`.
    pub circle_margin: u32,
    /// Wait before re-polling an empty or missing directory, in seconds.
    pub empty_poll_secs: f64,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        let policy = SchedulerPolicy::default();
        Self {
            image_dir: PathBuf::from("/home/pi/pics"),
            panel: PanelSize {
                width: 800,
                height: 480,
            },
            strategy: Strategy::CanvasFull,
            delay_secs: 3.0,
            layer_threshold: policy.layer_threshold,
            maintenance_interval: policy.maintenance_interval,
            region_margin: policy.region_margin,
            circle_margin: policy.circle_margin,
            empty_poll_secs: 5.0,
        }
    }
}

impl SlideshowConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GhostResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GhostError::serde(format!("parse slideshow config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GhostResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GhostError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field. Invalid configuration aborts before the panel is touched.
    pub fn validate(&self) -> GhostResult<()> {
        self.panel.validate()?;
        self.policy().validate()?;
        for (name, secs) in [
            ("delay_secs", self.delay_secs),
            ("empty_poll_secs", self.empty_poll_secs),
        ] {
            if !(0.0..=MAX_WAIT_SECS).contains(&secs) {
                return Err(GhostError::validation(format!(
                    "{name} must be between 0 and {MAX_WAIT_SECS}, got {secs}"
                )));
            }
        }
        Ok(())
    }

    /// Scheduler knobs carried by this configuration.
    pub fn policy(&self) -> SchedulerPolicy {
        SchedulerPolicy {
            layer_threshold: self.layer_threshold,
            maintenance_interval: self.maintenance_interval,
            region_margin: self.region_margin,
            circle_margin: self.circle_margin,
        }
    }

    /// Inter-frame pause.
    pub fn delay(&self) -> Duration {
        secs_to_duration(self.delay_secs)
    }

    /// Empty-directory poll interval.
    pub fn empty_poll(&self) -> Duration {
        secs_to_duration(self.empty_poll_secs)
    }
}

/// Negative or NaN becomes zero; values past what `Duration` holds saturate.
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
