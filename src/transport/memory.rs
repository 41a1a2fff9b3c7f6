use crate::canvas::plane::Plane;
use crate::foundation::core::Region;
use crate::foundation::error::{GhostError, GhostResult};
use crate::transport::display::DisplayTransport;
use crate::transport::pack::PanelBuffer;

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    /// [`DisplayTransport::init`].
    Init,
    /// [`DisplayTransport::clear`].
    Clear,
    /// [`DisplayTransport::init_partial_mode`].
    InitPartialMode,
    /// [`DisplayTransport::display_full`] with the packed buffer that would go on the wire.
    DisplayFull(PanelBuffer),
    /// [`DisplayTransport::display_partial`].
    DisplayPartial {
        /// Target region.
        region: Region,
        /// Region-local black slice.
        slice: Plane,
    },
    /// [`DisplayTransport::sleep`].
    Sleep,
}

impl TransportCall {
    /// Return `true` for full or partial writes.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::DisplayFull(_) | Self::DisplayPartial { .. })
    }
}

/// Transport that records every call instead of driving hardware.
///
/// Used by tests and by `ghostink run --transport memory` for a dry run. Failures can be
/// injected for init, for the next N writes, and for sleep.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    calls: Vec<TransportCall>,
    fail_init: bool,
    fail_writes: u32,
    fail_clears: u32,
    fail_sleep: bool,
    history_limit: Option<usize>,
}

impl InMemoryTransport {
    /// Create a recorder that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make [`DisplayTransport::init`] fail with a device-init error.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make [`DisplayTransport::sleep`] fail.
    pub fn failing_sleep(mut self) -> Self {
        self.fail_sleep = true;
        self
    }

    /// Keep only the most recent `n` calls. Long dry runs use this to bound memory.
    pub fn with_history_limit(mut self, n: usize) -> Self {
        self.history_limit = Some(n.max(1));
        self
    }

    /// Fail the next `n` display calls (full or partial) with a transport error.
    pub fn fail_next_writes(&mut self, n: u32) {
        self.fail_writes = n;
    }

    /// Fail the next `n` clears with a transport error.
    pub fn fail_next_clears(&mut self, n: u32) {
        self.fail_clears = n;
    }

    /// Borrow the recorded calls in order.
    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    /// Drop recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded full or partial writes.
    pub fn write_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_write()).count()
    }

    fn record(&mut self, call: TransportCall) {
        self.calls.push(call);
        if let Some(limit) = self.history_limit
            && self.calls.len() > limit
        {
            let excess = self.calls.len() - limit;
            self.calls.drain(..excess);
        }
    }

    fn take_write_failure(&mut self) -> GhostResult<()> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(GhostError::transport("injected write failure"));
        }
        Ok(())
    }
}

impl DisplayTransport for InMemoryTransport {
    fn init(&mut self) -> GhostResult<()> {
        if self.fail_init {
            return Err(GhostError::device_init("injected init failure"));
        }
        self.record(TransportCall::Init);
        Ok(())
    }

    fn clear(&mut self) -> GhostResult<()> {
        if self.fail_clears > 0 {
            self.fail_clears -= 1;
            return Err(GhostError::transport("injected clear failure"));
        }
        self.record(TransportCall::Clear);
        Ok(())
    }

    fn init_partial_mode(&mut self) -> GhostResult<()> {
        self.record(TransportCall::InitPartialMode);
        Ok(())
    }

    fn display_full(&mut self, black: &Plane, red: &Plane) -> GhostResult<()> {
        self.take_write_failure()?;
        let buf = PanelBuffer::pack(black, red)?;
        self.record(TransportCall::DisplayFull(buf));
        Ok(())
    }

    fn display_partial(&mut self, slice: &Plane, region: Region) -> GhostResult<()> {
        self.take_write_failure()?;
        self.record(TransportCall::DisplayPartial {
            region,
            slice: slice.clone(),
        });
        Ok(())
    }

    fn sleep(&mut self) -> GhostResult<()> {
        if self.fail_sleep {
            return Err(GhostError::transport("injected sleep failure"));
        }
        self.record(TransportCall::Sleep);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/memory.rs"]
mod tests;
