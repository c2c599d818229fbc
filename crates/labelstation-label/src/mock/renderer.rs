//! Deterministic symbol renderer.

use crate::error::RenderError;
use crate::renderer::SymbolRenderer;
use image::{GrayImage, Luma};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Calls {
    count: usize,
    last: Option<(Vec<u8>, u32)>,
}

/// Renderer that draws a fixed pattern and records what it was asked for.
///
/// The pattern has a solid left column and bottom row, like a Data Matrix
/// finder, over a checkerboard. Clones share the call record.
#[derive(Debug, Clone, Default)]
pub struct FixedSymbolRenderer {
    native_size: Option<u32>,
    failure: Option<RenderError>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Calls>>,
}

impl FixedSymbolRenderer {
    /// Renders at exactly the requested size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always renders `size` x `size`, whatever was requested.
    pub fn with_native_size(size: u32) -> Self {
        Self {
            native_size: Some(size),
            ..Self::default()
        }
    }

    /// Always fails with `error`.
    pub fn failing(error: RenderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Block the calling thread for `delay` on every request, like a slow
    /// external encoder.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of render requests so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().count
    }

    /// Payload and size of the most recent request.
    pub fn last_request(&self) -> Option<(Vec<u8>, u32)> {
        self.calls.lock().last.clone()
    }
}

impl SymbolRenderer for FixedSymbolRenderer {
    fn render_symbol(&self, payload: &[u8], size_px: u32) -> Result<GrayImage, RenderError> {
        {
            let mut calls = self.calls.lock();
            calls.count += 1;
            calls.last = Some((payload.to_vec(), size_px));
        }

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let n = self.native_size.unwrap_or(size_px).max(1);
        Ok(GrayImage::from_fn(n, n, |x, y| {
            if x == 0 || y == n - 1 || (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        }))
    }
}
