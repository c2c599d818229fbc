//! Symbol renderers.
//!
//! A renderer turns a payload into a square raster of the requested size.
//! Renderers are synchronous and may block; async callers run composition
//! on a blocking thread.

use crate::error::RenderError;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_ENCODER_TIMEOUT: Duration = Duration::from_secs(5);
const EXIT_POLL: Duration = Duration::from_millis(10);

/// Produces the machine-readable symbol for a label.
pub trait SymbolRenderer: Send + Sync {
    /// Render `payload` as a `size_px` x `size_px` grayscale image.
    ///
    /// # Errors
    /// `RenderError::Unavailable` when no encoder is installed; the caller
    /// is expected to degrade gracefully.
    fn render_symbol(&self, payload: &[u8], size_px: u32) -> Result<GrayImage, RenderError>;
}

impl<R: SymbolRenderer + ?Sized> SymbolRenderer for Box<R> {
    fn render_symbol(&self, payload: &[u8], size_px: u32) -> Result<GrayImage, RenderError> {
        (**self).render_symbol(payload, size_px)
    }
}

/// Renderer used when no symbol encoder is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRenderer;

impl SymbolRenderer for UnavailableRenderer {
    fn render_symbol(&self, _payload: &[u8], _size_px: u32) -> Result<GrayImage, RenderError> {
        Err(RenderError::Unavailable(
            "no symbol encoder configured".to_string(),
        ))
    }
}

/// Data Matrix renderer backed by the libdmtx `dmtxwrite` program.
///
/// The payload is piped to the program, which answers with a PNG of the
/// bare symbol at one pixel per module. The result is scaled with nearest
/// neighbour sampling so module edges stay sharp.
///
/// An encoder that runs past its timeout is killed and the render fails.
#[derive(Debug, Clone)]
pub struct DmtxCommandRenderer {
    program: PathBuf,
    timeout: Duration,
}

impl DmtxCommandRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_ENCODER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn encode_png(&self, payload: &[u8]) -> Result<Vec<u8>, RenderError> {
        let mut child = Command::new(&self.program)
            .args(["--module=1", "--margin=0", "--format=PNG"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RenderError::Unavailable(format!(
                    "{} not found",
                    self.program.display()
                )),
                _ => RenderError::Failed(format!("cannot start {}: {e}", self.program.display())),
            })?;

        // Drain stdout while waiting so a large symbol cannot stall the encoder.
        let stdout = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                pipe.read_to_end(&mut buf).map(|_| buf)
            })
        });

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(payload)
        {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RenderError::Failed(format!("cannot write payload: {e}")));
        }

        let status = self.wait(&mut child)?;

        let png = match stdout.map(|reader| reader.join()) {
            Some(Ok(Ok(buf))) => buf,
            Some(Ok(Err(e))) => return Err(RenderError::Failed(format!("cannot read encoder output: {e}"))),
            Some(Err(_)) | None => return Err(RenderError::Failed("encoder output was lost".to_string())),
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            return Err(RenderError::Unsupported(stderr.trim().to_string()));
        }

        Ok(png)
    }

    /// Wait for the encoder to exit, killing it once the timeout has passed.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RenderError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    warn!(
                        "{} still running after {:?}, killing it",
                        self.program.display(),
                        self.timeout
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RenderError::Failed(format!(
                        "encoder timed out after {} ms",
                        self.timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(EXIT_POLL),
                Err(e) => {
                    return Err(RenderError::Failed(format!("encoder did not finish: {e}")));
                }
            }
        }
    }
}

impl SymbolRenderer for DmtxCommandRenderer {
    fn render_symbol(&self, payload: &[u8], size_px: u32) -> Result<GrayImage, RenderError> {
        if payload.is_empty() {
            return Err(RenderError::Unsupported("empty payload".to_string()));
        }

        let png = self.encode_png(payload)?;
        let symbol = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|e| RenderError::Failed(format!("encoder output is not a PNG: {e}")))?
            .to_luma8();

        debug!(
            "Encoded {} byte payload as {}x{} modules",
            payload.len(),
            symbol.width(),
            symbol.height()
        );

        Ok(fit_square(&symbol, size_px))
    }
}

/// Scale `image` to exactly `size_px` square with nearest neighbour sampling.
pub fn fit_square(image: &GrayImage, size_px: u32) -> GrayImage {
    if image.width() == size_px && image.height() == size_px {
        return image.clone();
    }
    imageops::resize(image, size_px, size_px, FilterType::Nearest)
}
