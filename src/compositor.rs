//! Format dispatch: pick a blit path from the destination FourCC and run it.

use std::fmt;

use crate::blit::{BlitStats, OutOfBounds, i420, rv16};
use crate::frame::{DestinationFrame, FourCc, FrameLayout, LayoutKind};
use crate::overlay::Overlay;

/// One compositing job: draw `overlay` into `destination`.
pub struct RenderRequest<'o, 'f> {
    pub overlay: &'o Overlay,
    pub destination: DestinationFrame<'f>,
    pub crop_enabled: bool,
}

impl<'o, 'f> RenderRequest<'o, 'f> {
    pub fn new(overlay: &'o Overlay, destination: DestinationFrame<'f>) -> Self {
        Self {
            overlay,
            destination,
            crop_enabled: false,
        }
    }

    pub fn with_crop(mut self, enabled: bool) -> Self {
        self.crop_enabled = enabled;
        self
    }
}

/// How a render call ended. None of these is fatal to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// The destination was not touched.
    SkippedUnsupportedFormat,
    /// Pixels written before the bad index stay written.
    AbortedOutOfBounds,
}

/// The blit routine a destination format is served by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlitPath {
    /// 1:1 onto the luma plane of planar 4:2:0 YUV.
    I420,
    /// Scaled onto packed 16-bit RGB.
    Rv16,
}

impl BlitPath {
    pub fn for_fourcc(fourcc: FourCc) -> Result<Self, UnsupportedReason> {
        match fourcc {
            FourCc::I420 | FourCc::IYUV | FourCc::YV12 => Ok(Self::I420),
            FourCc::RV16 => Ok(Self::Rv16),
            FourCc::RV24 | FourCc::RV32 | FourCc::YUY2 => Err(UnsupportedReason::NotImplemented),
            _ => Err(UnsupportedReason::Unknown),
        }
    }

    /// Frame layout this path writes into.
    pub fn layout(self) -> LayoutKind {
        match self {
            Self::I420 => LayoutKind::PlanarYuv,
            Self::Rv16 => LayoutKind::PackedRgb16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// Known format with no blit path yet.
    NotImplemented,
    Unknown,
    /// The FourCC names one layout but the frame carries another.
    LayoutMismatch {
        expected: LayoutKind,
        found: LayoutKind,
    },
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => f.write_str("not implemented yet"),
            Self::Unknown => f.write_str("unknown chroma"),
            Self::LayoutMismatch { expected, found } => {
                write!(f, "layout mismatch: expected {expected}, frame is {found}")
            }
        }
    }
}

/// A recoverable condition raised during a render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    UnsupportedFormat {
        fourcc: FourCc,
        reason: UnsupportedReason,
    },
    OutOfBounds(OutOfBounds),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { fourcc, reason } => {
                write!(f, "can't render subpicture onto {fourcc}: {reason}")
            }
            Self::OutOfBounds(oob) => write!(f, "trying to access beyond subpicture: {oob}"),
        }
    }
}

/// Receiver for [`Diagnostic`]s; each condition is delivered once.
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnsupportedFormat { fourcc, .. } => {
                tracing::error!(fourcc = %fourcc, "{diagnostic}");
            }
            Diagnostic::OutOfBounds(oob) => {
                tracing::error!(index = oob.index, len = oob.len, "{diagnostic}");
            }
        }
    }
}

impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Outcome plus the counters of the path that ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub outcome: Outcome,
    pub stats: BlitStats,
}

/// Composite the request's overlay, logging any diagnostic through `tracing`.
pub fn render(request: RenderRequest<'_, '_>) -> Outcome {
    render_with(request, &mut LogDiagnostics).outcome
}

/// Composite the request's overlay, sending diagnostics to `diagnostics`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(fourcc = %request.destination.fourcc(), crop = request.crop_enabled)
)]
pub fn render_with(request: RenderRequest<'_, '_>, diagnostics: &mut dyn Diagnostics) -> Rendered {
    let RenderRequest {
        overlay,
        mut destination,
        crop_enabled,
    } = request;
    let fourcc = destination.fourcc();

    let skipped = |reason| {
        (
            Diagnostic::UnsupportedFormat { fourcc, reason },
            Rendered {
                outcome: Outcome::SkippedUnsupportedFormat,
                stats: BlitStats::default(),
            },
        )
    };

    let path = match BlitPath::for_fourcc(fourcc) {
        Ok(p) => p,
        Err(reason) => {
            let (diag, rendered) = skipped(reason);
            diagnostics.report(diag);
            return rendered;
        }
    };

    let (render, output, scale) = (
        destination.render_size(),
        destination.output_size(),
        destination.scale(),
    );
    let found = destination.layout().kind();
    match (path, destination.layout_mut()) {
        (BlitPath::I420, FrameLayout::PlanarYuv { luma }) => Rendered {
            outcome: Outcome::Ok,
            stats: i420::blit(overlay, luma, crop_enabled),
        },
        (BlitPath::Rv16, FrameLayout::PackedRgb16 { plane }) => {
            let blit = rv16::blit(overlay, plane, render, output, scale, crop_enabled);
            let outcome = match blit.aborted {
                Some(oob) => {
                    diagnostics.report(Diagnostic::OutOfBounds(oob));
                    Outcome::AbortedOutOfBounds
                }
                None => Outcome::Ok,
            };
            Rendered {
                outcome,
                stats: blit.stats,
            }
        }
        (path, _) => {
            let (diag, rendered) = skipped(UnsupportedReason::LayoutMismatch {
                expected: path.layout(),
                found,
            });
            diagnostics.report(diag);
            rendered
        }
    }
}
