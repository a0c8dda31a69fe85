//! Subpicture compositing onto video frames.
//!
//! A decoded [`Overlay`] (luma plus 4-bit alpha per sample) is blended into a
//! caller-owned [`DestinationFrame`]. Planar YUV targets take a 1:1 path that
//! writes the luma plane only; packed 16-bit targets take a nearest-neighbor
//! scaled path. [`render`] picks the path from the frame's FourCC and reports
//! recoverable conditions through [`Diagnostics`].
#![forbid(unsafe_code)]

pub mod blend;
pub mod blit;
pub mod compositor;
pub mod crop;
pub mod foundation;
pub mod frame;
pub mod overlay;
pub mod preview;

pub use blend::{blend, blend_rv16, y_to_rv16};
pub use blit::{BlitStats, OutOfBounds};
pub use compositor::{
    BlitPath, Diagnostic, Diagnostics, LogDiagnostics, Outcome, RenderRequest, Rendered,
    UnsupportedReason, render, render_with,
};
pub use crop::CropWindow;
pub use foundation::core::{ALPHA_BITS, CropBox, MAX_ALPHA, Origin, Sample, Scale, Size};
pub use foundation::error::{SpuError, SpuResult};
pub use frame::{DestinationFrame, FourCc, FrameLayout, LayoutKind, PlaneMut};
pub use overlay::{Overlay, OverlayDef};
