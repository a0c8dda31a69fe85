use std::ops::Range;

use crate::foundation::core::{Scale, scale_ceil};
use crate::overlay::Overlay;

/// Visible region of an overlay, in the coordinates a blit path iterates.
///
/// For the 1:1 path those are overlay-local `(col, row)`; for scaled paths
/// they are offsets inside the scaled footprint. With cropping disabled every
/// coordinate is visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropWindow {
    enabled: bool,
    cols: Range<u32>,
    rows: Range<u32>,
}

impl CropWindow {
    pub fn unscaled(overlay: &Overlay, enabled: bool) -> Self {
        let c = overlay.crop();
        Self {
            enabled,
            cols: c.x_start..c.x_end,
            rows: c.y_start..c.y_end,
        }
    }

    /// Crop box scaled into destination space.
    ///
    /// Bounds round up, so a destination column is visible exactly when the
    /// source column `floor(x * 64 / scale.x)` it samples is inside the box.
    pub fn scaled(overlay: &Overlay, scale: Scale, enabled: bool) -> Self {
        let c = overlay.crop();
        Self {
            enabled,
            cols: scale_ceil(c.x_start, scale.x)..scale_ceil(c.x_end, scale.x),
            rows: scale_ceil(c.y_start, scale.y)..scale_ceil(c.y_end, scale.y),
        }
    }

    #[inline]
    pub fn contains_row(&self, row: u32) -> bool {
        !self.enabled || self.rows.contains(&row)
    }

    #[inline]
    pub fn contains_col(&self, col: u32) -> bool {
        !self.enabled || self.cols.contains(&col)
    }

    #[inline]
    pub fn contains(&self, col: u32, row: u32) -> bool {
        self.contains_col(col) && self.contains_row(row)
    }
}
