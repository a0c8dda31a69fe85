use crate::foundation::error::{SpuError, SpuResult};

/// Bits of opacity carried by every overlay sample.
pub const ALPHA_BITS: u32 = 4;
/// Fully opaque alpha level. `0` is fully transparent.
pub const MAX_ALPHA: u8 = (1 << ALPHA_BITS) - 1;
/// Shift that brings a `luma * alpha` product back to 8 bits.
pub const ALPHA_SCALEDOWN: u32 = 8 - ALPHA_BITS;

/// Fractional bits of the fixed-point scale factors.
pub const SCALE_SHIFT: u32 = 6;

/// One overlay texel: a luma value plus a 4-bit opacity level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sample {
    pub luma: u8,
    /// `0..=MAX_ALPHA`.
    pub alpha: u8,
}

impl Sample {
    pub const fn new(luma: u8, alpha: u8) -> Self {
        Self { luma, alpha }
    }

    pub const fn opaque(luma: u8) -> Self {
        Self {
            luma,
            alpha: MAX_ALPHA,
        }
    }
}

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered, `width * height`.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Top-left placement of an overlay, in render (native picture) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Origin {
    pub x: u32,
    pub y: u32,
}

impl Origin {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Sub-rectangle of an overlay that stays visible when cropping is enabled.
///
/// Overlay-local pixel coordinates, half-open on both axes: a column `c` is
/// inside when `x_start <= c < x_end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CropBox {
    pub x_start: u32,
    pub x_end: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl CropBox {
    pub const fn new(x_start: u32, x_end: u32, y_start: u32, y_end: u32) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    /// Box covering a whole `size` overlay.
    pub const fn full(size: Size) -> Self {
        Self::new(0, size.width, 0, size.height)
    }

    /// Check `start <= end <= size` on both axes.
    pub fn validate(self, size: Size) -> SpuResult<()> {
        if self.x_start > self.x_end || self.y_start > self.y_end {
            return Err(SpuError::validation(format!(
                "crop box start must be <= end (x {}..{}, y {}..{})",
                self.x_start, self.x_end, self.y_start, self.y_end
            )));
        }
        if self.x_end > size.width || self.y_end > size.height {
            return Err(SpuError::validation(format!(
                "crop box x {}..{}, y {}..{} exceeds overlay {}x{}",
                self.x_start, self.x_end, self.y_start, self.y_end, size.width, size.height
            )));
        }
        Ok(())
    }
}

/// Horizontal and vertical scale factors in 6-bit fixed point (`64` is 1.0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Scale {
    pub x: u32,
    pub y: u32,
}

impl Scale {
    pub const ONE: u32 = 1 << SCALE_SHIFT;
    pub const IDENTITY: Self = Self {
        x: Self::ONE,
        y: Self::ONE,
    };

    /// Derive `(output << 6) / render` on both axes.
    ///
    /// Downscaling so far that a factor truncates to zero is rejected, as is a
    /// zero render dimension.
    pub fn from_dims(render: Size, output: Size) -> SpuResult<Self> {
        if render.is_empty() {
            return Err(SpuError::validation(format!(
                "render size must be non-zero, got {}x{}",
                render.width, render.height
            )));
        }
        let x = fixed_ratio(output.width, render.width);
        let y = fixed_ratio(output.height, render.height);
        if x == 0 || y == 0 {
            return Err(SpuError::validation(format!(
                "scale {}x{} -> {}x{} is below fixed-point resolution",
                render.width, render.height, output.width, output.height
            )));
        }
        Ok(Self { x, y })
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }
}

fn fixed_ratio(num: u32, den: u32) -> u32 {
    let v = (u64::from(num) << SCALE_SHIFT) / u64::from(den);
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// `floor(v * factor / 64)`.
pub fn scale_floor(v: u32, factor: u32) -> u32 {
    let p = (u64::from(v) * u64::from(factor)) >> SCALE_SHIFT;
    u32::try_from(p).unwrap_or(u32::MAX)
}

/// `ceil(v * factor / 64)`.
pub fn scale_ceil(v: u32, factor: u32) -> u32 {
    let p = (u64::from(v) * u64::from(factor)).div_ceil(u64::from(Scale::ONE));
    u32::try_from(p).unwrap_or(u32::MAX)
}
