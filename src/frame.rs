use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Scale, Size};
use crate::foundation::error::{SpuError, SpuResult};

/// Four-character pixel format code, e.g. `I420` or `RV16`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const I420: Self = Self(*b"I420");
    pub const IYUV: Self = Self(*b"IYUV");
    pub const YV12: Self = Self(*b"YV12");
    pub const RV16: Self = Self(*b"RV16");
    pub const RV24: Self = Self(*b"RV24");
    pub const RV32: Self = Self(*b"RV32");
    pub const YUY2: Self = Self(*b"YUY2");
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({self})")
    }
}

impl FromStr for FourCc {
    type Err = SpuError;

    fn from_str(s: &str) -> SpuResult<Self> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| SpuError::format(format!("fourcc must be 4 bytes, got '{s}'")))?;
        Ok(Self(bytes.map(|b| b.to_ascii_uppercase())))
    }
}

/// Bounds-checked mutable view of one picture plane in caller-owned memory.
///
/// `pitch` is the byte distance between lines and may exceed the visible
/// `width * pixel_bytes`. Coordinates outside `width x lines` are rejected by
/// every accessor, so a bad placement can never touch memory beyond the plane.
pub struct PlaneMut<'a> {
    data: &'a mut [u8],
    pitch: usize,
    width: u32,
    lines: u32,
    pixel_bytes: usize,
}

impl<'a> PlaneMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        pitch: usize,
        width: u32,
        lines: u32,
        pixel_bytes: usize,
    ) -> SpuResult<Self> {
        if pixel_bytes == 0 {
            return Err(SpuError::validation("plane pixel size must be > 0"));
        }
        let row_bytes = (width as usize)
            .checked_mul(pixel_bytes)
            .ok_or_else(|| SpuError::validation("plane row size overflow"))?;
        if pitch < row_bytes {
            return Err(SpuError::validation(format!(
                "plane pitch {pitch} is smaller than a {width}-pixel row ({row_bytes} bytes)"
            )));
        }
        let needed = match lines {
            0 => 0,
            n => pitch
                .checked_mul(n as usize - 1)
                .and_then(|v| v.checked_add(row_bytes))
                .ok_or_else(|| SpuError::validation("plane size overflow"))?,
        };
        if data.len() < needed {
            return Err(SpuError::validation(format!(
                "plane buffer holds {} bytes, {width}x{lines} at pitch {pitch} needs {needed}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            pitch,
            width,
            lines,
            pixel_bytes,
        })
    }

    /// 8-bit plane, such as the luma plane of a planar YUV picture.
    pub fn bytes(data: &'a mut [u8], pitch: usize, width: u32, lines: u32) -> SpuResult<Self> {
        Self::new(data, pitch, width, lines, 1)
    }

    /// Packed 16-bit plane, native endian.
    pub fn words(data: &'a mut [u8], pitch: usize, width: u32, lines: u32) -> SpuResult<Self> {
        Self::new(data, pitch, width, lines, 2)
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn pixel_bytes(&self) -> usize {
        self.pixel_bytes
    }

    fn offset(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.lines || col >= self.width {
            return None;
        }
        Some(row as usize * self.pitch + col as usize * self.pixel_bytes)
    }

    pub fn get_u8(&self, row: u32, col: u32) -> Option<u8> {
        self.offset(row, col).map(|o| self.data[o])
    }

    /// Returns `false` (and writes nothing) when `(row, col)` is off-plane.
    pub fn set_u8(&mut self, row: u32, col: u32, v: u8) -> bool {
        match self.offset(row, col) {
            Some(o) => {
                self.data[o] = v;
                true
            }
            None => false,
        }
    }

    pub fn get_u16(&self, row: u32, col: u32) -> Option<u16> {
        if self.pixel_bytes < 2 {
            return None;
        }
        let o = self.offset(row, col)?;
        Some(u16::from_ne_bytes([self.data[o], self.data[o + 1]]))
    }

    pub fn set_u16(&mut self, row: u32, col: u32, v: u16) -> bool {
        if self.pixel_bytes < 2 {
            return false;
        }
        match self.offset(row, col) {
            Some(o) => {
                self.data[o..o + 2].copy_from_slice(&v.to_ne_bytes());
                true
            }
            None => false,
        }
    }
}

/// Pixel layout of a destination picture.
pub enum FrameLayout<'a> {
    /// Planar YUV; only the luma plane is ever written.
    PlanarYuv { luma: PlaneMut<'a> },
    /// Single plane of 16-bit pixels with 4-bit colour channels.
    PackedRgb16 { plane: PlaneMut<'a> },
}

impl FrameLayout<'_> {
    pub fn kind(&self) -> LayoutKind {
        match self {
            Self::PlanarYuv { .. } => LayoutKind::PlanarYuv,
            Self::PackedRgb16 { .. } => LayoutKind::PackedRgb16,
        }
    }
}

/// [`FrameLayout`] without its planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    PlanarYuv,
    PackedRgb16,
}

impl LayoutKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::PlanarYuv => "planar-yuv",
            Self::PackedRgb16 => "packed-rgb16",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A destination picture, borrowed from the video-output cycle for one call.
///
/// `render` is the native picture size the overlay was placed against;
/// `output` is the requested display size. Scaled paths derive their factors
/// from the pair, which is checked once here.
pub struct DestinationFrame<'a> {
    fourcc: FourCc,
    layout: FrameLayout<'a>,
    render: Size,
    output: Size,
    scale: Scale,
}

impl<'a> DestinationFrame<'a> {
    pub fn new(fourcc: FourCc, layout: FrameLayout<'a>, render: Size, output: Size) -> SpuResult<Self> {
        let scale = Scale::from_dims(render, output)?;
        Ok(Self {
            fourcc,
            layout,
            render,
            output,
            scale,
        })
    }

    /// Planar picture at native resolution (`output == render`).
    pub fn planar(fourcc: FourCc, luma: PlaneMut<'a>) -> SpuResult<Self> {
        let size = Size::new(luma.width(), luma.lines());
        Self::new(fourcc, FrameLayout::PlanarYuv { luma }, size, size)
    }

    /// Packed 16-bit picture displayed at the plane's size, rendered at `render`.
    pub fn packed_rgb16(fourcc: FourCc, plane: PlaneMut<'a>, render: Size) -> SpuResult<Self> {
        let output = Size::new(plane.width(), plane.lines());
        Self::new(fourcc, FrameLayout::PackedRgb16 { plane }, render, output)
    }

    pub fn fourcc(&self) -> FourCc {
        self.fourcc
    }

    pub fn layout(&self) -> &FrameLayout<'a> {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut FrameLayout<'a> {
        &mut self.layout
    }

    pub fn render_size(&self) -> Size {
        self.render
    }

    pub fn output_size(&self) -> Size {
        self.output
    }

    /// `(output << 6) / render` on both axes.
    pub fn scale(&self) -> Scale {
        self.scale
    }
}
