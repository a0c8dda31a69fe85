//! Convert destination planes into `image` buffers for inspection.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::frame::PlaneMut;

/// Copy an 8-bit plane into a greyscale image, dropping pitch padding.
pub fn luma_to_gray(plane: &PlaneMut<'_>) -> GrayImage {
    GrayImage::from_fn(plane.width(), plane.lines(), |x, y| {
        Luma([plane.get_u8(y, x).unwrap_or(0)])
    })
}

/// Expand a packed 16-bit plane (three 4-bit channels) to 8-bit RGB.
pub fn rv16_to_rgb(plane: &PlaneMut<'_>) -> RgbImage {
    RgbImage::from_fn(plane.width(), plane.lines(), |x, y| {
        let px = plane.get_u16(y, x).unwrap_or(0);
        let ch = |shift: u32| ((px >> shift) & 0x0f) as u8 * 17;
        Rgb([ch(8), ch(4), ch(0)])
    })
}
