//! Integer alpha compositing for 4-bit overlay opacity.
//!
//! The arithmetic is a fast approximation, not exact linear compositing:
//! the source weight is biased by one (`alpha + 1`) so that high alpha levels
//! land close to full replacement, and alpha `0` is special-cased because the
//! generic formula would still leak one sixteenth of the source.

use crate::foundation::core::{ALPHA_SCALEDOWN, MAX_ALPHA};

/// Composite a source luma over a destination byte.
///
/// `alpha` is `0..=15`; anything larger is treated as fully opaque.
#[inline]
pub fn blend(dest: u8, luma: u8, alpha: u8) -> u8 {
    match alpha {
        0 => dest,
        a if a >= MAX_ALPHA => opaque(luma),
        a => {
            let src = u16::from(luma) * u16::from(a + 1);
            let dst = u16::from(dest) * u16::from(MAX_ALPHA - a);
            ((src + dst) >> ALPHA_SCALEDOWN) as u8
        }
    }
}

/// Full-replacement value for `luma`, `(luma * 15) >> 4`.
#[inline]
pub fn opaque(luma: u8) -> u8 {
    ((u16::from(luma) * u16::from(MAX_ALPHA)) >> ALPHA_SCALEDOWN) as u8
}

/// Greyscale packed pixel: the top nibble of `luma` in each of the three
/// 4-bit colour channels.
#[inline]
pub fn y_to_rv16(luma: u8) -> u16 {
    0x111 * u16::from(luma >> 4)
}

const RV16_CHANNEL_SHIFTS: [u32; 3] = [8, 4, 0];

/// Composite a source luma over a packed 16-bit pixel.
///
/// Each 4-bit channel is blended on its own with [`blend`] against the luma's
/// top nibble, so no channel carries into its neighbour. Bits above the three
/// colour channels are preserved.
#[inline]
pub fn blend_rv16(dest: u16, luma: u8, alpha: u8) -> u16 {
    match alpha {
        0 => dest,
        a if a >= MAX_ALPHA => (dest & 0xf000) | y_to_rv16(luma),
        a => {
            let src = luma >> 4;
            let mut out = dest & 0xf000;
            for shift in RV16_CHANNEL_SHIFTS {
                let ch = ((dest >> shift) & 0x0f) as u8;
                out |= u16::from(blend(ch, src, a) & 0x0f) << shift;
            }
            out
        }
    }
}
