//! 1:1 compositing onto the luma plane of a planar YUV picture.

use crate::blend::blend;
use crate::blit::BlitStats;
use crate::crop::CropWindow;
use crate::foundation::core::MAX_ALPHA;
use crate::frame::PlaneMut;
use crate::overlay::Overlay;

/// Composite `overlay` onto `luma` at the overlay's origin, without scaling.
///
/// Chroma planes are not touched.
pub fn blit(overlay: &Overlay, luma: &mut PlaneMut<'_>, crop_enabled: bool) -> BlitStats {
    let window = CropWindow::unscaled(overlay, crop_enabled);
    let origin = overlay.origin();

    tracing::debug!(
        width = overlay.width(),
        height = overlay.height(),
        x = origin.x,
        y = origin.y,
        pitch = luma.pitch(),
        crop = crop_enabled,
        "i420 blit"
    );

    let mut stats = BlitStats::default();
    for row in 0..overlay.height() {
        let Some(line) = overlay.row(row) else {
            break;
        };
        let dst_row = origin.y.checked_add(row);
        for (col, s) in (0u32..).zip(line) {
            stats.visited += 1;
            if !window.contains(col, row) {
                stats.cropped += 1;
                continue;
            }
            if s.alpha == 0 {
                stats.transparent += 1;
                continue;
            }

            let target = dst_row
                .zip(origin.x.checked_add(col))
                .and_then(|(y, x)| Some((y, x, luma.get_u8(y, x)?)));
            let Some((y, x, cur)) = target else {
                stats.clipped += 1;
                continue;
            };
            luma.set_u8(y, x, blend(cur, s.luma, s.alpha));
            if s.alpha == MAX_ALPHA {
                stats.replaced += 1;
            } else {
                stats.blended += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{CropBox, Origin, Sample, Size};

    fn plane(buf: &mut [u8], w: u32, h: u32) -> PlaneMut<'_> {
        PlaneMut::bytes(buf, w as usize, w, h).unwrap()
    }

    #[test]
    fn writes_at_origin_offset() {
        let mut buf = vec![0u8; 6 * 5];
        let o = Overlay::filled(Size::new(2, 2), Origin::new(3, 2), Sample::opaque(160)).unwrap();
        let stats = blit(&o, &mut plane(&mut buf, 6, 5), false);
        assert_eq!(stats.replaced, 4);
        for (i, &v) in buf.iter().enumerate() {
            let (y, x) = (i / 6, i % 6);
            let inside = (2..4).contains(&y) && (3..5).contains(&x);
            assert_eq!(v, if inside { 150 } else { 0 }, "x={x} y={y}");
        }
    }

    #[test]
    fn honours_pitch_padding() {
        let mut buf = vec![9u8; 8 * 2];
        let o = Overlay::filled(Size::new(4, 2), Origin::default(), Sample::opaque(255)).unwrap();
        let mut p = PlaneMut::bytes(&mut buf, 8, 4, 2).unwrap();
        blit(&o, &mut p, false);
        assert_eq!(&buf[0..8], &[239, 239, 239, 239, 9, 9, 9, 9]);
        assert_eq!(&buf[8..16], &[239, 239, 239, 239, 9, 9, 9, 9]);
    }

    #[test]
    fn clips_at_plane_edge() {
        let mut buf = vec![0u8; 4 * 4];
        let o = Overlay::filled(Size::new(3, 3), Origin::new(2, 2), Sample::opaque(16)).unwrap();
        let stats = blit(&o, &mut plane(&mut buf, 4, 4), false);
        assert_eq!(stats.written(), 4);
        assert_eq!(stats.clipped, 5);
    }

    #[test]
    fn crop_limits_visible_samples() {
        let mut buf = vec![0u8; 4 * 4];
        let o = Overlay::filled(Size::new(4, 4), Origin::default(), Sample::opaque(16))
            .unwrap()
            .with_crop(CropBox::new(1, 3, 1, 2))
            .unwrap();
        let stats = blit(&o, &mut plane(&mut buf, 4, 4), true);
        assert_eq!(stats.visited, 16);
        assert_eq!(stats.cropped, 14);
        assert_eq!(stats.replaced, 2);
        assert_eq!(buf[4 + 1], 15);
        assert_eq!(buf[4 + 2], 15);
        assert_eq!(buf.iter().filter(|&&v| v != 0).count(), 2);
    }
}
