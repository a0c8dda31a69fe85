//! Scaled compositing onto a packed 16-bit picture.
//!
//! Nearest-neighbor in both directions. Source coordinates come from the
//! 6-bit fixed-point factors of the destination frame. The footprint width is
//! the overlay width scaled by the same factor, so a column never samples past
//! its own row. The footprint height comes from the exact `output / render`
//! ratio and can run a row past the truncated factor near the bottom edge, so
//! every mapped index is checked against the sample count before it is read.

use crate::blend::blend_rv16;
use crate::blit::{BlitStats, OutOfBounds};
use crate::crop::CropWindow;
use crate::foundation::core::{MAX_ALPHA, SCALE_SHIFT, Scale, Size, scale_ceil, scale_floor};
use crate::frame::PlaneMut;
use crate::overlay::Overlay;

/// Result of one scaled blit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rv16Blit {
    pub stats: BlitStats,
    /// Set when the blit stopped at an out-of-range source index.
    pub aborted: Option<OutOfBounds>,
}

/// Size of the overlay once scaled from `render` to `output` resolution.
///
/// Width is `(width * scale.x) >> 6`; height is `height * output / render`.
pub fn footprint(overlay: &Overlay, render: Size, output: Size, scale: Scale) -> Size {
    let height = if render.height == 0 {
        0
    } else {
        let v = u64::from(overlay.height()) * u64::from(output.height) / u64::from(render.height);
        u32::try_from(v).unwrap_or(u32::MAX)
    };
    Size::new(scale_floor(overlay.width(), scale.x), height)
}

/// Composite `overlay` onto `plane`, scaling from `render` to `output` size.
///
/// Destination rows that sample the same source row are filled together from
/// one fetched row. Stops at the first source index past the overlay data,
/// which can only be the first visible column of a run below the last source
/// row; pixels written before that point stay written.
pub fn blit(
    overlay: &Overlay,
    plane: &mut PlaneMut<'_>,
    render: Size,
    output: Size,
    scale: Scale,
    crop_enabled: bool,
) -> Rv16Blit {
    let window = CropWindow::scaled(overlay, scale, crop_enabled);
    let scaled = footprint(overlay, render, output, scale);
    let origin = overlay.origin();
    let (ox, oy) = (scale_floor(origin.x, scale.x), scale_floor(origin.y, scale.y));
    let samples = overlay.samples();
    let len = samples.len();
    let src_width = overlay.width() as usize;

    tracing::debug!(
        width = overlay.width(),
        height = overlay.height(),
        scaled_width = scaled.width,
        scaled_height = scaled.height,
        xscale = scale.x,
        yscale = scale.y,
        pitch = plane.pitch(),
        crop = crop_enabled,
        "rv16 blit"
    );

    let mut stats = BlitStats::default();
    let mut y = 0u32;
    while y < scaled.height {
        let src_row = (u64::from(y) << SCALE_SHIFT) / u64::from(scale.y);
        let next = u64::from(scale_ceil(
            u32::try_from(src_row + 1).unwrap_or(u32::MAX),
            scale.y,
        ));
        let run_end = next.clamp(u64::from(y) + 1, u64::from(scaled.height)) as u32;
        let run = y..run_end;
        let run_len = u64::from(run_end - y);

        if !run.clone().any(|r| window.contains_row(r)) {
            stats.visited += run_len * u64::from(scaled.width);
            stats.cropped += run_len * u64::from(scaled.width);
            y = run_end;
            continue;
        }

        let row_base = (src_row as usize).saturating_mul(src_width);
        for x in 0..scaled.width {
            stats.visited += run_len;
            if !window.contains_col(x) {
                stats.cropped += run_len;
                continue;
            }

            let src_col = ((u64::from(x) << SCALE_SHIFT) / u64::from(scale.x)) as usize;
            let index = row_base.saturating_add(src_col);
            let Some(&s) = samples.get(index) else {
                return Rv16Blit {
                    stats,
                    aborted: Some(OutOfBounds {
                        col: x,
                        row: y,
                        index,
                        len,
                    }),
                };
            };

            if s.alpha == 0 {
                stats.transparent += run_len;
                continue;
            }

            for r in run.clone() {
                if !window.contains_row(r) {
                    stats.cropped += 1;
                    continue;
                }
                let target = oy
                    .checked_add(r)
                    .zip(ox.checked_add(x))
                    .and_then(|(dy, dx)| Some((dy, dx, plane.get_u16(dy, dx)?)));
                let Some((dy, dx, cur)) = target else {
                    stats.clipped += 1;
                    continue;
                };
                plane.set_u16(dy, dx, blend_rv16(cur, s.luma, s.alpha));
                if s.alpha == MAX_ALPHA {
                    stats.replaced += 1;
                } else {
                    stats.blended += 1;
                }
            }
        }
        y = run_end;
    }

    Rv16Blit {
        stats,
        aborted: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::y_to_rv16;
    use crate::foundation::core::{CropBox, Origin, Sample};

    fn words(buf: &[u8]) -> Vec<u16> {
        buf.chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect()
    }

    fn gradient(w: u32, h: u32) -> Overlay {
        let samples = (0..w * h).map(|i| Sample::opaque((i * 16) as u8)).collect();
        let size = Size::new(w, h);
        Overlay::new(size, Origin::default(), samples, CropBox::full(size)).unwrap()
    }

    #[test]
    fn footprint_width_follows_fixed_point_factor() {
        let o = gradient(3, 3);
        let (render, output) = (Size::new(3, 3), Size::new(4, 4));
        let scale = Scale::from_dims(render, output).unwrap();
        assert_eq!(scale.x, 85);
        // exact ratio would give 4 columns; 3 * 85 >> 6 is 3
        assert_eq!(footprint(&o, render, output, scale), Size::new(3, 4));
    }

    #[test]
    fn doubles_in_both_directions() {
        let o = gradient(2, 2);
        let (render, output) = (Size::new(2, 2), Size::new(4, 4));
        let scale = Scale::from_dims(render, output).unwrap();
        let mut buf = vec![0u8; 4 * 4 * 2];
        let mut p = PlaneMut::words(&mut buf, 8, 4, 4).unwrap();
        let out = blit(&o, &mut p, render, output, scale, false);
        assert_eq!(out.aborted, None);
        assert_eq!(out.stats.replaced, 16);

        let px = words(&buf);
        let v = |i: u32| y_to_rv16((i * 16) as u8);
        #[rustfmt::skip]
        let expected = vec![
            v(0), v(0), v(1), v(1),
            v(0), v(0), v(1), v(1),
            v(2), v(2), v(3), v(3),
            v(2), v(2), v(3), v(3),
        ];
        assert_eq!(px, expected);
    }

    #[test]
    fn vertical_runs_cover_every_row_once() {
        // 1.5x vertically: source rows map to runs of 2, 1, 2, 1 ...
        let o = gradient(1, 4);
        let (render, output) = (Size::new(2, 2), Size::new(2, 3));
        let scale = Scale::from_dims(render, output).unwrap();
        let mut buf = vec![0u8; 6 * 2];
        let mut p = PlaneMut::words(&mut buf, 2, 1, 6).unwrap();
        let out = blit(&o, &mut p, render, output, scale, false);
        assert_eq!(out.aborted, None);
        assert_eq!(out.stats.visited, 6);
        assert_eq!(out.stats.replaced, 6);
        let v = |i: u32| y_to_rv16((i * 16) as u8);
        assert_eq!(words(&buf), vec![v(0), v(0), v(1), v(2), v(2), v(3)]);
    }

    #[test]
    fn aborts_on_row_past_the_overlay_and_stops_writing() {
        // 64 * 132 / 130 truncates to 64 while the footprint grows to 133 rows.
        let o = Overlay::filled(Size::new(1, 131), Origin::default(), Sample::opaque(255)).unwrap();
        let (render, output) = (Size::new(130, 130), Size::new(132, 132));
        let scale = Scale::from_dims(render, output).unwrap();
        assert!(scale.is_identity());

        let mut buf = vec![0u8; 132 * 132 * 2];
        let mut p = PlaneMut::words(&mut buf, 264, 132, 132).unwrap();
        let out = blit(&o, &mut p, render, output, scale, false);
        assert_eq!(
            out.aborted,
            Some(OutOfBounds {
                col: 0,
                row: 131,
                index: 131,
                len: 131
            })
        );
        assert_eq!(out.stats.replaced, 131);
        let px = words(&buf);
        for (i, &w) in px.iter().enumerate() {
            let lit = i % 132 == 0 && i / 132 < 131;
            assert_eq!(w, if lit { 0x0fff } else { 0 }, "pixel {i}");
        }
    }

    #[test]
    fn wide_rows_never_sample_the_next_row() {
        // 720 -> 768 gives a factor of 68 (1.0625) against an exact 1.0667.
        let size = Size::new(400, 2);
        let samples = (0..800)
            .map(|i| Sample::opaque(if i < 400 { 0x10 } else { 0xf0 }))
            .collect();
        let o = Overlay::new(size, Origin::default(), samples, CropBox::full(size)).unwrap();
        let (render, output) = (Size::new(720, 2), Size::new(768, 2));
        let scale = Scale::from_dims(render, output).unwrap();
        assert_eq!(footprint(&o, render, output, scale), Size::new(425, 2));

        let mut buf = vec![0u8; 768 * 2 * 2];
        let mut p = PlaneMut::words(&mut buf, 768 * 2, 768, 2).unwrap();
        let out = blit(&o, &mut p, render, output, scale, false);
        assert_eq!(out.aborted, None);
        assert_eq!(out.stats.replaced, 850);
        let px = words(&buf);
        assert!(px[..425].iter().all(|&w| w == y_to_rv16(0x10)));
        assert!(px[768..768 + 425].iter().all(|&w| w == y_to_rv16(0xf0)));
        assert!(px[425..768].iter().all(|&w| w == 0));
    }

    #[test]
    fn cropped_bottom_rows_never_trip_the_guard() {
        let o = Overlay::filled(Size::new(1, 131), Origin::default(), Sample::opaque(255))
            .unwrap()
            .with_crop(CropBox::new(0, 1, 0, 100))
            .unwrap();
        let (render, output) = (Size::new(130, 130), Size::new(132, 132));
        let scale = Scale::from_dims(render, output).unwrap();
        let mut buf = vec![0u8; 132 * 132 * 2];
        let mut p = PlaneMut::words(&mut buf, 264, 132, 132).unwrap();
        let out = blit(&o, &mut p, render, output, scale, true);
        assert_eq!(out.aborted, None);
        assert_eq!(out.stats.replaced, 100);
    }

    #[test]
    fn origin_is_scaled() {
        let o = Overlay::filled(Size::new(1, 1), Origin::new(2, 1), Sample::opaque(255)).unwrap();
        let (render, output) = (Size::new(4, 4), Size::new(8, 8));
        let scale = Scale::from_dims(render, output).unwrap();
        let mut buf = vec![0u8; 8 * 8 * 2];
        let mut p = PlaneMut::words(&mut buf, 16, 8, 8).unwrap();
        blit(&o, &mut p, render, output, scale, false);
        let px = words(&buf);
        let lit: Vec<usize> = (0..64).filter(|&i| px[i] != 0).collect();
        assert_eq!(lit, vec![2 * 8 + 4, 2 * 8 + 5, 3 * 8 + 4, 3 * 8 + 5]);
    }
}
