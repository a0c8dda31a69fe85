use crate::foundation::core::{CropBox, MAX_ALPHA, Origin, Sample, Size};
use crate::foundation::error::{SpuError, SpuResult};

/// A decoded subpicture, ready for compositing.
///
/// Samples are row-major and already expanded from the run-length stream, so
/// `samples.len() == width * height`. The invariants are checked once here;
/// the blit paths rely on them without re-checking.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "OverlayDef", into = "OverlayDef")]
pub struct Overlay {
    size: Size,
    origin: Origin,
    samples: Vec<Sample>,
    crop: CropBox,
}

impl Overlay {
    pub fn new(size: Size, origin: Origin, samples: Vec<Sample>, crop: CropBox) -> SpuResult<Self> {
        if samples.len() != size.area() {
            return Err(SpuError::validation(format!(
                "overlay {}x{} needs {} samples, got {}",
                size.width,
                size.height,
                size.area(),
                samples.len()
            )));
        }
        if let Some(i) = samples.iter().position(|s| s.alpha > MAX_ALPHA) {
            return Err(SpuError::validation(format!(
                "sample {i} has alpha {} (max {MAX_ALPHA})",
                samples[i].alpha
            )));
        }
        crop.validate(size)?;
        Ok(Self {
            size,
            origin,
            samples,
            crop,
        })
    }

    /// Overlay where every sample is `sample` and the crop box covers everything.
    pub fn filled(size: Size, origin: Origin, sample: Sample) -> SpuResult<Self> {
        Self::new(size, origin, vec![sample; size.area()], CropBox::full(size))
    }

    /// Replace the crop box, re-checking it against the overlay bounds.
    pub fn with_crop(mut self, crop: CropBox) -> SpuResult<Self> {
        crop.validate(self.size)?;
        self.crop = crop;
        Ok(self)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn crop(&self) -> CropBox {
        self.crop
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Row `row` as a slice of `width` samples.
    pub fn row(&self, row: u32) -> Option<&[Sample]> {
        let w = self.size.width as usize;
        let start = (row as usize).checked_mul(w)?;
        self.samples.get(start..start.checked_add(w)?)
    }
}

/// Plain wire shape of [`Overlay`], validated on the way in.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OverlayDef {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub origin: Origin,
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub crop: Option<CropBox>,
}

impl TryFrom<OverlayDef> for Overlay {
    type Error = SpuError;

    fn try_from(def: OverlayDef) -> SpuResult<Self> {
        let size = Size::new(def.width, def.height);
        let crop = def.crop.unwrap_or(CropBox::full(size));
        Self::new(size, def.origin, def.samples, crop)
    }
}

impl From<Overlay> for OverlayDef {
    fn from(o: Overlay) -> Self {
        Self {
            width: o.size.width,
            height: o.size.height,
            origin: o.origin,
            samples: o.samples,
            crop: Some(o.crop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sample_count_mismatch() {
        let err = Overlay::new(
            Size::new(2, 2),
            Origin::default(),
            vec![Sample::opaque(1); 3],
            CropBox::full(Size::new(2, 2)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs 4 samples"));
    }

    #[test]
    fn rejects_alpha_above_4_bits() {
        let err = Overlay::filled(Size::new(1, 1), Origin::default(), Sample::new(9, 16))
            .unwrap_err();
        assert!(err.to_string().contains("alpha 16"));
    }

    #[test]
    fn rejects_crop_outside_overlay() {
        let o = Overlay::filled(Size::new(4, 2), Origin::default(), Sample::opaque(0)).unwrap();
        assert!(o.with_crop(CropBox::new(0, 4, 0, 3)).is_err());
    }

    #[test]
    fn row_slices_are_row_major() {
        let samples = (0..6).map(|i| Sample::opaque(i as u8)).collect();
        let size = Size::new(3, 2);
        let o = Overlay::new(size, Origin::default(), samples, CropBox::full(size)).unwrap();
        let lumas: Vec<u8> = o.row(1).unwrap().iter().map(|s| s.luma).collect();
        assert_eq!(lumas, vec![3, 4, 5]);
        assert!(o.row(2).is_none());
    }

    #[test]
    fn json_without_crop_defaults_to_full_box() {
        let json = r#"{
            "width": 2, "height": 1,
            "origin": { "x": 5, "y": 7 },
            "samples": [ { "luma": 10, "alpha": 15 }, { "luma": 20, "alpha": 0 } ]
        }"#;
        let o: Overlay = serde_json::from_str(json).unwrap();
        assert_eq!(o.crop(), CropBox::new(0, 2, 0, 1));
        assert_eq!(o.origin(), Origin::new(5, 7));
    }

    #[test]
    fn json_goes_through_validation() {
        let json = r#"{ "width": 2, "height": 2, "samples": [] }"#;
        assert!(serde_json::from_str::<Overlay>(json).is_err());
    }
}
