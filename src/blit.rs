pub mod i420;
pub mod rv16;

/// Per-call counters over the destination positions a blit path considered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlitStats {
    pub visited: u64,
    /// Outside the crop window.
    pub cropped: u64,
    /// Alpha 0, left untouched.
    pub transparent: u64,
    /// Alpha 15, overwritten.
    pub replaced: u64,
    pub blended: u64,
    /// Landed outside the destination plane.
    pub clipped: u64,
}

impl BlitStats {
    /// Destination pixels actually written.
    pub fn written(&self) -> u64 {
        self.replaced + self.blended
    }
}

/// A mapped source index past the end of the overlay samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    /// Destination column, relative to the scaled footprint.
    pub col: u32,
    /// Destination row, relative to the scaled footprint.
    pub row: u32,
    pub index: usize,
    pub len: usize,
}

impl std::fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "source index {} at scaled ({}, {}) is beyond {} overlay samples",
            self.index, self.col, self.row, self.len
        )
    }
}
