use crate::{foundation::grid::Grid, transform::dihedral::Transform};

/// Encoded description of one range block.
///
/// `source_x`/`source_y` index the domain-block grid, not pixels. The in-memory index is
/// wider than any on-disk record format so that large images can be searched; the record
/// writer decides whether a grid fits the legacy 8-bit layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atom {
    pub source_x: u32,
    pub source_y: u32,
    /// Affine scale applied to the domain block.
    pub contrast: f32,
    /// Affine offset applied after scaling.
    pub brightness: f32,
    pub transform: Transform,
}

/// One Atom per range block, row-major.
pub type AtomGrid = Grid<Atom>;

impl Atom {
    pub fn new(
        source_x: u32,
        source_y: u32,
        contrast: f32,
        brightness: f32,
        transform: Transform,
    ) -> Self {
        Self {
            source_x,
            source_y,
            contrast,
            brightness,
            transform,
        }
    }

    /// The Atom as it reads back after persistence: contrast and brightness snapped to
    /// the 8-bit grid and clamped to `[0, 1]`.
    pub fn quantized(&self) -> Self {
        Self {
            contrast: dequantize_unit(quantize_unit(self.contrast)),
            brightness: dequantize_unit(quantize_unit(self.brightness)),
            ..*self
        }
    }
}

/// Map `[0, 1]` to `0..=255`, clamping out-of-range values. NaN maps to 0.
pub fn quantize_unit(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Inverse of [`quantize_unit`] on its image.
pub fn dequantize_unit(b: u8) -> f32 {
    f32::from(b) / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/codec/atom.rs"]
mod tests;
