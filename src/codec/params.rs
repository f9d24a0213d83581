use crate::foundation::error::{FractalError, FractalResult};

/// Decode iterations used when the caller does not choose.
pub const DEFAULT_ITERATIONS: usize = 8;

/// Contrast ceiling used when the caller does not choose.
pub const DEFAULT_CONTRAST: f32 = 0.25;

/// Domain and range block sizes, validated together.
///
/// The domain size is an integer multiple of the range size (`scale_factor >= 1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockGeometry {
    domain_size: usize,
    range_size: usize,
}

impl BlockGeometry {
    pub fn new(domain_size: usize, range_size: usize) -> FractalResult<Self> {
        if range_size == 0 {
            return Err(FractalError::parameter("range size must be >= 1"));
        }
        if domain_size == 0 {
            return Err(FractalError::parameter("domain size must be >= 1"));
        }
        if domain_size < range_size || domain_size % range_size != 0 {
            return Err(FractalError::parameter(format!(
                "domain size {domain_size} must be an integer multiple of range size {range_size}"
            )));
        }
        Ok(Self {
            domain_size,
            range_size,
        })
    }

    pub fn domain_size(self) -> usize {
        self.domain_size
    }

    pub fn range_size(self) -> usize {
        self.range_size
    }

    /// `domain_size / range_size`.
    pub fn scale_factor(self) -> usize {
        self.domain_size / self.range_size
    }

    /// Reject images the block grids cannot tile exactly.
    pub fn check_image(self, height: usize, width: usize) -> FractalResult<()> {
        if height == 0 || width == 0 {
            return Err(FractalError::degenerate(format!(
                "image {height}x{width} has no samples"
            )));
        }
        for (name, size) in [("domain", self.domain_size), ("range", self.range_size)] {
            if height % size != 0 || width % size != 0 {
                return Err(FractalError::parameter(format!(
                    "{name} size {size} does not divide image {height}x{width}"
                )));
            }
        }
        Ok(())
    }

    /// `(rows, cols)` of the range-block grid (one Atom per cell).
    pub fn range_grid_shape(self, height: usize, width: usize) -> (usize, usize) {
        (height / self.range_size, width / self.range_size)
    }

    /// `(rows, cols)` of the domain-block grid Atoms may reference.
    pub fn domain_grid_shape(self, height: usize, width: usize) -> (usize, usize) {
        (height / self.domain_size, width / self.domain_size)
    }
}

/// Encoder configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodeParams {
    geometry: BlockGeometry,
    contrast: f32,
}

impl EncodeParams {
    /// `contrast` is the pinned affine scale used for every candidate, in `(0, 1]`.
    pub fn new(geometry: BlockGeometry, contrast: f32) -> FractalResult<Self> {
        if !contrast.is_finite() || contrast <= 0.0 || contrast > 1.0 {
            return Err(FractalError::parameter(format!(
                "contrast must be in (0, 1], got {contrast}"
            )));
        }
        Ok(Self { geometry, contrast })
    }

    /// [`DEFAULT_CONTRAST`] with the given geometry.
    pub fn with_default_contrast(geometry: BlockGeometry) -> Self {
        Self {
            geometry,
            contrast: DEFAULT_CONTRAST,
        }
    }

    pub fn geometry(&self) -> BlockGeometry {
        self.geometry
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }
}

/// Decoder configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeParams {
    geometry: BlockGeometry,
    iterations: usize,
}

impl DecodeParams {
    pub fn new(geometry: BlockGeometry, iterations: usize) -> FractalResult<Self> {
        if iterations == 0 {
            return Err(FractalError::parameter("iterations must be >= 1"));
        }
        Ok(Self {
            geometry,
            iterations,
        })
    }

    /// [`DEFAULT_ITERATIONS`] with the given geometry.
    pub fn with_default_iterations(geometry: BlockGeometry) -> Self {
        Self {
            geometry,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn geometry(&self) -> BlockGeometry {
        self.geometry
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/params.rs"]
mod tests;
