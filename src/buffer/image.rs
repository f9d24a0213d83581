use rand::Rng;
use rayon::prelude::*;

use crate::{
    foundation::error::{FractalError, FractalResult},
    foundation::grid::Grid,
    transform::dihedral::{Reflection, Rotation, Transform},
};

/// A single-channel image: `height x width` `f32` samples in row-major order.
///
/// Samples are nominally in `[0, 1]` but arithmetic may push them outside that range;
/// only the raster export clamps. The shape never changes after construction; every
/// geometric operation returns a new buffer of a checked, derived shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl ImageBuffer {
    /// Zero-filled buffer.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![0.0; height * width],
        }
    }

    /// Wrap row-major samples. `data.len()` must equal `height * width`.
    pub fn from_vec(height: usize, width: usize, data: Vec<f32>) -> FractalResult<Self> {
        let expected = height
            .checked_mul(width)
            .ok_or_else(|| FractalError::parameter("image shape overflows usize"))?;
        if data.len() != expected {
            return Err(FractalError::parameter(format!(
                "image {height}x{width} expects {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Buffer with sample `(y, x)` set to `f(y, x)`.
    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(height * width);
        for y in 0..height {
            for x in 0..width {
                data.push(f(y, x));
            }
        }
        Self {
            height,
            width,
            data,
        }
    }

    /// Independent uniform samples in `[0, 1)`.
    ///
    /// Used to seed decoding. The generator is supplied by the caller so tests can pin it.
    pub fn random<R: Rng + ?Sized>(height: usize, width: usize, rng: &mut R) -> Self {
        let data = (0..height * width).map(|_| rng.r#gen::<f32>()).collect();
        Self {
            height,
            width,
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at row `y`, column `x`. Panics when out of bounds.
    pub fn get(&self, y: usize, x: usize) -> f32 {
        assert!(y < self.height && x < self.width, "sample out of bounds");
        self.data[y * self.width + x]
    }

    /// Overwrite sample `(y, x)`. Panics when out of bounds.
    pub fn set(&mut self, y: usize, x: usize, v: f32) {
        assert!(y < self.height && x < self.width, "sample out of bounds");
        self.data[y * self.width + x] = v;
    }

    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Mirror the buffer. [`Reflection::None`] returns a copy.
    pub fn reflect(&self, reflection: Reflection) -> Self {
        match reflection {
            Reflection::None => self.clone(),
            Reflection::Horizontal => {
                let w = self.width;
                Self::from_fn(self.height, w, |y, x| self.data[y * w + (w - 1 - x)])
            }
        }
    }

    /// Rotate clockwise. Quarter turns swap height and width.
    pub fn rotate(&self, rotation: Rotation) -> Self {
        let (h, w) = (self.height, self.width);
        match rotation {
            Rotation::None => self.clone(),
            // out(r, c) = in(h - 1 - c, r), shape w x h
            Rotation::Quarter => Self::from_fn(w, h, |r, c| self.data[(h - 1 - c) * w + r]),
            Rotation::Half => Self::from_fn(h, w, |r, c| self.data[(h - 1 - r) * w + (w - 1 - c)]),
            // out(r, c) = in(c, w - 1 - r), shape w x h
            Rotation::ThreeQuarter => {
                Self::from_fn(w, h, |r, c| self.data[c * w + (w - 1 - r)])
            }
        }
    }

    /// Reflect, then rotate.
    pub fn apply_transform(&self, transform: Transform) -> Self {
        match transform.reflection {
            Reflection::None => self.rotate(transform.rotation),
            reflection => self.reflect(reflection).rotate(transform.rotation),
        }
    }

    /// Undo [`ImageBuffer::apply_transform`] for the same `transform`.
    pub fn apply_inverse_transform(&self, transform: Transform) -> Self {
        self.rotate(transform.rotation.inverse())
            .reflect(transform.reflection)
    }

    /// Structural subsampling: output `(y, x)` copies input `(y * factor, x * factor)`.
    ///
    /// No averaging takes place. `factor` must be non-zero and divide both dimensions;
    /// `reduce(1)` is a copy.
    pub fn reduce(&self, factor: usize) -> FractalResult<Self> {
        check_factor(self.height, self.width, factor, "reduce")?;
        if factor == 1 {
            return Ok(self.clone());
        }
        let w = self.width;
        Ok(Self::from_fn(
            self.height / factor,
            self.width / factor,
            |y, x| self.data[(y * factor) * w + x * factor],
        ))
    }

    /// Nearest-neighbour replication: every sample becomes a `factor x factor` cell.
    pub fn expand(&self, factor: usize) -> FractalResult<Self> {
        if factor == 0 {
            return Err(FractalError::parameter("expand factor must be >= 1"));
        }
        let w = self.width;
        Ok(Self::from_fn(
            self.height * factor,
            self.width * factor,
            |y, x| self.data[(y / factor) * w + x / factor],
        ))
    }

    /// Multiply every sample by `s`.
    pub fn multiply(&self, s: f32) -> Self {
        self.map(|v| v * s)
    }

    /// Add `b` to every sample.
    pub fn add(&self, b: f32) -> Self {
        self.map(|v| v + b)
    }

    /// Element-wise sum. Shapes must match.
    pub fn add_buffer(&self, other: &ImageBuffer) -> FractalResult<Self> {
        self.zip_with(other, "add_buffer", |a, b| a + b)
    }

    /// Element-wise product. Shapes must match.
    pub fn multiply_buffer(&self, other: &ImageBuffer) -> FractalResult<Self> {
        self.zip_with(other, "multiply_buffer", |a, b| a * b)
    }

    /// Sum of squared per-sample differences.
    ///
    /// Not normalised: only meaningful for ranking candidates of the same shape.
    pub fn distance_to(&self, other: &ImageBuffer) -> FractalResult<f32> {
        self.check_same_shape(other, "distance_to")?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b) * (a - b))
            .sum())
    }

    /// [`ImageBuffer::distance_to`] divided by the sample count.
    pub fn mean_squared_error(&self, other: &ImageBuffer) -> FractalResult<f32> {
        let d = self.distance_to(other)?;
        if self.data.is_empty() {
            return Ok(0.0);
        }
        Ok(d / self.data.len() as f32)
    }

    /// Largest absolute per-sample difference.
    pub fn max_abs_difference(&self, other: &ImageBuffer) -> FractalResult<f32> {
        self.check_same_shape(other, "max_abs_difference")?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max))
    }

    /// Arithmetic mean of all samples; `0.0` for an empty buffer.
    pub fn average(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// Copy of the `height x width` region whose top-left corner is `(x, y)`.
    pub fn crop(&self, x: usize, y: usize, height: usize, width: usize) -> FractalResult<Self> {
        self.check_region(x, y, height, width, "crop")?;
        let src_w = self.width;
        Ok(Self::from_fn(height, width, |r, c| {
            self.data[(y + r) * src_w + (x + c)]
        }))
    }

    /// Partition into non-overlapping `n x n` blocks, enumerated row-major.
    ///
    /// `n` must be non-zero and divide both dimensions.
    pub fn extract_blocks(&self, n: usize) -> FractalResult<Grid<ImageBuffer>> {
        check_factor(self.height, self.width, n, "extract_blocks")?;
        let rows = self.height / n;
        let cols = self.width / n;
        let mut blocks = Vec::with_capacity(rows * cols);
        for by in 0..rows {
            for bx in 0..cols {
                blocks.push(self.crop(bx * n, by * n, n, n)?);
            }
        }
        Grid::from_vec(rows, cols, blocks)
    }

    /// Write `block` into `self` with its top-left corner at `(x, y)`.
    pub fn insert(&mut self, x: usize, y: usize, block: &ImageBuffer) -> FractalResult<()> {
        self.check_region(x, y, block.height, block.width, "insert")?;
        let w = self.width;
        for r in 0..block.height {
            let dst = (y + r) * w + x;
            self.data[dst..dst + block.width].copy_from_slice(block.row(r));
        }
        Ok(())
    }

    /// Split into disjoint horizontal bands of `band_height` rows for parallel writers.
    ///
    /// `band_height` must be non-zero and divide the height. Each band owns its rows
    /// exclusively, so writers on different bands can never alias.
    pub fn row_bands_mut(
        &mut self,
        band_height: usize,
    ) -> FractalResult<impl IndexedParallelIterator<Item = RowBand<'_>>> {
        if band_height == 0 || self.height % band_height != 0 {
            return Err(FractalError::parameter(format!(
                "band height {band_height} must be >= 1 and divide image height {}",
                self.height
            )));
        }
        let width = self.width;
        let chunk = (band_height * width).max(1);
        Ok(self
            .data
            .par_chunks_mut(chunk)
            .enumerate()
            .map(move |(i, data)| RowBand {
                top: i * band_height,
                width,
                data,
            }))
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            height: self.height,
            width: self.width,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    fn zip_with(
        &self,
        other: &ImageBuffer,
        op: &str,
        f: impl Fn(f32, f32) -> f32,
    ) -> FractalResult<Self> {
        self.check_same_shape(other, op)?;
        Ok(Self {
            height: self.height,
            width: self.width,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    fn check_same_shape(&self, other: &ImageBuffer, op: &str) -> FractalResult<()> {
        if self.height != other.height || self.width != other.width {
            return Err(FractalError::parameter(format!(
                "{op}: shape mismatch {}x{} vs {}x{}",
                self.height, self.width, other.height, other.width
            )));
        }
        Ok(())
    }

    fn check_region(
        &self,
        x: usize,
        y: usize,
        height: usize,
        width: usize,
        op: &str,
    ) -> FractalResult<()> {
        let fits = x
            .checked_add(width)
            .is_some_and(|end| end <= self.width)
            && y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits {
            return Err(FractalError::parameter(format!(
                "{op}: region {height}x{width} at (x={x}, y={y}) exceeds image {}x{}",
                self.height, self.width
            )));
        }
        Ok(())
    }
}

/// Exclusive view of a horizontal strip of an [`ImageBuffer`].
#[derive(Debug)]
pub struct RowBand<'a> {
    top: usize,
    width: usize,
    data: &'a mut [f32],
}

impl RowBand<'_> {
    /// First image row covered by this band.
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    /// Write `block` at column `x`, band row `0`. The block must fit inside the band.
    pub fn insert(&mut self, x: usize, block: &ImageBuffer) -> FractalResult<()> {
        let fits = block.height() <= self.height()
            && x.checked_add(block.width()).is_some_and(|end| end <= self.width);
        if !fits {
            return Err(FractalError::parameter(format!(
                "band insert: block {}x{} at x={x} exceeds band {}x{}",
                block.height(),
                block.width(),
                self.height(),
                self.width
            )));
        }
        for r in 0..block.height() {
            let dst = r * self.width + x;
            self.data[dst..dst + block.width()].copy_from_slice(block.row(r));
        }
        Ok(())
    }
}

fn check_factor(height: usize, width: usize, factor: usize, op: &str) -> FractalResult<()> {
    if factor == 0 {
        return Err(FractalError::parameter(format!("{op}: size must be >= 1")));
    }
    if height % factor != 0 || width % factor != 0 {
        return Err(FractalError::parameter(format!(
            "{op}: size {factor} does not divide image {height}x{width}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/image.rs"]
mod tests;
