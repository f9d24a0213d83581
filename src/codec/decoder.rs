use std::iter::FusedIterator;

use rand::Rng;
use rayon::prelude::*;

use crate::{
    buffer::image::ImageBuffer,
    codec::atom::AtomGrid,
    codec::params::{BlockGeometry, DecodeParams},
    foundation::error::{FractalError, FractalResult},
};

/// Reconstructs a channel from its Atom grid by fixed-point iteration.
///
/// Construction validates the grid against the geometry once (every domain reference
/// must land inside the decoded image), so stepping afterwards cannot go out of bounds.
#[derive(Clone, Copy, Debug)]
pub struct Decoder<'a> {
    atoms: &'a AtomGrid,
    geometry: BlockGeometry,
    height: usize,
    width: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(atoms: &'a AtomGrid, geometry: BlockGeometry) -> FractalResult<Self> {
        if atoms.is_empty() {
            return Err(FractalError::degenerate("atom grid is empty"));
        }
        let r = geometry.range_size();
        let height = atoms
            .rows()
            .checked_mul(r)
            .ok_or_else(|| FractalError::parameter("decoded height overflows usize"))?;
        let width = atoms
            .cols()
            .checked_mul(r)
            .ok_or_else(|| FractalError::parameter("decoded width overflows usize"))?;
        geometry.check_image(height, width)?;

        let (domain_rows, domain_cols) = geometry.domain_grid_shape(height, width);
        for ((y, x), atom) in atoms.indexed() {
            if atom.source_y as usize >= domain_rows || atom.source_x as usize >= domain_cols {
                return Err(FractalError::format(format!(
                    "atom ({y}, {x}) references domain block ({}, {}) outside {domain_rows}x{domain_cols} grid",
                    atom.source_y, atom.source_x
                )));
            }
        }

        Ok(Self {
            atoms,
            geometry,
            height,
            width,
        })
    }

    /// Height of every iterate.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of every iterate.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Iterate 0: uniform noise of the decoded shape.
    pub fn seed<R: Rng + ?Sized>(&self, rng: &mut R) -> ImageBuffer {
        ImageBuffer::random(self.height, self.width, rng)
    }

    /// One application of the encoded mapping: build iterate `i + 1` from `previous`.
    ///
    /// The output is split into one band per range-block row before dispatch; each
    /// worker reads `previous` and writes only its own band.
    pub fn step(&self, previous: &ImageBuffer) -> FractalResult<ImageBuffer> {
        if previous.height() != self.height || previous.width() != self.width {
            return Err(FractalError::parameter(format!(
                "iterate is {}x{}, decoder expects {}x{}",
                previous.height(),
                previous.width(),
                self.height,
                self.width
            )));
        }
        let r = self.geometry.range_size();
        let scale = self.geometry.scale_factor();
        let domain_blocks = previous.extract_blocks(self.geometry.domain_size())?;

        let mut next = ImageBuffer::new(self.height, self.width);
        next.row_bands_mut(r)?
            .zip(self.atoms.as_slice().par_chunks(self.atoms.cols()))
            .try_for_each(|(mut band, row)| -> FractalResult<()> {
                for (x, atom) in row.iter().enumerate() {
                    let domain = domain_blocks
                        .get(atom.source_y as usize, atom.source_x as usize)
                        .ok_or_else(|| FractalError::format("domain reference out of range"))?;
                    let block = domain
                        .reduce(scale)?
                        .apply_transform(atom.transform)
                        .multiply(atom.contrast)
                        .add(atom.brightness);
                    band.insert(x * r, &block)?;
                }
                Ok(())
            })?;
        Ok(next)
    }

    /// Lazy sequence of `iterations + 1` images: the seed, then each iterate.
    pub fn iterations<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        rng: &mut R,
    ) -> FractalResult<Iterations<'a>> {
        if iterations == 0 {
            return Err(FractalError::parameter("iterations must be >= 1"));
        }
        Ok(Iterations {
            decoder: *self,
            current: Some(self.seed(rng)),
            yielded: 0,
            total: iterations + 1,
        })
    }

    /// Run `iterations` steps from a random seed and return the last iterate.
    pub fn decode<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        rng: &mut R,
    ) -> FractalResult<ImageBuffer> {
        if iterations == 0 {
            return Err(FractalError::parameter("iterations must be >= 1"));
        }
        let mut current = self.seed(rng);
        for i in 1..=iterations {
            let next = self.step(&current)?;
            if tracing::enabled!(tracing::Level::DEBUG) {
                let delta = next.max_abs_difference(&current)?;
                tracing::debug!(iteration = i, delta, "decode iteration");
            }
            current = next;
        }
        Ok(current)
    }
}

/// The iterates of one decode, produced on demand.
///
/// Each iterate depends on the previous one, so the sequence cannot be restarted or
/// sampled out of order. Yields the seed first; an error ends the sequence.
#[derive(Debug)]
pub struct Iterations<'a> {
    decoder: Decoder<'a>,
    current: Option<ImageBuffer>,
    yielded: usize,
    total: usize,
}

impl Iterator for Iterations<'_> {
    type Item = FractalResult<ImageBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded >= self.total {
            return None;
        }
        let current = self.current.take()?;
        if self.yielded > 0 {
            match self.decoder.step(&current) {
                Ok(next) => {
                    self.yielded += 1;
                    self.current = Some(next.clone());
                    return Some(Ok(next));
                }
                Err(e) => {
                    self.yielded = self.total;
                    return Some(Err(e));
                }
            }
        }
        self.yielded += 1;
        self.current = Some(current.clone());
        Some(Ok(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.yielded;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Iterations<'_> {}

impl FusedIterator for Iterations<'_> {}

/// Decode one channel: `params.iterations()` steps from a seed drawn from `rng`.
#[tracing::instrument(skip(atoms, rng), fields(rows = atoms.rows(), cols = atoms.cols()))]
pub fn decompress<R: Rng + ?Sized>(
    atoms: &AtomGrid,
    params: &DecodeParams,
    rng: &mut R,
) -> FractalResult<ImageBuffer> {
    Decoder::new(atoms, params.geometry())?.decode(params.iterations(), rng)
}

/// Decode one channel, keeping every iterate (seed included).
pub fn decompress_iterations<'a, R: Rng + ?Sized>(
    atoms: &'a AtomGrid,
    params: &DecodeParams,
    rng: &mut R,
) -> FractalResult<Iterations<'a>> {
    Decoder::new(atoms, params.geometry())?.iterations(params.iterations(), rng)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/decoder.rs"]
mod tests;
