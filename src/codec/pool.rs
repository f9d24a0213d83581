use rayon::prelude::*;

use crate::{
    buffer::image::ImageBuffer,
    codec::atom::Atom,
    codec::params::BlockGeometry,
    foundation::error::{FractalError, FractalResult},
    transform::dihedral::Transform,
};

/// A domain block, reduced to range size and transformed, ready for comparison.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub source_x: u32,
    pub source_y: u32,
    pub transform: Transform,
    pub image: ImageBuffer,
    mean: f32,
}

impl Candidate {
    fn new(source_x: u32, source_y: u32, transform: Transform, image: ImageBuffer) -> Self {
        let mean = image.average();
        Self {
            source_x,
            source_y,
            transform,
            image,
            mean,
        }
    }

    /// Mean sample value of [`Candidate::image`].
    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Descriptor with the identity luminance mapping (contrast 1, brightness 0).
    pub fn atom(&self) -> Atom {
        Atom::new(self.source_x, self.source_y, 1.0, 0.0, self.transform)
    }
}

/// Every (domain position x transform) of one channel, built once and then read-only.
///
/// Ordered by domain row, domain column, then [`Transform::ALL`] order.
#[derive(Clone, Debug)]
pub struct CandidatePool {
    domain_rows: usize,
    domain_cols: usize,
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Extract the domain blocks of `image`, reduce each by the scale factor and apply
    /// all eight transforms.
    #[tracing::instrument(skip(image), fields(height = image.height(), width = image.width()))]
    pub fn build(image: &ImageBuffer, geometry: BlockGeometry) -> FractalResult<Self> {
        let domain_blocks = image.extract_blocks(geometry.domain_size())?;
        if domain_blocks.is_empty() {
            return Err(FractalError::degenerate(format!(
                "no {0}x{0} domain blocks in image {1}x{2}",
                geometry.domain_size(),
                image.height(),
                image.width()
            )));
        }
        let (domain_rows, domain_cols) = domain_blocks.shape();
        let scale = geometry.scale_factor();

        let per_block = domain_blocks
            .as_slice()
            .par_iter()
            .enumerate()
            .map(|(i, block)| -> FractalResult<Vec<Candidate>> {
                let source_x = domain_index(i % domain_cols)?;
                let source_y = domain_index(i / domain_cols)?;
                let reduced = block.reduce(scale)?;
                Ok(Transform::ALL
                    .iter()
                    .map(|&t| Candidate::new(source_x, source_y, t, reduced.apply_transform(t)))
                    .collect())
            })
            .collect::<FractalResult<Vec<_>>>()?;

        let candidates: Vec<Candidate> = per_block.into_iter().flatten().collect();
        tracing::debug!(
            domain_rows,
            domain_cols,
            candidates = candidates.len(),
            "candidate pool built"
        );
        Ok(Self {
            domain_rows,
            domain_cols,
            candidates,
        })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// `(rows, cols)` of the domain-block grid the pool was built from.
    pub fn domain_shape(&self) -> (usize, usize) {
        (self.domain_rows, self.domain_cols)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Candidate for domain block `(y, x)` under `transform`.
    pub fn get(&self, y: usize, x: usize, transform: Transform) -> Option<&Candidate> {
        if y >= self.domain_rows || x >= self.domain_cols {
            return None;
        }
        self.candidates
            .get((y * self.domain_cols + x) * Transform::ALL.len() + transform.index())
    }
}

fn domain_index(i: usize) -> FractalResult<u32> {
    u32::try_from(i).map_err(|_| FractalError::parameter("domain grid index exceeds u32"))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/pool.rs"]
mod tests;
