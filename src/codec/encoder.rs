use rayon::prelude::*;

use crate::{
    buffer::image::ImageBuffer,
    codec::atom::{Atom, AtomGrid},
    codec::params::EncodeParams,
    codec::pool::CandidatePool,
    foundation::error::{FractalError, FractalResult},
    foundation::grid::Grid,
};

/// Winning candidate for one range block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMatch {
    pub atom: Atom,
    /// Sum of squared differences between the block and the mapped candidate.
    pub score: f32,
}

/// Encode one channel into an Atom grid.
///
/// Every range block is matched against every candidate of the channel's pool. The
/// contrast is pinned to `params.contrast()`; only the brightness offset is fitted per
/// candidate. Shape and parameter problems are reported before the search starts.
#[tracing::instrument(skip(image), fields(height = image.height(), width = image.width()))]
pub fn compress(image: &ImageBuffer, params: &EncodeParams) -> FractalResult<AtomGrid> {
    let geometry = params.geometry();
    geometry.check_image(image.height(), image.width())?;

    let pool = CandidatePool::build(image, geometry)?;
    let range_blocks = image.extract_blocks(geometry.range_size())?;
    let (rows, cols) = range_blocks.shape();

    let atoms = search_blocks(&range_blocks, &pool, params.contrast())?;
    tracing::debug!(rows, cols, pool = pool.len(), "range blocks matched");
    Grid::from_vec(rows, cols, atoms)
}

/// Match every block of `range_blocks` against `pool`, in parallel over cells.
///
/// Workers share only read access to the pool and the blocks; each produces exactly the
/// Atom for its own cell and the results are collected back in row-major order.
pub fn search_blocks(
    range_blocks: &Grid<ImageBuffer>,
    pool: &CandidatePool,
    contrast: f32,
) -> FractalResult<Vec<Atom>> {
    range_blocks
        .as_slice()
        .par_iter()
        .map(|block| {
            best_match(block, pool, contrast)
                .map(|m| m.atom)
                .ok_or_else(|| FractalError::degenerate("candidate pool is empty"))
        })
        .collect()
}

/// Scan `pool` in order and keep the candidate with the strictly smallest score.
///
/// Ties go to the candidate seen first. Returns `None` only for an empty pool.
pub fn best_match(block: &ImageBuffer, pool: &CandidatePool, contrast: f32) -> Option<BlockMatch> {
    let block_mean = block.average();
    let mut best: Option<BlockMatch> = None;
    for candidate in pool.iter() {
        let (brightness, score) = fit_brightness(
            block.as_slice(),
            block_mean,
            candidate.image.as_slice(),
            candidate.mean(),
            contrast,
        );
        if best.is_none_or(|b| score < b.score) {
            best = Some(BlockMatch {
                atom: Atom::new(
                    candidate.source_x,
                    candidate.source_y,
                    contrast,
                    brightness,
                    candidate.transform,
                ),
                score,
            });
        }
    }
    best
}

/// Fit `contrast * candidate + brightness` to `block` with `contrast` fixed.
///
/// The least-squares brightness is `mean(block - contrast * candidate)`, which equals
/// `block_mean - contrast * candidate_mean`. Returns `(brightness, sum of squared
/// differences)`.
pub fn fit_brightness(
    block: &[f32],
    block_mean: f32,
    candidate: &[f32],
    candidate_mean: f32,
    contrast: f32,
) -> (f32, f32) {
    let brightness = block_mean - contrast * candidate_mean;
    let score = block
        .iter()
        .zip(candidate)
        .map(|(&b, &c)| {
            let d = b - (contrast * c + brightness);
            d * d
        })
        .sum();
    (brightness, score)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/encoder.rs"]
mod tests;
