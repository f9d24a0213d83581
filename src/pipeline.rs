use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::{
    buffer::image::ImageBuffer,
    codec::atom::AtomGrid,
    codec::decoder::{Decoder, decompress},
    codec::encoder::compress,
    codec::params::{DecodeParams, EncodeParams},
    foundation::error::{FractalError, FractalResult},
    io::container::{CHANNEL_ENTRIES, CompressedImage},
    io::raster::RgbChannels,
};

/// Worker-pool controls for multi-channel work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Threading {
    /// Explicit worker thread count; `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Compress the three channels of `image`, in parallel with each other.
#[tracing::instrument(skip(image), fields(height = image.height(), width = image.width()))]
pub fn compress_rgb(
    image: &RgbChannels,
    params: &EncodeParams,
    threading: &Threading,
) -> FractalResult<CompressedImage> {
    params
        .geometry()
        .check_image(image.height(), image.width())?;
    let pool = build_thread_pool(threading.threads)?;

    let grids = pool.install(|| {
        image
            .channels()
            .par_iter()
            .zip(CHANNEL_ENTRIES.par_iter())
            .map(|(channel, name)| -> FractalResult<AtomGrid> {
                let started = Instant::now();
                let grid = compress(channel, params)?;
                tracing::info!(
                    channel = *name,
                    rows = grid.rows(),
                    cols = grid.cols(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "channel compressed"
                );
                Ok(grid)
            })
            .collect::<FractalResult<Vec<_>>>()
    })?;

    CompressedImage::new(into_three(grids)?, Some(*params))
}

/// Decode all three channels and recombine them.
///
/// Each channel gets its own generator derived from `seed`; `None` seeds from OS
/// entropy. The same seed always reproduces the same output.
#[tracing::instrument(skip(image), fields(shape = ?image.shape()))]
pub fn decompress_rgb(
    image: &CompressedImage,
    params: &DecodeParams,
    seed: Option<u64>,
    threading: &Threading,
) -> FractalResult<RgbChannels> {
    let seeds = channel_seeds(seed);
    let pool = build_thread_pool(threading.threads)?;

    let planes = pool.install(|| {
        image
            .channels()
            .par_iter()
            .zip(seeds.par_iter())
            .zip(CHANNEL_ENTRIES.par_iter())
            .map(|((atoms, &seed), name)| -> FractalResult<ImageBuffer> {
                let started = Instant::now();
                let mut rng = StdRng::seed_from_u64(seed);
                let plane = decompress(atoms, params, &mut rng)?;
                tracing::info!(
                    channel = *name,
                    iterations = params.iterations(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "channel decompressed"
                );
                Ok(plane)
            })
            .collect::<FractalResult<Vec<_>>>()
    })?;

    RgbChannels::new(into_three(planes)?)
}

/// Decode all three channels keeping every iterate: element `i` of the result is
/// iterate `i` (element 0 is the random seed).
pub fn decompress_rgb_iterates(
    image: &CompressedImage,
    params: &DecodeParams,
    seed: Option<u64>,
    threading: &Threading,
) -> FractalResult<Vec<RgbChannels>> {
    let seeds = channel_seeds(seed);
    let pool = build_thread_pool(threading.threads)?;

    let per_channel = pool.install(|| {
        image
            .channels()
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(atoms, &seed)| -> FractalResult<Vec<ImageBuffer>> {
                let mut rng = StdRng::seed_from_u64(seed);
                Decoder::new(atoms, params.geometry())?
                    .iterations(params.iterations(), &mut rng)?
                    .collect()
            })
            .collect::<FractalResult<Vec<_>>>()
    })?;

    let [r, g, b] = into_three(per_channel)?;
    r.into_iter()
        .zip(g)
        .zip(b)
        .map(|((r, g), b)| RgbChannels::new([r, g, b]))
        .collect()
}

fn channel_seeds(seed: Option<u64>) -> [u64; 3] {
    let mut master = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    std::array::from_fn(|_| master.r#gen::<u64>())
}

fn into_three<T>(items: Vec<T>) -> FractalResult<[T; 3]> {
    let n = items.len();
    items
        .try_into()
        .map_err(|_| FractalError::degenerate(format!("expected three channels, got {n}")))
}

fn build_thread_pool(threads: Option<usize>) -> FractalResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FractalError::parameter(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FractalError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
