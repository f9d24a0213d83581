//! Fractal (partitioned IFS) image compression.
//!
//! An image is stored as a contractive mapping instead of pixels. Each small "range"
//! block is described by a reference to a larger "domain" block of the same image plus a
//! dihedral transform, a contrast scale and a brightness offset. Decoding starts from
//! noise and applies the mapping repeatedly; the iterates converge to an approximation of
//! the original at any seed.
//!
//! The surface is layered:
//!
//! - single-channel encode/decode: [`compress`], [`decompress`], [`Decoder`]
//! - three-channel RGB pipeline: [`compress_rgb`], [`decompress_rgb`]
//! - on-disk archive: [`save`], [`load`], [`write_container`], [`read_container`]
#![forbid(unsafe_code)]

mod buffer;
mod codec;
mod foundation;
mod io;
mod pipeline;
mod transform;

pub use crate::buffer::image::{ImageBuffer, RowBand};
pub use crate::codec::atom::{Atom, AtomGrid, dequantize_unit, quantize_unit};
pub use crate::codec::decoder::{Decoder, Iterations, decompress, decompress_iterations};
pub use crate::codec::encoder::{BlockMatch, best_match, compress, fit_brightness, search_blocks};
pub use crate::codec::params::{
    BlockGeometry, DEFAULT_CONTRAST, DEFAULT_ITERATIONS, DecodeParams, EncodeParams,
};
pub use crate::codec::pool::{Candidate, CandidatePool};
pub use crate::foundation::error::{FractalError, FractalResult};
pub use crate::foundation::grid::Grid;
pub use crate::io::container::{CompressedImage, load, read_container, save, write_container};
pub use crate::io::raster::{RgbChannels, load_rgb, save_rgb};
pub use crate::io::record::{
    RecordFormat, decode_atom, encode_atom, read_channel, write_channel,
};
pub use crate::pipeline::{Threading, compress_rgb, decompress_rgb, decompress_rgb_iterates};
pub use crate::transform::dihedral::{Reflection, Rotation, Transform};
