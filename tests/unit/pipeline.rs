use super::*;
use crate::codec::params::BlockGeometry;

fn gradient(h: usize, w: usize, phase: f32) -> ImageBuffer {
    ImageBuffer::from_fn(h, w, |y, x| ((x + y) as f32 / (h + w) as f32 + phase).fract())
}

fn sample() -> RgbChannels {
    RgbChannels::new([
        gradient(16, 16, 0.0),
        gradient(16, 16, 0.3),
        gradient(16, 16, 0.6),
    ])
    .unwrap()
}

fn encode_params() -> EncodeParams {
    EncodeParams::new(BlockGeometry::new(8, 4).unwrap(), 0.5).unwrap()
}

#[test]
fn zero_threads_is_rejected() {
    let threading = Threading { threads: Some(0) };
    assert!(matches!(
        compress_rgb(&sample(), &encode_params(), &threading),
        Err(FractalError::Parameter(_))
    ));
}

#[test]
fn compress_matches_single_channel_encoder() {
    let image = sample();
    let params = encode_params();
    let out = compress_rgb(&image, &params, &Threading { threads: Some(2) }).unwrap();

    assert_eq!(out.shape(), (4, 4));
    assert_eq!(out.params(), Some(params));
    for (grid, channel) in out.channels().iter().zip(image.channels()) {
        assert_eq!(grid, &compress(channel, &params).unwrap());
    }
}

#[test]
fn decode_is_reproducible_for_a_fixed_seed() {
    let compressed = compress_rgb(&sample(), &encode_params(), &Threading::default()).unwrap();
    let params = DecodeParams::new(BlockGeometry::new(8, 4).unwrap(), 4).unwrap();

    let a = decompress_rgb(&compressed, &params, Some(7), &Threading::default()).unwrap();
    let b = decompress_rgb(&compressed, &params, Some(7), &Threading { threads: Some(1) }).unwrap();
    assert_eq!(a, b);
    assert_eq!((a.height(), a.width()), (16, 16));
}

#[test]
fn iterates_end_with_the_decoded_image() {
    let compressed = compress_rgb(&sample(), &encode_params(), &Threading::default()).unwrap();
    let params = DecodeParams::new(BlockGeometry::new(8, 4).unwrap(), 3).unwrap();

    let iterates =
        decompress_rgb_iterates(&compressed, &params, Some(11), &Threading::default()).unwrap();
    assert_eq!(iterates.len(), 4);

    let last = decompress_rgb(&compressed, &params, Some(11), &Threading::default()).unwrap();
    assert_eq!(iterates.last(), Some(&last));
}

#[test]
fn mismatched_geometry_is_rejected() {
    let image = sample();
    let params = EncodeParams::new(BlockGeometry::new(6, 3).unwrap(), 0.5).unwrap();
    assert!(compress_rgb(&image, &params, &Threading::default()).is_err());
}
