use super::*;
use crate::transform::dihedral::{Reflection, Rotation};

fn ramp(height: usize, width: usize) -> ImageBuffer {
    ImageBuffer::from_fn(height, width, |y, x| ((y * width + x) % 17) as f32 / 16.0)
}

#[test]
fn pool_holds_eight_candidates_per_domain_block() {
    let img = ramp(16, 24);
    let g = BlockGeometry::new(8, 4).unwrap();
    let pool = CandidatePool::build(&img, g).unwrap();
    assert_eq!(pool.domain_shape(), (2, 3));
    assert_eq!(pool.len(), 2 * 3 * 8);
    assert!(
        pool.iter()
            .all(|c| c.image.height() == 4 && c.image.width() == 4)
    );
}

#[test]
fn pool_order_is_row_column_transform() {
    let img = ramp(16, 16);
    let pool = CandidatePool::build(&img, BlockGeometry::new(8, 4).unwrap()).unwrap();
    let order: Vec<(u32, u32, Transform)> = pool
        .iter()
        .map(|c| (c.source_y, c.source_x, c.transform))
        .collect();
    assert_eq!(order[0], (0, 0, Transform::IDENTITY));
    assert_eq!(order[7], (0, 0, Transform::ALL[7]));
    assert_eq!(order[8], (0, 1, Transform::IDENTITY));
    assert_eq!(order[16], (1, 0, Transform::IDENTITY));
}

#[test]
fn candidate_content_is_reduce_then_transform() {
    let img = ramp(16, 16);
    let g = BlockGeometry::new(8, 4).unwrap();
    let pool = CandidatePool::build(&img, g).unwrap();
    let t = Transform::new(Reflection::Horizontal, Rotation::Quarter);

    let expected = img
        .crop(8, 0, 8, 8)
        .unwrap()
        .reduce(2)
        .unwrap()
        .apply_transform(t);
    let c = pool.get(0, 1, t).unwrap();
    assert_eq!(c.image, expected);
    assert_eq!(c.mean(), expected.average());
    assert_eq!(c.atom(), Atom::new(1, 0, 1.0, 0.0, t));
    assert!(pool.get(2, 0, t).is_none());
}

#[test]
fn scale_factor_one_uses_blocks_unreduced() {
    let img = ramp(8, 8);
    let pool = CandidatePool::build(&img, BlockGeometry::new(4, 4).unwrap()).unwrap();
    assert_eq!(pool.len(), 4 * 8);
    let c = pool.get(1, 1, Transform::IDENTITY).unwrap();
    assert_eq!(c.image, img.crop(4, 4, 4, 4).unwrap());
}

#[test]
fn non_dividing_domain_size_is_rejected() {
    let img = ramp(12, 12);
    assert!(CandidatePool::build(&img, BlockGeometry::new(8, 4).unwrap()).is_err());
}

#[test]
fn empty_image_is_degenerate() {
    let img = ImageBuffer::new(0, 0);
    assert!(matches!(
        CandidatePool::build(&img, BlockGeometry::new(8, 4).unwrap()),
        Err(FractalError::Degenerate(_))
    ));
}
