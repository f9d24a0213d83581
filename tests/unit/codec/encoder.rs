use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::{codec::params::BlockGeometry, transform::dihedral::Transform};

fn noise(height: usize, width: usize, seed: u64) -> ImageBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    ImageBuffer::random(height, width, &mut rng)
}

#[test]
fn grid_has_one_atom_per_range_block() {
    let img = noise(16, 32, 1);
    let params = EncodeParams::new(BlockGeometry::new(8, 4).unwrap(), 0.5).unwrap();
    let grid = compress(&img, &params).unwrap();
    assert_eq!(grid.shape(), (4, 8));
    for atom in grid.iter() {
        assert_eq!(atom.contrast, 0.5);
        assert!(atom.source_y < 2 && atom.source_x < 4);
    }
}

#[test]
fn fit_matches_buffer_formulation() {
    let block = noise(4, 4, 2);
    let cand = noise(4, 4, 3);
    let c = 0.75;
    let (brightness, score) =
        fit_brightness(block.as_slice(), block.average(), cand.as_slice(), cand.average(), c);

    let expected_b = block
        .add_buffer(&cand.multiply(-c))
        .unwrap()
        .average();
    let expected_s = block
        .distance_to(&cand.multiply(c).add(expected_b))
        .unwrap();
    assert!((brightness - expected_b).abs() < 1e-5);
    assert!((score - expected_s).abs() < 1e-4);
}

#[test]
fn best_match_is_minimal_over_pool() {
    let img = noise(16, 16, 4);
    let g = BlockGeometry::new(8, 4).unwrap();
    let pool = CandidatePool::build(&img, g).unwrap();
    let blocks = img.extract_blocks(4).unwrap();
    let c = 0.25;

    for block in blocks.iter().take(4) {
        let m = best_match(block, &pool, c).unwrap();
        for cand in pool.iter() {
            let b = block.average() - c * cand.mean();
            let s = block.distance_to(&cand.image.multiply(c).add(b)).unwrap();
            assert!(m.score <= s + 1e-5);
        }
    }
}

#[test]
fn ties_resolve_to_first_candidate() {
    let img = ImageBuffer::from_fn(16, 16, |_, _| 0.5);
    let params = EncodeParams::new(BlockGeometry::new(8, 4).unwrap(), 0.25).unwrap();
    let grid = compress(&img, &params).unwrap();
    for atom in grid.iter() {
        assert_eq!((atom.source_x, atom.source_y), (0, 0));
        assert_eq!(atom.transform, Transform::IDENTITY);
        assert!((atom.brightness - 0.375).abs() < 1e-6);
    }
}

#[test]
fn equal_domain_and_range_size_compresses() {
    let img = noise(8, 8, 5);
    let g = BlockGeometry::new(4, 4).unwrap();
    let pool = CandidatePool::build(&img, g).unwrap();
    let blocks = img.extract_blocks(4).unwrap();
    for block in blocks.iter() {
        // With contrast 1 every block can map onto itself exactly.
        let m = best_match(block, &pool, 1.0).unwrap();
        assert!(m.score < 1e-8, "score {}", m.score);
    }

    let params = EncodeParams::new(g, 1.0).unwrap();
    assert_eq!(compress(&img, &params).unwrap().shape(), (2, 2));
}

#[test]
fn bad_geometry_is_rejected_before_search() {
    let img = noise(12, 12, 6);
    let params = EncodeParams::new(BlockGeometry::new(8, 4).unwrap(), 0.5).unwrap();
    assert!(matches!(
        compress(&img, &params),
        Err(FractalError::Parameter(_))
    ));
}
