use std::collections::HashSet;

use super::*;
use crate::buffer::image::ImageBuffer;

fn asymmetric_block() -> ImageBuffer {
    ImageBuffer::from_fn(4, 4, |y, x| (y * 4 + x) as f32 * 0.0625)
}

#[test]
fn all_lists_eight_distinct_transforms_in_index_order() {
    let set: HashSet<Transform> = Transform::ALL.iter().copied().collect();
    assert_eq!(set.len(), 8);
    for (i, t) in Transform::ALL.iter().enumerate() {
        assert_eq!(t.index(), i);
    }
    assert_eq!(Transform::ALL[0], Transform::IDENTITY);
    assert_eq!(
        Transform::ALL[5],
        Transform::new(Reflection::Horizontal, Rotation::Quarter)
    );
}

#[test]
fn transforms_produce_distinct_images_on_asymmetric_block() {
    let block = asymmetric_block();
    let images: Vec<ImageBuffer> = Transform::ALL
        .iter()
        .map(|t| block.apply_transform(*t))
        .collect();
    for i in 0..images.len() {
        for j in (i + 1)..images.len() {
            assert_ne!(images[i], images[j], "transforms {i} and {j} coincide");
        }
    }
}

#[test]
fn inverse_restores_bit_for_bit() {
    let block = asymmetric_block();
    for t in Transform::ALL {
        let there = block.apply_transform(t);
        assert_eq!(there.apply_inverse_transform(t), block, "{t:?}");
        assert_eq!(there.apply_transform(t.inverse()), block, "{t:?}");
    }
}

#[test]
fn group_is_closed_under_composition() {
    let block = asymmetric_block();
    let images: Vec<ImageBuffer> = Transform::ALL
        .iter()
        .map(|t| block.apply_transform(*t))
        .collect();
    for a in Transform::ALL {
        for b in Transform::ALL {
            let composed = block.apply_transform(a).apply_transform(b);
            assert!(images.contains(&composed), "{a:?} then {b:?}");
        }
    }
}

#[test]
fn reflected_transforms_are_involutions() {
    for rotation in Rotation::ALL {
        let t = Transform::new(Reflection::Horizontal, rotation);
        assert_eq!(t.inverse(), t);
    }
    assert_eq!(
        Transform::new(Reflection::None, Rotation::Quarter).inverse(),
        Transform::new(Reflection::None, Rotation::ThreeQuarter)
    );
}

#[test]
fn wire_bytes_are_validated() {
    assert_eq!(Reflection::from_byte(1).unwrap(), Reflection::Horizontal);
    assert!(Reflection::from_byte(2).is_err());
    assert_eq!(Rotation::from_byte(3).unwrap(), Rotation::ThreeQuarter);
    assert!(matches!(
        Rotation::from_byte(4),
        Err(FractalError::Format(_))
    ));
}
