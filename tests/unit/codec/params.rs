use super::*;

#[test]
fn geometry_requires_integer_multiple() {
    let g = BlockGeometry::new(8, 4).unwrap();
    assert_eq!(g.scale_factor(), 2);
    assert_eq!(BlockGeometry::new(4, 4).unwrap().scale_factor(), 1);

    for (d, r) in [(6, 4), (2, 4), (0, 4), (8, 0)] {
        assert!(
            matches!(BlockGeometry::new(d, r), Err(FractalError::Parameter(_))),
            "({d}, {r}) should be rejected"
        );
    }
}

#[test]
fn check_image_requires_both_sizes_to_divide() {
    let g = BlockGeometry::new(8, 4).unwrap();
    assert!(g.check_image(16, 32).is_ok());
    assert!(matches!(
        g.check_image(12, 16),
        Err(FractalError::Parameter(_))
    ));
    assert!(matches!(
        g.check_image(0, 16),
        Err(FractalError::Degenerate(_))
    ));
}

#[test]
fn grid_shapes() {
    let g = BlockGeometry::new(8, 4).unwrap();
    assert_eq!(g.range_grid_shape(256, 128), (64, 32));
    assert_eq!(g.domain_grid_shape(256, 128), (32, 16));
}

#[test]
fn contrast_must_be_in_unit_interval() {
    let g = BlockGeometry::new(8, 4).unwrap();
    assert!(EncodeParams::new(g, 1.0).is_ok());
    assert!(EncodeParams::new(g, 0.125).is_ok());
    for c in [0.0, -0.5, 1.5, f32::NAN, f32::INFINITY] {
        assert!(EncodeParams::new(g, c).is_err(), "{c}");
    }
    assert_eq!(
        EncodeParams::with_default_contrast(g).contrast(),
        DEFAULT_CONTRAST
    );
}

#[test]
fn iterations_must_be_positive() {
    let g = BlockGeometry::new(8, 4).unwrap();
    assert!(DecodeParams::new(g, 0).is_err());
    assert_eq!(DecodeParams::new(g, 3).unwrap().iterations(), 3);
    assert_eq!(
        DecodeParams::with_default_iterations(g).iterations(),
        DEFAULT_ITERATIONS
    );
}
