use std::io::Cursor;

use super::*;

fn sample_atom() -> Atom {
    Atom::new(
        12,
        200,
        0.75,
        0.4,
        Transform::new(Reflection::Horizontal, Rotation::ThreeQuarter),
    )
}

#[test]
fn legacy_layout_is_six_bytes_in_field_order() {
    let mut buf = Vec::new();
    encode_atom(&sample_atom(), RecordFormat::Legacy, &mut buf).unwrap();
    assert_eq!(buf, vec![12, 200, 191, 102, 1, 3]);
}

#[test]
fn record_round_trip_within_quantization() {
    for format in [RecordFormat::Legacy, RecordFormat::Wide] {
        for t in Transform::ALL {
            let atom = Atom::new(255, 3, 0.1234, 0.9876, t);
            let mut buf = Vec::new();
            encode_atom(&atom, format, &mut buf).unwrap();
            assert_eq!(buf.len(), format.record_len());

            let back = decode_atom(&buf, format).unwrap();
            assert_eq!((back.source_x, back.source_y), (255, 3));
            assert_eq!(back.transform, t);
            assert!((back.contrast - atom.contrast).abs() <= 1.0 / 255.0);
            assert!((back.brightness - atom.brightness).abs() <= 1.0 / 255.0);
        }
    }
}

#[test]
fn wide_layout_holds_large_indices() {
    let atom = Atom::new(300, 1024, 0.5, 0.5, Transform::IDENTITY);
    let mut buf = Vec::new();
    assert!(encode_atom(&atom, RecordFormat::Legacy, &mut buf).is_err());
    encode_atom(&atom, RecordFormat::Wide, &mut buf).unwrap();
    assert_eq!(&buf[..4], &[44, 1, 0, 4]);
    let back = decode_atom(&buf, RecordFormat::Wide).unwrap();
    assert_eq!((back.source_x, back.source_y), (300, 1024));
}

#[test]
fn narrowest_format_follows_largest_index() {
    let small = Grid::from_fn(2, 2, |y, x| Atom::new(x as u32, y as u32, 0.5, 0.0, Transform::IDENTITY));
    assert_eq!(RecordFormat::narrowest_for([&small]), RecordFormat::Legacy);

    let large = Grid::from_fn(1, 1, |_, _| Atom::new(256, 0, 0.5, 0.0, Transform::IDENTITY));
    assert_eq!(
        RecordFormat::narrowest_for([&small, &large]),
        RecordFormat::Wide
    );
}

#[test]
fn bad_transform_bytes_are_rejected() {
    assert!(matches!(
        decode_atom(&[0, 0, 0, 0, 2, 0], RecordFormat::Legacy),
        Err(FractalError::Format(_))
    ));
    assert!(decode_atom(&[0, 0, 0, 0, 0, 4], RecordFormat::Legacy).is_err());
    assert!(decode_atom(&[0, 0, 0, 0, 0], RecordFormat::Legacy).is_err());
}

#[test]
fn channel_round_trip_reshapes_rows() {
    let grid = Grid::from_fn(3, 4, |y, x| {
        Atom::new(x as u32, y as u32, 0.25, (y * 4 + x) as f32 / 20.0, Transform::ALL[(y + x) % 8])
    });
    let mut bytes = Vec::new();
    write_channel(&mut bytes, &grid, RecordFormat::Legacy).unwrap();
    assert_eq!(bytes.len(), 12 * 6);

    let back = read_channel(&mut Cursor::new(bytes), 4, RecordFormat::Legacy).unwrap();
    assert_eq!(back, grid.map(Atom::quantized));
}

#[test]
fn truncated_channel_fails_closed() {
    let grid = Grid::from_fn(2, 2, |_, _| Atom::new(0, 0, 0.5, 0.5, Transform::IDENTITY));
    let mut bytes = Vec::new();
    write_channel(&mut bytes, &grid, RecordFormat::Legacy).unwrap();

    let partial = bytes[..bytes.len() - 2].to_vec();
    assert!(matches!(
        read_channel(&mut Cursor::new(partial), 2, RecordFormat::Legacy),
        Err(FractalError::Format(_))
    ));

    let three_records = bytes[..18].to_vec();
    assert!(read_channel(&mut Cursor::new(three_records), 2, RecordFormat::Legacy).is_err());

    assert!(read_channel(&mut Cursor::new(Vec::new()), 2, RecordFormat::Legacy).is_err());
    assert!(read_channel(&mut Cursor::new(bytes), 0, RecordFormat::Legacy).is_err());
}
