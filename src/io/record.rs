//! Fixed-width binary records, one per Atom, row-major over the grid.
//!
//! Legacy layout (6 bytes): `source_x:u8 source_y:u8 contrast:u8 brightness:u8
//! reflection:u8 rotation:u8`. Wide layout (8 bytes) widens both source indices to
//! little-endian `u16` and keeps the remaining four bytes. A stream carries no count;
//! it ends where the bytes end.

use std::io::{Read, Write};

use crate::{
    codec::atom::{Atom, AtomGrid, dequantize_unit, quantize_unit},
    foundation::error::{FractalError, FractalResult},
    foundation::grid::Grid,
    transform::dihedral::{Reflection, Rotation, Transform},
};

/// Record layout of a channel stream.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// 6-byte records with 8-bit domain indices.
    #[default]
    Legacy,
    /// 8-byte records with 16-bit domain indices.
    Wide,
}

impl RecordFormat {
    /// Bytes per record.
    pub fn record_len(self) -> usize {
        match self {
            RecordFormat::Legacy => 6,
            RecordFormat::Wide => 8,
        }
    }

    /// Largest domain index the layout can hold.
    pub fn max_index(self) -> u32 {
        match self {
            RecordFormat::Legacy => u32::from(u8::MAX),
            RecordFormat::Wide => u32::from(u16::MAX),
        }
    }

    /// Legacy when every reference fits in a byte, wide otherwise.
    pub fn narrowest_for<'a>(grids: impl IntoIterator<Item = &'a AtomGrid>) -> Self {
        let max = grids
            .into_iter()
            .flat_map(|g| g.iter())
            .map(|a| a.source_x.max(a.source_y))
            .max()
            .unwrap_or(0);
        if max <= RecordFormat::Legacy.max_index() {
            RecordFormat::Legacy
        } else {
            RecordFormat::Wide
        }
    }
}

/// Append the record for `atom` to `out`.
pub fn encode_atom(atom: &Atom, format: RecordFormat, out: &mut Vec<u8>) -> FractalResult<()> {
    if atom.source_x > format.max_index() || atom.source_y > format.max_index() {
        return Err(FractalError::parameter(format!(
            "domain index ({}, {}) does not fit {format:?} records (max {})",
            atom.source_y,
            atom.source_x,
            format.max_index()
        )));
    }
    match format {
        RecordFormat::Legacy => {
            out.push(atom.source_x as u8);
            out.push(atom.source_y as u8);
        }
        RecordFormat::Wide => {
            out.extend_from_slice(&(atom.source_x as u16).to_le_bytes());
            out.extend_from_slice(&(atom.source_y as u16).to_le_bytes());
        }
    }
    out.extend_from_slice(&[
        quantize_unit(atom.contrast),
        quantize_unit(atom.brightness),
        atom.transform.reflection.to_byte(),
        atom.transform.rotation.quarter_turns(),
    ]);
    Ok(())
}

/// Parse exactly one record.
pub fn decode_atom(record: &[u8], format: RecordFormat) -> FractalResult<Atom> {
    if record.len() != format.record_len() {
        return Err(FractalError::format(format!(
            "{format:?} record must be {} bytes, got {}",
            format.record_len(),
            record.len()
        )));
    }
    let (source_x, source_y, tail) = match format {
        RecordFormat::Legacy => (u32::from(record[0]), u32::from(record[1]), &record[2..]),
        RecordFormat::Wide => (
            u32::from(u16::from_le_bytes([record[0], record[1]])),
            u32::from(u16::from_le_bytes([record[2], record[3]])),
            &record[4..],
        ),
    };
    let transform = Transform::new(
        Reflection::from_byte(tail[2])?,
        Rotation::from_byte(tail[3])?,
    );
    Ok(Atom::new(
        source_x,
        source_y,
        dequantize_unit(tail[0]),
        dequantize_unit(tail[1]),
        transform,
    ))
}

/// Write every Atom of `grid`, row-major.
pub fn write_channel<W: Write>(
    writer: &mut W,
    grid: &AtomGrid,
    format: RecordFormat,
) -> FractalResult<()> {
    let mut buf = Vec::with_capacity(grid.len() * format.record_len());
    for atom in grid.iter() {
        encode_atom(atom, format, &mut buf)?;
    }
    writer.write_all(&buf)?;
    Ok(())
}

/// Read records until the stream is exhausted and reshape them into rows of `cols`.
///
/// A trailing partial record, or a record count that does not fill whole rows, is a
/// format error: a truncated channel cannot be reshaped.
pub fn read_channel<R: Read>(
    reader: &mut R,
    cols: usize,
    format: RecordFormat,
) -> FractalResult<AtomGrid> {
    if cols == 0 {
        return Err(FractalError::format("grid width must be >= 1"));
    }
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let len = format.record_len();
    if bytes.len() % len != 0 {
        return Err(FractalError::format(format!(
            "channel stream of {} bytes ends inside a {len}-byte record",
            bytes.len()
        )));
    }
    let atoms = bytes
        .chunks_exact(len)
        .map(|r| decode_atom(r, format))
        .collect::<FractalResult<Vec<_>>>()?;
    if atoms.is_empty() {
        return Err(FractalError::format("channel stream holds no records"));
    }
    if atoms.len() % cols != 0 {
        return Err(FractalError::format(format!(
            "{} records do not fill rows of {cols}",
            atoms.len()
        )));
    }
    Grid::from_vec(atoms.len() / cols, cols, atoms)
}

#[cfg(test)]
#[path = "../../tests/unit/io/record.rs"]
mod tests;
