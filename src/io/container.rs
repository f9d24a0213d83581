//! Zip container bundling the three channel streams of one image.
//!
//! Entries: `red`, `green`, `blue` (record streams), `spec` (one text line holding the
//! grid width) and an optional `params` JSON entry with the encode-time geometry and
//! the record layout. Archives without `params` use legacy records.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, Write},
    path::Path,
};

use anyhow::Context as _;
use zip::{CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{
    codec::atom::AtomGrid,
    codec::params::{BlockGeometry, EncodeParams},
    foundation::error::{FractalError, FractalResult},
    io::record::{RecordFormat, read_channel, write_channel},
};

/// Entry names of the three channel streams, in channel order.
pub const CHANNEL_ENTRIES: [&str; 3] = ["red", "green", "blue"];

const SPEC_ENTRY: &str = "spec";
const PARAMS_ENTRY: &str = "params";
const PARAMS_VERSION: u32 = 1;

/// Three equally shaped Atom grids plus the parameters they were encoded with, if known.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressedImage {
    channels: [AtomGrid; 3],
    params: Option<EncodeParams>,
}

impl CompressedImage {
    pub fn new(channels: [AtomGrid; 3], params: Option<EncodeParams>) -> FractalResult<Self> {
        let shape = channels[0].shape();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(FractalError::degenerate("channel grids are empty"));
        }
        for (name, grid) in CHANNEL_ENTRIES.iter().zip(&channels) {
            if grid.shape() != shape {
                return Err(FractalError::format(format!(
                    "channel '{name}' grid is {:?}, expected {shape:?}",
                    grid.shape()
                )));
            }
        }
        Ok(Self { channels, params })
    }

    pub fn channels(&self) -> &[AtomGrid; 3] {
        &self.channels
    }

    pub fn into_channels(self) -> [AtomGrid; 3] {
        self.channels
    }

    /// Encode parameters recorded in the archive, if any.
    pub fn params(&self) -> Option<EncodeParams> {
        self.params
    }

    /// Block geometry recorded in the archive, if any.
    pub fn geometry(&self) -> Option<BlockGeometry> {
        self.params.map(|p| p.geometry())
    }

    /// `(rows, cols)` shared by all channel grids.
    pub fn shape(&self) -> (usize, usize) {
        self.channels[0].shape()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoredParams {
    version: u32,
    #[serde(default)]
    record_format: RecordFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contrast: Option<f32>,
}

impl StoredParams {
    fn new(params: Option<EncodeParams>, record_format: RecordFormat) -> Self {
        Self {
            version: PARAMS_VERSION,
            record_format,
            domain_size: params.map(|p| p.geometry().domain_size()),
            range_size: params.map(|p| p.geometry().range_size()),
            contrast: params.map(|p| p.contrast()),
        }
    }

    fn encode_params(&self) -> FractalResult<Option<EncodeParams>> {
        match (self.domain_size, self.range_size, self.contrast) {
            (Some(d), Some(r), Some(c)) => {
                let geometry = BlockGeometry::new(d, r)
                    .map_err(|e| FractalError::format(format!("params entry: {e}")))?;
                let params = EncodeParams::new(geometry, c)
                    .map_err(|e| FractalError::format(format!("params entry: {e}")))?;
                Ok(Some(params))
            }
            (None, None, None) => Ok(None),
            _ => Err(FractalError::format(
                "params entry must carry all of domain_size, range_size, contrast or none",
            )),
        }
    }
}

/// Write `image` as a zip archive.
///
/// Records use the legacy layout whenever every domain index fits in a byte.
pub fn write_container<W: Write + Seek>(writer: W, image: &CompressedImage) -> FractalResult<W> {
    let format = RecordFormat::narrowest_for(image.channels.iter());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    for (name, grid) in CHANNEL_ENTRIES.iter().zip(&image.channels) {
        zip.start_file(*name, options)
            .with_context(|| format!("start entry '{name}'"))?;
        write_channel(&mut zip, grid, format)?;
    }

    zip.start_file(SPEC_ENTRY, options)
        .context("start entry 'spec'")?;
    writeln!(zip, "{}", image.shape().1)?;

    let stored = StoredParams::new(image.params, format);
    zip.start_file(PARAMS_ENTRY, options)
        .context("start entry 'params'")?;
    serde_json::to_writer(&mut zip, &stored).context("serialize params entry")?;

    let inner = zip.finish().context("finish zip archive")?;
    tracing::debug!(?format, shape = ?image.shape(), "container written");
    Ok(inner)
}

/// Read an archive written by [`write_container`] or by the legacy tooling.
pub fn read_container<R: Read + Seek>(reader: R) -> FractalResult<CompressedImage> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| FractalError::format(format!("not a zip container: {e}")))?;

    let stored = if archive.file_names().any(|n| n == PARAMS_ENTRY) {
        let bytes = read_entry(&mut archive, PARAMS_ENTRY)?;
        Some(
            serde_json::from_slice::<StoredParams>(&bytes)
                .map_err(|e| FractalError::format(format!("params entry: {e}")))?,
        )
    } else {
        None
    };
    if let Some(s) = &stored
        && s.version != PARAMS_VERSION
    {
        return Err(FractalError::format(format!(
            "unsupported params version {}",
            s.version
        )));
    }
    let format = stored.as_ref().map(|s| s.record_format).unwrap_or_default();
    let params = match &stored {
        Some(s) => s.encode_params()?,
        None => None,
    };

    let spec = read_entry(&mut archive, SPEC_ENTRY)?;
    let cols = parse_spec(&spec)?;

    let mut grids = Vec::with_capacity(CHANNEL_ENTRIES.len());
    for name in CHANNEL_ENTRIES {
        let bytes = read_entry(&mut archive, name)?;
        let grid = read_channel(&mut bytes.as_slice(), cols, format)
            .map_err(|e| FractalError::format(format!("channel '{name}': {e}")))?;
        grids.push(grid);
    }
    let channels: [AtomGrid; 3] = grids
        .try_into()
        .map_err(|_| FractalError::format("expected three channels"))?;
    CompressedImage::new(channels, params)
}

/// [`write_container`] to a new file at `path`.
pub fn save(path: &Path, image: &CompressedImage) -> FractalResult<()> {
    let file = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut writer = write_container(BufWriter::new(file), image)?;
    writer.flush()?;
    Ok(())
}

/// [`read_container`] from the file at `path`.
pub fn load(path: &Path) -> FractalResult<CompressedImage> {
    let file = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    read_container(BufReader::new(file))
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> FractalResult<Vec<u8>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(FractalError::format(format!("missing entry '{name}'")));
        }
        Err(e) => {
            return Err(FractalError::format(format!("entry '{name}': {e}")));
        }
    };
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn parse_spec(bytes: &[u8]) -> FractalResult<usize> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| FractalError::format("spec entry is not UTF-8"))?;
    let line = text.lines().next().unwrap_or("").trim();
    let cols: usize = line
        .parse()
        .map_err(|_| FractalError::format(format!("spec entry '{line}' is not a grid width")))?;
    if cols == 0 {
        return Err(FractalError::format("spec entry declares zero columns"));
    }
    Ok(cols)
}

#[cfg(test)]
#[path = "../../tests/unit/io/container.rs"]
mod tests;
