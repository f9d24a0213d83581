use std::path::Path;

use anyhow::Context as _;

use crate::{
    buffer::image::ImageBuffer,
    foundation::error::{FractalError, FractalResult},
};

/// An RGB image split into three `[0, 1]` channel buffers of equal shape.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbChannels {
    channels: [ImageBuffer; 3],
}

impl RgbChannels {
    pub fn new(channels: [ImageBuffer; 3]) -> FractalResult<Self> {
        let (h, w) = (channels[0].height(), channels[0].width());
        if channels
            .iter()
            .any(|c| c.height() != h || c.width() != w)
        {
            return Err(FractalError::parameter(
                "rgb channels must share one shape",
            ));
        }
        Ok(Self { channels })
    }

    /// Split 8-bit RGB pixels into channels, `v / 255`.
    pub fn from_rgb8(img: &image::RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let channels = std::array::from_fn(|c| {
            ImageBuffer::from_fn(h as usize, w as usize, |y, x| {
                f32::from(img.get_pixel(x as u32, y as u32).0[c]) / 255.0
            })
        });
        Self { channels }
    }

    /// Recombine into 8-bit RGB, clamping each sample to `[0, 1]` first.
    pub fn to_rgb8(&self) -> FractalResult<image::RgbImage> {
        let (h, w) = (self.height(), self.width());
        let width = u32::try_from(w).map_err(|_| FractalError::parameter("image too wide"))?;
        let height = u32::try_from(h).map_err(|_| FractalError::parameter("image too tall"))?;
        let [r, g, b] = &self.channels;
        let mut raw = Vec::with_capacity(w * h * 3);
        for ((&r, &g), &b) in r.as_slice().iter().zip(g.as_slice()).zip(b.as_slice()) {
            raw.extend_from_slice(&[to_u8(r), to_u8(g), to_u8(b)]);
        }
        image::RgbImage::from_raw(width, height, raw)
            .ok_or_else(|| FractalError::parameter("rgb buffer does not match image size"))
    }

    pub fn channels(&self) -> &[ImageBuffer; 3] {
        &self.channels
    }

    pub fn into_channels(self) -> [ImageBuffer; 3] {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.channels[0].height()
    }

    pub fn width(&self) -> usize {
        self.channels[0].width()
    }
}

fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Decode any supported image file into RGB channels.
pub fn load_rgb(path: &Path) -> FractalResult<RgbChannels> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(RgbChannels::from_rgb8(&img.to_rgb8()))
}

/// Encode `channels` to `path`; the format follows the file extension.
pub fn save_rgb(path: &Path, channels: &RgbChannels) -> FractalResult<()> {
    channels
        .to_rgb8()?
        .save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/io/raster.rs"]
mod tests;
