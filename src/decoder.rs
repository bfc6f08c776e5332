use std::path::Path;

use image::GenericImageView;

use crate::error::SceneError;

/// Decoded pixel data, 8 bits per channel, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Reverses row order so the first row is the bottom of the image,
    /// matching texture coordinates with v pointing up.
    pub fn flip_vertical(&mut self) {
        let stride = self.width as usize * self.channels as usize;
        if stride == 0 {
            return;
        }
        let rows = self.pixels.len() / stride;
        for row in 0..rows / 2 {
            let (top, bottom) = self.pixels.split_at_mut((rows - 1 - row) * stride);
            top[row * stride..(row + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }
}

/// Turns an image file into raw pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, SceneError>;
}

/// [`ImageDecoder`] backed by the `image` crate.
///
/// Keeps the file's channel count and narrows wider sample types to 8 bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, SceneError> {
        let image = image::open(path).map_err(|err| SceneError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let (width, height) = image.dimensions();
        let channels = image.color().channel_count();
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };
        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels,
        })
    }
}
