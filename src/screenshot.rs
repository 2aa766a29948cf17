//! PNG export of the PPU framebuffer.

use std::path::Path;

use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::RgbaImage;

use crate::ppu::{NES_HEIGHT, NES_WIDTH, Ppu};

/// Copy the current frame into an image buffer.
pub fn frame_image(ppu: &Ppu) -> Option<RgbaImage> {
    RgbaImage::from_raw(NES_WIDTH as u32, NES_HEIGHT as u32, ppu.frame().to_vec())
}

/// Write the current frame to `path`; the format follows the extension.
pub fn save_frame_png<P: AsRef<Path>>(ppu: &Ppu, path: P) -> image::ImageResult<()> {
    let img = frame_image(ppu).ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
    })?;
    log::info!("saving frame to {}", path.as_ref().display());
    img.save(path)
}
