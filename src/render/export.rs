//! PNG export of ruler surfaces

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use resvg::tiny_skia::Pixmap;

use super::SurfacePair;
use crate::error::{Result, RulerError};

/// Straight-alpha RGBA bytes of `pixmap`
#[must_use]
pub fn rgba_bytes(pixmap: &Pixmap) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        bytes.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    bytes
}

/// Encode `pixmap` as PNG into `writer`
pub fn write_png<W: Write>(pixmap: &Pixmap, writer: W) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(writer, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgba_bytes(pixmap))?;
    writer.finish()
}

fn export_error(path: &Path, err: &dyn std::fmt::Display) -> RulerError {
    RulerError::Export {
        path: path.to_path_buf(),
        detail: err.to_string(),
    }
}

/// Save `pixmap` as a PNG file at `path`
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| export_error(path, &e))?;
    write_png(pixmap, BufWriter::new(file)).map_err(|e| export_error(path, &e))?;
    info!(
        "Wrote {}x{} ruler to {}",
        pixmap.width(),
        pixmap.height(),
        path.display()
    );
    Ok(())
}

/// Write both rulers of `surfaces` into `dir` as `<id>-x.png` and
/// `<id>-y.png`
pub fn export_surfaces(id: &str, surfaces: &SurfacePair, dir: &Path) -> Result<[PathBuf; 2]> {
    let horizontal = dir.join(format!("{id}-x.png"));
    let vertical = dir.join(format!("{id}-y.png"));
    save_png(surfaces.horizontal.pixmap(), &horizontal)?;
    save_png(surfaces.vertical.pixmap(), &vertical)?;
    Ok([horizontal, vertical])
}
