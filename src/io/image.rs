//! PNG import and export for RGB cell grids

use std::path::Path;

use image::{ImageBuffer, Rgb};
use ndarray::Array2;

use crate::io::error::{GenerationError, Result};

/// The reference cell value: 24-bit RGB
///
/// Plain byte triples order and compare cheaply, which is all pattern
/// deduplication needs.
pub type Rgb8 = [u8; 3];

/// Load a PNG into a `(width, height)` grid of RGB cells
///
/// # Errors
///
/// Returns an error when the file cannot be opened or decoded.
pub fn load_exemplar<P: AsRef<Path>>(path: P) -> Result<Array2<Rgb8>> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| GenerationError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    let rgb = img.to_rgb8();

    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut cells = Array2::from_elem((width, height), [0u8; 3]);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        cells[[x as usize, y as usize]] = pixel.0;
    }

    Ok(cells)
}

/// Save a grid of RGB cells as a PNG
///
/// Creates missing parent directories first.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or the image
/// cannot be encoded.
pub fn save_grid<P: AsRef<Path>>(grid: &Array2<Rgb8>, path: P) -> Result<()> {
    let path = path.as_ref();
    let (width, height) = grid.dim();

    let mut img = ImageBuffer::new(width as u32, height as u32);
    for x in 0..width {
        for y in 0..height {
            img.put_pixel(x as u32, y as u32, Rgb(grid[[x, y]]));
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GenerationError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(path).map_err(|e| GenerationError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
