//! PNG input and output

use image::{ImageFormat, RgbaImage};
use std::io;
use std::path::Path;

/// Error type for image file operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image decoding or encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "cannot access image file: {}", e),
            OutputError::Image(e) => write!(f, "PNG codec error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Save an RGBA image to a PNG file.
///
/// The file is always PNG-encoded, whatever its extension. Parent
/// directories are created as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Decode a PNG file into 8-bit RGBA.
///
/// Palette, grayscale and 16-bit images are converted.
pub fn load_png(path: &Path) -> Result<RgbaImage, OutputError> {
    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_png_round_trip_keeps_transparency() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        let mut atlas = RgbaImage::new(3, 1);
        atlas.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        atlas.put_pixel(1, 0, Rgba([0, 255, 0, 128]));

        save_png(&atlas, &path).unwrap();
        assert_eq!(load_png(&path).unwrap(), atlas);
    }

    #[test]
    fn test_save_png_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("build/atlases/ui.png");

        save_png(&RgbaImage::new(1, 1), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_png_ignores_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.bin");

        save_png(&RgbaImage::new(2, 2), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_load_png_converts_grayscale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let mut gray = image::GrayImage::new(1, 1);
        gray.put_pixel(0, 0, image::Luma([200]));
        gray.save(&path).unwrap();

        let loaded = load_png(&path).unwrap();
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn test_load_png_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(load_png(&path), Err(OutputError::Image(_))));
        assert!(matches!(load_png(&dir.path().join("missing.png")), Err(OutputError::Io(_))));
    }
}
