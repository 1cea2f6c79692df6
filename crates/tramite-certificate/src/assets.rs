//! Static image assets (the two corner logos).
//!
//! Images are decoded with `image`, composited onto white and downscaled to
//! at most [`MAX_IMAGE_WIDTH_PX`] pixels wide, so the embedded XObjects are
//! plain 8-bit RGB.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use tramite_utils::error::AssetError;

/// Width cap for embedded images, in pixels.
pub const MAX_IMAGE_WIDTH_PX: u32 = 200;

/// Source of raw image bytes by file name.
pub trait AssetSource: Send + Sync {
    /// Raw bytes of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] when the asset does not exist and
    /// [`AssetError::Io`] for any other read failure.
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError>;
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirectoryAssets {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        std::fs::read(self.root.join(name)).map_err(|source| match source.kind() {
            ErrorKind::NotFound => AssetError::NotFound {
                name: name.to_string(),
            },
            _ => AssetError::Io {
                name: name.to_string(),
                source,
            },
        })
    }
}

/// In-memory assets, for hosts that bundle their images and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Decoded, opaque RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub name: String,
    pub width_px: u32,
    pub height_px: u32,
    /// Row-major RGB triples, `width_px * height_px * 3` bytes.
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Width over height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width_px as f32 / self.height_px.max(1) as f32
    }
}

/// Decode PNG or JPEG bytes into a [`RasterImage`].
///
/// # Errors
///
/// Returns [`AssetError::Decode`] when the bytes are not a supported image
/// or have a zero dimension.
pub fn decode_raster(name: &str, bytes: &[u8]) -> Result<RasterImage, AssetError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let mut rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(AssetError::Decode {
            name: name.to_string(),
            reason: "image has no pixels".to_string(),
        });
    }

    if rgba.width() > MAX_IMAGE_WIDTH_PX {
        let scaled_height = (u64::from(rgba.height()) * u64::from(MAX_IMAGE_WIDTH_PX)
            + u64::from(rgba.width()) / 2)
            / u64::from(rgba.width());
        let scaled_height = u32::try_from(scaled_height.max(1)).unwrap_or(u32::MAX);
        rgba = imageops::resize(&rgba, MAX_IMAGE_WIDTH_PX, scaled_height, FilterType::Triangle);
    }

    let rgb = rgba
        .pixels()
        .flat_map(|p| {
            let [r, g, b, a] = p.0;
            [over_white(r, a), over_white(g, a), over_white(b, a)]
        })
        .collect();

    Ok(RasterImage {
        name: name.to_string(),
        width_px: rgba.width(),
        height_px: rgba.height(),
        rgb,
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let image = decode_raster("logo.png", &png_bytes(2, 2, [0, 0, 0, 0])).unwrap();
        assert!(image.rgb.iter().all(|&c| c == 255));
        assert_eq!(image.rgb.len(), 2 * 2 * 3);
    }

    #[test]
    fn test_opaque_pixels_keep_colour() {
        let image = decode_raster("logo.png", &png_bytes(1, 1, [10, 20, 30, 255])).unwrap();
        assert_eq!(image.rgb, vec![10, 20, 30]);
    }

    #[test]
    fn test_wide_images_are_downscaled() {
        let image = decode_raster("wide.png", &png_bytes(400, 100, [0, 0, 0, 255])).unwrap();
        assert_eq!(image.width_px, MAX_IMAGE_WIDTH_PX);
        assert_eq!(image.height_px, 50);
        assert!((image.aspect_ratio() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_raster("x.png", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn test_directory_assets_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let assets = DirectoryAssets::new(dir.path());
        assert!(matches!(
            assets.load("LogoArsa.png"),
            Err(AssetError::NotFound { .. })
        ));

        std::fs::write(dir.path().join("LogoArsa.png"), b"abc").unwrap();
        assert_eq!(assets.load("LogoArsa.png").unwrap(), b"abc");
    }

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with("a.png", vec![1, 2, 3]);
        assert_eq!(assets.load("a.png").unwrap(), vec![1, 2, 3]);
        assert!(assets.load("b.png").is_err());
    }
}
