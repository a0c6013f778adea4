//! Texture loading and caching for materials.
//!
//! Textures are binary PPM (`P6`) images decoded with the `image` crate's PNM
//! codec. Each file is loaded once and shared through `Arc`, so any number of
//! primitives can reference the same pixels.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::pnm::{PnmDecoder, PnmSubtype, SampleEncoding};
use image::DynamicImage;
use lux_math::{Color, Interval};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported texture format in {path}: expected P6, found {found}")]
    UnsupportedFormat { path: PathBuf, found: &'static str },

    #[error("texture {path} has no pixels")]
    Empty { path: PathBuf },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// An immutable grid of RGB samples.
///
/// Pixels are stored row-major with row 0 at the top of the image, already
/// converted to `[0, 1]` colour.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
    /// Path the texture was loaded from, for diagnostics
    pub path: String,
}

impl Texture {
    /// Create a texture from 8-bit RGB triples.
    pub fn from_rgb8(width: u32, height: u32, rgb: &[[u8; 3]], path: impl Into<String>) -> Self {
        let scale = 1.0 / 255.0;
        let pixels = rgb
            .iter()
            .map(|p| Color::new(p[0] as f32, p[1] as f32, p[2] as f32) * scale)
            .collect();

        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Load a binary PPM from disk.
    pub fn load(path: &Path) -> TextureResult<Self> {
        let file = File::open(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Decode a binary PPM from any buffered reader. `path` is only used in
    /// error messages and diagnostics.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> TextureResult<Self> {
        let decode_err = |source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let decoder = PnmDecoder::new(reader).map_err(decode_err)?;
        let found = subtype_tag(decoder.subtype());
        if found != "P6" {
            return Err(TextureError::UnsupportedFormat {
                path: path.to_path_buf(),
                found,
            });
        }

        let rgb = DynamicImage::from_decoder(decoder)
            .map_err(decode_err)?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty {
                path: path.to_path_buf(),
            });
        }

        let triples: Vec<[u8; 3]> = rgb.pixels().map(|p| p.0).collect();
        Ok(Self::from_rgb8(
            width,
            height,
            &triples,
            path.to_string_lossy().to_string(),
        ))
    }

    /// Nearest-neighbour lookup.
    ///
    /// `u` and `v` are clamped to `[0, 1]`; `v = 1` is the top row of the image.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        let v = 1.0 - unit.clamp(v); // Flip V to image rows

        let x = (u * self.width.saturating_sub(1) as f32) as u32;
        let y = (v * self.height.saturating_sub(1) as f32) as u32;

        self.get_pixel(x, y)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Color {
        // Empty textures fall through to the lookup miss below
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(Color::ZERO)
    }

    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }
}

fn subtype_tag(subtype: PnmSubtype) -> &'static str {
    match subtype {
        PnmSubtype::Bitmap(SampleEncoding::Ascii) => "P1",
        PnmSubtype::Graymap(SampleEncoding::Ascii) => "P2",
        PnmSubtype::Pixmap(SampleEncoding::Ascii) => "P3",
        PnmSubtype::Bitmap(SampleEncoding::Binary) => "P4",
        PnmSubtype::Graymap(SampleEncoding::Binary) => "P5",
        PnmSubtype::Pixmap(SampleEncoding::Binary) => "P6",
        PnmSubtype::ArbitraryMap => "P7",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}

/// Cache for loaded textures, keyed by the path as written in the scene.
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,
    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache that resolves relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(Texture::load(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Put an already decoded texture into the cache under `key`.
    pub fn insert(&mut self, key: impl Into<String>, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.textures.insert(key.into(), texture.clone());
        texture
    }

    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        self.textures.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
