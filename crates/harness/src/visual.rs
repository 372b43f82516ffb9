//! Visual regression with screenshot comparison

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageOutputFormat, Pixel, Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ComparisonError, HarnessResult};

/// Similarity threshold used across the suite unless configured otherwise.
pub const DEFAULT_ACCURACY: f64 = 0.83;

/// Per-channel difference still considered the same colour (anti-aliasing, compression).
pub const DEFAULT_CHANNEL_TOLERANCE: u8 = 5;

/// A decoded screenshot. Immutable once captured.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    png: Arc<[u8]>,
    pixels: Arc<RgbaImage>,
    digest: String,
    captured_at: DateTime<Utc>,
}

impl CapturedImage {
    /// Decode PNG (or any format `image` recognises) bytes from the backend.
    pub fn from_png(bytes: Vec<u8>) -> Result<Self, ComparisonError> {
        let decoded = image::load_from_memory(&bytes).map_err(|e| ComparisonError::Decode {
            which: "captured",
            reason: e.to_string(),
        })?;
        let pixels = decoded.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ComparisonError::Empty("captured"));
        }

        Ok(Self {
            digest: sha256_hex(&bytes),
            png: bytes.into(),
            pixels: Arc::new(pixels),
            captured_at: Utc::now(),
        })
    }

    /// Wrap raw pixels, encoding them as PNG for persistence.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, ComparisonError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ComparisonError::Empty("captured"));
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(pixels.clone())
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| ComparisonError::Encode(e.to_string()))?;

        Ok(Self {
            digest: sha256_hex(&png),
            png: png.into(),
            pixels: Arc::new(pixels),
            captured_at: Utc::now(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// SHA-256 of the encoded bytes, hex encoded
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn save(&self, path: &Path) -> HarnessResult<()> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }
}

/// Result of a visual comparison
#[derive(Debug, Clone)]
pub struct VisualDiff {
    /// Fraction of matching pixels, in [0, 1]
    pub similarity: f64,

    /// Threshold the similarity was judged against
    pub accuracy: f64,

    /// Whether `similarity >= accuracy`
    pub matches: bool,

    /// Number of different pixels
    pub diff_pixels: u64,

    /// Total pixels compared
    pub total_pixels: u64,

    /// Differing pixels in red, the rest dimmed
    pub diff_image: RgbaImage,
}

impl VisualDiff {
    pub fn save_diff_image(&self, path: &Path) -> HarnessResult<()> {
        self.diff_image.save(path)?;
        Ok(())
    }
}

/// Pure, deterministic image comparison.
///
/// Images of different dimensions are rejected with
/// [`ComparisonError::DimensionMismatch`]; nothing is resized.
#[derive(Debug, Clone, Copy)]
pub struct ImageComparator {
    channel_tolerance: u8,
}

impl Default for ImageComparator {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_TOLERANCE)
    }
}

impl ImageComparator {
    pub fn new(channel_tolerance: u8) -> Self {
        Self { channel_tolerance }
    }

    /// True when the two images are the same within `accuracy`.
    pub fn compare(
        &self,
        a: &CapturedImage,
        b: &CapturedImage,
        accuracy: f64,
    ) -> Result<bool, ComparisonError> {
        validate_accuracy(accuracy)?;
        Ok(self.similarity(a, b)? >= accuracy)
    }

    /// Compare two encoded images without going through a driver.
    pub fn compare_bytes(&self, a: &[u8], b: &[u8], accuracy: f64) -> Result<bool, ComparisonError> {
        validate_accuracy(accuracy)?;
        let left = decode("left", a)?;
        let right = decode("right", b)?;
        Ok(self.pixel_similarity(&left, &right)? >= accuracy)
    }

    /// Fraction of pixels that match, in [0, 1].
    pub fn similarity(&self, a: &CapturedImage, b: &CapturedImage) -> Result<f64, ComparisonError> {
        // Quick hash comparison
        if a.digest() == b.digest() {
            debug!("Screenshots match exactly (same hash)");
            return Ok(1.0);
        }
        self.pixel_similarity(a.pixels(), b.pixels())
    }

    /// Full comparison including a rendered diff image for evidence.
    pub fn diff(
        &self,
        a: &CapturedImage,
        b: &CapturedImage,
        accuracy: f64,
    ) -> Result<VisualDiff, ComparisonError> {
        validate_accuracy(accuracy)?;
        check_dimensions(a.pixels(), b.pixels())?;

        let (width, height) = a.dimensions();
        let mut diff_image = RgbaImage::new(width, height);
        let mut diff_pixels = 0u64;

        for (x, y, left) in a.pixels().enumerate_pixels() {
            let right = b.pixels().get_pixel(x, y);
            if self.pixels_differ(left, right) {
                diff_pixels += 1;
                diff_image.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            } else {
                let channels = left.channels();
                diff_image.put_pixel(
                    x,
                    y,
                    Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                );
            }
        }

        let total_pixels = u64::from(width) * u64::from(height);
        let similarity = (total_pixels - diff_pixels) as f64 / total_pixels as f64;

        Ok(VisualDiff {
            similarity,
            accuracy,
            matches: similarity >= accuracy,
            diff_pixels,
            total_pixels,
            diff_image,
        })
    }

    fn pixel_similarity(&self, a: &RgbaImage, b: &RgbaImage) -> Result<f64, ComparisonError> {
        check_dimensions(a, b)?;

        let total = u64::from(a.width()) * u64::from(a.height());
        let matching = a
            .pixels()
            .zip(b.pixels())
            .filter(|(left, right)| !self.pixels_differ(left, right))
            .count() as u64;

        Ok(matching as f64 / total as f64)
    }

    /// Check if two pixels differ significantly
    fn pixels_differ(&self, a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
        let tolerance = i32::from(self.channel_tolerance);
        a.channels()
            .iter()
            .zip(b.channels())
            .any(|(l, r)| (i32::from(*l) - i32::from(*r)).abs() > tolerance)
    }
}

fn validate_accuracy(accuracy: f64) -> Result<(), ComparisonError> {
    if (0.0..=1.0).contains(&accuracy) {
        Ok(())
    } else {
        Err(ComparisonError::InvalidAccuracy(accuracy))
    }
}

fn check_dimensions(a: &RgbaImage, b: &RgbaImage) -> Result<(), ComparisonError> {
    if a.width() == 0 || a.height() == 0 {
        return Err(ComparisonError::Empty("left"));
    }
    if b.width() == 0 || b.height() == 0 {
        return Err(ComparisonError::Empty("right"));
    }
    if a.dimensions() != b.dimensions() {
        return Err(ComparisonError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }
    Ok(())
}

fn decode(which: &'static str, bytes: &[u8]) -> Result<RgbaImage, ComparisonError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| ComparisonError::Decode { which, reason: e.to_string() })
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
