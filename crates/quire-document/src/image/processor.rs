// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, upscale, and normalise page images before they
// are handed to the recogniser. Operates on in-memory images using the
// `image` and `imageproc` crates.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use imageproc::contrast::equalize_histogram;
use quire_core::error::{QuireError, Result};
use quire_core::types::PixelBuffer;
use tracing::{debug, instrument};

/// Largest width or height of any canvas this module allocates or scales to.
pub const MAX_DIMENSION: u32 = 10_000;

/// Scale `(width, height)` uniformly so neither side exceeds
/// [`MAX_DIMENSION`]. Sides are at least one pixel.
pub fn fit_within_max(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= MAX_DIMENSION {
        return (width.max(1), height.max(1));
    }
    let factor = MAX_DIMENSION as f64 / longest as f64;
    let scale = |side: u32| ((side as f64 * factor).floor() as u32).clamp(1, MAX_DIMENSION);
    (scale(width), scale(height))
}

/// Luma spread below which a page image is treated as washed out and has its
/// histogram equalised.
pub const LOW_CONTRAST_SPREAD: u8 = 96;

/// Channel layout of raw 8-bit image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLayout {
    Gray,
    Rgb,
    Cmyk,
}

impl SampleLayout {
    pub fn components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Cmyk => 4,
        }
    }

    /// Layout for a sample count per pixel, if supported.
    pub fn from_components(components: usize) -> Option<Self> {
        match components {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            4 => Some(Self::Cmyk),
            _ => None,
        }
    }
}

/// A single in-memory image.
///
/// Each transformation consumes `self` and returns the result, so calls chain:
///
/// ```ignore
/// let page = ImageProcessor::from_bytes(&jpeg)?
///     .upscale_to_width(1190)
///     .grayscale()
///     .normalize_contrast()
///     .into_pixel_buffer()?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an encoded image (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| QuireError::Image(format!("failed to decode image: {err}")))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Build an image from raw, row-major 8-bit samples. Trailing bytes past
    /// `width * height * components` are ignored.
    pub fn from_samples(
        width: u32,
        height: u32,
        layout: SampleLayout,
        mut samples: Vec<u8>,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * layout.components();
        if samples.len() < expected {
            return Err(QuireError::Image(format!(
                "{width}x{height} {layout:?} image needs {expected} bytes, got {}",
                samples.len()
            )));
        }
        samples.truncate(expected);

        let image = match layout {
            SampleLayout::Gray => {
                GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
            }
            SampleLayout::Rgb => {
                RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
            }
            SampleLayout::Cmyk => {
                let rgb: Vec<u8> = samples.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
                RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
            }
        }
        .ok_or_else(|| QuireError::Image(format!("{width}x{height} sample buffer rejected")))?;

        Ok(Self { image })
    }

    /// A white page of the given size, shrunk uniformly when either side is
    /// over [`MAX_DIMENSION`].
    pub fn blank(width: u32, height: u32) -> Self {
        let (width, height) = fit_within_max(width, height);
        Self {
            image: DynamicImage::ImageLuma8(GrayImage::from_pixel(
                width,
                height,
                image::Luma([255]),
            )),
        }
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Enlarge the image so it is at least `min_width` pixels wide, keeping
    /// the aspect ratio. Images already wide enough are returned unchanged.
    /// The factor is reduced so neither side passes [`MAX_DIMENSION`].
    #[instrument(skip(self), fields(from_w = self.image.width()))]
    pub fn upscale_to_width(self, min_width: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width == 0 || height == 0 || width >= min_width {
            return self;
        }

        let longest = width.max(height) as f64;
        let factor = (min_width as f64 / width as f64).min(MAX_DIMENSION as f64 / longest);
        if factor <= 1.0 {
            return self;
        }
        let target_w = ((width as f64 * factor).round() as u32).clamp(1, MAX_DIMENSION);
        let target_h = ((height as f64 * factor).round() as u32).clamp(1, MAX_DIMENSION);
        let resized = self.image.resize_exact(
            target_w,
            target_h,
            image::imageops::FilterType::Lanczos3,
        );
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Upscale complete"
        );
        Self { image: resized }
    }

    /// Rotate clockwise by a whole number of quarter turns.
    pub fn rotate_quarter_turns(self, turns: i64) -> Self {
        let image = match turns.rem_euclid(4) {
            1 => self.image.rotate90(),
            2 => self.image.rotate180(),
            3 => self.image.rotate270(),
            _ => self.image,
        };
        Self { image }
    }

    /// Convert the image to grayscale (luma).
    pub fn grayscale(self) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Equalise the luma histogram when the image spans less than
    /// [`LOW_CONTRAST_SPREAD`] levels. Other images pass through.
    #[instrument(skip(self))]
    pub fn normalize_contrast(self) -> Self {
        let luma = self.image.to_luma8();
        let (min, max) = luma
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
        let spread = max.saturating_sub(min);

        if spread == 0 || spread >= LOW_CONTRAST_SPREAD {
            return self;
        }

        debug!(min, max, "Equalising low-contrast page image");
        Self {
            image: DynamicImage::ImageLuma8(equalize_histogram(&luma)),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| QuireError::Image(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// PNG-encode into the buffer type handed to recognisers.
    pub fn into_pixel_buffer(self) -> Result<PixelBuffer> {
        let png = self.to_png_bytes()?;
        Ok(PixelBuffer {
            width: self.image.width(),
            height: self.image.height(),
            png,
        })
    }
}

/// Naive device CMYK to RGB, ignoring any colour profile.
fn cmyk_to_rgb(pixel: &[u8]) -> [u8; 3] {
    let k = 255 - pixel[3] as u16;
    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
    [channel(pixel[0]), channel(pixel[1]), channel(pixel[2])]
}
