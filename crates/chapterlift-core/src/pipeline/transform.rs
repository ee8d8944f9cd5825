//! Page transform: decode, auto-orient, shrink, re-encode to JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::{ProcessedAsset, TransformConfig};

use super::naming;

/// Turns raw page bytes into an upload-ready [`ProcessedAsset`].
///
/// Pure with respect to its inputs: no network, no file system.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    filter: FilterType,
}

impl Default for ImageTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTransformer {
    /// Create a transformer using Lanczos3 resampling.
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Transform one page.
    ///
    /// `original_name` is the source file name; it only feeds the output key
    /// and error messages.
    pub fn transform(
        &self,
        bytes: &[u8],
        original_name: &str,
        config: &TransformConfig,
    ) -> Result<ProcessedAsset, PipelineError> {
        let start = std::time::Instant::now();
        let config = config.clamped();
        let name = PathBuf::from(original_name);

        let image = Self::decode(bytes, &name)?;
        let (width, height) = image.dimensions();
        tracing::trace!("  Decode: {:?} ({}x{})", start.elapsed(), width, height);

        let image = if config.should_resize(width) {
            let target_height = scaled_height(width, height, config.max_dimension);
            tracing::trace!(
                "  Resize {}x{} -> {}x{}",
                width,
                height,
                config.max_dimension,
                target_height
            );
            image.resize_exact(config.max_dimension, target_height, self.filter)
        } else {
            image
        };

        let (out_width, out_height) = image.dimensions();
        let encoded = Self::encode(image, config.quality, &name)?;
        let output_name = naming::output_name(original_name);
        tracing::trace!("  Transform total: {:?}", start.elapsed());

        Ok(ProcessedAsset {
            size: encoded.len() as u64,
            bytes: encoded,
            output_name,
            width: out_width,
            height: out_height,
        })
    }

    /// Decode with format sniffing and EXIF orientation applied.
    fn decode(bytes: &[u8], name: &Path) -> Result<DynamicImage, PipelineError> {
        let decode_err = |message: String| PipelineError::Decode {
            path: name.to_path_buf(),
            message,
        };

        if bytes.is_empty() {
            return Err(decode_err("empty file".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))?;
        if reader.format().is_none() {
            return Err(decode_err("Unrecognized image format".to_string()));
        }

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| decode_err(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| decode_err(e.to_string()))?;
        image.apply_orientation(orientation);
        Ok(image)
    }

    /// Encode as baseline JPEG. Alpha is dropped.
    fn encode(image: DynamicImage, quality: u8, name: &Path) -> Result<Vec<u8>, PipelineError> {
        let rgb = image.into_rgb8();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| PipelineError::Encode {
                path: name.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }
}

/// Height that keeps the aspect ratio when width becomes `target_width`.
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (height as u64 * target_width as u64 + width as u64 / 2) / width as u64;
    scaled.max(1) as u32
}
