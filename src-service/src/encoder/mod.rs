//! Artifact encoding.
//!
//! Converts one frame's raw buffers into encoded byte payloads: lossy JPEG
//! for color, lossless 32-bit float TIFF for depth (full precision, no
//! quantization), and lossless 8-bit PNG for confidence. Encoding is a pure
//! function of the frame; no filesystem access happens here, and a failure
//! on one artifact never blocks the others.

use crate::capture::types::{ColorImage, ConfidenceMap, DepthMap, SensorFrame};
use crate::error::EncodeError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fmt;
use std::io::Cursor;
use tiff::encoder::{colortype, TiffEncoder};

/// Default JPEG quality for color artifacts.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// The three artifacts derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Color,
    Depth,
    Confidence,
}

impl ArtifactKind {
    /// Session subdirectory holding this artifact.
    pub fn subdir(&self) -> &'static str {
        match self {
            ArtifactKind::Color => "rgb",
            ArtifactKind::Depth => "depth",
            ArtifactKind::Confidence => "conf",
        }
    }

    /// File extension for this artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Color => "jpg",
            ArtifactKind::Depth => "tiff",
            ArtifactKind::Confidence => "png",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Color => "color",
            ArtifactKind::Depth => "depth",
            ArtifactKind::Confidence => "confidence",
        };
        f.write_str(name)
    }
}

/// Encoded payloads for one frame.
///
/// Each artifact is independently absent when its buffer was missing from
/// the frame or its encode failed.
#[derive(Debug, Default)]
pub struct EncodedFrame {
    pub color: Option<Vec<u8>>,
    pub depth: Option<Vec<u8>>,
    pub confidence: Option<Vec<u8>>,
}

/// Encode all artifacts of a frame.
///
/// Returns the payloads plus the per-artifact failures; callers report the
/// failures and write whatever succeeded.
pub fn encode_frame(frame: &SensorFrame, jpeg_quality: u8) -> (EncodedFrame, Vec<EncodeError>) {
    let mut encoded = EncodedFrame::default();
    let mut failures = Vec::new();

    match encode_color(&frame.color, jpeg_quality) {
        Ok(bytes) => encoded.color = Some(bytes),
        Err(err) => failures.push(err),
    }

    if let Some(depth) = &frame.depth {
        match encode_depth(depth) {
            Ok(bytes) => encoded.depth = Some(bytes),
            Err(err) => failures.push(err),
        }
    }

    if let Some(confidence) = &frame.confidence {
        match encode_confidence(confidence) {
            Ok(bytes) => encoded.confidence = Some(bytes),
            Err(err) => failures.push(err),
        }
    }

    (encoded, failures)
}

/// Encode the color buffer as JPEG at the configured quality.
pub fn encode_color(color: &ColorImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let expected = color.width as usize * color.height as usize * 3;
    if color.data.len() != expected {
        return Err(EncodeError {
            artifact: ArtifactKind::Color,
            reason: format!(
                "buffer size mismatch: expected {} bytes, got {}",
                expected,
                color.data.len()
            ),
        });
    }

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .write_image(
            &color.data,
            color.width,
            color.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError {
            artifact: ArtifactKind::Color,
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// Encode the depth buffer as a single-channel 32-bit float TIFF.
pub fn encode_depth(depth: &DepthMap) -> Result<Vec<u8>, EncodeError> {
    let expected = depth.width as usize * depth.height as usize;
    if depth.data.len() != expected {
        return Err(EncodeError {
            artifact: ArtifactKind::Depth,
            reason: format!(
                "buffer size mismatch: expected {} samples, got {}",
                expected,
                depth.data.len()
            ),
        });
    }

    let mut cursor = Cursor::new(Vec::new());
    let to_encode_error = |reason: String| EncodeError {
        artifact: ArtifactKind::Depth,
        reason,
    };
    let mut encoder =
        TiffEncoder::new(&mut cursor).map_err(|e| to_encode_error(e.to_string()))?;
    encoder
        .write_image::<colortype::Gray32Float>(depth.width, depth.height, &depth.data)
        .map_err(|e| to_encode_error(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Encode the confidence buffer as an 8-bit grayscale PNG.
pub fn encode_confidence(confidence: &ConfidenceMap) -> Result<Vec<u8>, EncodeError> {
    let expected = confidence.width as usize * confidence.height as usize;
    if confidence.data.len() != expected {
        return Err(EncodeError {
            artifact: ArtifactKind::Confidence,
            reason: format!(
                "buffer size mismatch: expected {} bytes, got {}",
                expected,
                confidence.data.len()
            ),
        });
    }

    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    encoder
        .write_image(
            &confidence.data,
            confidence.width,
            confidence.height,
            ExtendedColorType::L8,
        )
        .map_err(|e| EncodeError {
            artifact: ArtifactKind::Confidence,
            reason: e.to_string(),
        })?;
    Ok(bytes)
}
