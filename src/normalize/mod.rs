//! Format and size normalization of the fetched working file.
//!
//! The normalizer decodes the working file, decides animated vs. static by
//! counting frames, transcodes to the platform's two accepted encodings
//! (static PNG with alpha preserved, animated GIF looping forever), and -
//! when the file is over the byte ceiling - re-encodes at a target pixel
//! footprint chosen by the configured [`SizeFitPolicy`]. Animated assets
//! are resized frame by frame with per-frame delays preserved.
//!
//! An already-compliant file (correct container, under the ceiling) is
//! returned untouched, byte-identical. Everything runs locally; no network.

mod error;
mod policy;

pub use error::NormalizeError;
pub use policy::SizeFitPolicy;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::webp::WebPDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat};
use tracing::{debug, instrument};

use crate::constants::{FALLBACK_EMOTE_DIMENSIONS, MAX_EMOTE_BYTES};

use policy::{fit_within, scale_dims};

/// Re-encode passes stop shrinking once the longest edge reaches this.
const MIN_TARGET_EDGE: u32 = 8;

/// Safety margin applied on top of the measured byte overshoot when a
/// re-encode is still over the ceiling.
const SHRINK_MARGIN: f64 = 0.95;

/// The normalized working file handed to the upload driver.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Working-file location (same path the fetcher wrote; overwritten in
    /// place when a re-encode was needed).
    pub path: PathBuf,
    /// Size on disk after normalization.
    pub byte_size: u64,
    /// Pixel dimensions after normalization.
    pub dimensions: (u32, u32),
    /// Number of frames; 1 for static images.
    pub frame_count: usize,
}

impl NormalizedImage {
    /// True when the asset is a multi-frame animation.
    #[must_use]
    pub fn animated(&self) -> bool {
        self.frame_count > 1
    }
}

/// Decodes, transcodes, and size-fits working files.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    policy: SizeFitPolicy,
    ceiling_bytes: u64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SizeFitPolicy::default())
    }
}

impl Normalizer {
    /// Creates a normalizer with the given size-fit policy and the
    /// platform byte ceiling.
    #[must_use]
    pub fn new(policy: SizeFitPolicy) -> Self {
        Self {
            policy,
            ceiling_bytes: MAX_EMOTE_BYTES,
        }
    }

    /// Creates a normalizer with an explicit byte ceiling (tests).
    #[must_use]
    pub fn with_ceiling(policy: SizeFitPolicy, ceiling_bytes: u64) -> Self {
        Self {
            policy,
            ceiling_bytes,
        }
    }

    /// The byte ceiling this normalizer fits into.
    #[must_use]
    pub fn ceiling_bytes(&self) -> u64 {
        self.ceiling_bytes
    }

    /// Normalizes the working file in place.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Unsupported`] when decoding or re-encoding
    /// fails (the message carries the codec error text) and
    /// [`NormalizeError::Io`] on file system failures.
    #[instrument(skip(self))]
    pub fn normalize(&self, path: &Path) -> Result<NormalizedImage, NormalizeError> {
        let bytes = fs::read(path).map_err(|e| NormalizeError::io(path, e))?;
        let format =
            image::guess_format(&bytes).map_err(|e| NormalizeError::unsupported(path, e))?;
        let frames = decode_frames(&bytes, format, path)?;
        let first = frames
            .first()
            .ok_or_else(|| NormalizeError::unsupported(path, "decoded zero frames"))?;
        let dimensions = first.buffer().dimensions();
        let animated = frames.len() > 1;
        let byte_size = bytes.len() as u64;

        let target_container = if animated {
            ImageFormat::Gif
        } else {
            ImageFormat::Png
        };
        if format == target_container && byte_size <= self.ceiling_bytes {
            debug!(byte_size, "Working file already compliant; no re-encode");
            return Ok(NormalizedImage {
                path: path.to_path_buf(),
                byte_size,
                dimensions,
                frame_count: frames.len(),
            });
        }

        let initial_target = if byte_size > self.ceiling_bytes {
            self.policy
                .target_dimensions(dimensions, byte_size, self.ceiling_bytes)
        } else {
            dimensions
        };
        self.encode_to_fit(path, &frames, animated, initial_target)
    }

    /// Forces a re-encode at the minimum supported footprint, regardless of
    /// current compliance. Used by the retry loop's manual-resize fallback
    /// after every candidate variant was size-rejected by the remote.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Normalizer::normalize`].
    #[instrument(skip(self))]
    pub fn force_fit(&self, path: &Path) -> Result<NormalizedImage, NormalizeError> {
        let bytes = fs::read(path).map_err(|e| NormalizeError::io(path, e))?;
        let format =
            image::guess_format(&bytes).map_err(|e| NormalizeError::unsupported(path, e))?;
        let frames = decode_frames(&bytes, format, path)?;
        let first = frames
            .first()
            .ok_or_else(|| NormalizeError::unsupported(path, "decoded zero frames"))?;
        let dimensions = first.buffer().dimensions();
        let animated = frames.len() > 1;

        let target = fit_within(dimensions, FALLBACK_EMOTE_DIMENSIONS);
        self.encode_to_fit(path, &frames, animated, target)
    }

    /// Encodes at `target`, shrinking geometrically until the result is
    /// under the ceiling, then overwrites the working file.
    ///
    /// The loop terminates because each pass multiplies the dimensions by a
    /// factor strictly below one and stops at [`MIN_TARGET_EDGE`].
    fn encode_to_fit(
        &self,
        path: &Path,
        frames: &[Frame],
        animated: bool,
        mut target: (u32, u32),
    ) -> Result<NormalizedImage, NormalizeError> {
        let mut encoded = encode(frames, target, animated, path)?;
        while encoded.len() as u64 > self.ceiling_bytes && target.0.max(target.1) > MIN_TARGET_EDGE
        {
            #[allow(clippy::cast_precision_loss)]
            let ratio = (self.ceiling_bytes as f64 / encoded.len() as f64).sqrt() * SHRINK_MARGIN;
            let next = scale_dims(target, ratio);
            target = if next == target {
                scale_dims(target, 0.9)
            } else {
                next
            };
            debug!(width = target.0, height = target.1, "Re-encoding smaller");
            encoded = encode(frames, target, animated, path)?;
        }

        fs::write(path, &encoded).map_err(|e| NormalizeError::io(path, e))?;
        debug!(
            byte_size = encoded.len(),
            width = target.0,
            height = target.1,
            frame_count = frames.len(),
            "Normalized working file"
        );
        Ok(NormalizedImage {
            path: path.to_path_buf(),
            byte_size: encoded.len() as u64,
            dimensions: target,
            frame_count: frames.len(),
        })
    }
}

/// Decodes the byte buffer into composited RGBA frames.
///
/// GIF and animated WebP decode through the animation path; everything
/// else is a single frame. Frame delays come through the decoder.
fn decode_frames(
    bytes: &[u8],
    format: ImageFormat,
    path: &Path,
) -> Result<Vec<Frame>, NormalizeError> {
    let unsupported = |e: image::ImageError| NormalizeError::unsupported(path, e);
    match format {
        ImageFormat::Gif => GifDecoder::new(Cursor::new(bytes))
            .map_err(unsupported)?
            .into_frames()
            .collect_frames()
            .map_err(unsupported),
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(Cursor::new(bytes)).map_err(unsupported)?;
            if decoder.has_animation() {
                decoder.into_frames().collect_frames().map_err(unsupported)
            } else {
                let img = DynamicImage::from_decoder(decoder).map_err(unsupported)?;
                Ok(vec![Frame::new(img.to_rgba8())])
            }
        }
        _ => {
            let img = image::load_from_memory_with_format(bytes, format).map_err(unsupported)?;
            Ok(vec![Frame::new(img.to_rgba8())])
        }
    }
}

/// Encodes frames at the target dimensions into the target container:
/// GIF (looping forever, per-frame delays kept) when animated, PNG (alpha
/// preserved) otherwise.
fn encode(
    frames: &[Frame],
    target: (u32, u32),
    animated: bool,
    path: &Path,
) -> Result<Vec<u8>, NormalizeError> {
    let unsupported = |e: image::ImageError| NormalizeError::unsupported(path, e);
    let mut buf = Vec::new();
    if animated {
        let resized = resize_frames(frames, target);
        let mut encoder = GifEncoder::new(&mut buf);
        encoder.set_repeat(Repeat::Infinite).map_err(unsupported)?;
        encoder.encode_frames(resized).map_err(unsupported)?;
    } else {
        let first = frames
            .first()
            .ok_or_else(|| NormalizeError::unsupported(path, "decoded zero frames"))?;
        let buffer = if first.buffer().dimensions() == target {
            first.buffer().clone()
        } else {
            imageops::resize(first.buffer(), target.0, target.1, FilterType::Lanczos3)
        };
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(unsupported)?;
    }
    Ok(buf)
}

/// Resizes every frame to the same target, keeping each frame's delay.
fn resize_frames(frames: &[Frame], target: (u32, u32)) -> Vec<Frame> {
    frames
        .iter()
        .map(|frame| {
            let resized =
                imageops::resize(frame.buffer(), target.0, target.1, FilterType::Lanczos3);
            Frame::from_parts(resized, 0, 0, frame.delay())
        })
        .collect()
}
