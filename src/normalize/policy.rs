//! Size-fit policies: mapping an oversized image to a target pixel footprint.
//!
//! Two policies exist because the platform tolerates either reading of the
//! ceiling: fit the image into a fixed bounding box, or scale it down by
//! the square root of the byte overshoot. The bounding box is the default
//! for determinism.

use crate::constants::MAX_EMOTE_DIMENSIONS;

/// Strategy for computing the target pixel footprint of an oversized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFitPolicy {
    /// Aspect-preserving fit into a fixed bounding box (never upscales).
    BoundingBox {
        /// Box width in pixels.
        max_width: u32,
        /// Box height in pixels.
        max_height: u32,
    },
    /// Divide both dimensions by `sqrt(current_bytes / ceiling_bytes)`.
    SizeRatio,
}

impl Default for SizeFitPolicy {
    fn default() -> Self {
        Self::bounding_box()
    }
}

impl SizeFitPolicy {
    /// The default bounding-box policy at the platform's pixel ceiling.
    #[must_use]
    pub fn bounding_box() -> Self {
        let (max_width, max_height) = MAX_EMOTE_DIMENSIONS;
        Self::BoundingBox {
            max_width,
            max_height,
        }
    }

    /// Computes the target dimensions for an image currently at
    /// `current_dims` and `current_bytes`.
    ///
    /// Both policies only ever shrink; a compliant image maps to itself.
    #[must_use]
    pub fn target_dimensions(
        self,
        current_dims: (u32, u32),
        current_bytes: u64,
        ceiling_bytes: u64,
    ) -> (u32, u32) {
        match self {
            Self::BoundingBox {
                max_width,
                max_height,
            } => fit_within(current_dims, (max_width, max_height)),
            Self::SizeRatio => {
                if current_bytes <= ceiling_bytes || ceiling_bytes == 0 {
                    return current_dims;
                }
                #[allow(clippy::cast_precision_loss)]
                let ratio = (current_bytes as f64 / ceiling_bytes as f64).sqrt();
                scale_dims(current_dims, 1.0 / ratio)
            }
        }
    }
}

/// Scales dimensions into a bounding box, preserving aspect ratio and
/// never upscaling.
#[must_use]
pub(crate) fn fit_within(dims: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (w, h) = dims;
    let (bw, bh) = bounds;
    if w == 0 || h == 0 {
        return dims;
    }
    let scale = f64::min(
        1.0,
        f64::min(f64::from(bw) / f64::from(w), f64::from(bh) / f64::from(h)),
    );
    scale_dims(dims, scale)
}

/// Applies a scale factor to both dimensions, flooring at one pixel.
#[must_use]
pub(crate) fn scale_dims(dims: (u32, u32), scale: f64) -> (u32, u32) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let apply = |d: u32| ((f64::from(d) * scale) as u32).max(1);
    (apply(dims.0), apply(dims.1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_shrinks_preserving_aspect() {
        let policy = SizeFitPolicy::bounding_box();
        let target = policy.target_dimensions((512, 256), 1, 1);
        assert_eq!(target, (256, 128));
    }

    #[test]
    fn test_bounding_box_never_upscales() {
        let policy = SizeFitPolicy::bounding_box();
        assert_eq!(policy.target_dimensions((64, 32), 1, 1), (64, 32));
    }

    #[test]
    fn test_bounding_box_ignores_byte_counts() {
        let policy = SizeFitPolicy::bounding_box();
        let a = policy.target_dimensions((512, 512), 1_000_000, 1);
        let b = policy.target_dimensions((512, 512), 1, 1_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_size_ratio_compliant_image_is_untouched() {
        let policy = SizeFitPolicy::SizeRatio;
        assert_eq!(policy.target_dimensions((300, 300), 100, 200), (300, 300));
    }

    #[test]
    fn test_size_ratio_scales_by_sqrt_of_overshoot() {
        let policy = SizeFitPolicy::SizeRatio;
        // 4x over the ceiling: both dimensions halve.
        assert_eq!(policy.target_dimensions((400, 200), 400, 100), (200, 100));
    }

    #[test]
    fn test_scale_dims_floors_at_one_pixel() {
        assert_eq!(scale_dims((3, 3), 0.01), (1, 1));
    }

    #[test]
    fn test_fit_within_tall_image() {
        assert_eq!(fit_within((100, 1000), (256, 256)), (25, 256));
    }

    #[test]
    fn test_default_policy_is_bounding_box_at_platform_ceiling() {
        assert_eq!(
            SizeFitPolicy::default(),
            SizeFitPolicy::BoundingBox {
                max_width: 256,
                max_height: 256
            }
        );
    }
}
