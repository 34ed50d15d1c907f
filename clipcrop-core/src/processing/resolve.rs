//! Coordinate resolution: reference-space clip descriptors to source-space
//! execution parameters.
//!
//! Pure functions only. Crop edges are scaled independently per axis with
//! truncating integer arithmetic (`edge * actual / reference`), and frame
//! bounds become timestamps through the exact frame-rate rational.

use crate::descriptor::ClipSpec;
use crate::error::{CoreError, CoreResult};
use crate::media::MediaIntrinsics;

use num_rational::Rational64;
use serde::Serialize;

use std::time::Duration;

/// Crop rectangle in source pixel coordinates. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Execution parameters for one clip against one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    /// First frame kept by the video trim.
    pub start_frame: u64,
    /// Last frame kept by the video trim (inclusive).
    pub end_frame: u64,
    /// `start_frame / frame_rate`, in seconds.
    pub start_time: Rational64,
    /// `(end_frame + 1) / frame_rate`, in seconds.
    pub end_time: Rational64,
    pub crop: CropRect,
}

impl ResolvedWindow {
    #[must_use]
    pub fn start_secs(&self) -> f64 {
        rational_to_f64(self.start_time)
    }

    #[must_use]
    pub fn end_secs(&self) -> f64 {
        rational_to_f64(self.end_time)
    }

    /// Length of the clip.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64((self.end_secs() - self.start_secs()).max(0.0))
    }
}

fn rational_to_f64(value: Rational64) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Scales one edge from reference to actual space, truncating toward zero.
fn scale_edge(edge: u32, actual: u32, reference: u32) -> u32 {
    // edge <= reference, so the quotient never exceeds `actual`
    (u64::from(edge) * u64::from(actual) / u64::from(reference)) as u32
}

/// `frame / rate`, computed as `frame * den / num` without overflowing `i64`.
fn frame_to_seconds(frame: u64, intrinsics: &MediaIntrinsics) -> CoreResult<Rational64> {
    let rate = &intrinsics.frame_rate;
    i64::try_from(frame)
        .ok()
        .and_then(|frame| frame.checked_mul(rate.denominator()))
        .map(|scaled| Rational64::new(scaled, rate.numerator()))
        .ok_or_else(|| {
            CoreError::Resolve(format!("frame index {frame} is out of range at {rate} fps"))
        })
}

/// Resolves a clip descriptor against the probed source intrinsics.
///
/// With `even_crop`, an odd crop width or height is shrunk by one pixel on
/// the right or bottom edge.
///
/// # Errors
///
/// `CoreError::Resolve` when the scaled crop has zero area or a reference
/// dimension is zero.
///
/// # Examples
///
/// ```rust
/// use clipcrop_core::{ClipSpec, FrameRate, MediaIntrinsics};
/// use clipcrop_core::processing::resolve::resolve;
///
/// let spec = ClipSpec::parse("v,100,200,0,29,10,10,190,90").unwrap();
/// let intrinsics = MediaIntrinsics {
///     width: 100,
///     height: 50,
///     frame_rate: FrameRate::new(30, 1).unwrap(),
/// };
/// let window = resolve(&spec, &intrinsics, false).unwrap();
/// assert_eq!((window.crop.left, window.crop.top), (5, 5));
/// assert_eq!((window.crop.right, window.crop.bottom), (95, 45));
/// assert_eq!(window.end_secs(), 1.0);
/// ```
pub fn resolve(spec: &ClipSpec, intrinsics: &MediaIntrinsics, even_crop: bool) -> CoreResult<ResolvedWindow> {
    if spec.ref_width == 0 || spec.ref_height == 0 {
        return Err(CoreError::Resolve(format!(
            "reference size {}x{} must be positive",
            spec.ref_width, spec.ref_height
        )));
    }

    let mut crop = CropRect {
        left: scale_edge(spec.left, intrinsics.width, spec.ref_width),
        top: scale_edge(spec.top, intrinsics.height, spec.ref_height),
        right: scale_edge(spec.right, intrinsics.width, spec.ref_width),
        bottom: scale_edge(spec.bottom, intrinsics.height, spec.ref_height),
    };

    if even_crop {
        if crop.width() % 2 == 1 {
            crop.right -= 1;
        }
        if crop.height() % 2 == 1 {
            crop.bottom -= 1;
        }
    }

    if crop.right <= crop.left || crop.bottom <= crop.top {
        return Err(CoreError::Resolve(format!(
            "crop L={} T={} R={} B={} collapses to {}x{} at source size {}x{}",
            crop.left,
            crop.top,
            crop.right,
            crop.bottom,
            crop.width(),
            crop.height(),
            intrinsics.width,
            intrinsics.height
        )));
    }

    if spec.start_frame > spec.end_frame {
        return Err(CoreError::Resolve(format!(
            "start frame {} is after end frame {}",
            spec.start_frame, spec.end_frame
        )));
    }
    let start_time = frame_to_seconds(spec.start_frame, intrinsics)?;
    let end_time = frame_to_seconds(spec.end_frame.saturating_add(1), intrinsics)?;

    Ok(ResolvedWindow {
        start_frame: spec.start_frame,
        end_frame: spec.end_frame,
        start_time,
        end_time,
        crop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::FrameRate;

    fn intrinsics(width: u32, height: u32, num: i64, den: i64) -> MediaIntrinsics {
        MediaIntrinsics {
            width,
            height,
            frame_rate: FrameRate::new(num, den).unwrap(),
        }
    }

    fn spec(line: &str) -> ClipSpec {
        ClipSpec::parse(line).unwrap()
    }

    #[test]
    fn test_halving_crop() {
        let window = resolve(&spec("v,100,200,0,29,10,10,190,90"), &intrinsics(100, 50, 30, 1), false).unwrap();
        assert_eq!(
            window.crop,
            CropRect { left: 5, top: 5, right: 95, bottom: 45 }
        );
        assert_eq!(window.crop.width(), 90);
        assert_eq!(window.crop.height(), 40);
    }

    #[test]
    fn test_one_second_at_thirty_fps() {
        let window = resolve(&spec("v,100,200,0,29,10,10,190,90"), &intrinsics(200, 100, 30, 1), false).unwrap();
        assert_eq!(window.start_time, Rational64::from_integer(0));
        assert_eq!(window.end_time, Rational64::from_integer(1));
        assert_eq!(window.start_secs(), 0.0);
        assert_eq!(window.end_secs(), 1.0);
        assert_eq!(window.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_ntsc_rate_stays_exact() {
        let window = resolve(&spec("v,100,200,30000,30029,0,0,200,100"), &intrinsics(200, 100, 30000, 1001), false).unwrap();
        // 30000 frames at 30000/1001 fps is exactly 1001 seconds
        assert_eq!(window.start_time, Rational64::from_integer(1001));
        assert_eq!(window.end_time, Rational64::new(30030 * 1001, 30000));
    }

    #[test]
    fn test_huge_frame_index_is_a_resolve_error() {
        let result = resolve(
            &spec("v,100,200,0,10000000000000000,0,0,200,100"),
            &intrinsics(200, 100, 30000, 1001),
            false,
        );
        assert!(matches!(result, Err(CoreError::Resolve(_))));

        let result = resolve(&spec(&format!("v,100,200,0,{},0,0,200,100", u64::MAX)), &intrinsics(200, 100, 30, 1), false);
        assert!(matches!(result, Err(CoreError::Resolve(_))));
    }

    #[test]
    fn test_axes_scale_independently_and_truncate() {
        // width x3, height x1.5 with truncation on the odd edges
        let window = resolve(&spec("v,100,100,0,0,1,1,3,3"), &intrinsics(300, 150, 25, 1), false).unwrap();
        assert_eq!(
            window.crop,
            CropRect { left: 3, top: 1, right: 9, bottom: 4 }
        );
    }

    #[test]
    fn test_degenerate_crop_after_scaling_is_rejected() {
        // 1 px wide box at 1/4 scale truncates to zero width
        let result = resolve(&spec("v,400,400,0,10,0,0,1,400"), &intrinsics(100, 100, 30, 1), false);
        assert!(matches!(result, Err(CoreError::Resolve(_))));

        let result = resolve(&spec("v,400,400,0,10,0,0,400,3"), &intrinsics(100, 100, 30, 1), false);
        assert!(matches!(result, Err(CoreError::Resolve(_))));
    }

    #[test]
    fn test_even_crop_shrinks_odd_dimensions() {
        let s = spec("v,100,100,0,10,0,0,51,33");
        let plain = resolve(&s, &intrinsics(100, 100, 30, 1), false).unwrap();
        assert_eq!((plain.crop.width(), plain.crop.height()), (51, 33));

        let even = resolve(&s, &intrinsics(100, 100, 30, 1), true).unwrap();
        assert_eq!(
            even.crop,
            CropRect { left: 0, top: 0, right: 50, bottom: 32 }
        );
    }

    #[test]
    fn test_even_crop_can_collapse_single_pixel() {
        let result = resolve(&spec("v,100,100,0,10,4,0,5,10"), &intrinsics(100, 100, 30, 1), true);
        assert!(matches!(result, Err(CoreError::Resolve(_))));
    }
}
