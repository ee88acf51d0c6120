//! Aspect-ratio fitting for flat previous-generation planes.
//!
//! A flat image plane's longest side is one world unit at unit distance (see
//! [`ImageTransform::plane_size`](crate::ImageTransform::plane_size)). The
//! previous plane keeps its own aspect ratio and is fitted inside the current
//! plane's rectangle, so overlaying the two never distorts either image.

use crate::error::{TransitionError, TransitionResult};

/// Half extents `(half_width, half_height)` of a plane with aspect `aspect`
/// letterboxed into the plane of a reference image with aspect `reference_aspect`.
///
/// | case | half_width | half_height |
/// |---|---|---|
/// | `aspect > ref`, `ref >= 1` | `0.5` | `0.5 / aspect` |
/// | `aspect > ref`, `ref < 1` | `0.5 * ref` | `0.5 * ref / aspect` |
/// | `aspect <= ref`, `ref >= 1` | `0.5 * aspect / ref` | `0.5 / ref` |
/// | `aspect <= ref`, `ref < 1` | `0.5 * aspect` | `0.5` |
pub fn flat_extents(aspect: f32, reference_aspect: f32) -> TransitionResult<(f32, f32)> {
    for (name, value) in [("aspect", aspect), ("reference aspect", reference_aspect)] {
        if value <= 0.0 || !value.is_finite() {
            return Err(TransitionError::invalid_geometry(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
    }

    // Reference rectangle, longest side 1.
    let (ref_width, ref_height) = if reference_aspect >= 1.0 {
        (1.0, 1.0 / reference_aspect)
    } else {
        (reference_aspect, 1.0)
    };

    if aspect > reference_aspect {
        // Relatively wider: width is the binding side.
        let half_width = 0.5 * ref_width;
        Ok((half_width, half_width / aspect))
    } else {
        let half_height = 0.5 * ref_height;
        Ok((half_height * aspect, half_height))
    }
}
