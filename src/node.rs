//! Navigation-side data consumed by the transition renderer.
//!
//! Everything in this module is produced by the navigation subsystem and read
//! by the renderer: node identities, the geometric transform of each node's
//! image, and the per-frame [`CurrentState`] payload.

use crate::error::{TransitionError, TransitionResult};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::PI;

/// Unique identifier for a visual node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(pub(crate) String);

impl NodeKey {
    /// Create a new node key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A visual node: one captured image and its projection kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub key: NodeKey,
    /// The image is spherical (full or partial panorama).
    pub pano: bool,
    /// The image covers the complete 360° sphere.
    pub full_pano: bool,
}

impl Node {
    /// A regular perspective image.
    pub fn flat(key: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            pano: false,
            full_pano: false,
        }
    }

    /// A complete equirectangular panorama.
    pub fn full_pano(key: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            pano: true,
            full_pano: true,
        }
    }

    /// A panorama covering less than the full sphere.
    pub fn partial_pano(key: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            pano: true,
            full_pano: false,
        }
    }

    /// Spherical but not a complete sphere.
    pub fn is_partial_pano(&self) -> bool {
        self.pano && !self.full_pano
    }
}

/// Crop of a partial panorama within its full equirectangular frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanoCrop {
    pub full_width: u32,
    pub full_height: u32,
    pub cropped_width: u32,
    pub cropped_height: u32,
    pub cropped_left: u32,
    pub cropped_top: u32,
}

impl PanoCrop {
    /// Longitude range `(start, length)` in radians.
    ///
    /// Longitude 0 is the center column of the full panorama, increasing to the right.
    pub fn longitude_range(&self) -> TransitionResult<(f32, f32)> {
        self.validate()?;
        let full = self.full_width as f32;
        let start = 2.0 * PI * self.cropped_left as f32 / full - PI;
        let length = 2.0 * PI * self.cropped_width as f32 / full;
        Ok((start, length))
    }

    /// Polar range `(start, length)` in radians, measured from the zenith.
    pub fn polar_range(&self) -> TransitionResult<(f32, f32)> {
        self.validate()?;
        let full = self.full_height as f32;
        let start = PI * self.cropped_top as f32 / full;
        let length = PI * self.cropped_height as f32 / full;
        Ok((start, length))
    }

    fn validate(&self) -> TransitionResult<()> {
        if self.full_width == 0 || self.full_height == 0 {
            return Err(TransitionError::invalid_geometry(
                "panorama crop has an empty full frame",
            ));
        }
        if self.cropped_width == 0 || self.cropped_height == 0 {
            return Err(TransitionError::invalid_geometry(
                "panorama crop has an empty cropped area",
            ));
        }
        let fits = |start: u32, len: u32, full: u32| {
            start.checked_add(len).is_some_and(|end| end <= full)
        };
        if !fits(self.cropped_left, self.cropped_width, self.full_width)
            || !fits(self.cropped_top, self.cropped_height, self.full_height)
        {
            return Err(TransitionError::invalid_geometry(format!(
                "panorama crop {}x{}+{}+{} exceeds full frame {}x{}",
                self.cropped_width,
                self.cropped_height,
                self.cropped_left,
                self.cropped_top,
                self.full_width,
                self.full_height
            )));
        }
        Ok(())
    }
}

/// Geometric descriptor of a node's image.
///
/// `rotation` and `position` place the capturing camera in the world; the
/// camera looks down its local -Z axis with +Y up.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTransform {
    /// Source image width in pixels.
    pub width: u32,
    /// Source image height in pixels.
    pub height: u32,
    pub rotation: Quat,
    pub position: Vec3,
    /// Present for partial panoramas.
    pub pano_crop: Option<PanoCrop>,
}

impl ImageTransform {
    /// Identity-placed transform for an image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
            pano_crop: None,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_pano_crop(mut self, crop: PanoCrop) -> Self {
        self.pano_crop = Some(crop);
        self
    }

    /// Width over height of the source image.
    pub fn basic_aspect(&self) -> TransitionResult<f32> {
        if self.width == 0 || self.height == 0 {
            return Err(TransitionError::invalid_geometry(format!(
                "degenerate image size {}x{}",
                self.width, self.height
            )));
        }
        Ok(self.width as f32 / self.height as f32)
    }

    /// World size `(width, height)` of the flat image plane at unit distance.
    ///
    /// The longest side is 1.
    pub fn plane_size(&self) -> TransitionResult<(f32, f32)> {
        let aspect = self.basic_aspect()?;
        if aspect >= 1.0 {
            Ok((1.0, 1.0 / aspect))
        } else {
            Ok((aspect, 1.0))
        }
    }

    /// Camera-to-world matrix for geometry built in this transform's local space.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// State payload of one navigation frame.
#[derive(Clone, Debug, Default)]
pub struct CurrentState {
    pub current_node: Option<Node>,
    pub previous_node: Option<Node>,
    pub current_transform: Option<ImageTransform>,
    pub previous_transform: Option<ImageTransform>,
    /// No camera motion is occurring; geometry is built as flat planes.
    pub motionless: bool,
}

impl CurrentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(mut self, node: Node, transform: ImageTransform) -> Self {
        self.current_node = Some(node);
        self.current_transform = Some(transform);
        self
    }

    pub fn previous(mut self, node: Node, transform: ImageTransform) -> Self {
        self.previous_node = Some(node);
        self.previous_transform = Some(transform);
        self
    }

    pub fn motionless(mut self, motionless: bool) -> Self {
        self.motionless = motionless;
        self
    }
}

/// One navigation tick delivered to the renderer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub id: u64,
    pub state: CurrentState,
}

impl Frame {
    pub fn new(id: u64, state: CurrentState) -> Self {
        Self { id, state }
    }
}
