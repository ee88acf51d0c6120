//! The two-generation image scene.

use crate::plane::ImagePlane;

/// One of the two mesh slots tracked by the transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Generation {
    /// The node being navigated to. Drawn with the curtain shader, on top.
    Current,
    /// The node being navigated away from. Drawn first, fully visible.
    Previous,
}

impl Generation {
    pub const ALL: [Generation; 2] = [Generation::Current, Generation::Previous];

    pub(crate) fn index(self) -> usize {
        match self {
            Generation::Current => 0,
            Generation::Previous => 1,
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::Current => write!(f, "current"),
            Generation::Previous => write!(f, "previous"),
        }
    }
}

/// Owns the meshes of both generations.
///
/// Sets are replaced wholesale. Meshes leaving the scene are disposed as part
/// of the replacement, since the scene is their only owner.
pub struct TransitionScene<M: ImagePlane> {
    generations: [Vec<M>; 2],
}

impl<M: ImagePlane> Default for TransitionScene<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ImagePlane> TransitionScene<M> {
    /// Create a scene with both generations empty.
    pub fn new() -> Self {
        Self {
            generations: [Vec::new(), Vec::new()],
        }
    }

    /// Replace the current-generation meshes.
    pub fn set_image_planes(&mut self, meshes: Vec<M>) {
        self.set_generation(Generation::Current, meshes);
    }

    /// Replace the previous-generation meshes.
    pub fn set_image_planes_old(&mut self, meshes: Vec<M>) {
        self.set_generation(Generation::Previous, meshes);
    }

    /// Replace one generation's meshes, disposing the superseded ones.
    pub fn set_generation(&mut self, generation: Generation, meshes: Vec<M>) {
        let superseded = std::mem::replace(&mut self.generations[generation.index()], meshes);
        dispose_all(superseded);
    }

    pub fn image_planes(&self) -> &[M] {
        self.generation(Generation::Current)
    }

    pub fn image_planes_old(&self) -> &[M] {
        self.generation(Generation::Previous)
    }

    /// Drawable container for the current generation.
    pub fn scene(&self) -> &[M] {
        self.image_planes()
    }

    /// Drawable container for the previous generation.
    pub fn scene_old(&self) -> &[M] {
        self.image_planes_old()
    }

    pub fn generation(&self, generation: Generation) -> &[M] {
        &self.generations[generation.index()]
    }

    pub(crate) fn generation_mut(&mut self, generation: Generation) -> &mut [M] {
        &mut self.generations[generation.index()]
    }

    /// Dispose every mesh of both generations. Idempotent.
    pub fn clear(&mut self) {
        for generation in Generation::ALL {
            let meshes = std::mem::take(&mut self.generations[generation.index()]);
            dispose_all(meshes);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.generations.iter().all(Vec::is_empty)
    }
}

fn dispose_all<M: ImagePlane>(meshes: Vec<M>) {
    for mut mesh in meshes {
        mesh.dispose();
    }
}
