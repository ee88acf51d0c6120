//! Frame-driven renderer for the two-generation transition scene.

use super::letterbox::flat_extents;
use super::scene::{Generation, TransitionScene};
use crate::camera::Camera;
use crate::error::{TransitionError, TransitionResult};
use crate::node::{CurrentState, Frame, Node, NodeKey};
use crate::plane::{ImagePlane, MeshFactory, RenderTarget};

/// Tunables for [`TransitionRenderer`].
#[derive(Clone, Copy, Debug)]
pub struct RendererConfig {
    /// Curtain position before the first [`update_curtain`](TransitionRenderer::update_curtain).
    pub initial_curtain: f32,
    /// Curtain changes smaller than this are ignored.
    pub curtain_epsilon: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            initial_curtain: 1.0,
            curtain_epsilon: 0.001,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_curtain(mut self, curtain: f32) -> Self {
        self.initial_curtain = curtain.clamp(0.0, 1.0);
        self
    }

    pub fn curtain_epsilon(mut self, epsilon: f32) -> Self {
        self.curtain_epsilon = epsilon;
        self
    }
}

/// Keeps a [`TransitionScene`] in sync with navigation frames and draws it.
///
/// Each generation caches the key of the node its meshes were built for.
/// A frame only causes work when one of those keys changes; steady-state
/// frames between navigation events are free.
///
/// All calls are expected from a single thread, one at a time.
pub struct TransitionRenderer<F: MeshFactory> {
    factory: F,
    scene: TransitionScene<F::Mesh>,
    keys: [Option<NodeKey>; 2],
    curtain: f32,
    curtain_epsilon: f32,
    disabled: bool,
    needs_render: bool,
    frame_id: Option<u64>,
    disposed: bool,
}

impl<F: MeshFactory> TransitionRenderer<F> {
    pub fn new(factory: F, config: RendererConfig) -> Self {
        Self {
            factory,
            scene: TransitionScene::new(),
            keys: [None, None],
            curtain: config.initial_curtain,
            curtain_epsilon: config.curtain_epsilon,
            disabled: true,
            needs_render: false,
            frame_id: None,
            disposed: false,
        }
    }

    /// Consume a navigation frame.
    ///
    /// Rebuilds the generation(s) whose node changed. Geometry for the whole
    /// frame is built before anything is replaced, so a factory error leaves
    /// the renderer exactly as it was.
    pub fn update(&mut self, frame: &Frame) -> TransitionResult<()> {
        self.ensure_live()?;
        self.frame_id = Some(frame.id);
        self.update_image_planes(&frame.state)
    }

    /// Move the wipe to `curtain`.
    ///
    /// Ignored while disabled or when the change is below the configured epsilon.
    pub fn update_curtain(&mut self, curtain: f32) -> TransitionResult<()> {
        self.ensure_live()?;

        if curtain.is_nan() {
            log::warn!("ignoring NaN curtain value");
            return Ok(());
        }
        if self.disabled {
            log::trace!("curtain {curtain} ignored: transition disabled");
            return Ok(());
        }

        let curtain = curtain.clamp(0.0, 1.0);
        if (curtain - self.curtain).abs() < self.curtain_epsilon {
            return Ok(());
        }

        self.curtain = curtain;
        self.apply_curtain();
        self.needs_render = true;
        Ok(())
    }

    /// Bind a decoded image to the generation currently built for `node`,
    /// checking the current generation first.
    ///
    /// An image for a node neither generation shows any more is dropped.
    /// That is the expected outcome of fast navigation, not an error.
    pub fn update_texture(
        &mut self,
        image: &<F::Mesh as ImagePlane>::Image,
        node: &Node,
    ) -> TransitionResult<()> {
        self.ensure_live()?;

        let matched = Generation::ALL
            .into_iter()
            .find(|&generation| self.key(generation) == Some(&node.key));

        match matched {
            Some(generation) => {
                for plane in self.scene.generation_mut(generation) {
                    plane.set_texture(image);
                }
                self.needs_render = true;
            }
            None => log::trace!("dropping stale texture for node {}", node.key),
        }
        Ok(())
    }

    /// Draw the previous generation (unless disabled) then the current one on top.
    pub fn render<T>(&mut self, camera: &Camera, target: &mut T) -> TransitionResult<()>
    where
        T: RenderTarget<F::Mesh>,
    {
        self.ensure_live()?;

        if !self.disabled {
            target.draw_scene(self.scene.scene_old(), camera);
        }
        target.draw_scene(self.scene.scene(), camera);

        self.needs_render = false;
        Ok(())
    }

    /// Release both generations. Terminal: every later call fails with
    /// [`TransitionError::Disposed`].
    pub fn dispose(&mut self) -> TransitionResult<()> {
        self.ensure_live()?;
        self.scene.clear();
        self.keys = [None, None];
        self.disposed = true;
        log::debug!("transition renderer disposed");
        Ok(())
    }

    /// Whether the previous pass and curtain updates are suppressed.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Id of the last frame passed to [`update`](Self::update).
    pub fn frame_id(&self) -> Option<u64> {
        self.frame_id
    }

    pub fn curtain(&self) -> f32 {
        self.curtain
    }

    /// Key of the node a generation was last built for.
    pub fn key(&self, generation: Generation) -> Option<&NodeKey> {
        self.keys[generation.index()].as_ref()
    }

    pub fn scene(&self) -> &TransitionScene<F::Mesh> {
        &self.scene
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> TransitionResult<()> {
        if self.disposed {
            Err(TransitionError::Disposed)
        } else {
            Ok(())
        }
    }

    fn changed(&self, generation: Generation, node: Option<&Node>) -> bool {
        self.key(generation) != node.map(|node| &node.key)
    }

    fn update_image_planes(&mut self, state: &CurrentState) -> TransitionResult<()> {
        let current = state.current_node.as_ref();
        let previous = state.previous_node.as_ref();
        let current_changed = self.changed(Generation::Current, current);
        let previous_changed = self.changed(Generation::Previous, previous);

        if !(current_changed || previous_changed) {
            return Ok(());
        }

        // A flat previous plane is sized against the current transform.
        let previous_node = previous.filter(|node| {
            previous_changed || (current_changed && builds_flat(node, state))
        });
        let current_node = current.filter(|_| current_changed);

        let previous_plane = match previous_node {
            Some(node) => Some(self.build_previous(node, state)?),
            None => None,
        };
        let current_plane = match current_node {
            Some(node) => match self.build_current(node, state) {
                Ok(plane) => Some(plane),
                Err(e) => {
                    if let Some(mut plane) = previous_plane {
                        plane.dispose();
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        match (previous_node, previous_plane) {
            (Some(node), Some(plane)) => self.replace(Generation::Previous, node, plane),
            _ if previous.is_none() && previous_changed => self.vacate(Generation::Previous),
            _ => {}
        }
        match (current_node, current_plane) {
            (Some(node), Some(plane)) => self.replace(Generation::Current, node, plane),
            _ if current.is_none() && current_changed => self.vacate(Generation::Current),
            _ => {}
        }

        self.needs_render = true;
        self.set_disabled(state);

        if current_node.is_some() && !self.disabled {
            self.apply_curtain();
        }
        Ok(())
    }

    fn build_previous(&mut self, node: &Node, state: &CurrentState) -> TransitionResult<F::Mesh> {
        let transform = state.previous_transform.as_ref().ok_or_else(|| {
            TransitionError::invalid_geometry(format!("previous node {} has no transform", node.key))
        })?;

        if builds_flat(node, state) {
            let aspect = transform.basic_aspect()?;
            let reference = match (&state.current_node, &state.current_transform) {
                (Some(_), Some(current)) => current.basic_aspect()?,
                _ => aspect,
            };
            let (half_width, half_height) = flat_extents(aspect, reference)?;
            log::debug!(
                "building flat previous plane for {} ({half_width:.3} x {half_height:.3})",
                node.key
            );
            self.factory
                .create_scaled_flat_mesh(node, transform, half_width, half_height)
        } else {
            log::debug!("building spherical previous plane for {}", node.key);
            self.factory.create_mesh(node, transform)
        }
    }

    fn build_current(&mut self, node: &Node, state: &CurrentState) -> TransitionResult<F::Mesh> {
        let transform = state.current_transform.as_ref().ok_or_else(|| {
            TransitionError::invalid_geometry(format!("current node {} has no transform", node.key))
        })?;

        log::debug!("building curtain plane for {}", node.key);
        self.factory.create_curtain_mesh(node, transform)
    }

    fn replace(&mut self, generation: Generation, node: &Node, plane: F::Mesh) {
        self.scene.set_generation(generation, vec![plane]);
        self.keys[generation.index()] = Some(node.key.clone());
    }

    fn vacate(&mut self, generation: Generation) {
        if let Some(key) = self.keys[generation.index()].take() {
            log::debug!("{generation} node {key} left the frame");
        }
        self.scene.set_generation(generation, Vec::new());
    }

    fn set_disabled(&mut self, state: &CurrentState) {
        let disabled = is_incompatible(state.current_node.as_ref(), state.previous_node.as_ref());
        if disabled != self.disabled {
            log::debug!("transition {}", if disabled { "disabled" } else { "enabled" });
        }
        self.disabled = disabled;
    }

    fn apply_curtain(&mut self) {
        let curtain = self.curtain;
        for plane in self.scene.generation_mut(Generation::Current) {
            plane.set_curtain(curtain);
        }
    }
}

/// Whether the previous node is drawn as a flat, letterboxed plane.
fn builds_flat(previous: &Node, state: &CurrentState) -> bool {
    state.motionless || !previous.pano
}

/// Whether a node pair cannot be wiped between.
fn is_incompatible(current: Option<&Node>, previous: Option<&Node>) -> bool {
    match (current, previous) {
        (Some(current), Some(previous)) => {
            current.is_partial_pano()
                || previous.is_partial_pano()
                || (current.full_pano && !previous.full_pano)
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ImageTransform;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Built {
        Mesh,
        Flat { half_width: f32, half_height: f32 },
        Curtain,
    }

    struct MockPlane {
        id: u32,
        key: NodeKey,
        built: Built,
        curtain: Option<f32>,
        texture: Option<u32>,
        disposed: Rc<Cell<u32>>,
    }

    impl ImagePlane for MockPlane {
        type Image = u32;

        fn set_curtain(&mut self, curtain: f32) {
            if self.built == Built::Curtain {
                self.curtain = Some(curtain);
            }
        }

        fn set_texture(&mut self, image: &u32) {
            self.texture = Some(*image);
        }

        fn dispose(&mut self) {
            self.disposed.set(self.disposed.get() + 1);
        }
    }

    #[derive(Default)]
    struct MockFactory {
        next_id: u32,
        built: u32,
        fail_for: Option<NodeKey>,
        disposed: Rc<Cell<u32>>,
    }

    impl MockFactory {
        fn make(&mut self, node: &Node, built: Built) -> TransitionResult<MockPlane> {
            if self.fail_for.as_ref() == Some(&node.key) {
                return Err(TransitionError::invalid_geometry("mock failure"));
            }
            self.next_id += 1;
            self.built += 1;
            Ok(MockPlane {
                id: self.next_id,
                key: node.key.clone(),
                built,
                curtain: None,
                texture: None,
                disposed: Rc::clone(&self.disposed),
            })
        }
    }

    impl MeshFactory for MockFactory {
        type Mesh = MockPlane;

        fn create_mesh(&mut self, node: &Node, _: &ImageTransform) -> TransitionResult<MockPlane> {
            self.make(node, Built::Mesh)
        }

        fn create_scaled_flat_mesh(
            &mut self,
            node: &Node,
            _: &ImageTransform,
            half_width: f32,
            half_height: f32,
        ) -> TransitionResult<MockPlane> {
            self.make(
                node,
                Built::Flat {
                    half_width,
                    half_height,
                },
            )
        }

        fn create_curtain_mesh(
            &mut self,
            node: &Node,
            _: &ImageTransform,
        ) -> TransitionResult<MockPlane> {
            self.make(node, Built::Curtain)
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        passes: Vec<Vec<u32>>,
    }

    impl RenderTarget<MockPlane> for RecordingTarget {
        fn draw_scene(&mut self, planes: &[MockPlane], _camera: &Camera) {
            self.passes.push(planes.iter().map(|p| p.id).collect());
        }
    }

    fn renderer() -> TransitionRenderer<MockFactory> {
        TransitionRenderer::new(MockFactory::default(), RendererConfig::default())
    }

    fn square() -> ImageTransform {
        ImageTransform::new(100, 100)
    }

    fn wide() -> ImageTransform {
        ImageTransform::new(200, 100)
    }

    fn ids(planes: &[MockPlane]) -> Vec<u32> {
        planes.iter().map(|p| p.id).collect()
    }

    fn pair(current: Node, previous: Node) -> CurrentState {
        CurrentState::new()
            .current(current, square())
            .previous(previous, square())
    }

    #[test]
    fn empty_frames_never_build() {
        let mut r = renderer();
        for id in 0..3 {
            r.update(&Frame::new(id, CurrentState::new())).unwrap();
        }
        assert_eq!(r.factory().built, 0);
        assert!(r.disabled());
        assert!(!r.needs_render());
        assert_eq!(r.frame_id(), Some(2));
    }

    #[test]
    fn unchanged_keys_keep_mesh_identities() {
        let mut r = renderer();
        let state = pair(Node::flat("b"), Node::flat("a"));
        r.update(&Frame::new(1, state.clone())).unwrap();
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();

        let current = ids(r.scene().image_planes());
        let previous = ids(r.scene().image_planes_old());
        let disabled = r.disabled();

        r.update(&Frame::new(2, state)).unwrap();
        assert_eq!(ids(r.scene().image_planes()), current);
        assert_eq!(ids(r.scene().image_planes_old()), previous);
        assert_eq!(r.disabled(), disabled);
        assert!(!r.needs_render());
        assert_eq!(r.factory().built, 2);
    }

    #[test]
    fn small_curtain_change_is_ignored() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.update_curtain(0.5).unwrap();
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();

        r.update_curtain(0.5005).unwrap();
        assert_eq!(r.curtain(), 0.5);
        assert!(!r.needs_render());
    }

    #[test]
    fn disabled_transition_ignores_curtain() {
        let mut r = renderer();
        r.update(&Frame::new(1, CurrentState::new().current(Node::flat("a"), square())))
            .unwrap();
        assert!(r.disabled());
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();

        r.update_curtain(0.25).unwrap();
        assert_eq!(r.curtain(), 1.0);
        assert!(!r.needs_render());
        assert_eq!(r.scene().image_planes()[0].curtain, None);
    }

    #[test]
    fn stale_texture_is_dropped() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();

        r.update_texture(&7, &Node::flat("gone")).unwrap();
        assert!(r.scene().image_planes().iter().all(|p| p.texture.is_none()));
        assert!(r.scene().image_planes_old().iter().all(|p| p.texture.is_none()));
        assert!(!r.needs_render());
    }

    #[test]
    fn texture_reaches_only_the_matching_generation() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();

        r.update_texture(&3, &Node::flat("a")).unwrap();
        assert_eq!(r.scene().image_planes_old()[0].texture, Some(3));
        assert_eq!(r.scene().image_planes()[0].texture, None);
        assert!(r.needs_render());

        r.update_texture(&4, &Node::flat("b")).unwrap();
        assert_eq!(r.scene().image_planes()[0].texture, Some(4));
        assert_eq!(r.scene().image_planes_old()[0].texture, Some(3));
    }

    #[test]
    fn incompatibility_truth_table() {
        let kinds = [
            ("flat", false, false),
            ("partial", true, false),
            ("full", true, true),
        ];
        let node = |(name, pano, full_pano): (&str, bool, bool)| Node {
            key: NodeKey::new(name),
            pano,
            full_pano,
        };

        for &c in &kinds {
            assert!(is_incompatible(Some(&node(c)), None));
            assert!(is_incompatible(None, Some(&node(c))));
            for &p in &kinds {
                let expected = (c.1 && !c.2) || (p.1 && !p.2) || (c.2 && !p.2);
                assert_eq!(
                    is_incompatible(Some(&node(c)), Some(&node(p))),
                    expected,
                    "current={} previous={}",
                    c.0,
                    p.0
                );
            }
        }
        assert!(is_incompatible(None, None));

        // Only flat->flat, flat->full and full->full can be wiped between.
        assert!(!is_incompatible(Some(&node(kinds[0])), Some(&node(kinds[0]))));
        assert!(!is_incompatible(Some(&node(kinds[0])), Some(&node(kinds[2]))));
        assert!(!is_incompatible(Some(&node(kinds[2])), Some(&node(kinds[2]))));
        assert!(is_incompatible(Some(&node(kinds[2])), Some(&node(kinds[0]))));
    }

    #[test]
    fn previous_plane_is_letterboxed_against_current() {
        let mut r = renderer();
        let state = CurrentState::new()
            .current(Node::flat("b"), square())
            .previous(Node::flat("a"), wide());
        r.update(&Frame::new(1, state)).unwrap();

        let previous = &r.scene().image_planes_old()[0];
        match previous.built {
            Built::Flat {
                half_width,
                half_height,
            } => {
                assert!(half_width <= 0.5);
                assert!((half_height - half_width / 2.0).abs() < 1e-6);
            }
            other => panic!("expected flat previous plane, got {other:?}"),
        }
    }

    #[test]
    fn navigation_scenario() {
        let mut r = renderer();

        r.update(&Frame::new(1, CurrentState::new().current(Node::flat("a"), square())))
            .unwrap();
        assert_eq!(r.scene().image_planes().len(), 1);
        assert_eq!(r.scene().image_planes()[0].built, Built::Curtain);
        assert!(r.scene().image_planes_old().is_empty());
        assert!(r.disabled());

        let state = CurrentState::new()
            .current(Node::flat("b"), square())
            .previous(Node::flat("a"), wide());
        r.update(&Frame::new(2, state)).unwrap();
        assert_eq!(r.key(Generation::Current), Some(&NodeKey::new("b")));
        assert_eq!(r.key(Generation::Previous), Some(&NodeKey::new("a")));
        assert_eq!(r.scene().image_planes_old()[0].key, NodeKey::new("a"));
        assert!(matches!(
            r.scene().image_planes_old()[0].built,
            Built::Flat { .. }
        ));
        assert!(!r.disabled());

        r.update_curtain(0.5).unwrap();
        assert_eq!(r.scene().image_planes()[0].curtain, Some(0.5));
        assert!(r.needs_render());

        let mut target = RecordingTarget::default();
        r.render(&Camera::new(), &mut target).unwrap();
        assert_eq!(target.passes.len(), 2);
        assert_eq!(target.passes[0], ids(r.scene().image_planes_old()));
        assert_eq!(target.passes[1], ids(r.scene().image_planes()));
        assert!(!r.needs_render());
    }

    #[test]
    fn render_skips_previous_pass_when_disabled() {
        let mut r = renderer();
        r.update(&Frame::new(
            1,
            pair(Node::full_pano("b"), Node::flat("a")),
        ))
        .unwrap();
        assert!(r.disabled());

        let mut target = RecordingTarget::default();
        r.render(&Camera::new(), &mut target).unwrap();
        assert_eq!(target.passes, vec![ids(r.scene().image_planes())]);
        assert!(!r.needs_render());
    }

    #[test]
    fn previous_only_change_recomputes_disabled() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        assert!(!r.disabled());
        let current = ids(r.scene().image_planes());

        r.update(&Frame::new(
            2,
            pair(Node::flat("b"), Node::partial_pano("c")),
        ))
        .unwrap();
        assert!(r.disabled());
        assert_eq!(ids(r.scene().image_planes()), current);
        assert_eq!(r.key(Generation::Previous), Some(&NodeKey::new("c")));
    }

    #[test]
    fn moving_pano_previous_gets_spherical_mesh() {
        let mut r = renderer();
        r.update(&Frame::new(
            1,
            pair(Node::full_pano("b"), Node::full_pano("a")),
        ))
        .unwrap();
        assert_eq!(r.scene().image_planes_old()[0].built, Built::Mesh);

        let mut r = renderer();
        r.update(&Frame::new(
            1,
            pair(Node::full_pano("b"), Node::full_pano("a")).motionless(true),
        ))
        .unwrap();
        assert!(matches!(
            r.scene().image_planes_old()[0].built,
            Built::Flat { .. }
        ));
    }

    #[test]
    fn motionless_current_change_resizes_previous() {
        let mut r = renderer();
        r.update(&Frame::new(
            1,
            pair(Node::full_pano("b"), Node::full_pano("a")).motionless(true),
        ))
        .unwrap();
        let previous = ids(r.scene().image_planes_old());

        let state = CurrentState::new()
            .current(Node::full_pano("c"), wide())
            .previous(Node::full_pano("a"), square())
            .motionless(true);
        r.update(&Frame::new(2, state)).unwrap();
        assert_ne!(ids(r.scene().image_planes_old()), previous);
        assert_eq!(r.factory().disposed.get(), 2);
    }

    #[test]
    fn current_change_resizes_flat_previous_while_moving() {
        let mut r = renderer();
        let state = CurrentState::new()
            .current(Node::flat("b"), square())
            .previous(Node::flat("a"), wide());
        r.update(&Frame::new(1, state)).unwrap();

        let state = CurrentState::new()
            .current(Node::flat("c"), ImageTransform::new(100, 400))
            .previous(Node::flat("a"), wide());
        r.update(&Frame::new(2, state)).unwrap();

        let expected = flat_extents(2.0, 0.25).unwrap();
        match r.scene().image_planes_old()[0].built {
            Built::Flat {
                half_width,
                half_height,
            } => {
                assert!((half_width - expected.0).abs() < 1e-6);
                assert!((half_height - expected.1).abs() < 1e-6);
            }
            other => panic!("expected flat previous plane, got {other:?}"),
        }
    }

    #[test]
    fn moving_pano_previous_survives_current_change() {
        let mut r = renderer();
        r.update(&Frame::new(
            1,
            pair(Node::full_pano("b"), Node::full_pano("a")),
        ))
        .unwrap();
        let previous = ids(r.scene().image_planes_old());

        r.update(&Frame::new(
            2,
            pair(Node::full_pano("c"), Node::full_pano("a")),
        ))
        .unwrap();
        assert_eq!(ids(r.scene().image_planes_old()), previous);
        assert_eq!(r.factory().disposed.get(), 1);
    }

    #[test]
    fn nodes_leaving_the_frame_disable_the_transition() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        assert!(!r.disabled());

        r.update(&Frame::new(2, CurrentState::new())).unwrap();
        assert!(r.disabled());
        assert!(r.scene().is_empty());
        assert_eq!(r.key(Generation::Current), None);
        assert_eq!(r.key(Generation::Previous), None);
        assert_eq!(r.factory().built, 2);
        assert_eq!(r.factory().disposed.get(), 2);

        let mut target = RecordingTarget::default();
        r.render(&Camera::new(), &mut target).unwrap();
        assert_eq!(target.passes, vec![Vec::<u32>::new()]);
    }

    #[test]
    fn previous_leaving_the_frame_disables_the_transition() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        let current = ids(r.scene().image_planes());

        let state = CurrentState::new().current(Node::flat("b"), square());
        r.update(&Frame::new(2, state)).unwrap();
        assert!(r.disabled());
        assert!(r.needs_render());
        assert!(r.scene().image_planes_old().is_empty());
        assert_eq!(r.key(Generation::Previous), None);
        assert_eq!(ids(r.scene().image_planes()), current);

        let mut target = RecordingTarget::default();
        r.render(&Camera::new(), &mut target).unwrap();
        assert_eq!(target.passes, vec![current]);
    }

    #[test]
    fn shared_key_texture_goes_to_current_only() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("a"), Node::flat("a"))))
            .unwrap();

        r.update_texture(&9, &Node::flat("a")).unwrap();
        assert_eq!(r.scene().image_planes()[0].texture, Some(9));
        assert_eq!(r.scene().image_planes_old()[0].texture, None);
    }

    #[test]
    fn fresh_current_plane_receives_cached_curtain() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.update_curtain(0.3).unwrap();

        r.update(&Frame::new(2, pair(Node::flat("c"), Node::flat("b"))))
            .unwrap();
        assert_eq!(r.scene().image_planes()[0].curtain, Some(0.3));
    }

    #[test]
    fn factory_error_leaves_state_untouched() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.render(&Camera::new(), &mut RecordingTarget::default()).unwrap();
        let current = ids(r.scene().image_planes());
        let previous = ids(r.scene().image_planes_old());

        r.factory_mut().fail_for = Some(NodeKey::new("d"));
        let err = r
            .update(&Frame::new(2, pair(Node::flat("d"), Node::flat("c"))))
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidGeometry(_)));

        assert_eq!(ids(r.scene().image_planes()), current);
        assert_eq!(ids(r.scene().image_planes_old()), previous);
        assert_eq!(r.key(Generation::Current), Some(&NodeKey::new("b")));
        assert_eq!(r.key(Generation::Previous), Some(&NodeKey::new("a")));
        assert!(!r.needs_render());
        // The previous plane built for "c" was released.
        assert_eq!(r.factory().disposed.get(), 1);
    }

    #[test]
    fn missing_transform_is_invalid_geometry() {
        let mut r = renderer();
        let mut state = CurrentState::new();
        state.current_node = Some(Node::flat("a"));
        let err = r.update(&Frame::new(1, state)).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidGeometry(_)));
        assert_eq!(r.key(Generation::Current), None);
    }

    #[test]
    fn rebuild_disposes_superseded_planes() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.update(&Frame::new(2, pair(Node::flat("c"), Node::flat("b"))))
            .unwrap();
        assert_eq!(r.factory().disposed.get(), 2);
    }

    #[test]
    fn every_call_after_dispose_fails() {
        let mut r = renderer();
        r.update(&Frame::new(1, pair(Node::flat("b"), Node::flat("a"))))
            .unwrap();
        r.dispose().unwrap();
        assert!(r.is_disposed());
        assert!(r.scene().is_empty());
        assert_eq!(r.factory().disposed.get(), 2);

        let frame = Frame::new(2, pair(Node::flat("c"), Node::flat("b")));
        assert!(matches!(r.update(&frame), Err(TransitionError::Disposed)));
        assert!(matches!(r.update_curtain(0.2), Err(TransitionError::Disposed)));
        assert!(matches!(
            r.update_texture(&1, &Node::flat("b")),
            Err(TransitionError::Disposed)
        ));
        assert!(matches!(
            r.render(&Camera::new(), &mut RecordingTarget::default()),
            Err(TransitionError::Disposed)
        ));
        assert!(matches!(r.dispose(), Err(TransitionError::Disposed)));
        assert_eq!(r.factory().built, 2);
    }
}
