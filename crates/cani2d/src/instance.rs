//! Animation playback on a shared mesh
//!
//! An [`AnimationInstance`] owns everything that changes per frame: the pose
//! tree, the deformed vertex buffer and the transport state. The mesh it
//! draws is shared through an [`Arc`], so any number of instances can play
//! different clips of the same model.
//!
//! Each frame runs the same pipeline: sample the clip's curves into the
//! poses, rebuild the pose matrices top-down, then skin the rest vertices.
//! Drawing only reads the result.

use std::fmt;
use std::sync::Arc;

use crate::animation::{AnimationClip, PlaybackState};
use crate::math::Vec2;
use crate::mesh::Mesh;
use crate::skeleton::{PoseObserver, PoseTree};
use crate::skinning::skin_vertices;
use crate::surface::DrawingSurface;

/// Playback state and deformed geometry for one animated copy of a mesh
pub struct AnimationInstance {
    mesh: Arc<Mesh>,
    poses: PoseTree,
    vertices: Vec<Vec2>,
    state: PlaybackState,
    observer: Option<Box<dyn PoseObserver + Send>>,
}

impl fmt::Debug for AnimationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationInstance")
            .field("state", &self.state)
            .field("bones", &self.poses.len())
            .field("vertices", &self.vertices.len())
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl AnimationInstance {
    /// Create a stopped instance showing the rest pose
    pub fn new(mesh: Arc<Mesh>) -> Self {
        let mut poses = PoseTree::new(mesh.skeleton());
        poses.rebuild(mesh.skeleton());
        let vertices = mesh.vertices().to_vec();

        Self {
            mesh,
            poses,
            vertices,
            state: PlaybackState::none(),
            observer: None,
        }
    }

    /// Get the shared mesh
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Select a clip by name without changing frame or transport
    ///
    /// An unknown name clears the selection, so the rest pose is drawn, and
    /// returns false.
    pub fn select_animation(&mut self, name: &str) -> bool {
        match self.mesh.find_animation(name) {
            Some(index) => {
                self.state.animation_index = Some(index);
                self.update_pose();
                true
            }
            None => {
                log::debug!("No animation named '{name}', showing rest pose");
                self.state.animation_index = None;
                self.update_pose();
                false
            }
        }
    }

    /// Select a clip, rewind it and start playing
    pub fn play_animation(&mut self, name: &str) -> bool {
        if !self.select_animation(name) {
            return false;
        }
        self.set_frame(0.0);
        self.play();
        true
    }

    /// Start advancing time
    pub fn play(&mut self) {
        self.state.playing = true;
    }

    /// Stop advancing time, keeping the current frame
    pub fn pause(&mut self) {
        self.state.playing = false;
    }

    /// Jump to a frame and bring the deformed geometry up to date
    pub fn set_frame(&mut self, frame: f32) {
        self.state.frame = frame;
        self.update_pose();
    }

    /// Advance playback by `delta_ms` milliseconds
    ///
    /// Returns whether playback is still running. A paused instance or one
    /// without a clip does not change. A negative delta plays backwards. A
    /// non-looping clip stops at its first or last frame, which is still
    /// applied, and returns false.
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        let Some(length) = self.clip().map(|clip| clip.length) else {
            return false;
        };
        if !self.state.playing {
            return false;
        }

        let running = self.state.step(delta_ms, length);
        self.update_pose();
        running
    }

    /// Draw the mesh in its current pose
    ///
    /// Returns the number of triangles drawn.
    pub fn draw(&self, surface: &mut dyn DrawingSurface) -> usize {
        if self.state.is_active() {
            self.mesh.draw(surface, &self.vertices)
        } else {
            self.mesh.draw_rest(surface)
        }
    }

    /// Set the playback rate in frames per second
    pub fn set_fps(&mut self, fps: f32) {
        self.state.fps = fps;
    }

    /// Choose between wrapping and stopping at the end of the clip
    pub fn set_looping(&mut self, looping: bool) {
        self.state.looping = looping;
    }

    /// Report every pose rebuild to `observer`
    pub fn set_pose_observer(&mut self, observer: Box<dyn PoseObserver + Send>) {
        self.observer = Some(observer);
    }

    /// Stop reporting pose rebuilds
    pub fn clear_pose_observer(&mut self) {
        self.observer = None;
    }

    /// Get the selected clip
    pub fn clip(&self) -> Option<&AnimationClip> {
        self.state
            .animation_index
            .and_then(|index| self.mesh.animations().get(index))
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Get the current frame
    pub fn frame(&self) -> f32 {
        self.state.frame
    }

    /// Get the current position in seconds
    pub fn time(&self) -> f32 {
        self.state.time()
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn poses(&self) -> &PoseTree {
        &self.poses
    }

    /// Get vertex positions for the current frame
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    fn update_pose(&mut self) {
        let mesh = Arc::clone(&self.mesh);
        let skeleton = mesh.skeleton();

        self.poses.reset();
        if let Some(clip) = self.clip_index().and_then(|index| mesh.animations().get(index)) {
            clip.apply(self.state.frame, &mut self.poses);
        }

        match self.observer.as_deref_mut() {
            Some(observer) => self.poses.rebuild_with(skeleton, observer),
            None => self.poses.rebuild(skeleton),
        }

        skin_vertices(
            mesh.vertices(),
            &self.poses,
            skeleton,
            mesh.weights(),
            &mut self.vertices,
        );
    }

    fn clip_index(&self) -> Option<usize> {
        self.state.animation_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneCurve, Curve, CurveTarget, Keyframe, QuatAxis};
    use crate::mesh::{FaceDef, Geometry, MeshOptions};
    use crate::skeleton::{BoneDef, Pose};
    use crate::skinning::VertexInfluence;
    use crate::surface::tests::RecordingSurface;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// Rotation of 180 degrees about z reached at frame 10
    fn spin_clip(length: f32) -> AnimationClip {
        let curves = vec![
            BoneCurve {
                bone: 0,
                curve: Curve::new(
                    CurveTarget::Rotation(QuatAxis::W),
                    vec![Keyframe::linear(0.0, 1.0), Keyframe::linear(10.0, 0.0)],
                ),
            },
            BoneCurve {
                bone: 0,
                curve: Curve::new(
                    CurveTarget::Rotation(QuatAxis::Z),
                    vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(10.0, 1.0)],
                ),
            },
        ];
        AnimationClip::new("spin", length, curves)
    }

    fn mesh() -> Arc<Mesh> {
        let geometry = Geometry {
            exporter_version: None,
            vertices: vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            uv: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
            faces: vec![FaceDef::new(0.0, vec![0, 1, 2])],
            influences: vec![VertexInfluence::single(0); 3],
            bones: vec![BoneDef::root("root", Vec2::ZERO)],
            animations: vec![spin_clip(48.0)],
        };
        Arc::new(Mesh::new(geometry, &RgbaImage::new(4, 4), &MeshOptions::default()).unwrap())
    }

    #[test]
    fn test_new_instance_is_at_rest() {
        let instance = AnimationInstance::new(mesh());
        assert!(!instance.is_playing());
        assert!(instance.clip().is_none());
        assert_eq!(instance.vertices(), instance.mesh().vertices());
    }

    #[test]
    fn test_set_frame_deforms_vertices() {
        let mut instance = AnimationInstance::new(mesh());
        assert!(instance.select_animation("spin"));
        instance.set_frame(10.0);

        assert!(instance.vertices()[1].abs_diff_eq(Vec2::new(-4.0, 0.0), 1e-4));
        assert!(instance.vertices()[2].abs_diff_eq(Vec2::new(0.0, -4.0), 1e-4));
    }

    #[test]
    fn test_unknown_animation_clears_selection() {
        let mut instance = AnimationInstance::new(mesh());
        instance.play_animation("spin");
        instance.set_frame(10.0);

        assert!(!instance.select_animation("walk"));
        assert!(instance.clip().is_none());
        assert_eq!(instance.vertices(), instance.mesh().vertices());
        assert!(!instance.advance(16.0));
    }

    #[test]
    fn test_play_animation_rewinds_and_plays() {
        let mut instance = AnimationInstance::new(mesh());
        instance.set_frame(7.0);
        assert!(instance.play_animation("spin"));
        assert!(instance.is_playing());
        assert_eq!(instance.frame(), 0.0);
    }

    #[test]
    fn test_advance_paused_is_noop() {
        let mut instance = AnimationInstance::new(mesh());
        instance.select_animation("spin");
        assert!(!instance.advance(1000.0));
        assert_eq!(instance.frame(), 0.0);
    }

    #[test]
    fn test_non_looping_stops_on_last_frame() {
        let mut instance = AnimationInstance::new(mesh());
        instance.set_looping(false);
        instance.play_animation("spin");

        assert!(instance.advance(1000.0));
        assert!(!instance.advance(1000.0));
        assert!(!instance.is_playing());
        assert_eq!(instance.frame(), 48.0);
        // Past the last key the rotation holds at 180 degrees
        assert!(instance.vertices()[1].abs_diff_eq(Vec2::new(-4.0, 0.0), 1e-4));
    }

    #[test]
    fn test_draw_uses_rest_without_clip() {
        let instance = AnimationInstance::new(mesh());
        let mut surface = RecordingSurface::default();
        assert_eq!(instance.draw(&mut surface), 1);
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<usize>>>);

    impl PoseObserver for Collect {
        fn pose_built(&mut self, bone: usize, _pose: &Pose) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(bone);
            }
        }
    }

    #[test]
    fn test_pose_observer_sees_rebuilds() {
        let seen = Collect::default();
        let mut instance = AnimationInstance::new(mesh());
        instance.set_pose_observer(Box::new(seen.clone()));
        instance.set_frame(1.0);
        instance.clear_pose_observer();
        instance.set_frame(2.0);

        assert_eq!(*seen.0.lock().unwrap(), vec![0]);
    }
}
