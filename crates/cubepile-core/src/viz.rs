//! The visualization owner: scene lifecycle and the step/sync/present loop.
//!
//! [`BoardViz`] is the single owner of the camera, physics world, render
//! scene, and cube registry. The host drives it through four lifecycle
//! hooks plus [`run_frame`](BoardViz::run_frame); everything runs on one
//! control thread, so there is no interior locking anywhere in the core.

use std::collections::BTreeMap;

use rapier3d::na::Point3;
use thiserror::Error;

use crate::camera::CameraState;
use crate::cubes::{CubeSet, ResourceKey};
use crate::layout::LayoutProvider;
use crate::physics::PhysicsWorld;
use crate::scene::{DirectionalLight, Scene};
use crate::walls::{self, ContainerWalls};

/// Current integer value per resource key. Read-only input supplied by the
/// counter store on every value change; ordered so reconciliation walks
/// containers deterministically. Values are unsigned by construction —
/// the negative-value case is unrepresentable rather than clamped.
pub type ResourceSnapshot = BTreeMap<ResourceKey, u32>;

/// Injectable present boundary: called once per frame with the scene to
/// draw. Tests record; a real host rasterizes.
pub trait FramePresenter {
    fn present(&mut self, scene: &Scene, camera: &CameraState);
}

/// Errors from the fallible lifecycle edges. Per-frame failures never
/// surface here; they degrade and log.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("container {0} has no layout rectangle")]
    MissingContainer(ResourceKey),
    #[error("visualization is already initialized")]
    AlreadyInitialized,
}

/// Key light intensity and the per-container fill light parameters.
const KEY_LIGHT_INTENSITY: f32 = 10.0;
const CONTAINER_LIGHT_INTENSITY: f32 = 0.05;
const CONTAINER_LIGHT_HEIGHT: f32 = 10.0;

/// The screen-anchored physics visualization of one resource board.
pub struct BoardViz<L: LayoutProvider> {
    layout: L,
    camera: CameraState,
    world: PhysicsWorld,
    scene: Scene,
    cubes: CubeSet,
    walls: Vec<ContainerWalls>,
    containers: Vec<ResourceKey>,
    initialized: bool,
    disposed: bool,
}

impl<L: LayoutProvider> BoardViz<L> {
    /// Creates an empty visualization over the given layout capability.
    pub fn new(layout: L, seed: u64) -> Self {
        let camera = CameraState::new(layout.viewport());
        Self {
            layout,
            camera,
            world: PhysicsWorld::new(),
            scene: Scene::new(),
            cubes: CubeSet::new(seed),
            walls: Vec::new(),
            containers: Vec::new(),
            initialized: false,
            disposed: false,
        }
    }

    /// One-time world setup: ground plane, key lights, then per container
    /// its four boundary walls and a fill light anchored above its center.
    pub fn initialize(&mut self, containers: &[ResourceKey]) -> Result<(), VizError> {
        if self.initialized {
            return Err(VizError::AlreadyInitialized);
        }
        self.initialized = true;

        walls::add_ground_plane(&mut self.world);
        for x in [10.0, -10.0] {
            self.scene.add_light(DirectionalLight {
                position: Point3::new(x, 10.0, 0.0),
                intensity: KEY_LIGHT_INTENSITY,
            });
        }

        for key in containers {
            let rect = self
                .layout
                .rect_of(key)
                .ok_or_else(|| VizError::MissingContainer(key.clone()))?;

            self.walls
                .push(walls::build_walls(&mut self.world, &self.camera, key, &rect));

            let (cx, cy) = rect.center();
            if let Some(anchor) = self.camera.layout_to_world(cx, cy) {
                self.scene.add_light(DirectionalLight {
                    position: Point3::new(anchor.x, anchor.y, CONTAINER_LIGHT_HEIGHT),
                    intensity: CONTAINER_LIGHT_INTENSITY,
                });
            } else {
                tracing::warn!("[viz] degenerate projection for {key}, no fill light");
            }

            self.containers.push(key.clone());
        }

        tracing::info!("[viz] initialized {} containers", self.containers.len());
        Ok(())
    }

    /// Reconciles every container's cube population against a snapshot.
    ///
    /// Keys absent from the snapshot reconcile to zero. Containers whose
    /// rectangle the layout no longer reports are skipped.
    pub fn on_resources_changed(&mut self, snapshot: &ResourceSnapshot) {
        if self.disposed {
            tracing::warn!("[viz] on_resources_changed after dispose, ignoring");
            return;
        }

        for key in &self.containers {
            let value = snapshot.get(key).copied().unwrap_or(0);
            let Some(rect) = self.layout.rect_of(key) else {
                tracing::warn!("[viz] no rectangle for {key}, skipping reconcile");
                continue;
            };
            self.cubes.reconcile(
                &mut self.world,
                &mut self.scene,
                &self.camera,
                key,
                value,
                &rect,
            );
        }
    }

    /// Recomputes the camera projection for the current viewport and moves
    /// every container's walls to its current rectangle.
    pub fn on_resize(&mut self) {
        if self.disposed {
            tracing::warn!("[viz] on_resize after dispose, ignoring");
            return;
        }

        let viewport = self.layout.viewport();
        self.camera.set_viewport(viewport);

        for container in &self.walls {
            let Some(rect) = self.layout.rect_of(&container.key) else {
                tracing::warn!("[viz] no rectangle for {}, walls keep pose", container.key);
                continue;
            };
            walls::update_walls(&mut self.world, &self.camera, container, &rect);
        }

        tracing::info!("[viz] resized to {}x{}", viewport.width, viewport.height);
    }

    /// One display frame: advance the simulation one fixed step, copy body
    /// transforms onto the visuals, and present.
    ///
    /// Safe with an empty or partially torn-down entity set; the sync pass
    /// only touches currently registered pairs.
    pub fn run_frame(&mut self, presenter: &mut dyn FramePresenter) {
        if self.disposed {
            return;
        }

        self.world.step();
        self.cubes.sync_transforms(&self.world, &mut self.scene);
        presenter.present(&self.scene, &self.camera);
    }

    /// Drives frames until the scheduler declines or the view is disposed.
    ///
    /// `next_frame` is the host's frame-presentation primitive: return
    /// `true` when the next frame is due, `false` to stop the loop.
    pub fn run(
        &mut self,
        presenter: &mut dyn FramePresenter,
        mut next_frame: impl FnMut() -> bool,
    ) {
        while !self.disposed && next_frame() {
            self.run_frame(presenter);
        }
    }

    /// Tears the view down: destroys every cube pair and turns all further
    /// hooks and frames into no-ops. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cubes.clear(&mut self.world, &mut self.scene);
        self.disposed = true;
        tracing::info!("[viz] disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn cubes(&self) -> &CubeSet {
        &self.cubes
    }

    /// The layout capability, for hosts that own it through the viz.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::cubes::Tier;
    use crate::layout::{FixedLayout, LayoutRect};

    /// Presenter that records what each frame would have drawn.
    #[derive(Default)]
    struct RecordingPresenter {
        frames: Vec<usize>,
    }

    impl FramePresenter for RecordingPresenter {
        fn present(&mut self, scene: &Scene, _camera: &CameraState) {
            self.frames.push(scene.visual_count());
        }
    }

    fn two_container_viz() -> (BoardViz<FixedLayout>, ResourceKey, ResourceKey) {
        let steel = ResourceKey::new("steel");
        let heat = ResourceKey::new("heat");

        let mut layout = FixedLayout::new(Viewport::new(800.0, 600.0));
        layout.set_rect(steel.clone(), LayoutRect::from_size(50.0, 50.0, 200.0, 150.0));
        layout.set_rect(heat.clone(), LayoutRect::from_size(450.0, 50.0, 200.0, 150.0));

        let mut viz = BoardViz::new(layout, 42);
        viz.initialize(&[steel.clone(), heat.clone()]).unwrap();
        (viz, steel, heat)
    }

    fn snapshot(entries: &[(&ResourceKey, u32)]) -> ResourceSnapshot {
        entries
            .iter()
            .map(|(key, value)| ((*key).clone(), *value))
            .collect()
    }

    fn counts(viz: &BoardViz<FixedLayout>, key: &ResourceKey) -> (usize, usize, usize) {
        (
            viz.cubes().count(key, Tier::Low),
            viz.cubes().count(key, Tier::Mid),
            viz.cubes().count(key, Tier::High),
        )
    }

    #[test]
    fn test_initialize_builds_world_and_lights() {
        let (viz, _, _) = two_container_viz();

        // 1 ground + 4 walls per container.
        assert_eq!(viz.world().body_count(), 9);
        // 2 key lights + 1 fill light per container.
        assert_eq!(viz.scene().lights().len(), 4);
        assert_eq!(viz.scene().visual_count(), 0);
    }

    #[test]
    fn test_initialize_requires_layout_rect() {
        let layout = FixedLayout::new(Viewport::new(800.0, 600.0));
        let mut viz = BoardViz::new(layout, 1);

        let err = viz.initialize(&[ResourceKey::new("steel")]).unwrap_err();
        assert!(matches!(err, VizError::MissingContainer(_)));
    }

    #[test]
    fn test_initialize_twice_errors() {
        let (mut viz, steel, _) = two_container_viz();

        let err = viz.initialize(&[steel]).unwrap_err();
        assert!(matches!(err, VizError::AlreadyInitialized));
    }

    #[test]
    fn test_resources_changed_populates_cubes() {
        let (mut viz, steel, heat) = two_container_viz();

        viz.on_resources_changed(&snapshot(&[(&steel, 7), (&heat, 12)]));

        assert_eq!(counts(&viz, &steel), (2, 1, 0));
        assert_eq!(counts(&viz, &heat), (2, 0, 1));
        // 9 static bodies + 6 cubes.
        assert_eq!(viz.world().body_count(), 15);
    }

    #[test]
    fn test_value_transitions_converge() {
        let (mut viz, steel, _) = two_container_viz();

        for (value, expected) in [(0, (0, 0, 0)), (7, (2, 1, 0)), (12, (2, 0, 1)), (3, (3, 0, 0))] {
            viz.on_resources_changed(&snapshot(&[(&steel, value)]));
            assert_eq!(counts(&viz, &steel), expected, "at value {value}");
        }
    }

    #[test]
    fn test_missing_snapshot_key_reconciles_to_zero() {
        let (mut viz, steel, heat) = two_container_viz();

        viz.on_resources_changed(&snapshot(&[(&steel, 6), (&heat, 4)]));
        viz.on_resources_changed(&snapshot(&[(&steel, 6)]));

        assert_eq!(counts(&viz, &heat), (0, 0, 0));
        assert_eq!(counts(&viz, &steel), (1, 1, 0));
    }

    #[test]
    fn test_run_frame_syncs_visuals_to_bodies() {
        let (mut viz, steel, _) = two_container_viz();
        viz.on_resources_changed(&snapshot(&[(&steel, 4)]));

        let mut presenter = RecordingPresenter::default();
        viz.run_frame(&mut presenter);
        viz.run_frame(&mut presenter);

        assert_eq!(viz.world().current_frame(), 2);
        assert_eq!(presenter.frames, vec![4, 4]);

        for entity in viz.cubes().iter() {
            let body = viz.world().get_rigid_body(entity.body).unwrap();
            let visual = viz.scene().get(entity.visual).unwrap();
            assert_eq!(visual.position, Point3::from(body.translation()));
            assert_eq!(visual.rotation, (*body.rotation()).into());
        }
    }

    #[test]
    fn test_run_frame_tolerates_empty_scene() {
        let (mut viz, _, _) = two_container_viz();

        let mut presenter = RecordingPresenter::default();
        viz.run_frame(&mut presenter);

        assert_eq!(presenter.frames, vec![0]);
    }

    #[test]
    fn test_run_drives_frames_until_scheduler_stops() {
        let (mut viz, _, _) = two_container_viz();

        let mut presenter = RecordingPresenter::default();
        let mut remaining = 3;
        viz.run(&mut presenter, || {
            remaining -= 1;
            remaining >= 0
        });

        assert_eq!(presenter.frames.len(), 3);
        assert_eq!(viz.world().current_frame(), 3);
    }

    #[test]
    fn test_resize_repositions_walls_without_leaks() {
        let (mut viz, steel, heat) = two_container_viz();
        let bodies_before = viz.world().body_count();
        let positions_before: Vec<_> = viz
            .world()
            .rigid_body_set
            .iter()
            .map(|(_, body)| body.translation())
            .collect();

        viz.layout_mut().set_viewport(Viewport::new(1200.0, 900.0));
        viz.layout_mut()
            .set_rect(steel.clone(), LayoutRect::from_size(80.0, 60.0, 300.0, 200.0));
        viz.layout_mut()
            .set_rect(heat.clone(), LayoutRect::from_size(700.0, 60.0, 300.0, 200.0));
        viz.on_resize();

        assert_eq!(viz.world().body_count(), bodies_before);
        assert_eq!(viz.camera().viewport().width, 1200.0);

        let positions_after: Vec<_> = viz
            .world()
            .rigid_body_set
            .iter()
            .map(|(_, body)| body.translation())
            .collect();
        assert_ne!(positions_before, positions_after);
    }

    #[test]
    fn test_dispose_clears_cubes_and_silences_hooks() {
        let (mut viz, steel, _) = two_container_viz();
        viz.on_resources_changed(&snapshot(&[(&steel, 9)]));
        assert_eq!(viz.cubes().total(), 5);

        viz.dispose();
        assert!(viz.is_disposed());
        assert_eq!(viz.cubes().total(), 0);
        assert_eq!(viz.scene().visual_count(), 0);

        // Late callbacks must not touch the torn-down world.
        let frame = viz.world().current_frame();
        viz.on_resources_changed(&snapshot(&[(&steel, 9)]));
        viz.on_resize();
        let mut presenter = RecordingPresenter::default();
        viz.run_frame(&mut presenter);
        viz.run(&mut presenter, || true);

        assert_eq!(viz.cubes().total(), 0);
        assert_eq!(viz.world().current_frame(), frame);
        assert!(presenter.frames.is_empty());

        // Dispose is idempotent.
        viz.dispose();
    }
}
