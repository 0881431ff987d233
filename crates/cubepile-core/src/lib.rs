//! Cubepile Core Library
//!
//! Screen-anchored physics visualization of resource counters: 2D container
//! rectangles are projected into a 3D world tracked by a virtual camera, a
//! `Rapier3D` simulation keeps cube piles confined by invisible walls derived
//! from those rectangles, and a reconciler matches the live cube population
//! of every container to its resource value.
//!
//! The crate is headless: the host supplies layout geometry through
//! [`LayoutProvider`] and receives frames through [`FramePresenter`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod cubes;
pub mod layout;
pub mod physics;
pub mod scene;
pub mod viz;
pub mod walls;

pub use camera::{CameraState, Viewport};
pub use cubes::{CubeEntity, CubeSet, MAX_LANE_CUBES, ResourceKey, Tier, TierCounts};
pub use layout::{FixedLayout, LayoutProvider, LayoutRect};
pub use physics::{PHYSICS_DT, PhysicsWorld, default_gravity};
pub use scene::{Color, CubeVisual, DirectionalLight, Scene, VisualHandle};
pub use viz::{BoardViz, FramePresenter, ResourceSnapshot, VizError};
pub use walls::{ColliderWall, ContainerWalls, WALL_MARGIN_PX, WALL_SIZE, WallSide};
