//! Virtual camera and layout-space ↔ world-space projection.
//!
//! Layout space is the 2D pixel frame of the container rectangles (Y grows
//! downward); world space is the 3D frame the physics and visuals live in
//! (the board plane is `z = 0`, the camera sits on `+z`). The projector casts
//! a ray from the camera through a layout point and intersects it with the
//! board plane.

use rapier3d::na::{Isometry3, Perspective3, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f32 = 50.0;

/// Near clip plane distance.
pub const CAMERA_NEAR: f32 = 0.1;

/// Far clip plane distance.
pub const CAMERA_FAR: f32 = 1000.0;

/// Default camera eye position, looking at the origin.
pub const CAMERA_EYE_Z: f32 = 10.0;

/// NDC depth of the point used to build the picking ray. Any depth in front
/// of the camera works; the ray direction is what matters.
const UNPROJECT_DEPTH: f32 = 0.5;

/// Rays closer to parallel with the board plane than this have no usable
/// intersection.
const MIN_RAY_Z: f32 = 1e-6;

/// Viewport dimensions in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Perspective camera state for the board view.
///
/// Owned by the visualization; mutated only on resize.
#[derive(Debug, Clone)]
pub struct CameraState {
    eye: Point3<f32>,
    viewport: Viewport,
    view: Isometry3<f32>,
    projection: Perspective3<f32>,
}

impl CameraState {
    /// Creates the default board camera at `(0, 0, 10)` looking at the origin.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_eye(Point3::new(0.0, 0.0, CAMERA_EYE_Z), viewport)
    }

    /// Creates a camera at an arbitrary eye position, looking at the origin
    /// with `+y` up.
    pub fn with_eye(eye: Point3<f32>, viewport: Viewport) -> Self {
        let view = Isometry3::look_at_rh(&eye, &Point3::origin(), &Vector3::y());
        let projection = Perspective3::new(
            viewport.aspect(),
            CAMERA_FOV_DEG.to_radians(),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        Self {
            eye,
            viewport,
            view,
            projection,
        }
    }

    /// The camera eye position in world space.
    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    /// Current viewport dimensions.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Recomputes the aspect ratio and projection matrix for a new viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.projection.set_aspect(viewport.aspect());
    }

    /// Projects a layout-space pixel position onto the board plane `z = 0`.
    ///
    /// Returns `None` when the ray through the point runs (near) parallel to
    /// the plane; callers skip the dependent placement instead of failing.
    pub fn layout_to_world(&self, x: f32, y: f32) -> Option<Point3<f32>> {
        // Normalized device coordinates; layout Y grows downward, NDC Y upward.
        let ndc_x = x / self.viewport.width * 2.0 - 1.0;
        let ndc_y = -(y / self.viewport.height) * 2.0 + 1.0;

        let view_point = self
            .projection
            .unproject_point(&Point3::new(ndc_x, ndc_y, UNPROJECT_DEPTH));
        let world_point = self.view.inverse_transform_point(&view_point);

        let direction = Unit::try_new(world_point - self.eye, MIN_RAY_Z)?;
        if direction.z.abs() < MIN_RAY_Z {
            return None;
        }

        let t = -self.eye.z / direction.z;
        Some(self.eye + direction.into_inner() * t)
    }

    /// Maps a world-space point back to layout pixels.
    ///
    /// Inverse of [`layout_to_world`](Self::layout_to_world) for points on
    /// the board plane; used to re-derive on-screen footprints.
    pub fn world_to_layout(&self, point: &Point3<f32>) -> (f32, f32) {
        let ndc = self.projection.project_point(&self.view.transform_point(point));
        let x = (ndc.x + 1.0) / 2.0 * self.viewport.width;
        let y = (1.0 - ndc.y) / 2.0 * self.viewport.height;
        (x, y)
    }
}
