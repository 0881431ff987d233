//! Invisible boundary bodies confining cubes to their container footprints.
//!
//! Each container gets four static walls derived from its layout rectangle,
//! plus the world has one shared ground plane. Walls are created once and
//! repositioned in place on resize; their physics registrations never churn.

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::camera::CameraState;
use crate::cubes::ResourceKey;
use crate::layout::LayoutRect;
use crate::physics::PhysicsWorld;

/// Wall plate edge length in world units.
pub const WALL_SIZE: f32 = 3.0;

/// Wall plate half-thickness.
const WALL_HALF_THICKNESS: f32 = 0.005;

/// Outward offset of each wall from its container edge, in layout pixels.
pub const WALL_MARGIN_PX: f32 = 10.0;

/// Ground plane half-extents.
const GROUND_HALF_SIZE: f32 = 50.0;
const GROUND_HALF_THICKNESS: f32 = 0.1;

/// Which container edge a wall guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    Top,
    Left,
    Right,
    Bottom,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [
        WallSide::Top,
        WallSide::Left,
        WallSide::Right,
        WallSide::Bottom,
    ];

    /// Layout-space anchor of this wall: the edge midpoint pushed outward
    /// by the margin.
    fn anchor(self, rect: &LayoutRect) -> (f32, f32) {
        let (cx, cy) = rect.center();
        match self {
            WallSide::Top => (cx, rect.top - WALL_MARGIN_PX),
            WallSide::Bottom => (cx, rect.bottom + WALL_MARGIN_PX),
            WallSide::Left => (rect.left - WALL_MARGIN_PX, cy),
            WallSide::Right => (rect.right + WALL_MARGIN_PX, cy),
        }
    }

    /// Rotation standing the wall plate up with its normal facing inward:
    /// 90° about world X for horizontal edges, 90° about world Y for
    /// vertical edges.
    fn rotation(self) -> UnitQuaternion<f32> {
        match self {
            WallSide::Top | WallSide::Bottom => {
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2)
            }
            WallSide::Left | WallSide::Right => {
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2)
            }
        }
    }
}

/// One static boundary body.
#[derive(Debug, Clone, Copy)]
pub struct ColliderWall {
    pub side: WallSide,
    pub body: RigidBodyHandle,
}

/// The four walls of one container.
#[derive(Debug, Clone)]
pub struct ContainerWalls {
    pub key: ResourceKey,
    pub walls: [ColliderWall; 4],
}

/// World-space pose for a wall, or `None` when the container's anchor has no
/// plane intersection under the current camera.
fn wall_pose(camera: &CameraState, rect: &LayoutRect, side: WallSide) -> Option<Isometry3<f32>> {
    let (x, y) = side.anchor(rect);
    let point = camera.layout_to_world(x, y)?;
    Some(Isometry3::from_parts(
        Translation3::new(point.x, point.y, WALL_SIZE / 2.0),
        side.rotation(),
    ))
}

/// Creates the four boundary bodies for a container.
pub fn build_walls(
    world: &mut PhysicsWorld,
    camera: &CameraState,
    key: &ResourceKey,
    rect: &LayoutRect,
) -> ContainerWalls {
    let walls = WallSide::ALL.map(|side| {
        let mut builder = RigidBodyBuilder::fixed();
        if let Some(pose) = wall_pose(camera, rect, side) {
            builder = builder.position(pose.into());
        } else {
            tracing::warn!("[walls] degenerate projection for {key} {side:?} wall");
        }
        let body = world.add_rigid_body(builder.build());
        world.add_collider(
            ColliderBuilder::cuboid(WALL_SIZE / 2.0, WALL_SIZE / 2.0, WALL_HALF_THICKNESS)
                .build(),
            body,
        );
        ColliderWall { side, body }
    });

    ContainerWalls {
        key: key.clone(),
        walls,
    }
}

/// Moves a container's walls to match its current rectangle.
///
/// Mutates body transforms in place; callable on every resize without
/// changing the set of registered bodies. A wall whose anchor no longer
/// projects keeps its previous pose.
pub fn update_walls(
    world: &mut PhysicsWorld,
    camera: &CameraState,
    walls: &ContainerWalls,
    rect: &LayoutRect,
) {
    for wall in &walls.walls {
        let Some(pose) = wall_pose(camera, rect, wall.side) else {
            tracing::warn!(
                "[walls] degenerate projection for {} {:?} wall, keeping pose",
                walls.key,
                wall.side
            );
            continue;
        };
        if let Some(body) = world.get_rigid_body_mut(wall.body) {
            body.set_position(pose.into(), false);
        }
    }
}

/// Adds the shared static ground plane at the origin.
pub fn add_ground_plane(world: &mut PhysicsWorld) -> RigidBodyHandle {
    let body = world.add_rigid_body(RigidBodyBuilder::fixed().build());
    world.add_collider(
        ColliderBuilder::cuboid(GROUND_HALF_SIZE, GROUND_HALF_SIZE, GROUND_HALF_THICKNESS)
            .build(),
        body,
    );
    body
}
