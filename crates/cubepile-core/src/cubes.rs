//! Cube entities and the population reconciler.
//!
//! A resource value decomposes into three cube tiers; the reconciler keeps
//! the live cube population of every `(resource, tier)` lane equal to that
//! decomposition, spawning and despawning visual+physics pairs as values
//! change. Spawn randomness is deterministic per seed.

use std::collections::HashMap;
use std::fmt;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rapier3d::na::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::layout::LayoutRect;
use crate::physics::PhysicsWorld;
use crate::scene::{Color, CubeVisual, Scene, VisualHandle};

/// Identifier of a resource counter (one container per resource).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Cube tier: units, fives, and tens of a resource value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Mid, Tier::High];

    /// Cube edge length in world units.
    pub fn size(self) -> f32 {
        match self {
            Tier::Low => 0.2,
            Tier::Mid => 0.25,
            Tier::High => 0.3,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Tier::Low => Color::BRONZE,
            Tier::Mid => Color::SILVER,
            Tier::High => Color::GOLD,
        }
    }

    fn lane(self) -> usize {
        match self {
            Tier::Low => 0,
            Tier::Mid => 1,
            Tier::High => 2,
        }
    }
}

/// Desired cube counts per tier for one resource value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub low: u32,
    pub mid: u32,
    pub high: u32,
}

impl TierCounts {
    /// Mixed-radix decomposition of a resource value.
    ///
    /// Ten high-tier units are never collapsed further; the high tier grows
    /// without bound as the value does.
    pub fn decompose(value: u32) -> Self {
        Self {
            low: value % 5,
            mid: (value % 10) / 5,
            high: value / 10,
        }
    }

    pub fn get(self, tier: Tier) -> u32 {
        match tier {
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
        }
    }
}

/// One live cube: a visual and a physics body created and destroyed together.
///
/// The pairing is the core invariant — a cube never exists with only one
/// half alive.
#[derive(Debug, Clone)]
pub struct CubeEntity {
    pub key: ResourceKey,
    pub tier: Tier,
    pub visual: VisualHandle,
    pub body: RigidBodyHandle,
}

/// Cube mass in world units (uniform across tiers).
pub const CUBE_MASS: f32 = 5.0;

/// Horizontal spawn jitter so simultaneous spawns do not overlap.
const SPAWN_JITTER_X: f32 = 1.0;
/// Vertical (layout-axis) spawn jitter.
const SPAWN_JITTER_Y: f32 = 0.5;
/// Spawn height above the resting plane.
const SPAWN_LIFT: f32 = 0.5;

/// Planar impulse magnitude range for the tumbling drop.
const IMPULSE_MIN: f32 = 5.0;
const IMPULSE_MAX: f32 = 9.0;

/// Upper bound on live cubes per `(resource, tier)` lane. Values large
/// enough to exceed this clamp rather than flooding the simulation.
pub const MAX_LANE_CUBES: usize = 256;

/// Live cube registry and reconciler.
///
/// Lanes are LIFO: shrinking a lane destroys the most recently created
/// cubes first.
#[derive(Debug)]
pub struct CubeSet {
    lanes: HashMap<ResourceKey, [Vec<CubeEntity>; 3]>,
    rng: ChaCha8Rng,
}

impl CubeSet {
    /// Creates a cube registry with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        Self {
            lanes: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Reconciles the live cube population for one resource against `value`.
    ///
    /// Creates or destroys cubes until every tier lane matches the value's
    /// decomposition. Idempotent: a second call with the same value changes
    /// nothing. A degenerate container projection skips the spawns it would
    /// have placed (never a panic).
    pub fn reconcile(
        &mut self,
        world: &mut PhysicsWorld,
        scene: &mut Scene,
        camera: &CameraState,
        key: &ResourceKey,
        value: u32,
        container: &LayoutRect,
    ) {
        let counts = TierCounts::decompose(value);
        let lanes = self.lanes.entry(key.clone()).or_default();

        for tier in Tier::ALL {
            let mut desired = counts.get(tier) as usize;
            if desired > MAX_LANE_CUBES {
                tracing::warn!(
                    "[cubes] {key}/{tier:?} target {desired} clamped to {MAX_LANE_CUBES}"
                );
                desired = MAX_LANE_CUBES;
            }

            let lane = &mut lanes[tier.lane()];

            while lane.len() < desired {
                match spawn_cube(&mut self.rng, world, scene, camera, key, tier, container) {
                    Some(entity) => lane.push(entity),
                    None => break,
                }
            }

            while lane.len() > desired {
                if let Some(entity) = lane.pop() {
                    despawn_cube(world, scene, &entity);
                }
            }
        }
    }

    /// Copies every live cube's physics transform onto its visual.
    ///
    /// Tolerates half-dead pairs mid-teardown: a cube whose body or visual
    /// is already gone is skipped.
    pub fn sync_transforms(&self, world: &PhysicsWorld, scene: &mut Scene) {
        for entity in self.iter() {
            let Some(body) = world.get_rigid_body(entity.body) else {
                continue;
            };
            let Some(visual) = scene.get_mut(entity.visual) else {
                continue;
            };
            visual.position = Point3::from(body.translation());
            visual.rotation = (*body.rotation()).into();
        }
    }

    /// Destroys every live cube (both halves).
    pub fn clear(&mut self, world: &mut PhysicsWorld, scene: &mut Scene) {
        for lanes in self.lanes.values_mut() {
            for lane in lanes.iter_mut() {
                for entity in lane.drain(..) {
                    despawn_cube(world, scene, &entity);
                }
            }
        }
    }

    /// Live cube count for one `(resource, tier)` lane.
    pub fn count(&self, key: &ResourceKey, tier: Tier) -> usize {
        self.lanes
            .get(key)
            .map_or(0, |lanes| lanes[tier.lane()].len())
    }

    /// Live cubes of one lane in creation order.
    pub fn cubes(&self, key: &ResourceKey, tier: Tier) -> &[CubeEntity] {
        self.lanes
            .get(key)
            .map_or(&[][..], |lanes| &lanes[tier.lane()])
    }

    /// Total live cube count.
    pub fn total(&self) -> usize {
        self.lanes
            .values()
            .flat_map(|lanes| lanes.iter())
            .map(Vec::len)
            .sum()
    }

    /// Iterates over every live cube.
    pub fn iter(&self) -> impl Iterator<Item = &CubeEntity> {
        self.lanes
            .values()
            .flat_map(|lanes| lanes.iter())
            .flatten()
    }
}

/// Spawns one cube above the container center with jitter, a random
/// orientation, and a random planar shove.
fn spawn_cube(
    rng: &mut ChaCha8Rng,
    world: &mut PhysicsWorld,
    scene: &mut Scene,
    camera: &CameraState,
    key: &ResourceKey,
    tier: Tier,
    container: &LayoutRect,
) -> Option<CubeEntity> {
    let (cx, cy) = container.center();
    let Some(anchor) = camera.layout_to_world(cx, cy) else {
        tracing::warn!("[cubes] degenerate projection for {key}, skipping spawn");
        return None;
    };

    let position = Point3::new(
        anchor.x + rng.random_range(-SPAWN_JITTER_X..=SPAWN_JITTER_X),
        anchor.y + rng.random_range(-SPAWN_JITTER_Y..=SPAWN_JITTER_Y),
        anchor.z + SPAWN_LIFT,
    );
    let rotation = random_orientation(rng);

    let body = RigidBodyBuilder::dynamic()
        .position(Isometry3::from_parts(
            Translation3::new(position.x, position.y, position.z),
            rotation,
        ).into())
        .ccd_enabled(true)
        .build();
    let body_handle = world.add_rigid_body(body);

    let half = tier.size() / 2.0;
    let collider = ColliderBuilder::cuboid(half, half, half)
        .mass(CUBE_MASS)
        .friction(0.5)
        .restitution(0.2)
        .build();
    world.add_collider(collider, body_handle);

    // Random planar shove; nothing along the vertical axis.
    let impulse = Vector::new(impulse_component(rng), impulse_component(rng), 0.0);
    if let Some(body) = world.get_rigid_body_mut(body_handle) {
        body.apply_impulse(impulse, true);
    }

    let visual = scene.add_visual(CubeVisual::new(tier, position, rotation));

    Some(CubeEntity {
        key: key.clone(),
        tier,
        visual,
        body: body_handle,
    })
}

/// Destroys both halves of a cube. Either half already being gone is fine;
/// teardown may race with rapid value churn.
fn despawn_cube(world: &mut PhysicsWorld, scene: &mut Scene, entity: &CubeEntity) {
    world.remove_rigid_body(entity.body);
    scene.remove_visual(entity.visual);
}

/// Uniform random orientation (Shoemake's method).
fn random_orientation(rng: &mut ChaCha8Rng) -> UnitQuaternion<f32> {
    use std::f32::consts::TAU;

    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    let u3: f32 = rng.random();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();

    UnitQuaternion::from_quaternion(Quaternion::new(
        b * (TAU * u3).cos(),
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
    ))
}

/// One impulse component: random magnitude in the drop range, random sign.
fn impulse_component(rng: &mut ChaCha8Rng) -> f32 {
    let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
    rng.random_range(IMPULSE_MIN..IMPULSE_MAX) * sign
}
