//! Render scene: cube visuals and lights.
//!
//! Visuals live in a generational-index arena. A [`VisualHandle`] carries its
//! slot generation, so a handle kept past removal is detected as stale
//! instead of silently addressing whatever reused the slot — the same handle
//! discipline the physics side gets from rapier's body sets.

use rapier3d::na::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::cubes::Tier;

/// RGBA color of a cube visual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Tier colors.
    pub const BRONZE: Color = Color::rgb(0xb7, 0x54, 0x23);
    pub const SILVER: Color = Color::rgb(0xbd, 0xbd, 0xbd);
    pub const GOLD: Color = Color::rgb(0xea, 0x9a, 0x1a);
}

/// Handle to a visual in the scene arena.
///
/// Carries the slot generation; stale handles (kept past removal) never
/// resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle {
    index: u32,
    generation: u32,
}

/// Renderable state of one cube.
#[derive(Debug, Clone)]
pub struct CubeVisual {
    pub tier: Tier,
    pub color: Color,
    pub half_extent: f32,
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl CubeVisual {
    /// Creates a visual for a tier at a pose.
    pub fn new(tier: Tier, position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            tier,
            color: tier.color(),
            half_extent: tier.size() / 2.0,
            position,
            rotation,
        }
    }
}

/// A directional light anchored in world space.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub position: Point3<f32>,
    pub intensity: f32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    visual: Option<CubeVisual>,
}

/// The render scene: an arena of cube visuals plus the light list.
///
/// Presented to the host once per frame through the `FramePresenter`
/// boundary; the host renderer draws whatever is live here.
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    lights: Vec<DirectionalLight>,
    live: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visual and returns its handle.
    pub fn add_visual(&mut self, visual: CubeVisual) -> VisualHandle {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.visual = Some(visual);
            return VisualHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("scene arena overflow");
        self.slots.push(Slot {
            generation: 0,
            visual: Some(visual),
        });
        VisualHandle {
            index,
            generation: 0,
        }
    }

    /// Removes a visual. Stale or already-removed handles are a no-op;
    /// returns whether a visual was removed.
    pub fn remove_visual(&mut self, handle: VisualHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.visual.is_none() {
            return false;
        }

        slot.visual = None;
        slot.generation += 1;
        self.free.push(handle.index);
        self.live -= 1;
        true
    }

    /// Resolves a handle to its visual, if still live.
    pub fn get(&self, handle: VisualHandle) -> Option<&CubeVisual> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.visual.as_ref()
    }

    /// Mutable access to a live visual.
    pub fn get_mut(&mut self, handle: VisualHandle) -> Option<&mut CubeVisual> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.visual.as_mut()
    }

    /// Number of live visuals.
    pub fn visual_count(&self) -> usize {
        self.live
    }

    /// Iterates over all live visuals.
    pub fn iter(&self) -> impl Iterator<Item = (VisualHandle, &CubeVisual)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let visual = slot.visual.as_ref()?;
            #[allow(clippy::cast_possible_truncation)]
            let handle = VisualHandle {
                index: index as u32,
                generation: slot.generation,
            };
            Some((handle, visual))
        })
    }

    /// Adds a directional light.
    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    /// All lights in the scene.
    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    /// Removes every visual (lights stay; they belong to scene setup).
    pub fn clear_visuals(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.visual.take().is_some() {
                slot.generation += 1;
                #[allow(clippy::cast_possible_truncation)]
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}
