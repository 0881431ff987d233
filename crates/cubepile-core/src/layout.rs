//! Layout geometry and the capability the host supplies it through.
//!
//! The core never queries a UI toolkit. Whatever owns the real screen
//! (a DOM, a windowing system, a test fixture) implements [`LayoutProvider`]
//! and the core pulls container rectangles and the viewport through it on
//! mount and on every resize.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::Viewport;
use crate::cubes::ResourceKey;

/// Axis-aligned rectangle in layout pixel space.
///
/// Snapshotted per container per layout event; recomputed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl LayoutRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rectangle from its top-left corner and size.
    pub fn from_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Center of the rectangle in layout pixels.
    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }
}

/// Capability that resolves container rectangles and the viewport.
///
/// `rect_of` returns `None` for containers the host no longer lays out;
/// the core skips those rather than erroring mid-frame.
pub trait LayoutProvider {
    fn rect_of(&self, key: &ResourceKey) -> Option<LayoutRect>;
    fn viewport(&self) -> Viewport;
}

/// In-memory layout used by tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct FixedLayout {
    viewport: Viewport,
    rects: HashMap<ResourceKey, LayoutRect>,
}

impl FixedLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rects: HashMap::new(),
        }
    }

    /// Registers (or replaces) a container rectangle.
    pub fn set_rect(&mut self, key: ResourceKey, rect: LayoutRect) {
        self.rects.insert(key, rect);
    }

    /// Changes the viewport, as a host resize handler would.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl LayoutProvider for FixedLayout {
    fn rect_of(&self, key: &ResourceKey) -> Option<LayoutRect> {
        self.rects.get(key).copied()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
