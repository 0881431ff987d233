//! Resource counter store and production-phase rules.
//!
//! The board tracks a value and a production rate per resource kind and
//! feeds the visualization core with [`ResourceSnapshot`]s. It owns no
//! simulation state; it is the data side of the board, the core is the
//! visual side.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]

use serde::{Deserialize, Serialize};

use cubepile_core::{ResourceKey, ResourceSnapshot};

/// Cost of turning plants into a greenery or heat into a temperature raise.
pub const CONVERT_COST: u32 = 8;

/// The six resource kinds of a player board, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Credits,
        ResourceKind::Steel,
        ResourceKind::Titanium,
        ResourceKind::Plants,
        ResourceKind::Energy,
        ResourceKind::Heat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Credits => "credits",
            ResourceKind::Steel => "steel",
            ResourceKind::Titanium => "titanium",
            ResourceKind::Plants => "plants",
            ResourceKind::Energy => "energy",
            ResourceKind::Heat => "heat",
        }
    }

    /// Key under which the visualization core tracks this kind's container.
    pub fn key(self) -> ResourceKey {
        ResourceKey::new(self.name())
    }
}

/// One resource track: current stock and per-phase production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTrack {
    pub value: u32,
    pub production: u32,
}

impl Default for ResourceTrack {
    fn default() -> Self {
        Self {
            value: 0,
            production: 1,
        }
    }
}

/// The full player board: six resource tracks plus the phase rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    tracks: [ResourceTrack; 6],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(kind: ResourceKind) -> usize {
        ResourceKind::ALL
            .iter()
            .position(|&k| k == kind)
            .expect("kind is in ALL")
    }

    pub fn value(&self, kind: ResourceKind) -> u32 {
        self.tracks[Self::index(kind)].value
    }

    pub fn production(&self, kind: ResourceKind) -> u32 {
        self.tracks[Self::index(kind)].production
    }

    /// Adjusts a value by a signed delta, saturating at zero.
    pub fn adjust_value(&mut self, kind: ResourceKind, delta: i32) {
        let track = &mut self.tracks[Self::index(kind)];
        track.value = track.value.saturating_add_signed(delta);
    }

    /// Adjusts a production rate by a signed delta, saturating at zero.
    pub fn adjust_production(&mut self, kind: ResourceKind, delta: i32) {
        let track = &mut self.tracks[Self::index(kind)];
        track.production = track.production.saturating_add_signed(delta);
    }

    /// Runs one production phase.
    ///
    /// Every kind gains its production, except the energy chain: leftover
    /// energy converts into heat, then energy restocks to its production.
    pub fn production_phase(&mut self) {
        let leftover_energy = self.value(ResourceKind::Energy);

        for kind in ResourceKind::ALL {
            let production = self.production(kind);
            let track = &mut self.tracks[Self::index(kind)];
            match kind {
                ResourceKind::Energy => track.value = production,
                ResourceKind::Heat => {
                    track.value = track.value + production + leftover_energy;
                }
                _ => track.value += production,
            }
        }

        tracing::info!("[board] production phase complete");
    }

    /// Spends eight plants on a greenery. Refused below cost.
    pub fn create_greenery(&mut self) -> bool {
        self.spend(ResourceKind::Plants, CONVERT_COST)
    }

    /// Spends eight heat to raise the temperature. Refused below cost.
    pub fn raise_temperature(&mut self) -> bool {
        self.spend(ResourceKind::Heat, CONVERT_COST)
    }

    fn spend(&mut self, kind: ResourceKind, cost: u32) -> bool {
        let track = &mut self.tracks[Self::index(kind)];
        if track.value < cost {
            return false;
        }
        track.value -= cost;
        true
    }

    /// Returns every track to value 0 and production 1.
    pub fn reset(&mut self) {
        self.tracks = [ResourceTrack::default(); 6];
        tracing::info!("[board] reset");
    }

    /// Snapshot of current values for the visualization core.
    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceKind::ALL
            .iter()
            .map(|&kind| (kind.key(), self.value(kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubepile_core::{BoardViz, FixedLayout, LayoutRect, Tier, Viewport};

    #[test]
    fn test_new_board_tracks() {
        let board = Board::new();

        for kind in ResourceKind::ALL {
            assert_eq!(board.value(kind), 0);
            assert_eq!(board.production(kind), 1);
        }
    }

    #[test]
    fn test_adjust_saturates_at_zero() {
        let mut board = Board::new();

        board.adjust_value(ResourceKind::Steel, 3);
        board.adjust_value(ResourceKind::Steel, -5);
        assert_eq!(board.value(ResourceKind::Steel), 0);

        board.adjust_production(ResourceKind::Steel, -4);
        assert_eq!(board.production(ResourceKind::Steel), 0);
    }

    #[test]
    fn test_production_phase_adds_production() {
        let mut board = Board::new();
        board.adjust_production(ResourceKind::Credits, 2); // production 3

        board.production_phase();

        assert_eq!(board.value(ResourceKind::Credits), 3);
        assert_eq!(board.value(ResourceKind::Steel), 1);
    }

    #[test]
    fn test_production_phase_converts_energy_to_heat() {
        let mut board = Board::new();
        board.adjust_value(ResourceKind::Energy, 4);
        board.adjust_production(ResourceKind::Energy, 1); // production 2
        board.adjust_production(ResourceKind::Heat, 2); // production 3

        board.production_phase();

        // Heat gains its production plus the leftover energy.
        assert_eq!(board.value(ResourceKind::Heat), 3 + 4);
        // Energy restocks to its production, leftovers gone.
        assert_eq!(board.value(ResourceKind::Energy), 2);
    }

    #[test]
    fn test_conversions_gate_on_cost() {
        let mut board = Board::new();
        board.adjust_value(ResourceKind::Plants, 7);

        assert!(!board.create_greenery());
        assert_eq!(board.value(ResourceKind::Plants), 7);

        board.adjust_value(ResourceKind::Plants, 2);
        assert!(board.create_greenery());
        assert_eq!(board.value(ResourceKind::Plants), 1);

        board.adjust_value(ResourceKind::Heat, 8);
        assert!(board.raise_temperature());
        assert_eq!(board.value(ResourceKind::Heat), 0);
        assert!(!board.raise_temperature());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut board = Board::new();
        board.adjust_value(ResourceKind::Titanium, 12);
        board.adjust_production(ResourceKind::Titanium, 4);

        board.reset();

        assert_eq!(board.value(ResourceKind::Titanium), 0);
        assert_eq!(board.production(ResourceKind::Titanium), 1);
    }

    #[test]
    fn test_snapshot_covers_every_kind() {
        let mut board = Board::new();
        board.adjust_value(ResourceKind::Heat, 23);

        let snapshot = board.snapshot();

        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot[&ResourceKind::Heat.key()], 23);
        assert_eq!(snapshot[&ResourceKind::Credits.key()], 0);
    }

    /// The board drives the visualization the way the host wires them up.
    #[test]
    fn test_board_feeds_visualization() {
        let mut layout = FixedLayout::new(Viewport::new(1200.0, 600.0));
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let left = 20.0 + i as f32 * 195.0;
            layout.set_rect(kind.key(), LayoutRect::from_size(left, 40.0, 180.0, 140.0));
        }

        let mut viz = BoardViz::new(layout, 42);
        let keys: Vec<_> = ResourceKind::ALL.iter().map(|k| k.key()).collect();
        viz.initialize(&keys).unwrap();

        let mut board = Board::new();
        board.adjust_value(ResourceKind::Plants, 7);
        viz.on_resources_changed(&board.snapshot());

        let plants = ResourceKind::Plants.key();
        assert_eq!(viz.cubes().count(&plants, Tier::Low), 2);
        assert_eq!(viz.cubes().count(&plants, Tier::Mid), 1);

        board.production_phase(); // plants 7 -> 8
        viz.on_resources_changed(&board.snapshot());
        assert_eq!(viz.cubes().count(&plants, Tier::Low), 3);

        assert!(board.create_greenery()); // plants 8 -> 0
        viz.on_resources_changed(&board.snapshot());
        assert_eq!(viz.cubes().count(&plants, Tier::Low), 0);
        assert_eq!(viz.cubes().count(&plants, Tier::Mid), 0);
    }
}
