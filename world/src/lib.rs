#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile grid and board outline state for ARrehab.
//!
//! The world is single-threaded: commands must be applied one at a time.
//! Hosts that receive surface reports on a different thread than player
//! updates should funnel both through a single queue or lock around the
//! [`World`].

mod grid;
mod outline;

pub use grid::{Cell, TileGrid};
pub use outline::{border_offsets, OutlineLocator};

use arrehab_core::{
    CommitError, ConfigError, Event, OutlineError, PlacedTile, Placement, PlacementConfig,
    SurfaceExtent, SurfacePoint, TileAppearance, TileIndex,
};

pub use arrehab_core::Command;

/// Stage of the placement flow the world is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No surface large enough for the board has been reported yet.
    Scanning,
    /// A tile grid exists and the player is choosing where the board goes.
    Selecting,
    /// The board was committed; further commands are ignored.
    Committed,
}

/// Represents the authoritative ARrehab placement state.
#[derive(Debug)]
pub struct World {
    config: PlacementConfig,
    phase: Phase,
    grid: Option<TileGrid>,
    outline: OutlineLocator,
    player: Option<SurfacePoint>,
    placement: Option<Placement>,
}

impl World {
    /// Creates a world that lays out boards according to `config`.
    pub fn new(config: PlacementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: PlacementConfig) -> Self {
        Self {
            outline: OutlineLocator::new(config.board),
            config,
            phase: Phase::Scanning,
            grid: None,
            player: None,
            placement: None,
        }
    }

    fn report_surface(
        &mut self,
        extent: SurfaceExtent,
        center: SurfacePoint,
        out_events: &mut Vec<Event>,
    ) {
        let Some(grid) = self.grid.as_mut() else {
            if !self.config.accepts_surface(extent) {
                log::debug!(
                    "surface {:.3}x{:.3} is too small for the board",
                    extent.width(),
                    extent.depth()
                );
                out_events.push(Event::SurfaceRejected { extent });
                return;
            }

            self.grid = Some(TileGrid::build(
                extent,
                center,
                self.config.cell_size,
                out_events,
            ));
            self.phase = Phase::Selecting;
            self.refresh_outline(out_events);
            return;
        };

        if !extent.is_measurable() {
            log::debug!("ignoring unmeasurable surface estimate {extent:?}");
            out_events.push(Event::SurfaceRejected { extent });
            return;
        }

        if grid.update(extent, center, out_events) {
            self.outline.forget(out_events);
            self.refresh_outline(out_events);
        }
    }

    fn occupy(&mut self, position: Option<SurfacePoint>, out_events: &mut Vec<Event>) {
        self.player = position;
        match position {
            Some(_) => self.refresh_outline(out_events),
            None => {
                if let Some(grid) = self.grid.as_mut() {
                    self.outline.clear(grid, out_events);
                }
            }
        }
    }

    /// Recomputes the outline around the last reported player position.
    fn refresh_outline(&mut self, out_events: &mut Vec<Event>) {
        let Some(position) = self.player else {
            return;
        };
        let Some(grid) = self.grid.as_mut() else {
            out_events.push(Event::OutlineRejected {
                reason: OutlineError::InvalidCenter,
            });
            return;
        };

        match grid.lookup(position).map(Cell::index) {
            Some(center) => {
                let _ = self.outline.recompute(grid, center, out_events);
            }
            None => {
                self.outline.clear(grid, out_events);
                out_events.push(Event::OutlineRejected {
                    reason: OutlineError::InvalidCenter,
                });
            }
        }
    }

    fn commit(&mut self, out_events: &mut Vec<Event>) {
        let placement = self.grid.as_ref().and_then(|grid| {
            let center = self.outline.center()?;
            let center = placed_tile(grid, center)?;
            let tiles = self
                .outline
                .tiles()
                .iter()
                .map(|tile| placed_tile(grid, *tile))
                .collect::<Option<Vec<_>>>()?;
            if tiles.is_empty() {
                return None;
            }
            Some(Placement {
                surface_center: grid.center(),
                center,
                facing: self.outline.facing(),
                tiles,
            })
        });

        let Some(placement) = placement else {
            out_events.push(Event::PlacementRejected {
                reason: CommitError::EmptyOutline,
            });
            return;
        };

        for tile in &placement.tiles {
            out_events.push(Event::TileRestyled {
                tile: tile.tile,
                appearance: TileAppearance::Placed,
            });
        }
        log::info!(
            "board committed facing {:?} with {} border tiles",
            placement.facing,
            placement.tiles.len()
        );
        self.phase = Phase::Committed;
        self.placement = Some(placement.clone());
        out_events.push(Event::PlacementCommitted { placement });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::with_config(PlacementConfig::default())
    }
}

fn placed_tile(grid: &TileGrid, tile: TileIndex) -> Option<PlacedTile> {
    grid.cell(tile).map(|cell| PlacedTile {
        tile,
        position: cell.position(),
    })
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase == Phase::Committed {
        log::warn!("ignoring {command:?}: board placement already committed");
        return;
    }

    match command {
        Command::ReportSurface { extent, center } => {
            world.report_surface(extent, center, out_events);
        }
        Command::OccupyTile { position } => world.occupy(position, out_events),
        Command::RotateBoard => {
            let facing = world.outline.rotate();
            out_events.push(Event::FacingChanged { facing });
            world.refresh_outline(out_events);
        }
        Command::SetFacing { facing } => {
            if world.outline.facing() != facing {
                world.outline.set_facing(facing);
                out_events.push(Event::FacingChanged { facing });
                world.refresh_outline(out_events);
            }
        }
        Command::ClearOutline => world.occupy(None, out_events),
        Command::CommitPlacement => world.commit(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arrehab_core::{Facing, Placement, PlacementConfig, SurfacePoint, TileIndex};

    use super::{Cell, Phase, TileGrid, World};

    /// Stage of the placement flow.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &PlacementConfig {
        &world.config
    }

    /// Provides read-only access to the tile grid, once one was built.
    #[must_use]
    pub fn tile_grid(world: &World) -> Option<&TileGrid> {
        world.grid.as_ref()
    }

    /// Facing the next outline will be laid out with.
    #[must_use]
    pub fn facing(world: &World) -> Facing {
        world.outline.facing()
    }

    /// Border tiles of the visible outline in walk order.
    #[must_use]
    pub fn outline(world: &World) -> &[TileIndex] {
        world.outline.tiles()
    }

    /// Cells of the visible outline in walk order.
    #[must_use]
    pub fn outline_cells(world: &World) -> Vec<&Cell> {
        let Some(grid) = world.grid.as_ref() else {
            return Vec::new();
        };
        world
            .outline
            .tiles()
            .iter()
            .filter_map(|tile| grid.cell(*tile))
            .collect()
    }

    /// Last position reported for the player.
    #[must_use]
    pub fn player_position(world: &World) -> Option<SurfacePoint> {
        world.player
    }

    /// Committed placement, once the player confirmed one.
    #[must_use]
    pub fn placement(world: &World) -> Option<&Placement> {
        world.placement.as_ref()
    }
}
