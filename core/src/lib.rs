#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the ARrehab board placement engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing surface reports and player intent, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that rendering collaborators and systems react to. Systems consume event
//! streams and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tile footprint used when no configuration overrides it, in meters.
pub const DEFAULT_CELL_SIZE: CellSize = CellSize::new(0.5, 0.5);

/// Board layout used when no configuration overrides it, in tiles.
pub const DEFAULT_BOARD_DIMENSIONS: BoardDimensions = BoardDimensions::new(3, 5);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Reports the latest estimate of the tracked floor surface.
    ///
    /// The first accepted report builds the tile grid; later reports may
    /// regenerate it when the surface grew enough to fit more tiles.
    ReportSurface {
        /// Width and depth of the surface in meters.
        extent: SurfaceExtent,
        /// Anchor of the surface in world space.
        center: SurfacePoint,
    },
    /// Reports the surface-space position the player currently stands on.
    OccupyTile {
        /// Position of the player, or `None` when no tile is occupied.
        position: Option<SurfacePoint>,
    },
    /// Rotates the board a quarter turn clockwise around the last center.
    RotateBoard,
    /// Sets the board facing explicitly.
    SetFacing {
        /// Facing the board should extend toward.
        facing: Facing,
    },
    /// Removes the current outline, e.g. when the player cancels placement.
    ClearOutline,
    /// Commits the current outline as the final board placement.
    CommitPlacement,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The reported surface is too small to host the configured board.
    SurfaceRejected {
        /// Extent that failed validation.
        extent: SurfaceExtent,
    },
    /// A fresh tile lattice replaced any previous one.
    GridBuilt {
        /// World-space anchor the lattice is laid out around.
        center: SurfacePoint,
        /// Number of tile columns along the surface width.
        columns: u32,
        /// Number of tile rows along the surface depth.
        rows: u32,
    },
    /// A tile was generated and should be placed by the renderer.
    TileCreated {
        /// Lattice index of the new tile.
        tile: TileIndex,
        /// Surface-space center of the tile.
        position: SurfacePoint,
    },
    /// A tile was dropped during regeneration.
    TileDiscarded {
        /// Lattice index of the discarded tile.
        tile: TileIndex,
    },
    /// A tile should switch to a different visual state.
    TileRestyled {
        /// Lattice index of the tile.
        tile: TileIndex,
        /// Appearance the renderer should apply.
        appearance: TileAppearance,
    },
    /// The board facing changed.
    FacingChanged {
        /// Facing that became active.
        facing: Facing,
    },
    /// A complete board outline was located and highlighted.
    OutlineResolved {
        /// Tile the outline was anchored on.
        center: TileIndex,
        /// Facing used to lay out the outline.
        facing: Facing,
        /// Border tiles in walk order.
        tiles: Vec<TileIndex>,
    },
    /// No outline could be placed for the requested center.
    OutlineRejected {
        /// Why the outline could not be placed.
        reason: OutlineError,
    },
    /// A previously visible outline was removed.
    OutlineCleared,
    /// The player committed the outline as the final board.
    PlacementCommitted {
        /// Committed placement handed to board construction.
        placement: Placement,
    },
    /// A commit request was refused.
    PlacementRejected {
        /// Why the commit was refused.
        reason: CommitError,
    },
}

/// Position on the tracked surface, measured in meters along the x and z axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    x: f32,
    z: f32,
}

impl SurfacePoint {
    /// The surface origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new surface point.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Offset along the width axis.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Offset along the depth axis.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Returns the point translated by `offset`.
    #[must_use]
    pub fn translated(self, offset: SurfacePoint) -> Self {
        Self::new(self.x + offset.x, self.z + offset.z)
    }
}

/// Width and depth of a tracked surface in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceExtent {
    width: f32,
    depth: f32,
}

impl SurfaceExtent {
    /// Creates a new surface extent.
    #[must_use]
    pub const fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// Extent along the x axis.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Extent along the z axis.
    #[must_use]
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Extent along the requested axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Z => self.depth,
        }
    }

    /// Reports whether both sides are finite and strictly positive.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        [self.width, self.depth]
            .into_iter()
            .all(|side| side.is_finite() && side > 0.0)
    }
}

/// Footprint of a single tile in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    width: f32,
    depth: f32,
}

impl CellSize {
    /// Creates a new cell footprint.
    #[must_use]
    pub const fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// Tile size along the x axis.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Tile size along the z axis.
    #[must_use]
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Tile size along the requested axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Z => self.depth,
        }
    }
}

/// Horizontal axes of a tracked surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Width axis.
    X,
    /// Depth axis.
    Z,
}

/// Location of a single tile within the current lattice.
///
/// Column zero holds the tiles with the largest x coordinate and row zero the
/// tiles with the largest z coordinate. Indices are only meaningful for the
/// lattice that produced them; a regenerated grid reassigns them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    column: u32,
    row: u32,
}

impl TileIndex {
    /// Creates a new tile index.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Size of the game board measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardDimensions {
    width: u32,
    depth: u32,
}

impl BoardDimensions {
    /// Creates a new board size descriptor.
    #[must_use]
    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }

    /// Tiles spanned across the player's facing.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Tiles spanned along the player's facing.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of tiles on the border of the board.
    #[must_use]
    pub const fn perimeter_tiles(&self) -> u32 {
        match (self.width, self.depth) {
            (0, _) | (_, 0) => 0,
            (1, depth) => depth,
            (width, 1) => width,
            (width, depth) => 2 * width + 2 * depth - 4,
        }
    }
}

/// Cardinal orientation the board extends toward from its center tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Initial orientation.
    #[default]
    North,
    /// Quarter turn clockwise from north.
    East,
    /// Half turn from north.
    South,
    /// Quarter turn counter-clockwise from north.
    West,
}

impl Facing {
    /// Every facing in rotation order.
    pub const ALL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    /// Returns the next facing in the north, east, south, west cycle.
    #[must_use]
    pub const fn rotated(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Sign applied to board offsets; south and west mirror north and east.
    #[must_use]
    pub const fn multiplier(self) -> i64 {
        match self {
            Self::North | Self::East => 1,
            Self::South | Self::West => -1,
        }
    }

    /// Reports whether the board's width runs along the depth axis.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

/// Visual state requested from the rendering collaborator for a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileAppearance {
    /// Untouched grid tile.
    #[default]
    Plain,
    /// Part of the candidate board border.
    Outline,
    /// Part of the committed board.
    Placed,
}

/// Reasons an outline could not be placed around a center tile.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutlineError {
    /// The center does not resolve to a tile, or the board's reference
    /// corner falls outside the grid.
    #[error("board does not fit around the requested center")]
    InvalidCenter,
    /// The reference corner exists but another border tile is missing.
    #[error("board border is incomplete")]
    IncompleteBorder,
}

/// Reasons a placement commit may be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitError {
    /// No outline is currently shown.
    #[error("no board outline is available to commit")]
    EmptyOutline,
}

/// Tile handed over to board construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedTile {
    /// Lattice index of the tile.
    pub tile: TileIndex,
    /// Surface-space center of the tile.
    pub position: SurfacePoint,
}

/// Board placement committed by the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// World-space anchor of the surface the board lies on.
    pub surface_center: SurfacePoint,
    /// Tile the player stood on when the outline was computed.
    pub center: PlacedTile,
    /// Facing of the committed board.
    pub facing: Facing,
    /// Border tiles in walk order.
    pub tiles: Vec<PlacedTile>,
}

/// Tunable parameters of the grid and outline engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Footprint of a single tile.
    pub cell_size: CellSize,
    /// Board size in tiles.
    pub board: BoardDimensions,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            board: DEFAULT_BOARD_DIMENSIONS,
        }
    }
}

impl PlacementConfig {
    /// Checks that the configuration describes a usable grid and board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cell = self.cell_size;
        for size in [cell.width(), cell.depth()] {
            if !size.is_finite() || size <= 0.0 {
                return Err(ConfigError::InvalidCellSize { size });
            }
        }
        if self.board.width() == 0 || self.board.depth() == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.board.width(),
                depth: self.board.depth(),
            });
        }
        Ok(())
    }

    /// Shorter and longer side of the board footprint in meters.
    #[must_use]
    pub fn board_footprint(&self) -> (f32, f32) {
        let across = self.board.width() as f32 * self.cell_size.width();
        let along = self.board.depth() as f32 * self.cell_size.depth();
        (across.min(along), across.max(along))
    }

    /// Reports whether a surface is large enough to ever host the board.
    ///
    /// The check ignores orientation: the shorter surface side must fit the
    /// shorter board side and the longer side the longer one. Extents with a
    /// non-finite or non-positive side are never accepted.
    #[must_use]
    pub fn accepts_surface(&self, extent: SurfaceExtent) -> bool {
        if !extent.is_measurable() {
            return false;
        }
        let (min_board, max_board) = self.board_footprint();
        let min_surface = extent.width().min(extent.depth());
        let max_surface = extent.width().max(extent.depth());
        min_surface >= min_board && max_surface >= max_board
    }
}

/// Errors raised while validating a [`PlacementConfig`].
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A cell side was zero, negative, or not finite.
    #[error("cell size must be positive and finite (received {size})")]
    InvalidCellSize {
        /// Offending side length.
        size: f32,
    },
    /// The board has no tiles along one axis.
    #[error("board must span at least one tile per axis (received {width}x{depth})")]
    EmptyBoard {
        /// Configured board width.
        width: u32,
        /// Configured board depth.
        depth: u32,
    },
}
