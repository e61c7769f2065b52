#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for ARrehab adapters.
//!
//! The world never owns renderable handles. Adapters feed its events into a
//! [`TileScene`], which keeps the mapping from tile index to visual state,
//! and hand the scene to a [`TileRenderer`] for presentation.

use std::{collections::BTreeMap, error::Error, fmt};

use anyhow::Result as AnyResult;
use arrehab_core::{Event, Facing, SurfacePoint, TileAppearance, TileIndex};
use glam::Vec2;

/// RGBA color used when presenting tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Colors applied to each tile appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Untouched grid tiles.
    pub plain: Color,
    /// Tiles on the candidate board border.
    pub outline: Color,
    /// Tiles of the committed board.
    pub placed: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            plain: Color::from_rgb_u8(255, 0, 0).with_alpha(0.1),
            outline: Color::from_rgb_u8(0, 255, 0),
            placed: Color::from_rgb_u8(0, 0, 255),
        }
    }
}

impl Palette {
    /// Color used for the provided appearance.
    #[must_use]
    pub const fn color_for(&self, appearance: TileAppearance) -> Color {
        match appearance {
            TileAppearance::Plain => self.plain,
            TileAppearance::Outline => self.outline,
            TileAppearance::Placed => self.placed,
        }
    }
}

/// Visual record of a single tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Lattice index of the tile.
    pub tile: TileIndex,
    /// Tile center relative to the surface anchor.
    pub surface_position: SurfacePoint,
    /// Visual state requested by the world.
    pub appearance: TileAppearance,
}

/// Renderer-side mirror of the tile grid built from world events.
#[derive(Clone, Debug, Default)]
pub struct TileScene {
    surface_center: Vec2,
    columns: u32,
    rows: u32,
    facing: Facing,
    committed: bool,
    tiles: BTreeMap<TileIndex, SceneTile>,
}

impl TileScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a batch of world events to the scene.
    ///
    /// Restyle requests for tiles the scene never saw created are reported as
    /// errors after the rest of the batch has been applied.
    pub fn apply(&mut self, events: &[Event]) -> Result<(), RenderingError> {
        let mut unknown = None;
        for event in events {
            match event {
                Event::GridBuilt {
                    center,
                    columns,
                    rows,
                } => {
                    self.surface_center = Vec2::new(center.x(), center.z());
                    self.columns = *columns;
                    self.rows = *rows;
                }
                Event::TileCreated { tile, position } => {
                    let _ = self.tiles.insert(
                        *tile,
                        SceneTile {
                            tile: *tile,
                            surface_position: *position,
                            appearance: TileAppearance::Plain,
                        },
                    );
                }
                Event::TileDiscarded { tile } => {
                    let _ = self.tiles.remove(tile);
                }
                Event::TileRestyled { tile, appearance } => match self.tiles.get_mut(tile) {
                    Some(scene_tile) => scene_tile.appearance = *appearance,
                    None => unknown = unknown.or(Some(*tile)),
                },
                Event::FacingChanged { facing } => self.facing = *facing,
                Event::PlacementCommitted { .. } => self.committed = true,
                _ => {}
            }
        }

        match unknown {
            Some(tile) => Err(RenderingError::UnknownTile { tile }),
            None => Ok(()),
        }
    }

    /// Retrieves the visual record of `tile`.
    #[must_use]
    pub fn tile(&self, tile: TileIndex) -> Option<&SceneTile> {
        self.tiles.get(&tile)
    }

    /// Iterator over every tile ordered by column, then row.
    pub fn tiles(&self) -> impl Iterator<Item = &SceneTile> {
        self.tiles.values()
    }

    /// World-space center of `tile` on the floor plane.
    #[must_use]
    pub fn world_position(&self, tile: TileIndex) -> Option<Vec2> {
        self.tiles.get(&tile).map(|scene_tile| {
            self.surface_center
                + Vec2::new(scene_tile.surface_position.x(), scene_tile.surface_position.z())
        })
    }

    /// Number of tiles currently showing `appearance`.
    #[must_use]
    pub fn count(&self, appearance: TileAppearance) -> usize {
        self.tiles
            .values()
            .filter(|scene_tile| scene_tile.appearance == appearance)
            .count()
    }

    /// Lattice dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Facing most recently announced by the world.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Reports whether the board was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }
}

/// Presents a [`TileScene`] to the user.
pub trait TileRenderer {
    /// Draws the scene using the palette's colors.
    fn present(&mut self, scene: &TileScene, palette: &Palette) -> AnyResult<()>;
}

/// Errors that can occur while mirroring world events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingError {
    /// A restyle request referenced a tile that does not exist in the scene.
    UnknownTile {
        /// Tile named by the request.
        tile: TileIndex,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTile { tile } => {
                write!(
                    f,
                    "tile ({}, {}) was restyled before it was created",
                    tile.column(),
                    tile.row()
                )
            }
        }
    }
}

impl Error for RenderingError {}
