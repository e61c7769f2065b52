#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Board construction system that turns a committed placement into a game board.
//!
//! Every committed border tile becomes a board tile. The four corner tiles
//! host minigames, assigned round-robin from the configured list in border
//! walk order; the remaining tiles are plain stepping stones.

use std::collections::BTreeMap;

use arrehab_core::{Event, Facing, PlacedTile, Placement, SurfacePoint, TileIndex};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Physical exercises that can be attached to a board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Minigame {
    /// Follow a sequence of body movements.
    Movement,
    /// Trace a floating path with the device.
    Trace,
}

impl Minigame {
    /// Every available minigame.
    pub const ALL: [Minigame; 2] = [Minigame::Movement, Minigame::Trace];
}

/// Tile that belongs to a constructed board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardTile {
    /// Lattice index of the tile.
    pub tile: TileIndex,
    /// Surface-space center of the tile.
    pub position: SurfacePoint,
    /// Minigame waiting on the tile, if any.
    pub game: Option<Minigame>,
}

/// Game board built from a committed placement.
#[derive(Clone, Debug)]
pub struct GameBoard {
    surface_center: SurfacePoint,
    center: PlacedTile,
    facing: Facing,
    walk: Vec<TileIndex>,
    tiles: BTreeMap<TileIndex, BoardTile>,
}

impl GameBoard {
    /// Builds a board and assigns `games` to its corners in walk order.
    #[must_use]
    pub fn from_placement(placement: &Placement, games: &[Minigame]) -> Self {
        let tiles = placement
            .tiles
            .iter()
            .map(|placed| {
                (
                    placed.tile,
                    BoardTile {
                        tile: placed.tile,
                        position: placed.position,
                        game: None,
                    },
                )
            })
            .collect();
        let mut board = Self {
            surface_center: placement.surface_center,
            center: placement.center,
            facing: placement.facing,
            walk: placement.tiles.iter().map(|placed| placed.tile).collect(),
            tiles,
        };
        board.assign_games(games);
        board
    }

    /// Builds a board after shuffling `games` with a seeded generator.
    ///
    /// The same seed always produces the same assignment.
    #[must_use]
    pub fn shuffled(placement: &Placement, games: &[Minigame], seed: u64) -> Self {
        let mut order = games.to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        Self::from_placement(placement, &order)
    }

    /// Reports whether `tile` is one of the board's four corners.
    #[must_use]
    pub fn is_corner(&self, tile: TileIndex) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        self.tiles.contains_key(&tile)
            && (tile.column() == bounds.0 || tile.column() == bounds.1)
            && (tile.row() == bounds.2 || tile.row() == bounds.3)
    }

    /// Corner tiles in walk order.
    #[must_use]
    pub fn corners(&self) -> Vec<TileIndex> {
        self.walk
            .iter()
            .copied()
            .filter(|tile| self.is_corner(*tile))
            .collect()
    }

    /// Minigame waiting on `tile`, if any.
    #[must_use]
    pub fn game_at(&self, tile: TileIndex) -> Option<Minigame> {
        self.tiles.get(&tile).and_then(|board_tile| board_tile.game)
    }

    /// Removes the minigame from `tile`, typically after it was played.
    pub fn remove_game(&mut self, tile: TileIndex) -> Option<Minigame> {
        self.tiles
            .get_mut(&tile)
            .and_then(|board_tile| board_tile.game.take())
    }

    /// Number of minigames still waiting on the board.
    #[must_use]
    pub fn remaining_games(&self) -> usize {
        self.tiles
            .values()
            .filter(|board_tile| board_tile.game.is_some())
            .count()
    }

    /// Board tiles in walk order.
    pub fn tiles(&self) -> impl Iterator<Item = &BoardTile> {
        self.walk.iter().filter_map(|tile| self.tiles.get(tile))
    }

    /// Tile the player stood on when the board was placed.
    #[must_use]
    pub const fn center(&self) -> PlacedTile {
        self.center
    }

    /// Facing the board was committed with.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// World-space anchor of the surface the board lies on.
    #[must_use]
    pub const fn surface_center(&self) -> SurfacePoint {
        self.surface_center
    }

    fn assign_games(&mut self, games: &[Minigame]) {
        if games.is_empty() {
            return;
        }
        for (slot, tile) in self.corners().into_iter().enumerate() {
            if let Some(board_tile) = self.tiles.get_mut(&tile) {
                board_tile.game = Some(games[slot % games.len()]);
            }
        }
    }

    /// Column and row extremes as `(min_column, max_column, min_row, max_row)`.
    fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let columns = self.tiles.keys().map(TileIndex::column);
        let rows = self.tiles.keys().map(TileIndex::row);
        Some((
            columns.clone().min()?,
            columns.max()?,
            rows.clone().min()?,
            rows.max()?,
        ))
    }
}

/// System that waits for a committed placement and constructs the board.
#[derive(Clone, Debug)]
pub struct BoardConstruction {
    games: Vec<Minigame>,
    seed: Option<u64>,
    board: Option<GameBoard>,
}

impl Default for BoardConstruction {
    fn default() -> Self {
        Self::new(vec![Minigame::Trace])
    }
}

impl BoardConstruction {
    /// Creates a construction system that assigns `games` in order.
    #[must_use]
    pub fn new(games: Vec<Minigame>) -> Self {
        Self {
            games,
            seed: None,
            board: None,
        }
    }

    /// Shuffles the minigame order with `seed` before assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Consumes world events, building the board once a placement is committed.
    pub fn handle(&mut self, events: &[Event]) -> Option<&GameBoard> {
        for event in events {
            if let Event::PlacementCommitted { placement } = event {
                let board = match self.seed {
                    Some(seed) => GameBoard::shuffled(placement, &self.games, seed),
                    None => GameBoard::from_placement(placement, &self.games),
                };
                self.board = Some(board);
            }
        }
        self.board.as_ref()
    }

    /// Board built from the committed placement, if any.
    #[must_use]
    pub fn board(&self) -> Option<&GameBoard> {
        self.board.as_ref()
    }
}
