//! Board outline search over the tile lattice.

use arrehab_core::{BoardDimensions, Event, Facing, OutlineError, TileAppearance, TileIndex};

use crate::grid::TileGrid;

/// Tracks the highlighted border of the candidate board.
///
/// The outline is always replaced wholesale: every recomputation first
/// restores the previous border, then either highlights a complete new
/// border or leaves the outline empty.
#[derive(Clone, Debug)]
pub struct OutlineLocator {
    board: BoardDimensions,
    facing: Facing,
    center: Option<TileIndex>,
    current: Vec<TileIndex>,
}

impl OutlineLocator {
    /// Creates an empty locator for boards of the given size, facing north.
    #[must_use]
    pub fn new(board: BoardDimensions) -> Self {
        Self {
            board,
            facing: Facing::North,
            center: None,
            current: Vec::new(),
        }
    }

    /// Facing used by the next recomputation.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Replaces the facing. Callers are expected to recompute afterwards.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Advances the facing a quarter turn and returns the new value.
    pub fn rotate(&mut self) -> Facing {
        self.facing = self.facing.rotated();
        self.facing
    }

    /// Board size the locator searches for.
    #[must_use]
    pub const fn board(&self) -> BoardDimensions {
        self.board
    }

    /// Center tile of the visible outline, if any.
    #[must_use]
    pub const fn center(&self) -> Option<TileIndex> {
        self.center
    }

    /// Border tiles of the visible outline in walk order.
    #[must_use]
    pub fn tiles(&self) -> &[TileIndex] {
        &self.current
    }

    /// Reports whether no outline is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Recomputes the outline of a board anchored on `center`.
    ///
    /// On failure the outline stays empty and the reason is both returned
    /// and broadcast as [`Event::OutlineRejected`].
    pub fn recompute(
        &mut self,
        grid: &mut TileGrid,
        center: TileIndex,
        out_events: &mut Vec<Event>,
    ) -> Result<&[TileIndex], OutlineError> {
        self.clear(grid, out_events);

        let border = match self.resolve_border(grid, center) {
            Ok(border) => border,
            Err(reason) => {
                log::debug!(
                    "no {:?} outline around tile ({}, {}): {reason}",
                    self.facing,
                    center.column(),
                    center.row()
                );
                out_events.push(Event::OutlineRejected { reason });
                return Err(reason);
            }
        };

        for tile in &border {
            if let Some(cell) = grid.cell_mut(*tile) {
                cell.set_outline(true);
            }
            out_events.push(Event::TileRestyled {
                tile: *tile,
                appearance: TileAppearance::Outline,
            });
        }
        self.current = border;
        self.center = Some(center);
        out_events.push(Event::OutlineResolved {
            center,
            facing: self.facing,
            tiles: self.current.clone(),
        });

        Ok(&self.current)
    }

    /// Restores every outlined tile to its plain appearance.
    pub fn clear(&mut self, grid: &mut TileGrid, out_events: &mut Vec<Event>) {
        if self.current.is_empty() {
            return;
        }

        for tile in self.current.drain(..) {
            if let Some(cell) = grid.cell_mut(tile) {
                cell.set_outline(false);
            }
            out_events.push(Event::TileRestyled {
                tile,
                appearance: TileAppearance::Plain,
            });
        }
        self.center = None;
        out_events.push(Event::OutlineCleared);
    }

    /// Drops the outline after the lattice it referred to was discarded.
    pub(crate) fn forget(&mut self, out_events: &mut Vec<Event>) {
        if self.current.is_empty() {
            return;
        }
        self.current.clear();
        self.center = None;
        out_events.push(Event::OutlineCleared);
    }

    fn resolve_border(
        &self,
        grid: &TileGrid,
        center: TileIndex,
    ) -> Result<Vec<TileIndex>, OutlineError> {
        if grid.cell(center).is_none() {
            return Err(OutlineError::InvalidCenter);
        }

        let offsets = border_offsets(self.board, self.facing);
        let Some(&(corner_x, corner_z)) = offsets.first() else {
            return Err(OutlineError::InvalidCenter);
        };
        if grid.offset(center, corner_x, corner_z).is_none() {
            return Err(OutlineError::InvalidCenter);
        }

        offsets
            .into_iter()
            .map(|(dx, dz)| {
                grid.offset(center, dx, dz)
                    .filter(|tile| grid.cell(*tile).is_some())
                    .ok_or(OutlineError::IncompleteBorder)
            })
            .collect()
    }
}

/// Cell offsets from the center tile to every border tile of the board.
///
/// Offsets count whole cells toward positive x and positive z. The first
/// entry is the reference corner; the walk then proceeds away from it, one
/// line across the board's depth at a time. South and west boards are the
/// point mirror of north and east boards, and east/west boards swap which
/// surface axis carries the board's width.
#[must_use]
pub fn border_offsets(board: BoardDimensions, facing: Facing) -> Vec<(i64, i64)> {
    let (span_x, span_z) = if facing.swaps_axes() {
        (i64::from(board.depth()), i64::from(board.width()))
    } else {
        (i64::from(board.width()), i64::from(board.depth()))
    };
    let sign = facing.multiplier();
    let corner_x = sign * (span_x / 2);
    let corner_z = -sign * (span_z / 2);

    let capacity = usize::try_from(board.perimeter_tiles()).unwrap_or(0);
    let mut offsets = Vec::with_capacity(capacity);
    for i in 0..span_x {
        let mut push = |j: i64| offsets.push((corner_x - sign * i, corner_z + sign * j));
        if i == 0 || i == span_x - 1 {
            (0..span_z).for_each(&mut push);
        } else {
            push(0);
            if span_z > 1 {
                push(span_z - 1);
            }
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use arrehab_core::{Axis, CellSize, SurfaceExtent, SurfacePoint};

    fn grid(width: f32, depth: f32) -> TileGrid {
        let mut events = Vec::new();
        TileGrid::build(
            SurfaceExtent::new(width, depth),
            SurfacePoint::ORIGIN,
            CellSize::new(0.5, 0.5),
            &mut events,
        )
    }

    fn index_at(grid: &TileGrid, x: f32, z: f32) -> TileIndex {
        grid.lookup(SurfacePoint::new(x, z))
            .expect("position resolves to a tile")
            .index()
    }

    fn spans(grid: &TileGrid, tiles: &[TileIndex]) -> (usize, usize) {
        let columns: BTreeSet<u32> = tiles.iter().map(TileIndex::column).collect();
        let rows: BTreeSet<u32> = tiles.iter().map(TileIndex::row).collect();
        assert!(tiles.iter().all(|tile| grid.cell(*tile).is_some()));
        (columns.len(), rows.len())
    }

    #[test]
    fn north_outline_around_origin_has_twelve_tiles() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        let center = index_at(&grid, 0.0, 0.0);

        let tiles = locator
            .recompute(&mut grid, center, &mut events)
            .expect("board fits")
            .to_vec();

        assert_eq!(tiles.len(), 12);
        assert_eq!(spans(&grid, &tiles), (3, 5));
    }

    #[test]
    fn east_outline_swaps_spanned_axes() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        let center = index_at(&grid, 0.0, 0.0);
        locator.set_facing(Facing::East);

        let tiles = locator
            .recompute(&mut grid, center, &mut events)
            .expect("board fits")
            .to_vec();

        assert_eq!(tiles.len(), 12);
        assert_eq!(spans(&grid, &tiles), (5, 3));
    }

    #[test]
    fn center_on_extremal_column_is_rejected() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        let edge = grid.extremal(Axis::X).expect("cells").index();

        let result = locator.recompute(&mut grid, edge, &mut events);

        assert_eq!(result, Err(OutlineError::InvalidCenter));
        assert!(locator.is_empty());
        assert_eq!(
            events,
            vec![Event::OutlineRejected {
                reason: OutlineError::InvalidCenter
            }]
        );
    }

    #[test]
    fn missing_far_side_reports_incomplete_border() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        // The north corner lies toward +x and -z, so a center on the -x edge
        // keeps the corner but loses the far side.
        let center = index_at(&grid, -2.25, 0.25);

        let result = locator.recompute(&mut grid, center, &mut events);

        assert_eq!(result, Err(OutlineError::IncompleteBorder));
        assert!(grid.cells().all(|cell| !cell.is_outline()));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TileRestyled { .. })));
    }

    #[test]
    fn only_outline_tiles_are_flagged() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        let first = index_at(&grid, 0.25, 0.25);
        let second = index_at(&grid, -0.25, -0.75);

        let _ = locator
            .recompute(&mut grid, first, &mut events)
            .expect("board fits");
        let tiles: BTreeSet<TileIndex> = locator
            .recompute(&mut grid, second, &mut events)
            .expect("board fits")
            .iter()
            .copied()
            .collect();

        for cell in grid.cells() {
            assert_eq!(cell.is_outline(), tiles.contains(&cell.index()));
        }
    }

    #[test]
    fn south_outline_mirrors_north_across_center() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(4, 5));
        let mut events = Vec::new();
        let center = index_at(&grid, 0.25, 0.25);
        let center_position = grid.cell(center).expect("cell").position();

        let positions = |grid: &TileGrid, tiles: &[TileIndex]| -> Vec<(i32, i32)> {
            let mut offsets: Vec<(i32, i32)> = tiles
                .iter()
                .map(|tile| {
                    let position = grid.cell(*tile).expect("cell").position();
                    (
                        ((position.x() - center_position.x()) / 0.5).round() as i32,
                        ((position.z() - center_position.z()) / 0.5).round() as i32,
                    )
                })
                .collect();
            offsets.sort_unstable();
            offsets
        };

        let north = locator
            .recompute(&mut grid, center, &mut events)
            .expect("north fits")
            .to_vec();
        let north = positions(&grid, &north);
        locator.set_facing(Facing::South);
        let south = locator
            .recompute(&mut grid, center, &mut events)
            .expect("south fits")
            .to_vec();
        let south = positions(&grid, &south);

        let mut mirrored: Vec<(i32, i32)> = north.iter().map(|(x, z)| (-x, -z)).collect();
        mirrored.sort_unstable();
        assert_eq!(south, mirrored);
    }

    #[test]
    fn clear_restores_plain_appearance() {
        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(BoardDimensions::new(3, 5));
        let mut events = Vec::new();
        let center = index_at(&grid, 0.25, 0.25);
        let _ = locator
            .recompute(&mut grid, center, &mut events)
            .expect("board fits");
        events.clear();

        locator.clear(&mut grid, &mut events);

        assert!(locator.is_empty());
        assert!(locator.center().is_none());
        assert!(grid.cells().all(|cell| !cell.is_outline()));
        let restored = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::TileRestyled {
                        appearance: TileAppearance::Plain,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(restored, 12);
        assert_eq!(events.last(), Some(&Event::OutlineCleared));
    }

    #[test]
    fn reference_corner_leads_the_walk() {
        let offsets = border_offsets(BoardDimensions::new(3, 5), Facing::North);

        assert_eq!(offsets.first(), Some(&(1, -2)));
        assert_eq!(offsets.len(), 12);
        let west = border_offsets(BoardDimensions::new(3, 5), Facing::West);
        assert_eq!(west.first(), Some(&(-2, 1)));
    }

    #[test]
    fn walk_visits_each_border_tile_once() {
        for (width, depth) in [(1, 1), (1, 4), (4, 1), (2, 2), (3, 5), (6, 4)] {
            let board = BoardDimensions::new(width, depth);
            for facing in Facing::ALL {
                let offsets = border_offsets(board, facing);
                let unique: BTreeSet<(i64, i64)> = offsets.iter().copied().collect();
                assert_eq!(offsets.len(), board.perimeter_tiles() as usize);
                assert_eq!(unique.len(), offsets.len(), "{board:?} {facing:?}");
            }
        }
    }

    #[test]
    fn huge_boards_only_walk_their_edges() {
        let board = BoardDimensions::new(100_000, 100_000);

        let offsets = border_offsets(board, Facing::North);

        assert_eq!(offsets.len(), 399_996);
        assert_eq!(offsets.first(), Some(&(50_000, -50_000)));

        let mut grid = grid(5.0, 5.0);
        let mut locator = OutlineLocator::new(board);
        let mut events = Vec::new();
        let center = index_at(&grid, 0.0, 0.0);
        assert_eq!(
            locator.recompute(&mut grid, center, &mut events),
            Err(OutlineError::InvalidCenter)
        );
    }
}
