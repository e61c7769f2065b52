//! Tile lattice covering the tracked floor surface.

use arrehab_core::{Axis, CellSize, Event, SurfaceExtent, SurfacePoint, TileIndex};

/// Slack applied when counting how many cells fit along an axis, so extents
/// that are whole multiples of the cell size are not lost to float rounding.
const FIT_EPSILON: f32 = 1e-4;

/// Single tile position generated for the current lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    index: TileIndex,
    position: SurfacePoint,
    outlined: bool,
}

impl Cell {
    fn new(index: TileIndex, position: SurfacePoint) -> Self {
        Self {
            index,
            position,
            outlined: false,
        }
    }

    /// Lattice index of the cell.
    #[must_use]
    pub const fn index(&self) -> TileIndex {
        self.index
    }

    /// Surface-space center of the cell.
    #[must_use]
    pub const fn position(&self) -> SurfacePoint {
        self.position
    }

    /// Reports whether the cell belongs to the highlighted outline.
    #[must_use]
    pub const fn is_outline(&self) -> bool {
        self.outlined
    }

    pub(crate) fn set_outline(&mut self, outlined: bool) {
        self.outlined = outlined;
    }
}

/// Regular lattice of fixed-size cells laid over a rectangular surface.
///
/// Cells are stored densely in column-major order. Column zero holds the
/// cells with the largest x coordinate and row zero those with the largest z
/// coordinate, mirroring the corner the lattice is generated from.
#[derive(Clone, Debug)]
pub struct TileGrid {
    cell_size: CellSize,
    extent: SurfaceExtent,
    center: SurfacePoint,
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
    max_x: Option<f32>,
    max_z: Option<f32>,
}

impl TileGrid {
    /// Generates a lattice covering `extent`, anchored at `center`.
    ///
    /// A `TileCreated` event is emitted for every generated cell.
    #[must_use]
    pub fn build(
        extent: SurfaceExtent,
        center: SurfacePoint,
        cell_size: CellSize,
        out_events: &mut Vec<Event>,
    ) -> Self {
        let mut grid = Self {
            cell_size,
            extent,
            center,
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            max_x: None,
            max_z: None,
        };
        grid.generate(out_events);
        grid
    }

    /// Absorbs a new estimate of the same surface.
    ///
    /// The lattice is regenerated only when the surface grew enough for at
    /// least one more cell to fit along either axis; smaller changes leave
    /// every cell untouched. With `max` the outermost cell center, that is
    /// `extent >= 2 * max + 2 * cell` on some axis: `2 * max + cell` is the
    /// span already covered and one further cell must fit beyond it.
    /// Non-finite extents never regenerate. Returns `true` when the lattice
    /// was replaced.
    pub fn update(
        &mut self,
        extent: SurfaceExtent,
        center: SurfacePoint,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.has_room_to_grow(extent) {
            log::debug!(
                "surface estimate {:.3}x{:.3} fits no additional tiles",
                extent.width(),
                extent.depth()
            );
            return false;
        }

        out_events.extend(
            self.cells
                .drain(..)
                .map(|cell| Event::TileDiscarded { tile: cell.index }),
        );
        self.extent = extent;
        self.center = center;
        self.generate(out_events);
        true
    }

    /// Returns the cell `point` belongs to.
    ///
    /// A point belongs to a cell when it lies no more than half a cell from
    /// that cell's center on each axis. A point exactly between two centers
    /// resolves to the cell with the higher index, i.e. toward negative x or
    /// negative z.
    #[must_use]
    pub fn lookup(&self, point: SurfacePoint) -> Option<&Cell> {
        let column = self.nearest_step(point.x(), Axis::X)?;
        let row = self.nearest_step(point.z(), Axis::Z)?;
        self.cell(TileIndex::new(column, row))
    }

    /// Returns the cell with the largest coordinate along `axis`.
    #[must_use]
    pub fn extremal(&self, axis: Axis) -> Option<&Cell> {
        self.cells.iter().max_by(|left, right| {
            let left = along(left.position, axis);
            let right = along(right.position, axis);
            left.total_cmp(&right)
        })
    }

    /// Retrieves the cell stored at `index`.
    #[must_use]
    pub fn cell(&self, index: TileIndex) -> Option<&Cell> {
        self.slot(index).and_then(|slot| self.cells.get(slot))
    }

    pub(crate) fn cell_mut(&mut self, index: TileIndex) -> Option<&mut Cell> {
        self.slot(index).and_then(|slot| self.cells.get_mut(slot))
    }

    /// Steps `dx` cells toward positive x and `dz` cells toward positive z.
    ///
    /// Returns `None` when the destination falls outside the lattice.
    #[must_use]
    pub fn offset(&self, index: TileIndex, dx: i64, dz: i64) -> Option<TileIndex> {
        let column = i64::from(index.column()) - dx;
        let row = i64::from(index.row()) - dz;
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }
        Some(TileIndex::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// Iterator over every cell in generation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Number of cells in the lattice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the surface was too small to hold a single cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of columns along the surface width.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows along the surface depth.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Surface extent the lattice was generated from.
    #[must_use]
    pub const fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    /// World-space anchor of the surface the lattice was generated for.
    #[must_use]
    pub const fn center(&self) -> SurfacePoint {
        self.center
    }

    /// Footprint of a single cell.
    #[must_use]
    pub const fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    fn generate(&mut self, out_events: &mut Vec<Event>) {
        let size_x = self.cell_size.width();
        let size_z = self.cell_size.depth();
        self.columns = cells_fitting(self.extent.width(), size_x);
        self.rows = cells_fitting(self.extent.depth(), size_z);
        if self.columns == 0 || self.rows == 0 {
            self.columns = 0;
            self.rows = 0;
        }

        let corner_x = self.anchor(Axis::X);
        let corner_z = self.anchor(Axis::Z);
        let capacity = usize::try_from(u64::from(self.columns) * u64::from(self.rows)).unwrap_or(0);
        self.cells = Vec::with_capacity(capacity);

        for column in 0..self.columns {
            let x = corner_x - column as f32 * size_x;
            for row in 0..self.rows {
                let z = corner_z - row as f32 * size_z;
                let cell = Cell::new(TileIndex::new(column, row), SurfacePoint::new(x, z));
                out_events.push(Event::TileCreated {
                    tile: cell.index,
                    position: cell.position,
                });
                self.cells.push(cell);
            }
        }

        self.max_x = self.extremal(Axis::X).map(|cell| cell.position.x());
        self.max_z = self.extremal(Axis::Z).map(|cell| cell.position.z());

        log::info!(
            "generated {}x{} tile grid for {:.3}x{:.3} surface",
            self.columns,
            self.rows,
            self.extent.width(),
            self.extent.depth()
        );
        out_events.push(Event::GridBuilt {
            center: self.center,
            columns: self.columns,
            rows: self.rows,
        });
    }

    fn has_room_to_grow(&self, extent: SurfaceExtent) -> bool {
        if !extent.width().is_finite() || !extent.depth().is_finite() {
            return false;
        }
        if self.cells.is_empty() {
            return cells_fitting(extent.width(), self.cell_size.width()) > 0
                && cells_fitting(extent.depth(), self.cell_size.depth()) > 0;
        }

        [(Axis::X, self.max_x), (Axis::Z, self.max_z)]
            .into_iter()
            .any(|(axis, max)| {
                let size = self.cell_size.along(axis);
                let covered = max.map_or(0.0, |max| 2.0 * max + size);
                extent.along(axis) + FIT_EPSILON * size >= covered + size
            })
    }

    /// Coordinate of the outermost cell center along `axis`.
    fn anchor(&self, axis: Axis) -> f32 {
        let count = match axis {
            Axis::X => self.columns,
            Axis::Z => self.rows,
        };
        count.saturating_sub(1) as f32 * self.cell_size.along(axis) / 2.0
    }

    fn nearest_step(&self, value: f32, axis: Axis) -> Option<u32> {
        let count = match axis {
            Axis::X => self.columns,
            Axis::Z => self.rows,
        };
        if count == 0 {
            return None;
        }
        let steps = (self.anchor(axis) - value) / self.cell_size.along(axis);
        let last = (count - 1) as f32;
        if !steps.is_finite() || steps < -0.5 || steps > last + 0.5 {
            return None;
        }
        // `round` sends halves away from zero, i.e. to the higher index.
        Some(steps.round().clamp(0.0, last) as u32)
    }

    fn slot(&self, index: TileIndex) -> Option<usize> {
        if index.column() < self.columns && index.row() < self.rows {
            let column = usize::try_from(index.column()).ok()?;
            let row = usize::try_from(index.row()).ok()?;
            let height = usize::try_from(self.rows).ok()?;
            Some(column * height + row)
        } else {
            None
        }
    }
}

fn along(point: SurfacePoint, axis: Axis) -> f32 {
    match axis {
        Axis::X => point.x(),
        Axis::Z => point.z(),
    }
}

fn cells_fitting(extent: f32, size: f32) -> u32 {
    if !extent.is_finite() || !size.is_finite() || size <= 0.0 {
        return 0;
    }
    (extent / size + FIT_EPSILON).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_METER: CellSize = CellSize::new(0.5, 0.5);

    fn grid(width: f32, depth: f32) -> TileGrid {
        let mut events = Vec::new();
        TileGrid::build(
            SurfaceExtent::new(width, depth),
            SurfacePoint::ORIGIN,
            HALF_METER,
            &mut events,
        )
    }

    #[test]
    fn two_meter_surface_holds_sixteen_tiles() {
        let mut events = Vec::new();
        let grid = TileGrid::build(
            SurfaceExtent::new(2.0, 2.0),
            SurfacePoint::ORIGIN,
            HALF_METER,
            &mut events,
        );

        assert_eq!(grid.len(), 16);
        assert_eq!((grid.columns(), grid.rows()), (4, 4));
        let created = events
            .iter()
            .filter(|event| matches!(event, Event::TileCreated { .. }))
            .count();
        assert_eq!(created, 16);
        assert!(matches!(
            events.last(),
            Some(Event::GridBuilt {
                columns: 4,
                rows: 4,
                ..
            })
        ));
    }

    #[test]
    fn generation_starts_from_the_positive_corner() {
        let grid = grid(2.0, 2.0);
        let first = grid.cells().next().expect("grid has cells");

        assert_eq!(first.index(), TileIndex::new(0, 0));
        assert_eq!(first.position(), SurfacePoint::new(0.75, 0.75));
        let last = grid.cell(TileIndex::new(3, 3)).expect("last cell");
        assert_eq!(last.position(), SurfacePoint::new(-0.75, -0.75));
    }

    #[test]
    fn leftover_margin_is_split_evenly() {
        let grid = grid(2.2, 1.0);

        assert_eq!((grid.columns(), grid.rows()), (4, 2));
        let max_x = grid.extremal(Axis::X).expect("cells").position().x();
        let min_x = grid
            .cells()
            .map(|cell| cell.position().x())
            .fold(f32::INFINITY, f32::min);
        assert!((max_x + min_x).abs() < 1e-5);
    }

    #[test]
    fn surface_smaller_than_a_tile_yields_empty_grid() {
        let grid = grid(0.4, 3.0);

        assert!(grid.is_empty());
        assert!(grid.extremal(Axis::X).is_none());
        assert!(grid.lookup(SurfacePoint::ORIGIN).is_none());
    }

    #[test]
    fn update_with_same_extent_is_a_no_op() {
        let mut grid = grid(2.0, 2.0);
        let before: Vec<Cell> = grid.cells().copied().collect();
        let mut events = Vec::new();

        let regenerated = grid.update(
            SurfaceExtent::new(2.0, 2.0),
            SurfacePoint::new(0.1, 0.1),
            &mut events,
        );

        assert!(!regenerated);
        assert!(events.is_empty());
        assert_eq!(grid.cells().copied().collect::<Vec<_>>(), before);
        assert_eq!(grid.center(), SurfacePoint::ORIGIN);
    }

    #[test]
    fn marginal_growth_keeps_existing_cells() {
        let mut grid = grid(2.0, 2.0);
        let mut events = Vec::new();

        assert!(!grid.update(SurfaceExtent::new(2.3, 2.45), SurfacePoint::ORIGIN, &mut events));
        assert_eq!(grid.len(), 16);
    }

    #[test]
    fn growth_past_threshold_regenerates_everything() {
        let mut grid = grid(2.0, 2.0);
        let mut events = Vec::new();

        assert!(grid.update(SurfaceExtent::new(5.0, 5.0), SurfacePoint::ORIGIN, &mut events));
        assert_eq!(grid.len(), 100);
        let discarded = events
            .iter()
            .filter(|event| matches!(event, Event::TileDiscarded { .. }))
            .count();
        assert_eq!(discarded, 16);
    }

    #[test]
    fn growth_along_one_axis_is_enough() {
        let mut grid = grid(2.0, 2.0);
        let mut events = Vec::new();

        assert!(grid.update(SurfaceExtent::new(2.0, 2.5), SurfacePoint::ORIGIN, &mut events));
        assert_eq!((grid.columns(), grid.rows()), (4, 5));
    }

    #[test]
    fn stale_coordinates_are_unreachable_after_regeneration() {
        let mut grid = grid(1.5, 1.5);
        assert!(grid.lookup(SurfacePoint::ORIGIN).is_some());
        let mut events = Vec::new();

        assert!(grid.update(SurfaceExtent::new(2.0, 2.0), SurfacePoint::ORIGIN, &mut events));
        assert!(grid
            .cells()
            .all(|cell| cell.position() != SurfacePoint::ORIGIN));
        assert!(grid.lookup(SurfacePoint::new(0.25, -0.25)).is_some());
    }

    #[test]
    fn lookup_resolves_anywhere_within_half_a_cell() {
        let grid = grid(2.0, 2.0);

        let cell = grid
            .lookup(SurfacePoint::new(0.27, -0.23))
            .expect("near the center");
        assert_eq!(cell.position(), SurfacePoint::new(0.25, -0.25));
        let cell = grid
            .lookup(SurfacePoint::new(0.45, -0.05))
            .expect("inside the tile");
        assert_eq!(cell.position(), SurfacePoint::new(0.25, -0.25));
        let cell = grid
            .lookup(SurfacePoint::new(0.95, -0.95))
            .expect("on the outer tile edge");
        assert_eq!(cell.position(), SurfacePoint::new(0.75, -0.75));
        assert!(grid.lookup(SurfacePoint::new(1.1, 0.25)).is_none());
        assert!(grid.lookup(SurfacePoint::new(0.25, -1.1)).is_none());
    }

    #[test]
    fn points_between_centers_resolve_toward_negative_axes() {
        let grid = grid(2.0, 2.0);

        let cell = grid.lookup(SurfacePoint::ORIGIN).expect("origin resolves");
        assert_eq!(cell.position(), SurfacePoint::new(-0.25, -0.25));
        assert_eq!(cell.index(), TileIndex::new(2, 2));
        let cell = grid
            .lookup(SurfacePoint::new(0.5, 0.25))
            .expect("edge between columns resolves");
        assert_eq!(cell.position(), SurfacePoint::new(0.25, 0.25));
    }

    #[test]
    fn infinite_extent_leaves_grid_untouched() {
        let mut grid = grid(2.0, 2.0);
        let mut events = Vec::new();

        assert!(!grid.update(
            SurfaceExtent::new(f32::INFINITY, 2.0),
            SurfacePoint::ORIGIN,
            &mut events,
        ));
        assert!(!grid.update(SurfaceExtent::new(f32::NAN, 9.0), SurfacePoint::ORIGIN, &mut events));
        assert!(events.is_empty());
        assert_eq!(grid.len(), 16);
    }

    #[test]
    fn offsets_follow_surface_axes() {
        let grid = grid(2.0, 2.0);
        let origin = TileIndex::new(1, 1);

        let moved = grid.offset(origin, 1, -2).expect("inside lattice");
        let before = grid.cell(origin).expect("cell").position();
        let after = grid.cell(moved).expect("cell").position();
        assert!((after.x() - before.x() - 0.5).abs() < 1e-6);
        assert!((after.z() - before.z() + 1.0).abs() < 1e-6);
        assert!(grid.offset(origin, 2, 0).is_none());
    }
}
