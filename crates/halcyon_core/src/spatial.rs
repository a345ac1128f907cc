//! # Spatial Hash
//!
//! Incremental grid broad phase.
//!
//! The world plane is cut into square cells of a size fixed at
//! construction. Each entity occupies the inclusive range of cells its
//! rectangle overlaps, so an entity straddling a boundary is found from every
//! cell it touches. Cells that become empty are dropped, which makes an
//! insert followed by a remove leave the grid exactly as it was.
//!
//! Queries return *candidates*: entities sharing at least one cell. Exact
//! overlap is checked by the caller.

use std::collections::{HashMap, HashSet};

use crate::ecs::EntityId;
use crate::math::{Rect2, Vec2};

/// Integer grid cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Cells occupied by one entity, as an inclusive range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialHashHandle {
    /// Rectangle the range was computed from.
    pub rect: Rect2,
    /// Top-left occupied cell.
    pub min: CellCoord,
    /// Bottom-right occupied cell (inclusive).
    pub max: CellCoord,
}

impl SpatialHashHandle {
    /// Checks if the range includes `cell`.
    #[inline]
    #[must_use]
    pub const fn contains_cell(&self, cell: CellCoord) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Iterates over the occupied cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
    }

    const fn same_cells(&self, other: &Self) -> bool {
        self.min.x == other.min.x
            && self.min.y == other.min.y
            && self.max.x == other.max.x
            && self.max.y == other.max.y
    }
}

/// Grid of cells mapping to the entities overlapping them.
#[derive(Debug)]
pub struct SpatialHashMap {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<EntityId>>,
    handles: HashMap<EntityId, SpatialHashHandle>,
}

impl SpatialHashMap {
    /// Creates an empty grid.
    ///
    /// Non-positive or non-finite sizes fall back to one unit.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            handles: HashMap::new(),
        }
    }

    /// Returns the cell edge length.
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the cell containing a point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, point: Vec2) -> CellCoord {
        CellCoord::new(
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    fn handle_for(&self, rect: Rect2) -> SpatialHashHandle {
        SpatialHashHandle {
            rect,
            min: self.cell_of(Vec2::new(rect.x, rect.y)),
            max: self.cell_of(Vec2::new(rect.right(), rect.bottom())),
        }
    }

    /// Inserts an entity or moves it to `rect`.
    ///
    /// Only the difference between the old and the new cell range is
    /// touched; an unchanged range only refreshes the stored rect.
    pub fn insert_or_update(&mut self, entity: EntityId, rect: Rect2) -> SpatialHashHandle {
        let new = self.handle_for(rect);

        match self.handles.get(&entity).copied() {
            Some(old) if old.same_cells(&new) => {}
            Some(old) => {
                for cell in old.cells().filter(|&c| !new.contains_cell(c)) {
                    self.remove_from_cell(cell, entity);
                }
                for cell in new.cells().filter(|&c| !old.contains_cell(c)) {
                    self.cells.entry(cell).or_default().push(entity);
                }
            }
            None => {
                for cell in new.cells() {
                    self.cells.entry(cell).or_default().push(entity);
                }
            }
        }

        self.handles.insert(entity, new);
        new
    }

    /// Removes an entity from every cell it occupies.
    ///
    /// # Returns
    ///
    /// The entity's last handle, or `None` if it was not in the grid.
    pub fn remove(&mut self, entity: EntityId) -> Option<SpatialHashHandle> {
        let handle = self.handles.remove(&entity)?;
        for cell in handle.cells() {
            self.remove_from_cell(cell, entity);
        }
        Some(handle)
    }

    fn remove_from_cell(&mut self, cell: CellCoord, entity: EntityId) {
        if let Some(entities) = self.cells.get_mut(&cell) {
            entities.retain(|&e| e != entity);
            if entities.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Returns the handle of an entity.
    #[inline]
    #[must_use]
    pub fn handle(&self, entity: EntityId) -> Option<&SpatialHashHandle> {
        self.handles.get(&entity)
    }

    /// Checks if an entity is in the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.handles.contains_key(&entity)
    }

    /// Candidate collisions for an entity: every other entity sharing a
    /// cell, deduplicated, in first-encounter order.
    ///
    /// An entity not in the grid yields an empty list.
    #[must_use]
    pub fn compute_collisions(&self, entity: EntityId) -> Vec<EntityId> {
        let Some(handle) = self.handles.get(&entity) else {
            return Vec::new();
        };
        self.collect(handle.cells(), Some(entity))
    }

    /// Candidates whose cells include the one containing `point`.
    #[must_use]
    pub fn compute_point_collisions(&self, point: Vec2) -> Vec<EntityId> {
        self.entities_in_cell(self.cell_of(point)).to_vec()
    }

    /// Candidates sharing a cell with `rect`.
    #[must_use]
    pub fn compute_rect_collisions(&self, rect: Rect2) -> Vec<EntityId> {
        self.collect(self.handle_for(rect).cells(), None)
    }

    fn collect(&self, cells: impl Iterator<Item = CellCoord>, exclude: Option<EntityId>) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cell in cells {
            for &other in self.entities_in_cell(cell) {
                if Some(other) != exclude && seen.insert(other) {
                    out.push(other);
                }
            }
        }
        out
    }

    /// Entities in one cell, in insertion order.
    #[must_use]
    pub fn entities_in_cell(&self, cell: CellCoord) -> &[EntityId] {
        match self.cells.get(&cell) {
            Some(entities) => entities,
            None => &[],
        }
    }

    /// Number of non-empty cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of entities in the grid.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Checks if the grid is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.handles.clear();
    }

    /// Occupancy snapshot, sorted, for comparing grid states.
    #[must_use]
    pub fn occupancy(&self) -> Vec<(CellCoord, Vec<EntityId>)> {
        let mut cells: Vec<_> = self
            .cells
            .iter()
            .map(|(&cell, entities)| {
                let mut entities = entities.clone();
                entities.sort_unstable();
                (cell, entities)
            })
            .collect();
        cells.sort_unstable_by_key(|(cell, _)| *cell);
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_straddling_rect_occupies_all_cells() {
        let mut grid = SpatialHashMap::new(64.0);
        let handle = grid.insert_or_update(id(0), Rect2::new(60.0, 60.0, 10.0, 10.0));
        assert_eq!(handle.min, CellCoord::new(0, 0));
        assert_eq!(handle.max, CellCoord::new(1, 1));
        assert_eq!(grid.cell_count(), 4);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let grid = SpatialHashMap::new(64.0);
        assert_eq!(grid.cell_of(Vec2::new(-1.0, -64.0)), CellCoord::new(-1, -1));
        assert_eq!(grid.cell_of(Vec2::new(-65.0, 0.0)), CellCoord::new(-2, 0));
    }

    #[test]
    fn test_insert_remove_round_trip() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(1), Rect2::new(0.0, 0.0, 10.0, 10.0));
        let before = grid.occupancy();

        grid.insert_or_update(id(2), Rect2::new(50.0, 50.0, 100.0, 100.0));
        grid.remove(id(2));
        assert_eq!(grid.occupancy(), before);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut grid = SpatialHashMap::new(64.0);
        let rect = Rect2::new(10.0, 10.0, 80.0, 10.0);
        grid.insert_or_update(id(0), rect);
        let before = grid.occupancy();
        grid.insert_or_update(id(0), rect);
        assert_eq!(grid.occupancy(), before);
        assert_eq!(grid.entities_in_cell(CellCoord::new(0, 0)), &[id(0)]);
    }

    #[test]
    fn test_move_leaves_old_cells() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        grid.insert_or_update(id(0), Rect2::new(200.0, 200.0, 10.0, 10.0));
        assert!(grid.entities_in_cell(CellCoord::new(0, 0)).is_empty());
        assert_eq!(grid.entities_in_cell(CellCoord::new(3, 3)), &[id(0)]);
        assert_eq!(grid.cell_count(), 1);
    }

    #[test]
    fn test_collisions_deduplicated() {
        let mut grid = SpatialHashMap::new(64.0);
        // Both span the same four cells
        grid.insert_or_update(id(0), Rect2::new(60.0, 60.0, 10.0, 10.0));
        grid.insert_or_update(id(1), Rect2::new(62.0, 62.0, 10.0, 10.0));
        grid.insert_or_update(id(2), Rect2::new(500.0, 500.0, 10.0, 10.0));

        assert_eq!(grid.compute_collisions(id(0)), vec![id(1)]);
        assert!(grid.compute_collisions(id(2)).is_empty());
    }

    #[test]
    fn test_unknown_entity_yields_empty() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        assert!(grid.compute_collisions(id(9)).is_empty());
        assert!(grid.remove(id(9)).is_none());
    }

    #[test]
    fn test_point_and_rect_queries() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        grid.insert_or_update(id(1), Rect2::new(100.0, 0.0, 10.0, 10.0));

        assert_eq!(grid.compute_point_collisions(Vec2::new(5.0, 5.0)), vec![id(0)]);
        assert_eq!(
            grid.compute_rect_collisions(Rect2::new(0.0, 0.0, 120.0, 10.0)),
            vec![id(0), id(1)]
        );
    }
}
