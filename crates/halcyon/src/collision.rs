//! # Narrow Phase
//!
//! Exact overlap tests on top of the spatial hash broad phase.
//!
//! Rectangles are the ones stored in the grid, so results reflect the last
//! collider refresh (every fixed update, and immediately when a script moves
//! its entity).

use halcyon_core::{EntityId, Rect2, SpatialHashMap, Vec2};

/// Colliders whose rectangle overlaps `entity`'s, in broad-phase order.
///
/// An entity not in the grid collides with nothing.
#[must_use]
pub fn process_entity_collisions(spatial: &SpatialHashMap, entity: EntityId) -> Vec<EntityId> {
    let Some(handle) = spatial.handle(entity) else {
        return Vec::new();
    };
    let rect = handle.rect;
    spatial
        .compute_collisions(entity)
        .into_iter()
        .filter(|other| {
            spatial
                .handle(*other)
                .is_some_and(|h| h.rect.intersects(&rect))
        })
        .collect()
}

/// Colliders containing `point`.
#[must_use]
pub fn process_point_collisions(spatial: &SpatialHashMap, point: Vec2) -> Vec<EntityId> {
    spatial
        .compute_point_collisions(point)
        .into_iter()
        .filter(|other| {
            spatial
                .handle(*other)
                .is_some_and(|h| h.rect.contains_point(point))
        })
        .collect()
}

/// Colliders overlapping `rect`.
#[must_use]
pub fn process_rect_collisions(spatial: &SpatialHashMap, rect: Rect2) -> Vec<EntityId> {
    spatial
        .compute_rect_collisions(rect)
        .into_iter()
        .filter(|other| {
            spatial
                .handle(*other)
                .is_some_and(|h| h.rect.intersects(&rect))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_same_cell_without_overlap_filtered() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        grid.insert_or_update(id(1), Rect2::new(40.0, 40.0, 10.0, 10.0));
        grid.insert_or_update(id(2), Rect2::new(5.0, 5.0, 10.0, 10.0));

        assert_eq!(grid.compute_collisions(id(0)).len(), 2);
        assert_eq!(process_entity_collisions(&grid, id(0)), vec![id(2)]);
    }

    #[test]
    fn test_point_inside_only() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        grid.insert_or_update(id(1), Rect2::new(20.0, 0.0, 10.0, 10.0));

        assert_eq!(process_point_collisions(&grid, Vec2::new(25.0, 5.0)), vec![id(1)]);
        assert!(process_point_collisions(&grid, Vec2::new(15.0, 5.0)).is_empty());
    }

    #[test]
    fn test_rect_query() {
        let mut grid = SpatialHashMap::new(64.0);
        grid.insert_or_update(id(0), Rect2::new(0.0, 0.0, 10.0, 10.0));
        grid.insert_or_update(id(1), Rect2::new(30.0, 0.0, 10.0, 10.0));

        assert_eq!(
            process_rect_collisions(&grid, Rect2::new(8.0, 0.0, 10.0, 10.0)),
            vec![id(0)]
        );
    }
}
