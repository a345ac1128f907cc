//! # Scene Tree
//!
//! Parent/child links between entities.
//!
//! The tree stores topology and per-node time dilation. Cached transforms
//! notice a new parent on their next resolve, so reparenting needs no eager
//! invalidation.

use crate::ecs::EntityId;

#[derive(Clone, Debug)]
struct SceneNode {
    id: EntityId,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    time_dilation: f32,
}

impl SceneNode {
    const fn new(id: EntityId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            time_dilation: 1.0,
        }
    }
}

/// Entity hierarchy with a single root.
///
/// Nodes live in a direct-indexed table keyed by entity index; generations
/// are checked so a stale id never aliases a reused slot.
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    nodes: Vec<Option<SceneNode>>,
    root: Option<EntityId>,
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, entity: EntityId) -> Option<&SceneNode> {
        self.nodes
            .get(entity.index() as usize)?
            .as_ref()
            .filter(|node| node.id == entity)
    }

    fn node_mut(&mut self, entity: EntityId) -> Option<&mut SceneNode> {
        self.nodes
            .get_mut(entity.index() as usize)?
            .as_mut()
            .filter(|node| node.id == entity)
    }

    fn ensure_node(&mut self, entity: EntityId) -> &mut SceneNode {
        let index = entity.index() as usize;
        if self.nodes.len() <= index {
            self.nodes.resize(index + 1, None);
        }
        let slot = &mut self.nodes[index];
        if slot.as_ref().map_or(true, |node| node.id != entity) {
            *slot = Some(SceneNode::new(entity));
        }
        slot.get_or_insert_with(|| SceneNode::new(entity))
    }

    /// Adds an entity without a parent.
    pub fn insert(&mut self, entity: EntityId) {
        self.ensure_node(entity);
    }

    /// Sets the scene root.
    ///
    /// # Panics
    ///
    /// Panics if a root is already set; replacing a live root is a
    /// programming error. Call [`SceneTree::remove`] on the old root first.
    pub fn set_root(&mut self, entity: EntityId) {
        assert!(
            self.root.is_none(),
            "scene root already set to {:?}",
            self.root
        );
        self.ensure_node(entity);
        self.root = Some(entity);
    }

    /// Returns the scene root.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Option<EntityId> {
        self.root
    }

    /// Checks if the entity is part of the tree.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.node(entity).is_some()
    }

    /// Attaches `child` under `parent`, detaching it from any previous parent.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if the link would create a cycle.
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId) -> bool {
        if child == parent || self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        self.ensure_node(parent).children.push(child);
        self.ensure_node(child).parent = Some(parent);
        true
    }

    /// Removes the link between `child` and its parent.
    pub fn detach(&mut self, child: EntityId) {
        let Some(parent) = self.node_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != child);
        }
    }

    /// Removes an entity from the tree.
    ///
    /// Its children are left without a parent; remove them first (see
    /// [`SceneTree::descendants`]) to delete a whole subtree.
    pub fn remove(&mut self, entity: EntityId) {
        if !self.contains(entity) {
            return;
        }
        self.detach(entity);
        let Some(node) = self.nodes[entity.index() as usize].take() else {
            return;
        };
        for child in node.children {
            if let Some(child_node) = self.node_mut(child) {
                child_node.parent = None;
            }
        }
        if self.root == Some(entity) {
            self.root = None;
        }
    }

    /// Returns the parent of an entity.
    #[inline]
    #[must_use]
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.node(entity)?.parent
    }

    /// Returns the children of an entity in attach order.
    #[must_use]
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        match self.node(entity) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Checks if `ancestor` is above `entity` in the tree.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut current = self.parent(entity);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Own time dilation of a node, `1.0` for entities outside the tree.
    #[must_use]
    pub fn time_dilation(&self, entity: EntityId) -> f32 {
        self.node(entity).map_or(1.0, |node| node.time_dilation)
    }

    /// Sets the time dilation of a node.
    ///
    /// Negative and NaN values clamp to `0.0` (frozen). Returns `false` if the
    /// entity is not in the tree.
    pub fn set_time_dilation(&mut self, entity: EntityId, dilation: f32) -> bool {
        let Some(node) = self.node_mut(entity) else {
            return false;
        };
        node.time_dilation = dilation.max(0.0);
        true
    }

    /// Effective time dilation: the node's own value times that of every
    /// ancestor.
    #[must_use]
    pub fn total_time_dilation(&self, entity: EntityId) -> f32 {
        let mut total = self.time_dilation(entity);
        let mut current = self.parent(entity);
        while let Some(node) = current {
            total *= self.time_dilation(node);
            current = self.parent(node);
        }
        total
    }

    /// Collects every descendant of `entity`, children before their parent
    /// (post-order), excluding `entity` itself.
    #[must_use]
    pub fn descendants(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        for &child in self.children(entity) {
            self.collect_post_order(child, &mut out);
        }
        out
    }

    fn collect_post_order(&self, entity: EntityId, out: &mut Vec<EntityId>) {
        for &child in self.children(entity) {
            self.collect_post_order(child, out);
        }
        out.push(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_parent_child_links() {
        let mut tree = SceneTree::new();
        tree.set_root(id(0));
        assert!(tree.set_parent(id(1), id(0)));
        assert!(tree.set_parent(id(2), id(1)));

        assert_eq!(tree.parent(id(2)), Some(id(1)));
        assert_eq!(tree.children(id(0)), &[id(1)]);
        assert!(tree.is_ancestor(id(0), id(2)));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = SceneTree::new();
        tree.set_parent(id(1), id(0));
        assert!(!tree.set_parent(id(0), id(1)));
        assert!(!tree.set_parent(id(0), id(0)));
    }

    #[test]
    fn test_reparent_moves_child() {
        let mut tree = SceneTree::new();
        tree.set_parent(id(2), id(0));
        tree.set_parent(id(2), id(1));
        assert!(tree.children(id(0)).is_empty());
        assert_eq!(tree.children(id(1)), &[id(2)]);
    }

    #[test]
    fn test_descendants_post_order() {
        let mut tree = SceneTree::new();
        tree.set_parent(id(1), id(0));
        tree.set_parent(id(2), id(1));
        tree.set_parent(id(3), id(0));
        assert_eq!(tree.descendants(id(0)), vec![id(2), id(1), id(3)]);
    }

    #[test]
    fn test_remove_orphans_children_and_clears_root() {
        let mut tree = SceneTree::new();
        tree.set_root(id(0));
        tree.set_parent(id(1), id(0));
        tree.remove(id(0));
        assert_eq!(tree.root(), None);
        assert_eq!(tree.parent(id(1)), None);
        tree.set_root(id(1));
    }

    #[test]
    fn test_stale_id_not_found() {
        let mut tree = SceneTree::new();
        tree.set_parent(id(1), id(0));
        assert_eq!(tree.parent(EntityId::new(1, 1)), None);
    }

    #[test]
    fn test_time_dilation_multiplies_down_the_chain() {
        let mut tree = SceneTree::new();
        tree.set_root(id(0));
        tree.set_parent(id(1), id(0));
        tree.set_parent(id(2), id(1));

        assert!(tree.set_time_dilation(id(0), 0.5));
        assert!(tree.set_time_dilation(id(2), 4.0));
        assert!((tree.total_time_dilation(id(2)) - 2.0).abs() < f32::EPSILON);
        assert!((tree.total_time_dilation(id(1)) - 0.5).abs() < f32::EPSILON);
        assert!((tree.time_dilation(id(1)) - 1.0).abs() < f32::EPSILON);

        tree.set_time_dilation(id(1), -3.0);
        assert!(tree.total_time_dilation(id(2)).abs() < f32::EPSILON);
        assert!(!tree.set_time_dilation(id(9), 2.0));
    }

    #[test]
    #[should_panic(expected = "scene root already set")]
    fn test_root_overwrite_panics() {
        let mut tree = SceneTree::new();
        tree.set_root(id(0));
        tree.set_root(id(1));
    }
}
