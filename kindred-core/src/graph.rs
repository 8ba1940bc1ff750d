//! Explicit kind graph and its dispatch order.
//!
//! The graph is plain adjacency data (kind → parents), independent of any
//! event type, so the ordering rules can be exercised in isolation.
//!
//! # Ordering
//!
//! [`KindGraph::order`] returns the ancestor closure of a kind plus the kind
//! itself, each exactly once, sorted by:
//!
//! 1. depth, the longest parent path down from a root;
//! 2. first discovery in a depth-first walk that visits parents in declaration
//!    order.
//!
//! Every parent has a strictly smaller depth than its children, so this is a
//! topological order, and the queried kind always comes last.

use crate::{error::KindError, kind::KindId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct Node {
    name: &'static str,
    parents: Vec<KindId>,
}

/// Adjacency list of kinds to their direct parents.
#[derive(Debug, Clone, Default)]
pub struct KindGraph {
    nodes: HashMap<KindId, Node>,
}

impl KindGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a kind and its direct parents.
    ///
    /// Returns `Ok(false)` if the kind was already declared with the same
    /// parents. Parents do not have to be declared first; unknown parents
    /// surface from [`order`](Self::order).
    pub fn declare(
        &mut self,
        id: KindId,
        name: &'static str,
        parents: Vec<KindId>,
    ) -> Result<bool, KindError> {
        if parents.contains(&id) {
            return Err(KindError::SelfParent(name));
        }
        if let Some(existing) = self.nodes.get(&id) {
            return if existing.parents == parents {
                Ok(false)
            } else {
                Err(KindError::Duplicate(name))
            };
        }
        self.nodes.insert(id, Node { name, parents });
        Ok(true)
    }

    /// Whether `id` has been declared.
    pub fn contains(&self, id: KindId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Name given when `id` was declared.
    pub fn name(&self, id: KindId) -> Option<&'static str> {
        self.nodes.get(&id).map(|node| node.name)
    }

    /// Direct parents of `id`.
    pub fn parents(&self, id: KindId) -> Option<&[KindId]> {
        self.nodes.get(&id).map(|node| node.parents.as_slice())
    }

    /// Number of declared kinds.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no kinds.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dispatch order for `root`: its ancestors, parents first, then `root`.
    pub fn order(&self, root: KindId) -> Result<Vec<KindId>, KindError> {
        let mut discovered = Vec::new();
        let mut seen = HashSet::new();
        self.discover(root, &mut seen, &mut discovered)?;

        let mut depths = HashMap::new();
        let mut active = HashSet::new();
        for &id in &discovered {
            self.depth(id, &mut depths, &mut active)?;
        }

        let mut ranked: Vec<(usize, usize, KindId)> = discovered
            .into_iter()
            .enumerate()
            .map(|(found, id)| (depths[&id], found, id))
            .collect();
        ranked.sort_by_key(|&(depth, found, _)| (depth, found));
        Ok(ranked.into_iter().map(|(_, _, id)| id).collect())
    }

    fn discover(
        &self,
        id: KindId,
        seen: &mut HashSet<KindId>,
        discovered: &mut Vec<KindId>,
    ) -> Result<(), KindError> {
        if !seen.insert(id) {
            return Ok(());
        }
        let node = self.nodes.get(&id).ok_or(KindError::Unknown(id))?;
        discovered.push(id);
        for &parent in &node.parents {
            self.discover(parent, seen, discovered)?;
        }
        Ok(())
    }

    fn depth(
        &self,
        id: KindId,
        depths: &mut HashMap<KindId, usize>,
        active: &mut HashSet<KindId>,
    ) -> Result<usize, KindError> {
        if let Some(&depth) = depths.get(&id) {
            return Ok(depth);
        }
        let node = self.nodes.get(&id).ok_or(KindError::Unknown(id))?;
        if !active.insert(id) {
            return Err(KindError::Cycle(node.name));
        }
        let mut depth = 0;
        for &parent in &node.parents {
            depth = depth.max(self.depth(parent, depths, active)? + 1);
        }
        active.remove(&id);
        depths.insert(id, depth);
        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct R;
    struct A;
    struct B;
    struct C;

    fn id<T: 'static>() -> KindId {
        KindId::of::<T>()
    }

    fn diamond() -> KindGraph {
        let mut graph = KindGraph::new();
        graph.declare(id::<C>(), "C", vec![id::<A>(), id::<B>()]).unwrap();
        graph.declare(id::<A>(), "A", vec![id::<R>()]).unwrap();
        graph.declare(id::<B>(), "B", vec![id::<R>()]).unwrap();
        graph.declare(id::<R>(), "R", vec![]).unwrap();
        graph
    }

    #[test]
    fn test_diamond_visits_shared_root_once() {
        let order = diamond().order(id::<C>()).unwrap();
        assert_eq!(order, vec![id::<R>(), id::<A>(), id::<B>(), id::<C>()]);
    }

    #[test]
    fn test_root_orders_to_itself() {
        let order = diamond().order(id::<R>()).unwrap();
        assert_eq!(order, vec![id::<R>()]);
    }

    #[test]
    fn test_redeclaring_is_idempotent() {
        let mut graph = diamond();
        assert_eq!(graph.declare(id::<A>(), "A", vec![id::<R>()]), Ok(false));
        assert_eq!(
            graph.declare(id::<A>(), "A", vec![]),
            Err(KindError::Duplicate("A"))
        );
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_self_parent_rejected() {
        let mut graph = KindGraph::new();
        assert_eq!(
            graph.declare(id::<A>(), "A", vec![id::<A>()]),
            Err(KindError::SelfParent("A"))
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = KindGraph::new();
        graph.declare(id::<A>(), "A", vec![id::<B>()]).unwrap();
        graph.declare(id::<B>(), "B", vec![id::<C>()]).unwrap();
        graph.declare(id::<C>(), "C", vec![id::<A>()]).unwrap();
        assert!(matches!(graph.order(id::<A>()), Err(KindError::Cycle(_))));
    }

    #[test]
    fn test_unknown_parent_reported() {
        let mut graph = KindGraph::new();
        graph.declare(id::<A>(), "A", vec![id::<R>()]).unwrap();
        assert_eq!(graph.order(id::<A>()), Err(KindError::Unknown(id::<R>())));
        assert_eq!(graph.order(id::<B>()), Err(KindError::Unknown(id::<B>())));
    }

    #[test]
    fn test_deeper_branch_waits_for_its_parents() {
        // C -> {A, R}, A -> R: R must come before A even though C lists A first.
        let mut graph = KindGraph::new();
        graph.declare(id::<R>(), "R", vec![]).unwrap();
        graph.declare(id::<A>(), "A", vec![id::<R>()]).unwrap();
        graph.declare(id::<C>(), "C", vec![id::<A>(), id::<R>()]).unwrap();
        let order = graph.order(id::<C>()).unwrap();
        assert_eq!(order, vec![id::<R>(), id::<A>(), id::<C>()]);
        assert_eq!(graph.parents(id::<C>()).map(<[_]>::len), Some(2));
        assert_eq!(graph.name(id::<A>()), Some("A"));
    }
}
