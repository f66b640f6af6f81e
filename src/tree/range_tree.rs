// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Bounded-fanout range tree over axis-aligned boxes
//!
//! Leaves carry caller payloads; interior nodes hold up to [`MAX_FANOUT`]
//! children that are all leaves or all interiors, never mixed. Nodes live in
//! arenas on the tree and refer to each other by index.

use crate::geometry::Range3;

/// Maximum child count of an interior node.
pub const MAX_FANOUT: usize = 50;

/// Reference to a node in one of the tree's arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Interior(usize),
    Leaf(usize),
}

#[derive(Debug, Clone)]
struct LeafNode<T> {
    range: Range3,
    parent: usize,
    payload: T,
}

#[derive(Debug, Clone)]
struct InteriorNode {
    range: Range3,
    /// Cached squared diagonal of `range`.
    extent_squared: f64,
    /// None only for the current root child.
    parent: Option<usize>,
    children: Vec<NodeRef>,
    all_leaves: bool,
}

/// Traversal callbacks for [`RangeTree::traverse`]; pre-order, sibling order
/// is child-array order.
pub trait TreeHandler<T> {
    /// False skips this subtree's children. `should_continue_after_subtree`
    /// still runs for the node.
    fn should_recurse_into_subtree(&mut self, _tree: &RangeTree<T>, _interior: usize) -> bool {
        true
    }

    /// False aborts the whole traversal.
    fn should_continue_after_subtree(&mut self, _tree: &RangeTree<T>, _interior: usize) -> bool {
        true
    }

    /// Called per leaf with its parent interior; false aborts the whole
    /// traversal.
    fn should_continue_after_leaf(
        &mut self,
        _tree: &RangeTree<T>,
        _interior: usize,
        _leaf: usize,
    ) -> bool {
        true
    }
}

/// Axis-aligned bounding range tree with opaque leaf payloads.
///
/// Built by repeated [`add`](RangeTree::add), then queried through
/// [`traverse`](RangeTree::traverse) or a pair searcher. There is no removal;
/// rebuild from scratch when the input set changes.
#[derive(Debug, Clone)]
pub struct RangeTree<T> {
    leaves: Vec<LeafNode<T>>,
    interiors: Vec<InteriorNode>,
    root_child: Option<usize>,
}

impl<T> Default for RangeTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RangeTree<T> {
    pub fn new() -> Self {
        Self {
            leaves: Vec::new(),
            interiors: Vec::new(),
            root_child: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn interior_count(&self) -> usize {
        self.interiors.len()
    }

    /// Index of the single interior below the root, if any leaf was added.
    pub fn root_child(&self) -> Option<usize> {
        self.root_child
    }

    /// Range of the whole tree; null when empty.
    pub fn range(&self) -> Range3 {
        match self.root_child {
            Some(root) => self.interiors[root].range,
            None => Range3::null(),
        }
    }

    pub fn leaf_range(&self, leaf: usize) -> &Range3 {
        &self.leaves[leaf].range
    }

    pub fn leaf_payload(&self, leaf: usize) -> &T {
        &self.leaves[leaf].payload
    }

    pub fn interior_range(&self, interior: usize) -> &Range3 {
        &self.interiors[interior].range
    }

    /// Cached squared diagonal of the interior's range.
    pub fn interior_extent_squared(&self, interior: usize) -> f64 {
        self.interiors[interior].extent_squared
    }

    pub fn children(&self, interior: usize) -> &[NodeRef] {
        &self.interiors[interior].children
    }

    /// True when the interior's children are all leaves.
    pub fn is_fringe(&self, interior: usize) -> bool {
        self.interiors[interior].all_leaves
    }

    pub fn node_range(&self, node: NodeRef) -> &Range3 {
        match node {
            NodeRef::Interior(interior) => &self.interiors[interior].range,
            NodeRef::Leaf(leaf) => &self.leaves[leaf].range,
        }
    }

    /// Insert one leaf.
    ///
    /// Descends to the fringe interior whose range grows least, splitting
    /// full nodes on the way out. Ranges of all ancestors are extended to
    /// cover the new leaf.
    pub fn add(&mut self, payload: T, range: Range3) {
        let root = match self.root_child {
            Some(root) => root,
            None => {
                let root = self.alloc_interior();
                self.root_child = Some(root);
                root
            }
        };

        let mut target = self.choose_fringe(root, &range);
        if self.interiors[target].children.len() >= MAX_FANOUT {
            let sibling = self.split_interior(target);
            target = self.less_growth_of(target, sibling, &range);
        }

        let leaf = self.leaves.len();
        self.leaves.push(LeafNode {
            range,
            parent: target,
            payload,
        });
        self.append_child(target, NodeRef::Leaf(leaf));
        self.extend_upward(target, &range);
    }

    /// Walk the tree depth-first through `handler`; false iff the handler
    /// aborted the traversal.
    pub fn traverse<H: TreeHandler<T>>(&self, handler: &mut H) -> bool {
        match self.root_child {
            Some(root) => self.traverse_interior(root, handler),
            None => true,
        }
    }

    fn traverse_interior<H: TreeHandler<T>>(&self, interior: usize, handler: &mut H) -> bool {
        if handler.should_recurse_into_subtree(self, interior) {
            for i in 0..self.interiors[interior].children.len() {
                match self.interiors[interior].children[i] {
                    NodeRef::Leaf(leaf) => {
                        if !handler.should_continue_after_leaf(self, interior, leaf) {
                            return false;
                        }
                    }
                    NodeRef::Interior(child) => {
                        if !self.traverse_interior(child, handler) {
                            return false;
                        }
                    }
                }
            }
        }
        handler.should_continue_after_subtree(self, interior)
    }

    fn alloc_interior(&mut self) -> usize {
        let index = self.interiors.len();
        self.interiors.push(InteriorNode {
            range: Range3::null(),
            extent_squared: 0.0,
            parent: None,
            children: Vec::new(),
            all_leaves: true,
        });
        index
    }

    /// Descend from `node` to the fringe whose range grows least for `range`
    /// (ties to the smaller extent).
    fn choose_fringe(&self, mut node: usize, range: &Range3) -> usize {
        loop {
            let interior = &self.interiors[node];
            if interior.all_leaves {
                return node;
            }
            let mut best = node;
            let mut best_growth = f64::INFINITY;
            let mut best_extent = f64::INFINITY;
            for &child in &interior.children {
                if let NodeRef::Interior(index) = child {
                    let candidate = &self.interiors[index];
                    let growth =
                        candidate.range.union(range).extent_squared() - candidate.extent_squared;
                    if growth < best_growth
                        || (growth == best_growth && candidate.extent_squared < best_extent)
                    {
                        best = index;
                        best_growth = growth;
                        best_extent = candidate.extent_squared;
                    }
                }
            }
            node = best;
        }
    }

    fn less_growth_of(&self, a: usize, b: usize, range: &Range3) -> usize {
        let growth_a =
            self.interiors[a].range.union(range).extent_squared() - self.interiors[a].extent_squared;
        let growth_b =
            self.interiors[b].range.union(range).extent_squared() - self.interiors[b].extent_squared;
        if growth_b < growth_a {
            b
        } else {
            a
        }
    }

    /// Split a full interior along the longest axis of its range: children
    /// are sorted by center and the upper half moves to a new sibling.
    /// Attaching the sibling may overflow the parent, splitting upward; a
    /// split of the root child allocates a new root child above both halves.
    /// Returns the sibling.
    fn split_interior(&mut self, node: usize) -> usize {
        let axis = longest_axis(&self.interiors[node].range);
        let mut children = std::mem::take(&mut self.interiors[node].children);
        children.sort_by(|&a, &b| {
            let ca = self.node_range(a).center()[axis];
            let cb = self.node_range(b).center()[axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });
        let upper = children.split_off(children.len() / 2);
        let all_leaves = self.interiors[node].all_leaves;

        let sibling = self.alloc_interior();
        self.interiors[node].children = children;
        self.adopt_children(sibling, upper, all_leaves);
        self.refit(node);
        self.refit(sibling);

        match self.interiors[node].parent {
            Some(parent) => {
                self.append_child(parent, NodeRef::Interior(sibling));
                if self.interiors[parent].children.len() > MAX_FANOUT {
                    self.split_interior(parent);
                }
            }
            None => {
                let new_root = self.alloc_interior();
                self.append_child(new_root, NodeRef::Interior(node));
                self.append_child(new_root, NodeRef::Interior(sibling));
                self.refit(new_root);
                self.root_child = Some(new_root);
            }
        }
        sibling
    }

    /// Push a child and fix its parent back-reference. Appending an interior
    /// clears `all_leaves`; leaves are only ever appended to all-leaf nodes.
    fn append_child(&mut self, parent: usize, child: NodeRef) {
        match child {
            NodeRef::Leaf(leaf) => self.leaves[leaf].parent = parent,
            NodeRef::Interior(interior) => {
                self.interiors[interior].parent = Some(parent);
                self.interiors[parent].all_leaves = false;
            }
        }
        self.interiors[parent].children.push(child);
    }

    fn adopt_children(&mut self, node: usize, children: Vec<NodeRef>, all_leaves: bool) {
        for &child in &children {
            match child {
                NodeRef::Leaf(leaf) => self.leaves[leaf].parent = node,
                NodeRef::Interior(interior) => self.interiors[interior].parent = Some(node),
            }
        }
        let interior = &mut self.interiors[node];
        interior.children = children;
        interior.all_leaves = all_leaves;
    }

    /// Recompute an interior's range and cached extent from its children.
    fn refit(&mut self, node: usize) {
        let mut range = Range3::null();
        for i in 0..self.interiors[node].children.len() {
            range.extend_range(self.node_range(self.interiors[node].children[i]));
        }
        self.set_range(node, range);
    }

    fn set_range(&mut self, node: usize, range: Range3) {
        let interior = &mut self.interiors[node];
        interior.range = range;
        interior.extent_squared = range.extent_squared();
    }

    /// Extend `node` and every ancestor to cover `range`.
    fn extend_upward(&mut self, node: usize, range: &Range3) {
        let mut current = Some(node);
        while let Some(index) = current {
            let mut grown = self.interiors[index].range;
            grown.extend_range(range);
            self.set_range(index, grown);
            current = self.interiors[index].parent;
        }
    }
}

/// Axis of greatest extent (x on ties).
fn longest_axis(range: &Range3) -> usize {
    let d = range.diagonal();
    if d.x >= d.y && d.x >= d.z {
        0
    } else if d.y >= d.z {
        1
    } else {
        2
    }
}
