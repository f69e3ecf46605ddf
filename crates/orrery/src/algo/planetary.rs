//! Planetary layout: every node sits at the center of its own system, with its children on an
//! orbit around it.
//!
//! The layout runs in two passes over an explicit tree:
//!
//! 1. bottom-up, each node gets the radius its subtree needs and each child an angular slice
//!    proportional to the child's radius;
//! 2. top-down, children are dropped on their parent's orbit, rotated so the widest slice points
//!    away from the grandparent.

use crate::graph::Graph;
use crate::identity::NodeIdentity;
use crate::node::{Node, Placement};
use indexmap::{IndexMap, IndexSet};
use nalgebra as na;
use rustc_hash::FxHashMap;
use std::f64::consts::TAU;
use std::fmt;
use std::hash::Hash;

/// Spanning tree the layout is computed on.
///
/// Each node's children are its (real or synthetic) neighbors not yet claimed by a node closer to
/// the root.
#[derive(Debug, Clone)]
pub struct LayoutTree<Id: Ord> {
    root: NodeIdentity<Id>,
    // Insertion order is preorder.
    entries: IndexMap<NodeIdentity<Id>, TreeEntry<Id>>,
}

#[derive(Debug, Clone)]
struct TreeEntry<Id: Ord> {
    radius: f64,
    parent: Option<NodeIdentity<Id>>,
    children: Vec<NodeIdentity<Id>>,
}

impl<Id> LayoutTree<Id>
where
    Id: Clone + Ord + Hash + fmt::Display,
{
    pub fn build<N: Node>(g: &Graph<N, Id>, root: &NodeIdentity<Id>) -> Self {
        let mut entries: IndexMap<NodeIdentity<Id>, TreeEntry<Id>> = IndexMap::new();
        let mut used: IndexSet<NodeIdentity<Id>> = IndexSet::new();
        used.insert(root.clone());
        let mut stack: Vec<(NodeIdentity<Id>, Option<NodeIdentity<Id>>)> =
            vec![(root.clone(), None)];

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = g.node(&id) else {
                debug_assert!(false, "layout tree references a missing node: {id}");
                continue;
            };
            let children: Vec<NodeIdentity<Id>> = g
                .linked(&id)
                .into_iter()
                .filter(|n| !used.contains(n))
                .collect();
            used.extend(children.iter().cloned());
            stack.extend(
                children
                    .iter()
                    .rev()
                    .map(|c| (c.clone(), Some(id.clone()))),
            );
            entries.insert(
                id,
                TreeEntry {
                    radius: node.radius(),
                    parent,
                    children,
                },
            );
        }

        Self {
            root: root.clone(),
            entries,
        }
    }

    pub fn root(&self) -> &NodeIdentity<Id> {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parents come before their children.
    pub fn preorder(&self) -> impl DoubleEndedIterator<Item = &NodeIdentity<Id>> {
        self.entries.keys()
    }

    pub fn parent(&self, id: &NodeIdentity<Id>) -> Option<&NodeIdentity<Id>> {
        self.entries.get(id).and_then(|e| e.parent.as_ref())
    }

    pub fn children(&self, id: &NodeIdentity<Id>) -> &[NodeIdentity<Id>] {
        self.entries
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Placements for every node of a [`LayoutTree`].
#[derive(Debug, Clone)]
pub struct Layout<Id: Ord> {
    tree: LayoutTree<Id>,
    placements: IndexMap<NodeIdentity<Id>, Placement>,
}

impl<Id> Layout<Id>
where
    Id: Clone + Ord + Hash + fmt::Display,
{
    pub fn root(&self) -> &NodeIdentity<Id> {
        self.tree.root()
    }

    pub fn tree(&self) -> &LayoutTree<Id> {
        &self.tree
    }

    /// Placements in parent-before-child order.
    pub fn placements(&self) -> impl Iterator<Item = (&NodeIdentity<Id>, &Placement)> {
        self.placements.iter()
    }

    pub fn placement(&self, id: &NodeIdentity<Id>) -> Option<&Placement> {
        self.placements.get(id)
    }

    pub fn parent(&self, id: &NodeIdentity<Id>) -> Option<&NodeIdentity<Id>> {
        self.tree.parent(id)
    }

    pub fn children(&self, id: &NodeIdentity<Id>) -> &[NodeIdentity<Id>] {
        self.tree.children(id)
    }

    /// Smallest box containing every node's disk.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut out: Option<Bounds> = None;
        for (id, p) in &self.placements {
            let r = self.tree.entries.get(id).map_or(0.0, |e| e.radius);
            let b = out.get_or_insert(Bounds {
                min_x: p.x - r,
                min_y: p.y - r,
                max_x: p.x + r,
                max_y: p.y + r,
            });
            b.min_x = b.min_x.min(p.x - r);
            b.min_y = b.min_y.min(p.y - r);
            b.max_x = b.max_x.max(p.x + r);
            b.max_y = b.max_y.max(p.y + r);
        }
        out
    }
}

/// Lays out the tree spanned from `root`. The root lands on the origin.
pub fn layout<N, Id>(g: &Graph<N, Id>, root: &NodeIdentity<Id>) -> Layout<Id>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let tree = LayoutTree::build(g, root);
    let allocations = allocate(&tree);
    let placements = place(&tree, &allocations);
    Layout { tree, placements }
}

#[derive(Debug, Clone, Copy)]
struct Allocation {
    radius: f64,
    slice: f64,
    offset: f64,
}

fn allocate<Id>(tree: &LayoutTree<Id>) -> FxHashMap<NodeIdentity<Id>, Allocation>
where
    Id: Clone + Ord + Hash + fmt::Display,
{
    let mut out: FxHashMap<NodeIdentity<Id>, Allocation> = FxHashMap::default();

    for (id, entry) in tree.entries.iter().rev() {
        let radii: Vec<f64> = entry
            .children
            .iter()
            .map(|c| out.get(c).map_or(0.0, |a| a.radius))
            .collect();
        let total: f64 = radii.iter().sum();
        let widest = radii.iter().copied().fold(0.0, f64::max);

        let mut offset = 0.0;
        let mut packed = 0.0;
        for (child, &r) in entry.children.iter().zip(&radii) {
            let slice = TAU * r / total;
            if let Some(a) = out.get_mut(child) {
                a.slice = slice;
                a.offset = offset;
            }
            offset += slice;
            if radii.len() > 2 {
                packed += r / (slice / 2.0).sin();
            }
        }

        let mut radius = entry.radius + widest;
        if radii.len() > 2 {
            // Circles of radius r_i on an orbit of radius R do not overlap while
            // R * sin(slice_i / 2) >= r_i.
            radius = radius.max(packed / radii.len() as f64 + widest);
        }
        out.insert(
            id.clone(),
            Allocation {
                radius,
                slice: TAU,
                offset: 0.0,
            },
        );
    }

    out
}

fn place<Id>(
    tree: &LayoutTree<Id>,
    allocations: &FxHashMap<NodeIdentity<Id>, Allocation>,
) -> IndexMap<NodeIdentity<Id>, Placement>
where
    Id: Clone + Ord + Hash + fmt::Display,
{
    let mut placements: IndexMap<NodeIdentity<Id>, Placement> =
        IndexMap::with_capacity(tree.len());
    let mut pending: FxHashMap<NodeIdentity<Id>, na::Point2<f64>> = FxHashMap::default();
    pending.insert(tree.root.clone(), na::Point2::origin());

    for (id, entry) in &tree.entries {
        let (Some(a), Some(position)) = (allocations.get(id), pending.remove(id)) else {
            debug_assert!(false, "node placed before its parent: {id}");
            continue;
        };

        // Unit vector pointing away from the parent; the root has none and looks along +x.
        let direction = match entry.parent.as_ref().and_then(|p| placements.get(p)) {
            None => na::Vector2::x(),
            Some(parent) => (position - na::Point2::new(parent.x, parent.y))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(|| {
                    debug_assert!(false, "node {id} coincides with its parent");
                    na::Vector2::x()
                }),
        };

        let placement = Placement {
            x: position.x,
            y: position.y,
            orbit: a.radius,
            slice: a.slice,
        };
        tracing::trace!(
            node = %id,
            x = placement.x,
            y = placement.y,
            orbit = placement.orbit,
            "placed"
        );
        placements.insert(id.clone(), placement);

        let slices: Vec<(f64, f64)> = entry
            .children
            .iter()
            .map(|c| allocations.get(c).map_or((0.0, 0.0), |c| (c.offset, c.slice)))
            .collect();
        // Center the widest slice on `direction`.
        let reference = slices
            .iter()
            .fold(None, |best: Option<(f64, f64)>, &s| match best {
                Some(b) if b.1 >= s.1 => Some(b),
                _ => Some(s),
            })
            .map_or(0.0, |(offset, slice)| offset + slice / 2.0);
        for (child, (offset, slice)) in entry.children.iter().zip(slices) {
            let rotation = na::Rotation2::new(offset + slice / 2.0 - reference);
            pending.insert(child.clone(), position + (rotation * direction) * a.radius);
        }
    }

    placements
}
