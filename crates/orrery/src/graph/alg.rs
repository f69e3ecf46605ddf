//! Traversal helpers used to pick layout roots.

use super::Graph;
use crate::identity::NodeIdentity;
use crate::node::Node;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

/// Partitions the graph into maximal connected components, following synthetic links too.
pub fn components<N, Id>(g: &Graph<N, Id>) -> Vec<IndexSet<NodeIdentity<Id>>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let mut seen: IndexSet<NodeIdentity<Id>> = IndexSet::new();
    let mut out: Vec<IndexSet<NodeIdentity<Id>>> = Vec::new();

    for start in g.identities() {
        if !seen.insert(start.clone()) {
            continue;
        }
        let mut comp: IndexSet<NodeIdentity<Id>> = IndexSet::new();
        let mut q: VecDeque<NodeIdentity<Id>> = VecDeque::new();
        q.push_back(start.clone());
        while let Some(v) = q.pop_front() {
            for n in g.linked(&v) {
                if seen.insert(n.clone()) {
                    q.push_back(n);
                }
            }
            comp.insert(v);
        }
        out.push(comp);
    }

    out
}

/// Depth-weighted reach of `start`: every reachable node contributes `1 / depth`, where `start`
/// itself has depth 1 and depth grows by one per hop along the shallowest path.
pub fn weight<N, Id>(g: &Graph<N, Id>, start: &NodeIdentity<Id>) -> f64
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    if !g.contains(start) {
        return 0.0;
    }
    let mut depth: FxHashMap<NodeIdentity<Id>, usize> = FxHashMap::default();
    let mut q: VecDeque<NodeIdentity<Id>> = VecDeque::new();
    depth.insert(start.clone(), 1);
    q.push_back(start.clone());
    while let Some(v) = q.pop_front() {
        let next = depth.get(&v).copied().unwrap_or(1) + 1;
        for n in g.linked(&v) {
            let shallower = depth.get(&n).is_none_or(|&d| next < d);
            if shallower {
                depth.insert(n.clone(), next);
                q.push_back(n);
            }
        }
    }
    depth.values().map(|&d| 1.0 / d as f64).sum()
}

/// [`weight`] of every node in `g`.
pub fn weights<N, Id>(g: &Graph<N, Id>) -> FxHashMap<NodeIdentity<Id>, f64>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    g.identities()
        .map(|id| (id.clone(), weight(g, id)))
        .collect()
}

/// The node with the largest weight among `ids`; the first one wins ties. Ids missing from
/// `weights` score zero.
pub fn heaviest_node<'a, Id>(
    weights: &FxHashMap<NodeIdentity<Id>, f64>,
    ids: impl IntoIterator<Item = &'a NodeIdentity<Id>>,
) -> Option<NodeIdentity<Id>>
where
    Id: Clone + Ord + Hash + 'a,
{
    let mut best: Option<(&NodeIdentity<Id>, f64)> = None;
    for id in ids {
        let w = weights.get(id).copied().unwrap_or(0.0);
        if best.is_none_or(|(_, bw)| w > bw) {
            best = Some((id, w));
        }
    }
    best.map(|(id, _)| id.clone())
}

/// Picks the global root and links the heaviest node of every other component to it, so the
/// graph becomes one connected layout tree. Returns `None` for an empty graph.
pub fn connect_components<N, Id>(g: &mut Graph<N, Id>) -> Option<NodeIdentity<Id>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let comps = components(g);
    let weights = weights(g);

    let root = heaviest_node(&weights, g.identities())?;
    let sub_roots: Vec<NodeIdentity<Id>> = comps
        .iter()
        .filter(|comp| !comp.contains(&root))
        .filter_map(|comp| heaviest_node(&weights, comp))
        .collect();
    tracing::debug!(
        root = %root,
        components = comps.len(),
        "selected layout root"
    );
    for sub_root in &sub_roots {
        tracing::debug!(root = %root, sub_root = %sub_root, "linking disconnected subgraph");
        g.link(&root, sub_root);
    }
    Some(root)
}
