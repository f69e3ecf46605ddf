#![forbid(unsafe_code)]

//! Headless planetary graph layout with sibling clustering.
//!
//! Nodes are laid out as nested orbits around the heaviest node of the graph. Before layout,
//! mutually compatible siblings can be merged into composite nodes (see [`Node::clusterable_with`]).
//! Disconnected subgraphs are linked to the root so the result is always one layout tree.

pub mod algo;
pub mod error;
pub mod graph;
pub mod identity;
pub mod node;

pub use algo::DistributeOptions;
pub use algo::planetary::{Bounds, Layout, LayoutTree};
pub use error::{Error, Result};
pub use graph::{Graph, Registration};
pub use identity::NodeIdentity;
pub use node::{Clusterability, Node, Placement};

use std::fmt;
use std::hash::Hash;

/// Roots, optionally clusters, and lays out `graph`.
///
/// The graph is rewritten in place: synthetic links join disconnected subgraphs and clustered
/// siblings are replaced by their composites. Returns `Ok(None)` for an empty graph, and an error
/// when a composite built by [`Node::merge_with`] has an invalid radius or cluster bounds.
pub fn layout<N, Id>(
    graph: &mut Graph<N, Id>,
    opts: &DistributeOptions,
) -> Result<Option<Layout<Id>>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let span = tracing::debug_span!("layout", nodes = graph.node_count());
    let _enter = span.enter();

    let Some(root) = graph::alg::connect_components(graph) else {
        return Ok(None);
    };
    if opts.clustering {
        let formed = algo::cluster::cluster(graph, &root)?;
        tracing::debug!(clusters = formed.len(), nodes = graph.node_count(), "clustered");
    }
    let layout = algo::planetary::layout(graph, &root);
    if let Some(b) = layout.bounds() {
        tracing::debug!(root = %root, width = b.width(), height = b.height(), "laid out");
    }
    Ok(Some(layout))
}

/// Lays out the registered nodes and hands them back with their placements applied.
///
/// The returned registrations are keyed by [`NodeIdentity`]; clusters show up as multi-id
/// identities. Placements are applied parent before child.
pub fn distribute<N, Id>(
    registrations: impl IntoIterator<Item = Registration<N, Id>>,
    opts: &DistributeOptions,
) -> Result<Vec<Registration<N, NodeIdentity<Id>>>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let span = tracing::debug_span!("distribute");
    let _enter = span.enter();

    let mut graph = Graph::from_registrations(registrations)?;
    if graph.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(layout) = layout(&mut graph, opts)? {
        for (id, placement) in layout.placements() {
            if let Some(node) = graph.node_mut(id) {
                node.apply(placement);
            }
        }
    }
    Ok(graph.into_registrations())
}
