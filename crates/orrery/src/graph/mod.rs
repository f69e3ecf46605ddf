//! Node registry and symmetric adjacency.

pub mod alg;

use crate::error::{Error, Result};
use crate::identity::NodeIdentity;
use crate::node::Node;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::hash::Hash;

type Adjacency<Id> = IndexMap<NodeIdentity<Id>, IndexSet<NodeIdentity<Id>>>;

/// One node together with the ids of its neighbors.
///
/// Input registrations carry the caller's raw ids; [`crate::distribute`] returns registrations keyed
/// by [`NodeIdentity`] so clusters are visible.
#[derive(Debug, Clone)]
pub struct Registration<N, Id> {
    pub id: Id,
    pub node: N,
    pub neighbors: Vec<Id>,
}

impl<N, Id> Registration<N, Id> {
    pub fn new(id: Id, node: N, neighbors: impl IntoIterator<Item = Id>) -> Self {
        Self {
            id,
            node,
            neighbors: neighbors.into_iter().collect(),
        }
    }
}

/// Nodes keyed by identity plus a symmetric neighbor map.
///
/// Synthetic links joining disconnected subgraphs live in a separate `bridges` map: traversal sees
/// them (see [`Graph::linked`]), but they are never reported back as caller neighbors.
#[derive(Debug, Clone)]
pub struct Graph<N, Id: Ord> {
    nodes: IndexMap<NodeIdentity<Id>, N>,
    adjacency: Adjacency<Id>,
    bridges: Adjacency<Id>,
}

impl<N, Id: Ord> Default for Graph<N, Id> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            adjacency: IndexMap::new(),
            bridges: IndexMap::new(),
        }
    }
}

impl<N, Id> Graph<N, Id>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers all nodes first, then all neighbor declarations, so registration order does not
    /// matter.
    pub fn from_registrations(
        registrations: impl IntoIterator<Item = Registration<N, Id>>,
    ) -> Result<Self> {
        let mut graph = Self::new();
        let mut declared: Vec<(NodeIdentity<Id>, Vec<Id>)> = Vec::new();
        for r in registrations {
            let id = NodeIdentity::of(r.id);
            graph.register_node(id.clone(), r.node)?;
            declared.push((id, r.neighbors));
        }
        for (id, neighbors) in declared {
            graph.register_neighbors(&id, neighbors.into_iter().map(NodeIdentity::of))?;
        }
        Ok(graph)
    }

    pub fn register_node(&mut self, id: NodeIdentity<Id>, node: N) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode { id: id.to_string() });
        }
        check_node(&id, &node)?;
        self.adjacency.entry(id.clone()).or_default();
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Records every declared neighbor in both directions. Self references are ignored.
    pub fn register_neighbors(
        &mut self,
        id: &NodeIdentity<Id>,
        neighbors: impl IntoIterator<Item = NodeIdentity<Id>>,
    ) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(Error::UnknownNode { id: id.to_string() });
        }
        for neighbor in neighbors {
            if !self.nodes.contains_key(&neighbor) {
                return Err(Error::UnknownNeighbor {
                    node: id.to_string(),
                    neighbor: neighbor.to_string(),
                });
            }
            if &neighbor == id {
                continue;
            }
            insert_symmetric(&mut self.adjacency, id, &neighbor);
        }
        Ok(())
    }

    /// Adds a synthetic link between two nodes that are not already neighbors.
    pub fn link(&mut self, a: &NodeIdentity<Id>, b: &NodeIdentity<Id>) {
        if a == b || !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return;
        }
        if self.adjacency.get(a).is_some_and(|n| n.contains(b)) {
            return;
        }
        insert_symmetric(&mut self.bridges, a, b);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeIdentity<Id>) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeIdentity<Id>) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeIdentity<Id>) -> Option<&mut N> {
        self.nodes.get_mut(id)
    }

    /// Identities in registration order; clusters follow the nodes they replaced.
    pub fn identities(&self) -> impl Iterator<Item = &NodeIdentity<Id>> {
        self.nodes.keys()
    }

    /// Caller-visible neighbors, without synthetic links.
    pub fn neighbors(&self, id: &NodeIdentity<Id>) -> impl Iterator<Item = &NodeIdentity<Id>> {
        self.adjacency.get(id).into_iter().flatten()
    }

    pub fn has_bridge(&self, a: &NodeIdentity<Id>, b: &NodeIdentity<Id>) -> bool {
        self.bridges.get(a).is_some_and(|n| n.contains(b))
    }

    /// Neighbors followed by synthetic links, deduplicated.
    pub fn linked(&self, id: &NodeIdentity<Id>) -> Vec<NodeIdentity<Id>> {
        let mut out: IndexSet<NodeIdentity<Id>> = self.neighbors(id).cloned().collect();
        if let Some(bridged) = self.bridges.get(id) {
            out.extend(bridged.iter().cloned());
        }
        out.into_iter().collect()
    }

    /// Contracts `members` into one composite node and returns its identity.
    ///
    /// The composite absorbs the members' combined neighbors and synthetic links; every other entry
    /// referencing a member now references the composite. Returns `Ok(None)` (leaving the graph
    /// untouched) for fewer than two members or an unknown member. A composite with an invalid
    /// radius or invalid cluster bounds is rejected the same way [`Graph::register_node`] rejects
    /// an original node, and the graph is left untouched.
    pub fn merge(&mut self, members: &[NodeIdentity<Id>]) -> Result<Option<NodeIdentity<Id>>> {
        let [first, second, rest @ ..] = members else {
            return Ok(None);
        };
        let members: IndexSet<NodeIdentity<Id>> = members.iter().cloned().collect();
        if members.len() != rest.len() + 2 {
            return Ok(None);
        }
        let (Some(a), Some(b)) = (self.nodes.get(first), self.nodes.get(second)) else {
            return Ok(None);
        };
        let mut merged = a.merge_with(b);
        let mut composite = first.merge_with(second);
        for m in rest {
            let Some(node) = self.nodes.get(m) else {
                return Ok(None);
            };
            merged = merged.merge_with(node);
            composite = composite.merge_with(m);
        }
        check_node(&composite, &merged)?;

        self.nodes.retain(|id, _| !members.contains(id));
        self.nodes.insert(composite.clone(), merged);

        self.adjacency = rewire(std::mem::take(&mut self.adjacency), &members, &composite);
        self.adjacency.entry(composite.clone()).or_default();
        self.bridges = rewire(std::mem::take(&mut self.bridges), &members, &composite);
        Ok(Some(composite))
    }

    /// Hands the nodes back with their caller-visible neighbors.
    pub fn into_registrations(self) -> Vec<Registration<N, NodeIdentity<Id>>> {
        let Self {
            nodes,
            mut adjacency,
            ..
        } = self;
        nodes
            .into_iter()
            .map(|(id, node)| {
                let neighbors = adjacency
                    .swap_remove(&id)
                    .map(|n| n.into_iter().collect::<Vec<_>>())
                    .unwrap_or_default();
                Registration {
                    id,
                    node,
                    neighbors,
                }
            })
            .collect()
    }
}

fn insert_symmetric<Id: Clone + Ord + Hash>(
    map: &mut Adjacency<Id>,
    a: &NodeIdentity<Id>,
    b: &NodeIdentity<Id>,
) {
    map.entry(a.clone()).or_default().insert(b.clone());
    map.entry(b.clone()).or_default().insert(a.clone());
}

fn check_node<N: Node, Id: Ord + fmt::Display>(id: &NodeIdentity<Id>, node: &N) -> Result<()> {
    let radius = node.radius();
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidRadius {
            id: id.to_string(),
            radius,
        });
    }
    let (min, max) = (node.min_cluster_size(), node.max_cluster_size());
    if min == 0 || min > max {
        return Err(Error::InvalidClusterBounds {
            id: id.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn rewire<Id: Clone + Ord + Hash>(
    map: Adjacency<Id>,
    members: &IndexSet<NodeIdentity<Id>>,
    composite: &NodeIdentity<Id>,
) -> Adjacency<Id> {
    let mut out: Adjacency<Id> = IndexMap::with_capacity(map.len());
    let mut absorbed: IndexSet<NodeIdentity<Id>> = IndexSet::new();
    for (id, neighbors) in map {
        let rewired = neighbors.into_iter().map(|n| {
            if members.contains(&n) {
                composite.clone()
            } else {
                n
            }
        });
        if members.contains(&id) {
            absorbed.extend(rewired.filter(|n| n != composite));
        } else {
            out.insert(id, rewired.collect());
        }
    }
    if !absorbed.is_empty() {
        out.insert(composite.clone(), absorbed);
    }
    out
}
