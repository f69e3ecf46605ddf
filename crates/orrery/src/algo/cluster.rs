//! Sibling clustering.
//!
//! Walking down from the root, the unplaced children of every parent are searched for groups of
//! mutually compatible siblings. Larger groups win; a sibling claimed by one group cannot join
//! another. Each accepted group is contracted into one composite node, which is then visited like
//! any other child so clustering can cascade below it.

use crate::error::Result;
use crate::graph::Graph;
use crate::identity::NodeIdentity;
use crate::node::{Clusterability, Node};
use indexmap::IndexSet;
use std::fmt;
use std::hash::Hash;

/// Clusters the tree reachable from `root` in place and returns the composites that were formed.
///
/// Fails when a composite built by [`Node::merge_with`] has an invalid radius or cluster bounds.
pub fn cluster<N, Id>(
    g: &mut Graph<N, Id>,
    root: &NodeIdentity<Id>,
) -> Result<Vec<NodeIdentity<Id>>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let mut formed: Vec<NodeIdentity<Id>> = Vec::new();
    let mut used: IndexSet<NodeIdentity<Id>> = IndexSet::new();
    used.insert(root.clone());
    let mut stack: Vec<NodeIdentity<Id>> = vec![root.clone()];

    while let Some(parent) = stack.pop() {
        let siblings = unused_links(g, &parent, &used);
        for members in find_clusters(g, &siblings) {
            if let Some(composite) = g.merge(&members)? {
                tracing::debug!(parent = %parent, cluster = %composite, "merged siblings");
                formed.push(composite);
            }
        }

        let children = unused_links(g, &parent, &used);
        used.extend(children.iter().cloned());
        stack.extend(children.into_iter().rev());
    }

    Ok(formed)
}

fn unused_links<N, Id>(
    g: &Graph<N, Id>,
    id: &NodeIdentity<Id>,
    used: &IndexSet<NodeIdentity<Id>>,
) -> Vec<NodeIdentity<Id>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    g.linked(id)
        .into_iter()
        .filter(|n| !used.contains(n))
        .collect()
}

/// Greedy, largest-first selection of disjoint clusters among `siblings`.
///
/// A cluster is a set of two or more siblings that all accept each other in both directions and
/// whose size lies within every member's cluster bounds. Ties between equally large clusters go to
/// the one that comes first in sibling order.
pub fn find_clusters<N, Id>(
    g: &Graph<N, Id>,
    siblings: &[NodeIdentity<Id>],
) -> Vec<Vec<NodeIdentity<Id>>>
where
    N: Node,
    Id: Clone + Ord + Hash + fmt::Display,
{
    let nodes: Vec<(&NodeIdentity<Id>, &N)> = siblings
        .iter()
        .filter_map(|id| g.node(id).map(|n| (id, n)))
        .collect();
    let count = nodes.len();

    let mut compatible = vec![vec![false; count]; count];
    for i in 0..count {
        for j in (i + 1)..count {
            let (a, b) = (nodes[i].1, nodes[j].1);
            let ok = a.clusterable_with(b) == Clusterability::Siblings
                && b.clusterable_with(a) == Clusterability::Siblings;
            compatible[i][j] = ok;
            compatible[j][i] = ok;
        }
    }
    let bounds: Vec<(usize, usize)> = nodes
        .iter()
        .map(|(_, n)| (n.min_cluster_size(), n.max_cluster_size()))
        .collect();

    // A sibling that cannot reach its own minimum with every compatible partner never clusters.
    let mut pool: Vec<usize> = (0..count)
        .filter(|&i| {
            let partners = compatible[i].iter().filter(|&&c| c).count();
            bounds[i].1 >= 2 && partners > 0 && bounds[i].0 <= partners + 1
        })
        .collect();
    let search = CliqueSearch {
        compatible: &compatible,
        bounds: &bounds,
    };
    let mut out: Vec<Vec<NodeIdentity<Id>>> = Vec::new();
    loop {
        let best = search.largest(&pool);
        if best.is_empty() {
            break;
        }
        pool.retain(|i| !best.contains(i));
        out.push(best.iter().map(|&i| nodes[i].0.clone()).collect());
    }
    out
}

/// Branch-and-bound search for the lexicographically first largest valid clique.
struct CliqueSearch<'a> {
    compatible: &'a [Vec<bool>],
    bounds: &'a [(usize, usize)],
}

/// One search level: the chosen members may still be extended by `candidates[next..]`.
struct Frame {
    candidates: Vec<usize>,
    next: usize,
    /// Tightest max bound among the chosen members.
    cap: usize,
    /// Tightest min bound among the chosen members.
    floor: usize,
}

impl CliqueSearch<'_> {
    fn largest(&self, pool: &[usize]) -> Vec<usize> {
        // No clique can outgrow the pool or the loosest max bound in it.
        let limit = pool
            .iter()
            .map(|&i| self.bounds[i].1)
            .max()
            .unwrap_or(0)
            .min(pool.len());
        let mut best: Vec<usize> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut stack = vec![Frame {
            candidates: pool.to_vec(),
            next: 0,
            cap: usize::MAX,
            floor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let len = current.len();
            let remaining = frame.candidates.len() - frame.next;
            if remaining == 0
                || best.len() >= limit
                || (len + remaining).min(frame.cap) <= best.len()
            {
                stack.pop();
                current.pop();
                continue;
            }

            let k = frame.candidates[frame.next];
            frame.next += 1;
            let (k_min, k_max) = self.bounds[k];
            let cap = frame.cap.min(k_max);
            let floor = frame.floor.max(k_min);
            if len + 1 > cap || floor > cap || floor > len + remaining {
                continue;
            }
            if (len + remaining).min(cap) <= best.len() {
                continue;
            }

            // Keep only candidates whose own bounds still admit a clique with the chosen members.
            let rest: Vec<usize> = frame.candidates[frame.next..]
                .iter()
                .copied()
                .filter(|&c| {
                    let (c_min, c_max) = self.bounds[c];
                    self.compatible[k][c] && c_max >= floor.max(len + 2) && c_min <= cap
                })
                .collect();
            let reach = len + 1 + rest.len();
            if floor > reach || reach.min(cap) <= best.len() {
                continue;
            }

            current.push(k);
            if current.len() >= 2 && current.len() >= floor && current.len() > best.len() {
                best = current.clone();
            }
            stack.push(Frame {
                candidates: rest,
                next: 0,
                cap,
                floor,
            });
        }

        best
    }
}
