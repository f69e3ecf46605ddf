//! The capability contract a laid-out node must satisfy.

/// Whether two nodes agree to be merged into one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clusterability {
    #[default]
    Deny,
    /// Both nodes may be merged when they are children of the same parent.
    Siblings,
}

/// A visual unit placed by the layout, either an original node or a cluster.
///
/// Neighbors are not part of the node; they are tracked by [`crate::Graph`] under each node's
/// [`crate::NodeIdentity`].
pub trait Node: Sized {
    /// Intrinsic size of the node. Must be finite and positive.
    fn radius(&self) -> f64;

    /// Smallest cluster (counting this node) this node may join.
    fn min_cluster_size(&self) -> usize {
        1
    }

    /// Largest cluster (counting this node) this node may join. `1` never clusters.
    fn max_cluster_size(&self) -> usize {
        1
    }

    /// Only a `Siblings` verdict in both directions allows a merge.
    fn clusterable_with(&self, _other: &Self) -> Clusterability {
        Clusterability::Deny
    }

    /// Builds the composite node for a cluster.
    ///
    /// Folding the members of one cluster in any order must yield behaviorally equivalent nodes
    /// (same radius and cluster bounds). The composite is checked like a registered node; an
    /// invalid radius or invalid bounds fail the layout.
    fn merge_with(&self, other: &Self) -> Self;

    fn set_orbit(&mut self, orbit: f64);

    fn set_x(&mut self, x: f64);

    fn set_y(&mut self, y: f64);

    /// Writes a computed placement through the setters.
    fn apply(&mut self, placement: &Placement) {
        self.set_x(placement.x);
        self.set_y(placement.y);
        self.set_orbit(placement.orbit);
    }
}

/// Final position of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// Radius of the disk the node's children are placed on.
    pub orbit: f64,
    /// Angular width (radians) of the slice the parent allotted to this node's subtree.
    pub slice: f64,
}
