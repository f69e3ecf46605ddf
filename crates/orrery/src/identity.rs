//! Identity keys for original and clustered nodes.

use std::collections::BTreeSet;
use std::fmt;

/// A set of one or more caller ids identifying a node.
///
/// Originals carry exactly one id; clusters carry the union of their members' ids. Equality,
/// ordering and hashing all follow set equality, so identities are safe map keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdentity<Id: Ord> {
    ids: BTreeSet<Id>,
}

impl<Id: Ord + Clone> NodeIdentity<Id> {
    pub fn of(id: Id) -> Self {
        let mut ids = BTreeSet::new();
        ids.insert(id);
        Self { ids }
    }

    /// Returns a new identity holding the union of both id sets.
    pub fn merge_with(&self, other: &Self) -> Self {
        Self {
            ids: self.ids.union(&other.ids).cloned().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_cluster(&self) -> bool {
        self.ids.len() > 1
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.ids.is_disjoint(&other.ids)
    }
}

impl<Id: Ord + Clone> From<Id> for NodeIdentity<Id> {
    fn from(id: Id) -> Self {
        Self::of(id)
    }
}

impl<Id: Ord + fmt::Display> fmt::Display for NodeIdentity<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ids.len() == 1 {
            if let Some(id) = self.ids.first() {
                return write!(f, "{id}");
            }
        }
        f.write_str("{")?;
        for (idx, id) in self.ids.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("}")
    }
}
