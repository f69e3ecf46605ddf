pub mod cluster;
pub mod planetary;

#[derive(Debug, Clone)]
pub struct DistributeOptions {
    /// Merge mutually compatible siblings into composite nodes before layout.
    ///
    /// Nodes keep the default cluster bounds (`1..=1`) unless they opt in, so enabling this is a
    /// no-op for graphs whose nodes never cluster.
    pub clustering: bool,
}

impl Default for DistributeOptions {
    fn default() -> Self {
        Self { clustering: true }
    }
}
