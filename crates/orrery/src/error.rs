#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {node} declares an unregistered neighbor: {neighbor}")]
    UnknownNeighbor { node: String, neighbor: String },

    #[error("neighbors declared for an unregistered node: {id}")]
    UnknownNode { id: String },

    #[error("node registered more than once: {id}")]
    DuplicateNode { id: String },

    #[error("node {id} has a non-positive or non-finite radius: {radius}")]
    InvalidRadius { id: String, radius: f64 },

    #[error("node {id} has invalid cluster bounds: min={min} max={max}")]
    InvalidClusterBounds { id: String, min: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
