use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Graph build error: {0}")]
    BuildError(String),

    #[error("Invalid adjacency file: {0}")]
    InvalidAdjacency(String),

    #[error("Graph too large: {0} entries")]
    TooLarge(usize),
}
