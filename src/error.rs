use crate::Dim;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
  #[error("dimension mismatch: expected {expected}, found {found}")]
  DimensionMismatch { expected: Dim, found: Dim },
  #[error("invalid degree {0}")]
  InvalidDegree(usize),
  #[error("change of basis matrix is singular")]
  Singular,
  #[error("unsupported: {0}")]
  Unsupported(String),
  #[error("no sub-entity {index} of dimension {dim}")]
  InvalidEntity { dim: Dim, index: usize },
  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub(crate) fn check_dim(expected: Dim, found: Dim) -> Result<()> {
    if expected == found {
      Ok(())
    } else {
      Err(Self::DimensionMismatch { expected, found })
    }
  }
}
