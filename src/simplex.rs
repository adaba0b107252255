use crate::{
  error::{Error, Result},
  linalg::{Matrix, Vector},
  polynomial::MAX_DIM,
  Dim,
};

use itertools::Itertools;
use num_integer::binomial;

pub fn factorial(num: usize) -> usize {
  (1..=num).product()
}

/// Volume of the reference simplex in `dim` dimensions.
pub fn ref_vol(dim: Dim) -> f64 {
  (factorial(dim) as f64).recip()
}

/// The reference simplex with the origin and the unit vectors as vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSimplex {
  /// rows are vertex coordinates
  vertices: Matrix,
}
impl ReferenceSimplex {
  pub fn new(dim: Dim) -> Result<Self> {
    if !(1..=MAX_DIM).contains(&dim) {
      return Err(Error::Unsupported(format!("reference simplex of dimension {dim}")));
    }
    let mut vertices = Matrix::zeros(dim + 1, dim);
    for d in 0..dim {
      vertices[(d + 1, d)] = 1.0;
    }
    Ok(Self { vertices })
  }

  pub fn dim(&self) -> Dim {
    self.vertices.ncols()
  }
  pub fn nvertices(&self) -> usize {
    self.vertices.nrows()
  }
  /// The vertices of the simplex, in the rows of the returned matrix.
  pub fn vertices(&self) -> &Matrix {
    &self.vertices
  }
  pub fn vertex(&self, ivertex: usize) -> Vector {
    self.vertices.row(ivertex).transpose()
  }

  pub fn measure(&self) -> f64 {
    ref_vol(self.dim())
  }

  /// Number of sub-entities of dimension `k`.
  pub fn sub_entity_count(&self, k: Dim) -> usize {
    if k > self.dim() {
      0
    } else {
      binomial(self.nvertices(), k + 1)
    }
  }

  /// Vertex indices of the `i`-th sub-entity of dimension `k`.
  ///
  /// Vertex `i` is sub-entity `i` of dimension 0. Higher dimensional
  /// sub-entities are enumerated in reverse lexicographic order of their
  /// vertex sets, so facet `i` is the one opposite vertex `i`. Triangle edges
  /// are (1,2), (0,2), (0,1) and tetrahedron edges
  /// (2,3), (1,3), (1,2), (0,3), (0,2), (0,1).
  pub fn sub_entity_vertices(&self, k: Dim, i: usize) -> Result<Vec<usize>> {
    let count = self.sub_entity_count(k);
    if i >= count {
      return Err(Error::InvalidEntity { dim: k, index: i });
    }
    if k == 0 {
      return Ok(vec![i]);
    }
    let entity = (0..self.nvertices())
      .combinations(k + 1)
      .nth(count - 1 - i)
      .ok_or(Error::InvalidEntity { dim: k, index: i })?;
    Ok(entity)
  }

  /// Vertex coordinates of the `i`-th sub-entity of dimension `k`, as rows.
  pub fn sub(&self, k: Dim, i: usize) -> Result<Matrix> {
    let entity = self.sub_entity_vertices(k, i)?;
    let rows: Vec<_> = entity.iter().map(|&v| self.vertices.row(v)).collect();
    Ok(Matrix::from_rows(&rows))
  }

  /// Tangent $v_1 - v_0$ of edge `i` of a triangle, oriented such that the
  /// opposite vertex lies on its left. The boundary is then traversed
  /// counter-clockwise.
  pub fn edge_tangent(&self, i: usize) -> Result<Vector> {
    Error::check_dim(2, self.dim())?;
    let edge = self.sub(1, i)?;
    let v0 = edge.row(0).transpose();
    let tangent = edge.row(1).transpose() - &v0;
    // edge i is opposite vertex i
    let opposite = self.vertex(i) - v0;
    let cross = tangent[0] * opposite[1] - tangent[1] * opposite[0];
    if cross < 0.0 {
      Ok(-tangent)
    } else {
      Ok(tangent)
    }
  }
}
