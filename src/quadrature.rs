//! Gauss quadrature on the reference simplex.
//!
//! Rules are conical products of Gauss-Legendre rules: the unit cube is
//! collapsed onto the simplex by
//! $x_1 = t_1, x_i = t_i product_(j<i) (1 - t_j)$
//! with Jacobian $product_i (1 - t_i)^(N-i)$.

use crate::{
  error::{Error, Result},
  linalg::{Matrix, Vector},
  polynomial::MAX_DIM,
  Dim,
};

use itertools::Itertools;

/// Gauss-Legendre rule with `npoints` points on $[0, 1]$, sorted by node.
///
/// Nodes are the eigenvalues of the Jacobi matrix of the Legendre
/// recurrence, weights the squared first components of its eigenvectors.
pub fn gauss_legendre(npoints: usize) -> (Vector, Vector) {
  assert!(npoints > 0);
  let mut jacobi = Matrix::zeros(npoints, npoints);
  for k in 1..npoints {
    let kf = k as f64;
    let beta = kf / (4.0 * kf * kf - 1.0).sqrt();
    jacobi[(k - 1, k)] = beta;
    jacobi[(k, k - 1)] = beta;
  }
  let eigen = jacobi.symmetric_eigen();

  let rule: Vec<(f64, f64)> = eigen
    .eigenvalues
    .iter()
    .zip(eigen.eigenvectors.row(0).iter())
    .map(|(&t, &v)| (0.5 * (t + 1.0), v * v))
    .sorted_by(|a, b| a.0.total_cmp(&b.0))
    .collect();

  let nodes = Vector::from_iterator(npoints, rule.iter().map(|r| r.0));
  let weights = Vector::from_iterator(npoints, rule.iter().map(|r| r.1));
  (nodes, weights)
}

/// A quadrature rule defined on the reference simplex
#[derive(Debug, Clone)]
pub struct QuadRule {
  /// rows are quadrature points
  points: Matrix,
  weights: Vector,
}
impl QuadRule {
  /// Rule on the reference `dim`-simplex, exact for polynomials up to `degree`.
  pub fn simplex(dim: Dim, degree: usize) -> Result<Self> {
    if !(1..=MAX_DIM).contains(&dim) {
      return Err(Error::Unsupported(format!("quadrature in dimension {dim}")));
    }
    let npoints1d = (degree + dim + 1) / 2;
    let (nodes, weights1d) = gauss_legendre(npoints1d);

    let tuples: Vec<Vec<usize>> = (0..dim)
      .map(|_| 0..npoints1d)
      .multi_cartesian_product()
      .collect();

    let mut points = Matrix::zeros(tuples.len(), dim);
    let mut weights = Vector::zeros(tuples.len());
    for (ipoint, tuple) in tuples.iter().enumerate() {
      // product of (1 - t_j) over the previous directions
      let mut collapse = 1.0;
      let mut weight = 1.0;
      for (i, &it) in tuple.iter().enumerate() {
        let t = nodes[it];
        points[(ipoint, i)] = t * collapse;
        weight *= weights1d[it] * (1.0 - t).powi((dim - 1 - i) as i32);
        collapse *= 1.0 - t;
      }
      weights[ipoint] = weight;
    }

    Ok(Self { points, weights })
  }

  pub fn dim(&self) -> Dim {
    self.points.ncols()
  }
  pub fn npoints(&self) -> usize {
    self.points.nrows()
  }
  pub fn points(&self) -> &Matrix {
    &self.points
  }
  pub fn weights(&self) -> &Vector {
    &self.weights
  }

  pub fn integrate<F>(&self, f: F) -> f64
  where
    F: Fn(&Vector) -> f64,
  {
    self
      .points
      .row_iter()
      .zip(self.weights.iter())
      .map(|(p, w)| w * f(&p.transpose()))
      .sum()
  }
}
