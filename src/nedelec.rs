//! Nédelec elements of the first kind on the reference triangle.
//!
//! The element space is $[P_(k-1)]^2 plus.o S_k$ with
//! $S_k = {p in [tilde(P)_k]^2 : p dot x = 0}$, the degrees of freedom are
//! tangential moments against $P_(k-1)$ on each edge and moments against
//! $[P_(k-2)]^2$ in the interior.
//!
//! Everything is expanded in an orthonormal basis ${phi_k}$ of $P_k$. The rows
//! of `wcoeffs` span the element space, the rows of the dual matrix hold the
//! dofs applied to each $phi_k e_alpha$. The nodal basis is
//! $(W D^T)^(-1) W$.

use crate::{
  error::{Error, Result},
  linalg::{LuExt, Matrix},
  polynomial::{ncoeffs, Polynomial},
  polyset::orthonormal_basis,
  quadrature::QuadRule,
  simplex::ReferenceSimplex,
  Dim,
};

use tracing::{debug, trace, warn};

/// Polynomial exactness of the edge quadrature, per degree of the edge test functions.
const EDGE_QUADRATURE_FACTOR: usize = 5;
/// Pivot ratio of the change of basis matrix below which we warn.
const ILL_CONDITIONED_PIVOT_RATIO: f64 = 1e-12;

/// Values of `set[j]` at the rows of `points`, in column `j`.
fn tabulate_set(set: &[Polynomial], points: &Matrix) -> Result<Matrix> {
  let mut tab = Matrix::zeros(points.nrows(), set.len());
  for (j, p) in set.iter().enumerate() {
    tab.set_column(j, &p.tabulate(points)?);
  }
  Ok(tab)
}

#[derive(Debug, Clone)]
pub struct NedelecElement {
  dim: Dim,
  degree: usize,
  /// orthonormal basis of $P_k$
  expansion_set: Vec<Polynomial>,
  dual_matrix: Matrix,
  /// nodal basis in terms of `expansion_set`, one row per dof
  coefficients: Matrix,
  /// component-outer, dof-inner
  basis: Vec<Polynomial>,
}

impl NedelecElement {
  pub fn new(dim: Dim, degree: usize) -> Result<Self> {
    if dim != 2 {
      return Err(Error::Unsupported(format!(
        "Nedelec element in dimension {dim}"
      )));
    }
    if degree < 1 {
      return Err(Error::InvalidDegree(degree));
    }

    let triangle = ReferenceSimplex::new(dim)?;
    let expansion_set = orthonormal_basis(dim, degree)?;
    let psize = expansion_set.len();
    let ndofs = ndofs(degree);
    debug!(degree, ndofs, psize, "constructing Nedelec element");

    let rule = QuadRule::simplex(dim, 2 * degree)?;
    let expansion_at_qpts = tabulate_set(&expansion_set, rule.points())?;

    let wcoeffs = span_coeffs(degree, &rule, &expansion_at_qpts);
    trace!("wcoeffs = {wcoeffs:.6}");

    let dual_matrix = dual_matrix(&triangle, degree, &expansion_set, &rule, &expansion_at_qpts)?;
    trace!("dualmat = {dual_matrix:.6}");

    let change = (&wcoeffs * dual_matrix.transpose()).lu();
    let pivot_ratio = change.pivot_ratio();
    if pivot_ratio < ILL_CONDITIONED_PIVOT_RATIO {
      warn!(pivot_ratio, "change of basis matrix is badly conditioned");
    }
    let coefficients = change.solve(&wcoeffs).ok_or(Error::Singular)?;
    trace!("coefficients = {coefficients:.6}");

    // columns are the monomial coefficients of the expansion set
    let expansion_coeffs = Matrix::from_columns(
      &expansion_set
        .iter()
        .map(|p| p.coeffs().clone())
        .collect::<Vec<_>>(),
    );
    let mut basis = Vec::with_capacity(dim * ndofs);
    for icomp in 0..dim {
      for idof in 0..ndofs {
        let dof_coeffs = coefficients
          .row(idof)
          .columns(icomp * psize, psize)
          .transpose();
        basis.push(Polynomial::from_coeffs(
          dim,
          degree,
          &expansion_coeffs * dof_coeffs,
        )?);
      }
    }

    Ok(Self {
      dim,
      degree,
      expansion_set,
      dual_matrix,
      coefficients,
      basis,
    })
  }

  pub fn dim(&self) -> Dim {
    self.dim
  }
  pub fn degree(&self) -> usize {
    self.degree
  }
  pub fn ndofs(&self) -> usize {
    ndofs(self.degree)
  }

  /// Scalar components of the basis functions: entry `i + ndofs * c` is
  /// component `c` of basis function `i`.
  pub fn basis(&self) -> &[Polynomial] {
    &self.basis
  }
  /// The orthonormal basis the element is expanded in.
  pub fn expansion_set(&self) -> &[Polynomial] {
    &self.expansion_set
  }
  /// Dofs applied to the vector expansion functions $phi_k e_alpha$.
  ///
  /// Column `alpha * psize + k` corresponds to $phi_k e_alpha$.
  pub fn dual_matrix(&self) -> &Matrix {
    &self.dual_matrix
  }
  /// Row `i` expands basis function `i` in $phi_k e_alpha$, laid out like
  /// the columns of [`Self::dual_matrix`].
  pub fn coefficients(&self) -> &Matrix {
    &self.coefficients
  }

  /// Dofs associated with each sub-entity, indexed by entity dimension and
  /// entity index. Vertices carry no dofs, edge `e` carries the `k` tangential
  /// moments of that edge and the interior carries the remaining ones.
  pub fn entity_dofs(&self) -> Vec<Vec<Vec<usize>>> {
    let k = self.degree;
    let vertices = vec![Vec::new(); 3];
    let edges = (0..3).map(|e| (e * k..(e + 1) * k).collect()).collect();
    let interior = vec![(3 * k..self.ndofs()).collect()];
    vec![vertices, edges, interior]
  }

  /// Basis values at the rows of `points`.
  ///
  /// Column `j` holds `basis()[j]`, so the vector value of basis function `i`
  /// is made up of the columns `i` and `i + ndofs`.
  pub fn tabulate_basis(&self, points: &Matrix) -> Result<Matrix> {
    Error::check_dim(self.dim, points.ncols())?;
    tabulate_set(&self.basis, points)
  }

  /// Values of the derivative $partial^d$ of the basis, laid out like
  /// [`Self::tabulate_basis`].
  pub fn tabulate_basis_derivatives(&self, d: &[usize], points: &Matrix) -> Result<Matrix> {
    Error::check_dim(self.dim, points.ncols())?;
    let derivs = self
      .basis
      .iter()
      .map(|p| p.diff(d))
      .collect::<Result<Vec<_>>>()?;
    tabulate_set(&derivs, points)
  }
}

/// Dimension $k(k+2)$ of the degree `k` element.
pub fn ndofs(degree: usize) -> usize {
  degree * (degree + 2)
}

/// Coefficients spanning $[P_(k-1)]^2 plus.o S_k$ in the vector expansion set.
///
/// The first rows pick the $[P_(k-1)]^2$ members of the expansion set, the
/// remaining rows are the projections of $phi (y, -x)$ for the $phi$ of exact
/// degree $k-1$.
fn span_coeffs(degree: usize, rule: &QuadRule, expansion_at_qpts: &Matrix) -> Matrix {
  let d = degree - 1;
  let psize = expansion_at_qpts.ncols();
  let nv = ncoeffs(2, d);
  let ns = d + 1;
  let ns0 = d * (d + 1) / 2;

  let mut wcoeffs = Matrix::zeros(2 * nv + ns, 2 * psize);
  for i in 0..nv {
    wcoeffs[(i, i)] = 1.0;
    wcoeffs[(nv + i, psize + i)] = 1.0;
  }

  let x = rule.points().column(0);
  let y = rule.points().column(1);
  for i in 0..ns {
    let weighted = expansion_at_qpts
      .column(ns0 + i)
      .component_mul(rule.weights());
    let wx = weighted.component_mul(&x);
    let wy = weighted.component_mul(&y);
    for k in 0..psize {
      let phik = expansion_at_qpts.column(k);
      wcoeffs[(2 * nv + i, k)] = wy.dot(&phik);
      wcoeffs[(2 * nv + i, psize + k)] = -wx.dot(&phik);
    }
  }
  wcoeffs
}

/// Dofs applied to each vector expansion function $phi_k e_alpha$.
fn dual_matrix(
  triangle: &ReferenceSimplex,
  degree: usize,
  expansion_set: &[Polynomial],
  rule: &QuadRule,
  expansion_at_qpts: &Matrix,
) -> Result<Matrix> {
  let d = degree - 1;
  let psize = expansion_set.len();
  let ndofs = ndofs(degree);
  let mut dualmat = Matrix::zeros(ndofs, 2 * psize);

  // dof counter
  let mut c = 0;

  // tangential moments against P_d on each edge
  let edge_tests = orthonormal_basis(1, d)?;
  let edge_rule = QuadRule::simplex(1, EDGE_QUADRATURE_FACTOR * (d + 1))?;
  let edge_tests_at_qpts = tabulate_set(&edge_tests, edge_rule.points())?;
  for iedge in 0..triangle.sub_entity_count(1) {
    let edge = triangle.sub(1, iedge)?;
    let tangent = triangle.edge_tangent(iedge)?;

    // x(s) = v0 + s (v1 - v0)
    let v0 = edge.row(0).clone_owned();
    let span = edge.row(1) - &v0;
    let mut edge_qpts = Matrix::zeros(edge_rule.npoints(), 2);
    for (ipoint, &s) in edge_rule.points().column(0).iter().enumerate() {
      edge_qpts.set_row(ipoint, &(&v0 + s * &span));
    }
    let expansion_at_edge_qpts = tabulate_set(expansion_set, &edge_qpts)?;

    for psi in edge_tests_at_qpts.column_iter() {
      let weighted = psi.component_mul(edge_rule.weights());
      let moments = expansion_at_edge_qpts.tr_mul(&weighted);
      for icomp in 0..2 {
        dualmat
          .view_mut((c, icomp * psize), (1, psize))
          .copy_from(&(tangent[icomp] * moments.transpose()));
      }
      c += 1;
    }
  }

  // moments against [P_(d-1)]^2 in the interior
  if d > 0 {
    let interior_tests = orthonormal_basis(2, d - 1)?;
    let interior_tests_at_qpts = tabulate_set(&interior_tests, rule.points())?;
    for chi in interior_tests_at_qpts.column_iter() {
      let weighted = chi.component_mul(rule.weights());
      let moments = expansion_at_qpts.tr_mul(&weighted).transpose();
      for icomp in 0..2 {
        dualmat
          .view_mut((c, icomp * psize), (1, psize))
          .copy_from(&moments);
        c += 1;
      }
    }
  }

  if c != ndofs {
    return Err(Error::Internal(format!(
      "assembled {c} dofs, expected {ndofs}"
    )));
  }
  Ok(dualmat)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::linalg::assert_mat_eq;

  #[test]
  fn dimension_of_space() {
    for degree in 1..=5 {
      let d = degree - 1;
      assert_eq!(ndofs(degree), 2 * ncoeffs(2, d) + d + 1);
      let element = NedelecElement::new(2, degree).unwrap();
      assert_eq!(element.basis().len(), 2 * element.ndofs());
      assert_eq!(element.dual_matrix().nrows(), element.ndofs());
      assert_eq!(element.dual_matrix().ncols(), 2 * element.expansion_set().len());
    }
  }

  #[test]
  fn duality() {
    for degree in 1..=5 {
      let element = NedelecElement::new(2, degree).unwrap();
      let n = element.ndofs();
      let identity = element.dual_matrix() * element.coefficients().transpose();
      assert_mat_eq(&identity, &Matrix::identity(n, n), 1e-10);
    }
  }

  #[test]
  fn lowest_order_is_whitney() {
    // lambda_i grad lambda_j - lambda_j grad lambda_i for the edges (1,2), (2,0), (0,1)
    let element = NedelecElement::new(2, 1).unwrap();
    let points = na::dmatrix![0.2, 0.3; 0.6, 0.1; 0.05, 0.7];
    let tab = element.tabulate_basis(&points).unwrap();
    let whitneys: [fn(f64, f64) -> [f64; 2]; 3] = [
      |x: f64, y: f64| [-y, x],
      |x: f64, y: f64| [-y, x - 1.0],
      |x: f64, y: f64| [1.0 - y, x],
    ];
    for (i, whitney) in whitneys.iter().enumerate() {
      for (ipoint, p) in points.row_iter().enumerate() {
        let [u, v] = whitney(p[0], p[1]);
        assert!((tab[(ipoint, i)] - u).abs() < 1e-10);
        assert!((tab[(ipoint, i + 3)] - v).abs() < 1e-10);
      }
    }
  }

  #[test]
  fn entity_dofs_partition() {
    let element = NedelecElement::new(2, 3).unwrap();
    let entity_dofs = element.entity_dofs();
    assert!(entity_dofs[0].iter().all(|dofs| dofs.is_empty()));
    assert_eq!(entity_dofs[1][1], vec![3, 4, 5]);
    assert_eq!(entity_dofs[2][0], (9..15).collect::<Vec<_>>());
    let mut all: Vec<usize> = entity_dofs.into_iter().flatten().flatten().collect();
    all.sort();
    assert_eq!(all, (0..element.ndofs()).collect::<Vec<_>>());
  }

  #[test]
  fn invalid_construction() {
    assert_eq!(
      NedelecElement::new(2, 0).unwrap_err(),
      Error::InvalidDegree(0)
    );
    assert!(matches!(
      NedelecElement::new(3, 1),
      Err(Error::Unsupported(_))
    ));
    assert!(matches!(
      NedelecElement::new(1, 1),
      Err(Error::Unsupported(_))
    ));
  }

  #[test]
  fn shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NedelecElement>();
  }
}
