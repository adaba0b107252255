//! Orthonormal polynomial sets on the reference simplex.
//!
//! The basis is the Dubiner basis in collapsed coordinates. Level `i` of a
//! member with exponents $(p_0, ..., p_(N-1))$ is the scaled Jacobi polynomial
//! $t_i^(p_i) P_(p_i)^((a_i, 0))(s_i / t_i)$ with
//! $t_i = 1 - sum_(j>i) x_j$, $s_i = 2 x_i - t_i$ and
//! $a_i = 2 sum_(j<i) p_j + i$. The members are mutually orthogonal and
//! $norm(phi)^2 = product_i (2 sum_(j<=i) p_j + i + 1)^(-1)$.

use crate::{
  error::Result,
  linalg::Vector,
  polynomial::{monomial_exponents, ncoeffs, Polynomial},
  Dim,
};

/// $t^n P_n^((alpha, 0))(s / t)$ by the three-term Jacobi recurrence,
/// multiplied through by $t^n$ so that it stays polynomial.
fn scaled_jacobi(alpha: usize, n: usize, s: &Polynomial, t: &Polynomial) -> Result<Polynomial> {
  let a = alpha as f64;
  let mut prev = Polynomial::one(s.dim())?;
  if n == 0 {
    return Ok(prev);
  }
  let mut curr = (0.5 * (a + 2.0)) * s + (0.5 * a) * t;
  let tt = t * t;
  for k in 2..=n {
    let k = k as f64;
    let c = 2.0 * k + a;
    let denom = 2.0 * k * (k + a) * (c - 2.0);
    let lin = ((c - 1.0) * c * (c - 2.0) / denom) * s + ((c - 1.0) * a * a / denom) * t;
    let next = &lin * &curr - (2.0 * (k + a - 1.0) * (k - 1.0) * c / denom) * (&tt * &prev);
    prev = std::mem::replace(&mut curr, next);
  }
  Ok(curr)
}

/// $L^2$-orthonormal basis of $P_d$ on the reference `dim`-simplex.
///
/// Members are enumerated along the graded monomial exponents, so the first
/// `ncoeffs(dim, d - 1)` of them span $P_(d-1)$. Every member is stored with
/// order `degree`.
pub fn orthonormal_basis(dim: Dim, degree: usize) -> Result<Vec<Polynomial>> {
  let one = Polynomial::one(dim)?;

  // (s_i, t_i) of each level
  let mut levels = Vec::with_capacity(dim);
  for i in 0..dim {
    let mut t = one.clone();
    for j in (i + 1)..dim {
      t -= &Polynomial::variable(dim, j)?;
    }
    let s = &(2.0 * Polynomial::variable(dim, i)?) - &t;
    levels.push((s, t));
  }

  let nbasis = ncoeffs(dim, degree);
  let mut basis = Vec::with_capacity(nbasis);
  for exponents in monomial_exponents(dim, degree) {
    let mut member = one.clone();
    let mut norm_sq = 1.0;
    let mut partial = 0;
    for (i, (&p, (s, t))) in exponents.iter().zip(&levels).enumerate() {
      member = &member * &scaled_jacobi(2 * partial + i, p, s, t)?;
      partial += p;
      norm_sq /= (2 * partial + i + 1) as f64;
    }
    member *= norm_sq.sqrt().recip();

    let mut coeffs = Vector::zeros(nbasis);
    coeffs
      .rows_mut(0, member.coeffs().len())
      .copy_from(member.coeffs());
    basis.push(Polynomial::from_coeffs(dim, degree, coeffs)?);
  }
  Ok(basis)
}
