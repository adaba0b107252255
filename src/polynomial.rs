//! Dense multivariate polynomials in one, two or three variables.
//!
//! Coefficients are stored in graded lexicographic order of the monomial
//! exponents. In two variables the order is $1, x, y, x^2, x y, y^2, ...$,
//! in three variables $1, x, y, z, x^2, x y, x z, y^2, y z, z^2, ...$.
//! The layout of a polynomial of order $d$ is a prefix of the layout of any
//! higher order, so polynomials of different orders are added by padding.

use crate::{
  error::{Error, Result},
  linalg::{Matrix, Vector},
  Dim,
};

use num_integer::binomial;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Multi-index of monomial exponents, one entry per variable.
pub type Exponents = Vec<usize>;

pub const MAX_DIM: Dim = 3;

/// Number of coefficients of a polynomial of `order` in `dim` variables.
pub fn ncoeffs(dim: Dim, order: usize) -> usize {
  binomial(order + dim, dim)
}

/// Position of the monomial with the given exponents in the graded layout.
///
/// $"idx"_N (alpha) = binom(|alpha| + N - 1, N) + "idx"_(N-1) (alpha_2, ..., alpha_N)$
pub fn monomial_index(exponents: &[usize]) -> usize {
  match exponents {
    [] => 0,
    [p] => *p,
    [_, rest @ ..] => {
      let dim = exponents.len();
      let degree: usize = exponents.iter().sum();
      binomial(degree + dim - 1, dim) + monomial_index(rest)
    }
  }
}

/// All exponents of total degree exactly `degree`, in layout order.
fn homogeneous_exponents(dim: Dim, degree: usize) -> Vec<Exponents> {
  if dim == 1 {
    return vec![vec![degree]];
  }
  (0..=degree)
    .rev()
    .flat_map(|first| {
      homogeneous_exponents(dim - 1, degree - first)
        .into_iter()
        .map(move |mut rest| {
          rest.insert(0, first);
          rest
        })
    })
    .collect()
}

/// All exponents of total degree at most `order`, in layout order.
pub fn monomial_exponents(dim: Dim, order: usize) -> Vec<Exponents> {
  (0..=order)
    .flat_map(|degree| homogeneous_exponents(dim, degree))
    .collect()
}

/// $a! / (a - d)!$
fn falling_factorial(a: usize, d: usize) -> f64 {
  ((a - d + 1)..=a).map(|i| i as f64).product()
}

fn check_supported(dim: Dim) -> Result<()> {
  if (1..=MAX_DIM).contains(&dim) {
    Ok(())
  } else {
    Err(Error::Unsupported(format!("polynomials in {dim} variables")))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
  /// number of variables
  dim: Dim,
  /// maximal total degree representable by `coeffs`
  order: usize,
  coeffs: Vector,
}

impl Polynomial {
  fn zeros(dim: Dim, order: usize) -> Self {
    Self {
      dim,
      order,
      coeffs: Vector::zeros(ncoeffs(dim, order)),
    }
  }

  /// The zero polynomial of order zero in `dim` variables.
  pub fn zero(dim: Dim) -> Result<Self> {
    check_supported(dim)?;
    Ok(Self::zeros(dim, 0))
  }

  /// The constant one in `dim` variables.
  pub fn one(dim: Dim) -> Result<Self> {
    let mut p = Self::zero(dim)?;
    p.coeffs[0] = 1.0;
    Ok(p)
  }

  /// The monomial $x^alpha$.
  pub fn monomial(exponents: &[usize]) -> Result<Self> {
    let dim = exponents.len();
    check_supported(dim)?;
    let mut p = Self::zeros(dim, exponents.iter().sum());
    p.coeffs[monomial_index(exponents)] = 1.0;
    Ok(p)
  }

  /// Polynomial with the given coefficients in the graded layout.
  pub fn from_coeffs(dim: Dim, order: usize, coeffs: Vector) -> Result<Self> {
    check_supported(dim)?;
    Error::check_dim(ncoeffs(dim, order), coeffs.len())?;
    Ok(Self { dim, order, coeffs })
  }

  /// The coordinate function of variable `ivar`.
  pub fn variable(dim: Dim, ivar: usize) -> Result<Self> {
    check_supported(dim)?;
    if ivar >= dim {
      return Err(Error::Unsupported(format!(
        "variable {ivar} of a polynomial in {dim} variables"
      )));
    }
    let mut exponents = vec![0; dim];
    exponents[ivar] = 1;
    Self::monomial(&exponents)
  }

  pub fn x(dim: Dim) -> Result<Self> {
    Self::variable(dim, 0)
  }
  pub fn y(dim: Dim) -> Result<Self> {
    Self::variable(dim, 1)
  }
  pub fn z(dim: Dim) -> Result<Self> {
    Self::variable(dim, 2)
  }

  pub fn dim(&self) -> Dim {
    self.dim
  }
  pub fn order(&self) -> usize {
    self.order
  }
  pub fn coeffs(&self) -> &Vector {
    &self.coeffs
  }

  /// Coefficient vector extended with zeros to `order`.
  fn padded_coeffs(&self, order: usize) -> Vector {
    let mut coeffs = Vector::zeros(ncoeffs(self.dim, order.max(self.order)));
    coeffs.rows_mut(0, self.coeffs.len()).copy_from(&self.coeffs);
    coeffs
  }

  /// $p + s q$
  fn axpy(&self, scale: f64, other: &Self) -> Self {
    let order = self.order.max(other.order);
    let coeffs = self.padded_coeffs(order) + other.padded_coeffs(order) * scale;
    Self {
      dim: self.dim,
      order,
      coeffs,
    }
  }

  /// Product by convolution of the coefficients in exponent space.
  fn convolve(&self, other: &Self) -> Self {
    let mut product = Self::zeros(self.dim, self.order + other.order);

    let other_exponents = monomial_exponents(other.dim, other.order);
    for (alpha, &a) in monomial_exponents(self.dim, self.order)
      .iter()
      .zip(self.coeffs.iter())
    {
      if a == 0.0 {
        continue;
      }
      for (beta, &b) in other_exponents.iter().zip(other.coeffs.iter()) {
        let sum: Exponents = alpha.iter().zip(beta).map(|(a, b)| a + b).collect();
        product.coeffs[monomial_index(&sum)] += a * b;
      }
    }
    product
  }

  pub fn checked_add(&self, other: &Self) -> Result<Self> {
    Error::check_dim(self.dim, other.dim)?;
    Ok(self.axpy(1.0, other))
  }
  pub fn checked_sub(&self, other: &Self) -> Result<Self> {
    Error::check_dim(self.dim, other.dim)?;
    Ok(self.axpy(-1.0, other))
  }
  pub fn checked_mul(&self, other: &Self) -> Result<Self> {
    Error::check_dim(self.dim, other.dim)?;
    Ok(self.convolve(other))
  }

  /// Partial derivative $partial^(|d|) p \/ (partial x_1^(d_1) ... partial x_N^(d_N))$.
  pub fn diff(&self, d: &[usize]) -> Result<Self> {
    Error::check_dim(self.dim, d.len())?;
    let nd: usize = d.iter().sum();
    if nd > self.order {
      return Self::zero(self.dim);
    }

    let mut deriv = Self::zeros(self.dim, self.order - nd);
    for (alpha, &c) in monomial_exponents(self.dim, self.order)
      .iter()
      .zip(self.coeffs.iter())
    {
      if alpha.iter().zip(d).any(|(a, d)| a < d) {
        continue;
      }
      let factor: f64 = alpha
        .iter()
        .zip(d)
        .map(|(&a, &d)| falling_factorial(a, d))
        .product();
      let lowered: Exponents = alpha.iter().zip(d).map(|(a, d)| a - d).collect();
      deriv.coeffs[monomial_index(&lowered)] += factor * c;
    }
    Ok(deriv)
  }

  /// Values at the points given in the rows of `points`.
  pub fn tabulate(&self, points: &Matrix) -> Result<Vector> {
    Error::check_dim(self.dim, points.ncols())?;
    let exponents = monomial_exponents(self.dim, self.order);

    let mut values = Vector::zeros(points.nrows());
    for (ipoint, point) in points.row_iter().enumerate() {
      // powers[ivar][p] = x_ivar^p
      let powers: Vec<Vec<f64>> = point
        .iter()
        .map(|&x| {
          std::iter::successors(Some(1.0), |p| Some(p * x))
            .take(self.order + 1)
            .collect()
        })
        .collect();

      values[ipoint] = exponents
        .iter()
        .zip(self.coeffs.iter())
        .map(|(alpha, c)| {
          c * alpha
            .iter()
            .enumerate()
            .map(|(ivar, &a)| powers[ivar][a])
            .product::<f64>()
        })
        .sum();
    }
    Ok(values)
  }

  /// Value of a univariate polynomial at `x`, by Horner's scheme.
  pub fn tabulate_at(&self, x: f64) -> Result<f64> {
    Error::check_dim(1, self.dim)?;
    Ok(self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c))
  }
}

impl Add for &Polynomial {
  type Output = Polynomial;
  fn add(self, other: &Polynomial) -> Polynomial {
    assert_eq!(self.dim, other.dim, "polynomial dimension mismatch");
    self.axpy(1.0, other)
  }
}
impl Add for Polynomial {
  type Output = Polynomial;
  fn add(self, other: Polynomial) -> Polynomial {
    &self + &other
  }
}
impl AddAssign<&Polynomial> for Polynomial {
  fn add_assign(&mut self, other: &Polynomial) {
    assert_eq!(self.dim, other.dim, "polynomial dimension mismatch");
    if other.order > self.order {
      self.coeffs = self.padded_coeffs(other.order);
      self.order = other.order;
    }
    let mut head = self.coeffs.rows_mut(0, other.coeffs.len());
    head += &other.coeffs;
  }
}
impl AddAssign for Polynomial {
  fn add_assign(&mut self, other: Polynomial) {
    *self += &other;
  }
}

impl Sub for &Polynomial {
  type Output = Polynomial;
  fn sub(self, other: &Polynomial) -> Polynomial {
    assert_eq!(self.dim, other.dim, "polynomial dimension mismatch");
    self.axpy(-1.0, other)
  }
}
impl Sub for Polynomial {
  type Output = Polynomial;
  fn sub(self, other: Polynomial) -> Polynomial {
    &self - &other
  }
}
impl SubAssign<&Polynomial> for Polynomial {
  fn sub_assign(&mut self, other: &Polynomial) {
    *self += &-other;
  }
}

impl Mul for &Polynomial {
  type Output = Polynomial;
  fn mul(self, other: &Polynomial) -> Polynomial {
    assert_eq!(self.dim, other.dim, "polynomial dimension mismatch");
    self.convolve(other)
  }
}
impl Mul for Polynomial {
  type Output = Polynomial;
  fn mul(self, other: Polynomial) -> Polynomial {
    &self * &other
  }
}

impl Mul<f64> for &Polynomial {
  type Output = Polynomial;
  fn mul(self, scale: f64) -> Polynomial {
    Polynomial {
      dim: self.dim,
      order: self.order,
      coeffs: &self.coeffs * scale,
    }
  }
}
impl Mul<f64> for Polynomial {
  type Output = Polynomial;
  fn mul(mut self, scale: f64) -> Polynomial {
    self *= scale;
    self
  }
}
impl Mul<&Polynomial> for f64 {
  type Output = Polynomial;
  fn mul(self, p: &Polynomial) -> Polynomial {
    p * self
  }
}
impl Mul<Polynomial> for f64 {
  type Output = Polynomial;
  fn mul(self, p: Polynomial) -> Polynomial {
    p * self
  }
}
impl MulAssign<f64> for Polynomial {
  fn mul_assign(&mut self, scale: f64) {
    self.coeffs *= scale;
  }
}

impl Neg for &Polynomial {
  type Output = Polynomial;
  fn neg(self) -> Polynomial {
    self * -1.0
  }
}
impl Neg for Polynomial {
  type Output = Polynomial;
  fn neg(self) -> Polynomial {
    self * -1.0
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use approx::assert_relative_eq;

  fn sample_points(dim: Dim) -> Matrix {
    Matrix::from_fn(5, dim, |i, j| 0.1 * (i + 1) as f64 - 0.17 * j as f64)
  }

  /// $sum_alpha c_alpha x^alpha$ with some non-trivial coefficients.
  fn sample_poly(dim: Dim, order: usize, shift: f64) -> Polynomial {
    let mut p = Polynomial::zero(dim).unwrap();
    for (i, alpha) in monomial_exponents(dim, order).iter().enumerate() {
      p += &(Polynomial::monomial(alpha).unwrap() * (shift + 0.5 * i as f64 - 1.0));
    }
    p
  }

  #[test]
  fn index_matches_closed_forms() {
    for n in 0..6 {
      for p in 0..=n {
        let q = n - p;
        assert_eq!(monomial_index(&[p, q]), (p + q + 1) * (p + q) / 2 + q);
      }
      for p in 0..=n {
        for q in 0..=(n - p) {
          let r = n - p - q;
          let expected = (p + q + r) * (p + q + r + 1) * (p + q + r + 2) / 6
            + (q + r) * (q + r + 1) / 2
            + r;
          assert_eq!(monomial_index(&[p, q, r]), expected);
        }
      }
    }
  }

  #[test]
  fn exponents_are_in_layout_order() {
    for dim in 1..=MAX_DIM {
      let exponents = monomial_exponents(dim, 5);
      assert_eq!(exponents.len(), ncoeffs(dim, 5));
      for (i, alpha) in exponents.iter().enumerate() {
        assert_eq!(monomial_index(alpha), i);
      }
    }
    assert_eq!(
      monomial_exponents(2, 2),
      vec![
        vec![0, 0],
        vec![1, 0],
        vec![0, 1],
        vec![2, 0],
        vec![1, 1],
        vec![0, 2]
      ]
    );
  }

  #[test]
  fn constant() {
    let p = Polynomial::one(2).unwrap();
    let points = na::dmatrix![0.1, 0.2; 0.3, 0.4];
    assert_eq!(p.tabulate(&points).unwrap(), na::dvector![1.0, 1.0]);
    assert_eq!(p.order(), 0);
  }

  #[test]
  fn monomial_product() {
    let x = Polynomial::x(2).unwrap();
    let y = Polynomial::y(2).unwrap();
    let xy = &x * &y;
    assert_eq!(xy.order(), 2);
    assert_eq!(xy.tabulate(&na::dmatrix![2.0, 3.0]).unwrap(), na::dvector![6.0]);
  }

  #[test]
  fn differentiation() {
    let x = Polynomial::x(2).unwrap();
    let y = Polynomial::y(2).unwrap();
    let p = &x * &x + &x * &y;

    let at = |p: Polynomial, point: Matrix| p.tabulate(&point).unwrap()[0];
    assert_eq!(at(p.diff(&[1, 0]).unwrap(), na::dmatrix![1.0, 1.0]), 3.0);
    assert_eq!(at(p.diff(&[0, 1]).unwrap(), na::dmatrix![1.0, 1.0]), 1.0);
    assert_eq!(at(p.diff(&[1, 1]).unwrap(), na::dmatrix![0.0, 0.0]), 1.0);
  }

  #[test]
  fn monomial_derivative_rule() {
    let p = Polynomial::monomial(&[3, 2, 4]).unwrap();
    let dp = p.diff(&[2, 1, 3]).unwrap();
    // 3!/1! * 2!/1! * 4!/1! x y z
    let expected = Polynomial::monomial(&[1, 1, 1]).unwrap() * (6.0 * 2.0 * 24.0);
    assert_eq!(dp.order(), 3);
    assert_eq!(dp, expected);

    let vanishing = p.diff(&[4, 0, 0]).unwrap();
    assert_eq!(vanishing.coeffs().iter().copied().sum::<f64>(), 0.0);
  }

  #[test]
  fn diff_past_order_is_zero() {
    let p = sample_poly(2, 2, 0.3);
    let dp = p.diff(&[2, 1]).unwrap();
    assert_eq!(dp, Polynomial::zero(2).unwrap());
    let zero = Polynomial::zero(3).unwrap();
    assert_eq!(zero.diff(&[1, 0, 0]).unwrap(), zero);
  }

  #[test]
  fn diff_commutes() {
    let p = sample_poly(2, 5, 0.7);
    for (a, b, c, d) in [(1, 0, 0, 1), (2, 1, 1, 0), (0, 3, 1, 1), (1, 1, 2, 2)] {
      let lhs = p.diff(&[a, b]).unwrap().diff(&[c, d]).unwrap();
      let rhs = p.diff(&[a + c, b + d]).unwrap();
      assert_relative_eq!(lhs.coeffs(), rhs.coeffs());
    }
  }

  #[test]
  fn product_and_sum_tabulate_pointwise() {
    for dim in 1..=MAX_DIM {
      let points = sample_points(dim);
      let p = sample_poly(dim, 3, 0.2);
      let q = sample_poly(dim, 2, -0.4);
      let pv = p.tabulate(&points).unwrap();
      let qv = q.tabulate(&points).unwrap();

      let prod = (&p * &q).tabulate(&points).unwrap();
      assert_relative_eq!(prod, pv.component_mul(&qv), epsilon = 1e-12);

      let sum = (&p + &q).tabulate(&points).unwrap();
      assert_relative_eq!(sum, &pv + &qv, epsilon = 1e-12);

      let diff = (&p - &q).tabulate(&points).unwrap();
      assert_relative_eq!(diff, &pv - &qv, epsilon = 1e-12);
    }
  }

  #[test]
  fn adding_zero_is_identity() {
    let p = sample_poly(3, 2, 1.0);
    let sum = Polynomial::zero(3).unwrap() + p.clone();
    assert_eq!(sum, p);
    assert_eq!(sum.dim(), 3);
  }

  #[test]
  fn scalar_scaling_preserves_order() {
    let p = sample_poly(2, 3, 0.5);
    let scaled = 2.0 * &p;
    assert_eq!(scaled.order(), p.order());
    assert_eq!(scaled.coeffs(), &(p.coeffs() * 2.0));
    let mut q = p.clone();
    q *= -1.0;
    assert_eq!(q, -p);
  }

  #[test]
  fn univariate_horner() {
    let x = Polynomial::x(1).unwrap();
    let p = &x * &x * 3.0 - x + Polynomial::one(1).unwrap();
    assert_eq!(p.tabulate_at(2.0).unwrap(), 11.0);
    let points = na::dmatrix![2.0; -1.0];
    assert_eq!(p.tabulate(&points).unwrap(), na::dvector![11.0, 5.0]);
    assert!(Polynomial::one(2).unwrap().tabulate_at(1.0).is_err());
  }

  #[test]
  fn unsupported_variables() {
    assert!(matches!(Polynomial::y(1), Err(Error::Unsupported(_))));
    assert!(matches!(Polynomial::z(2), Err(Error::Unsupported(_))));
    assert!(matches!(Polynomial::one(4), Err(Error::Unsupported(_))));
    assert!(matches!(Polynomial::zero(0), Err(Error::Unsupported(_))));
    assert!(Polynomial::z(3).is_ok());
  }

  #[test]
  fn dimension_mismatch() {
    let p = Polynomial::x(2).unwrap();
    let q = Polynomial::x(3).unwrap();
    assert_eq!(
      p.checked_add(&q),
      Err(Error::DimensionMismatch {
        expected: 2,
        found: 3
      })
    );
    assert_eq!(
      q.checked_sub(&p),
      Err(Error::DimensionMismatch {
        expected: 3,
        found: 2
      })
    );
    assert!(p.checked_mul(&q).is_err());
    assert!(p.tabulate(&Matrix::zeros(4, 3)).is_err());
    assert!(p.diff(&[1]).is_err());
  }

  #[test]
  #[should_panic]
  fn operator_dimension_mismatch_panics() {
    let _ = Polynomial::x(2).unwrap() + Polynomial::x(1).unwrap();
  }
}
