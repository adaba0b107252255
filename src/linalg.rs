pub type Matrix = na::DMatrix<f64>;
pub type Vector = na::DVector<f64>;
pub type Lu = na::LU<f64, na::Dyn, na::Dyn>;

pub trait LuExt {
  /// Ratio of the smallest to the largest absolute pivot.
  ///
  /// Cheap stand-in for the reciprocal condition number of the factored matrix.
  fn pivot_ratio(&self) -> f64;
}
impl LuExt for Lu {
  fn pivot_ratio(&self) -> f64 {
    let pivots = self.u().diagonal().map(f64::abs);
    let max = pivots.max();
    if max == 0.0 {
      0.0
    } else {
      pivots.min() / max
    }
  }
}

#[cfg(test)]
pub(crate) fn assert_mat_eq(a: &Matrix, b: &Matrix, tol: f64) {
  let error = (a - b).norm();
  assert!(
    error <= tol,
    "matrices differ by {error:e} (tolerance {tol:e})\na = {a:.3}\nb = {b:.3}"
  );
}
