extern crate nalgebra as na;

pub mod error;
pub mod linalg;
pub mod nedelec;
pub mod polynomial;
pub mod polyset;
pub mod quadrature;
pub mod simplex;

pub use error::{Error, Result};
pub use nedelec::NedelecElement;
pub use polynomial::Polynomial;

pub type Dim = usize;
