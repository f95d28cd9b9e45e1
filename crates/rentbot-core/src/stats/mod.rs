pub mod fiterror;
pub mod ols;
pub mod stats;

pub use fiterror::{FitError, FitResult};
pub use ols::Ols;
