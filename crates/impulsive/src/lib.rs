//! Impulsive transfer utilities: Lambert solver and classical transfer approximations.

pub mod lambert;
pub mod transfers;

pub use lambert::{LambertError, LambertSolution};
pub use transfers::{HohmannResult, hohmann};
