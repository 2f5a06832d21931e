//! Transfer window search: Lambert-based transfer evaluation, porkchop grids,
//! transfer selection, and a background grid worker.

pub mod evaluator;
pub mod porkchop;
pub mod selector;
pub mod window;
pub mod worker;

pub use facade::*;
pub use twp_impulsive as impulsive;

mod facade;
