//! Transfer window planning for bodies orbiting a common parent.
//!
//! The physics lives in the member crates; this crate re-exports them so the
//! binaries and integration tests share one import path.

pub use twp_config as config;
pub use twp_core as common;
pub use twp_ephemeris as ephemeris;
pub use twp_export as export;
pub use twp_impulsive as impulsive;
pub use twp_orbits as orbits;
pub use twp_transfer as transfer;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
