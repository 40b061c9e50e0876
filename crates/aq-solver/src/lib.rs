//! Equilibrium pH solver for aqueous acid/base systems.
//!
//! The unknown is a single pH. The residual is the absolute charge or proton
//! imbalance of the solution at a candidate pH; an optional coarse scan
//! across the 0..14 window anchors the starting point, then forward
//! difference gradient descent refines it until the residual drops under the
//! tolerance.

pub mod descent;
pub mod error;
pub mod problem;
pub mod progress;
pub mod scan;
pub mod solve;

pub use descent::DescentConfig;
pub use error::{SolverError, SolverResult};
pub use problem::{EquilibriumProblem, SpeciesDistribution};
pub use progress::{SolveControl, SolvePhase, SolveProgressEvent};
pub use scan::{PH_SCAN_MAX, PH_SCAN_MIN, ScanConfig, ScanPick, coarse_scan};
pub use solve::{EquilibriumSolution, SolveOptions, solve, solve_with_progress};
