//! Progress reporting and cancellation for a running solve.

use aq_core::Real;

/// Phase of the solve a progress event was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePhase {
    /// Coarse grid scan for a starting point.
    Scanning,
    /// Gradient descent refinement.
    Refining,
}

/// Snapshot of solver state, handed to the progress callback.
#[derive(Debug, Clone)]
pub struct SolveProgressEvent {
    pub phase: SolvePhase,
    /// Descent iterations completed so far (0 while scanning).
    pub iteration: usize,
    /// Current pH estimate.
    pub ph: Real,
    /// Residual at the current estimate.
    pub residual: Real,
}

/// Control flow decision returned by a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveControl {
    Continue,
    Stop,
}
