//! Coarse residual scan across a pH window.

use crate::error::{SolverError, SolverResult};
use aq_core::Real;
use rayon::prelude::*;

/// Default lower edge of the scanned pH window.
pub const PH_SCAN_MIN: Real = 0.0;
/// Default upper edge of the scanned pH window.
pub const PH_SCAN_MAX: Real = 14.0;
/// Largest accepted scan grid.
pub const MAX_SCAN_POINTS: usize = 10_000_000;

/// Coarse scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of evenly spaced grid points
    pub num_points: usize,
    /// Lower edge of the scanned window
    pub ph_min: Real,
    /// Upper edge of the scanned window
    pub ph_max: Real,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_points: 1500,
            ph_min: PH_SCAN_MIN,
            ph_max: PH_SCAN_MAX,
        }
    }
}

/// Best grid point found by a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPick {
    pub ph: Real,
    pub residual: Real,
}

/// Evaluate the residual on an evenly spaced grid and pick the minimum.
///
/// Grid points whose residual comes back non-finite are not candidates; if
/// no point evaluates to a finite residual the scan is inconclusive and
/// returns `None`. Grid evaluations are independent and run in parallel.
pub fn coarse_scan<F>(residual: F, config: &ScanConfig) -> SolverResult<Option<ScanPick>>
where
    F: Fn(Real) -> SolverResult<Real> + Sync,
{
    if config.num_points < 2 {
        return Err(SolverError::ProblemSetup {
            what: format!("scan needs at least 2 points, got {}", config.num_points),
        });
    }
    if config.num_points > MAX_SCAN_POINTS {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "scan supports at most {MAX_SCAN_POINTS} points, got {}",
                config.num_points
            ),
        });
    }
    if !config.ph_min.is_finite() || !config.ph_max.is_finite() || config.ph_min >= config.ph_max {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "scan window must be finite and ordered, got {}..{}",
                config.ph_min, config.ph_max
            ),
        });
    }

    let grid = linear_grid(config.ph_min, config.ph_max, config.num_points);

    let pick = grid
        .par_iter()
        .filter_map(|&ph| {
            residual(ph)
                .ok()
                .map(|residual| ScanPick { ph, residual })
        })
        .min_by(|a, b| a.residual.total_cmp(&b.residual));

    Ok(pick)
}

fn linear_grid(start: Real, end: Real, num_points: usize) -> Vec<Real> {
    let mut points = Vec::with_capacity(num_points);
    let delta = (end - start) / (num_points - 1) as f64;

    for i in 0..num_points {
        points.push(start + i as f64 * delta);
    }

    // Ensure exact endpoint
    points[num_points - 1] = end;
    points
}
