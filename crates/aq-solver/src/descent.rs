//! Gradient descent refinement of a pH estimate.

use crate::error::{SolverError, SolverResult};
use crate::progress::{SolveControl, SolvePhase, SolveProgressEvent};
use aq_core::Real;

/// Gradient descent configuration.
#[derive(Debug, Clone)]
pub struct DescentConfig {
    /// Step size applied to the estimated slope
    pub learning_rate: Real,
    /// Iteration budget before the descent gives up
    pub max_iterations: usize,
    /// Residual magnitude below which the estimate is accepted
    pub tolerance: Real,
    /// Forward difference step used to estimate the slope
    pub diff_step: Real,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            max_iterations: 10_000,
            tolerance: 1e-5,
            diff_step: 1e-5,
        }
    }
}

/// Accepted estimate produced by [`refine`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Refined {
    pub ph: Real,
    pub residual: Real,
    pub iterations: usize,
}

/// Walk the residual downhill from `start` until it drops below tolerance.
///
/// The slope is estimated with a forward difference; each step moves the
/// estimate by `learning_rate` times the slope. The callback sees one event
/// per iteration and can stop the descent early.
pub(crate) fn refine<F>(
    residual: F,
    start: Real,
    config: &DescentConfig,
    mut progress_cb: Option<&mut dyn FnMut(&SolveProgressEvent) -> SolveControl>,
) -> SolverResult<Refined>
where
    F: Fn(Real) -> SolverResult<Real>,
{
    let mut ph = start;
    let mut value = residual(ph)?;

    for iteration in 0..config.max_iterations {
        if value <= config.tolerance {
            return Ok(Refined {
                ph,
                residual: value,
                iterations: iteration,
            });
        }

        if let Some(cb) = progress_cb.as_deref_mut() {
            let event = SolveProgressEvent {
                phase: SolvePhase::Refining,
                iteration,
                ph,
                residual: value,
            };
            if cb(&event) == SolveControl::Stop {
                return Err(SolverError::Cancelled {
                    iterations: iteration,
                });
            }
        }

        let ahead = residual(ph + config.diff_step)?;
        let slope = (ahead - value) / config.diff_step;

        ph -= config.learning_rate * slope;
        value = residual(ph)?;
    }

    if value <= config.tolerance {
        return Ok(Refined {
            ph,
            residual: value,
            iterations: config.max_iterations,
        });
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "maximum iterations {} reached, residual = {:.3e}",
            config.max_iterations, value
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::AqError;

    // Shallow valley the default step size can settle into.
    fn gentle_valley(x: Real) -> SolverResult<Real> {
        Ok(0.05 * (x - 2.0).abs())
    }

    #[test]
    fn converges_on_a_gentle_valley() {
        let config = DescentConfig::default();
        let refined = refine(gentle_valley, 2.1, &config, None).unwrap();

        assert!(refined.residual <= config.tolerance);
        assert!((refined.ph - 2.0).abs() < 3e-4);
        assert!(refined.iterations > 0);
    }

    #[test]
    fn zero_iterations_when_already_converged() {
        let config = DescentConfig::default();
        let refined = refine(gentle_valley, 2.0, &config, None).unwrap();

        assert_eq!(refined.iterations, 0);
        assert_eq!(refined.ph, 2.0);
    }

    #[test]
    fn respects_iteration_budget() {
        let config = DescentConfig {
            max_iterations: 10,
            ..DescentConfig::default()
        };
        let result = refine(gentle_valley, 2.1, &config, None);

        assert!(matches!(
            result,
            Err(SolverError::ConvergenceFailed { .. })
        ));
    }

    #[test]
    fn cancellation_stops_the_descent() {
        let config = DescentConfig::default();
        let mut cb = |event: &SolveProgressEvent| {
            if event.iteration == 3 {
                SolveControl::Stop
            } else {
                SolveControl::Continue
            }
        };
        let result = refine(gentle_valley, 2.1, &config, Some(&mut cb));

        assert!(matches!(
            result,
            Err(SolverError::Cancelled { iterations: 3 })
        ));
    }

    #[test]
    fn progress_reports_the_refining_phase() {
        let config = DescentConfig {
            max_iterations: 50,
            ..DescentConfig::default()
        };
        let mut events = Vec::new();
        let mut cb = |event: &SolveProgressEvent| {
            events.push(event.clone());
            SolveControl::Continue
        };
        let _ = refine(gentle_valley, 2.1, &config, Some(&mut cb));

        assert!(!events.is_empty());
        assert_eq!(events[0].ph, 2.1);
        assert!(events.iter().all(|e| e.phase == SolvePhase::Refining));
        for pair in events.windows(2) {
            assert_eq!(pair[1].iteration, pair[0].iteration + 1);
        }
    }

    #[test]
    fn numeric_failure_propagates() {
        let config = DescentConfig::default();
        let result = refine(
            |_| {
                Err(AqError::NonFinite {
                    what: "residual",
                    value: f64::NAN,
                }
                .into())
            },
            7.0,
            &config,
            None,
        );

        assert!(matches!(result, Err(SolverError::Numeric(_))));
    }
}
