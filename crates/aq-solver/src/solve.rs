//! Top-level solve orchestration: scan, refine, report.

use crate::descent::{DescentConfig, refine};
use crate::error::{SolverError, SolverResult};
use crate::problem::{EquilibriumProblem, SpeciesDistribution};
use crate::progress::{SolveControl, SolvePhase, SolveProgressEvent};
use crate::scan::{ScanConfig, coarse_scan};
use aq_core::Real;

/// Options for a pH solve.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Starting pH when the coarse scan is disabled or inconclusive
    pub initial_guess: Real,
    /// Anchor the descent at the best coarse grid point first
    pub coarse_scan: bool,
    pub scan: ScanConfig,
    pub descent: DescentConfig,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            initial_guess: 7.0,
            coarse_scan: true,
            scan: ScanConfig::default(),
            descent: DescentConfig::default(),
        }
    }
}

/// Converged equilibrium state.
#[derive(Debug, Clone)]
pub struct EquilibriumSolution {
    /// pH at which the balance residual dropped below tolerance
    pub ph: Real,
    /// Residual magnitude at the accepted pH
    pub residual: Real,
    /// Descent iterations taken
    pub iterations: usize,
    /// Whether a coarse scan anchored the starting point
    pub scanned: bool,
    /// Per-species state fractions at the accepted pH
    pub species: Vec<SpeciesDistribution>,
}

/// Solve for the equilibrium pH of `problem`.
pub fn solve(
    problem: &EquilibriumProblem,
    options: &SolveOptions,
) -> SolverResult<EquilibriumSolution> {
    solve_internal(problem, options, None)
}

/// Solve with a progress callback.
///
/// The callback sees one event when the coarse scan picks a starting point
/// and one per descent iteration. Returning [`SolveControl::Stop`] abandons
/// the solve with [`SolverError::Cancelled`].
pub fn solve_with_progress(
    problem: &EquilibriumProblem,
    options: &SolveOptions,
    progress_cb: &mut dyn FnMut(&SolveProgressEvent) -> SolveControl,
) -> SolverResult<EquilibriumSolution> {
    solve_internal(problem, options, Some(progress_cb))
}

fn solve_internal(
    problem: &EquilibriumProblem,
    options: &SolveOptions,
    mut progress_cb: Option<&mut dyn FnMut(&SolveProgressEvent) -> SolveControl>,
) -> SolverResult<EquilibriumSolution> {
    validate_options(options)?;

    let residual = |ph: Real| problem.imbalance(ph);

    let mut start = options.initial_guess;
    let mut scanned = false;

    if options.coarse_scan {
        match coarse_scan(&residual, &options.scan)? {
            Some(pick) => {
                tracing::debug!(
                    ph = pick.ph,
                    residual = pick.residual,
                    "coarse scan anchored the start"
                );
                if let Some(cb) = progress_cb.as_deref_mut() {
                    let event = SolveProgressEvent {
                        phase: SolvePhase::Scanning,
                        iteration: 0,
                        ph: pick.ph,
                        residual: pick.residual,
                    };
                    if cb(&event) == SolveControl::Stop {
                        return Err(SolverError::Cancelled { iterations: 0 });
                    }
                }
                start = pick.ph;
                scanned = true;
            }
            None => {
                tracing::debug!("coarse scan found no finite residual, keeping the initial guess");
            }
        }
    }

    let refined = match refine(&residual, start, &options.descent, progress_cb) {
        Ok(refined) => refined,
        Err(err) => {
            if matches!(err, SolverError::ConvergenceFailed { .. }) {
                tracing::warn!("pH refinement gave up: {err}");
            }
            return Err(err);
        }
    };

    tracing::debug!(
        ph = refined.ph,
        residual = refined.residual,
        iterations = refined.iterations,
        "equilibrium found"
    );

    Ok(EquilibriumSolution {
        ph: refined.ph,
        residual: refined.residual,
        iterations: refined.iterations,
        scanned,
        species: problem.speciation(refined.ph),
    })
}

fn validate_options(options: &SolveOptions) -> SolverResult<()> {
    if !options.initial_guess.is_finite() {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "initial guess must be finite, got {}",
                options.initial_guess
            ),
        });
    }
    if !options.descent.learning_rate.is_finite() || options.descent.learning_rate <= 0.0 {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "learning rate must be finite and positive, got {}",
                options.descent.learning_rate
            ),
        });
    }
    if !options.descent.tolerance.is_finite() || options.descent.tolerance <= 0.0 {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "tolerance must be finite and positive, got {}",
                options.descent.tolerance
            ),
        });
    }
    if !options.descent.diff_step.is_finite() || options.descent.diff_step <= 0.0 {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "difference step must be finite and positive, got {}",
                options.descent.diff_step
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_chem::{AcidBase, BalanceMode};

    fn acetic() -> AcidBase {
        AcidBase::from_ka(vec![1.8e-5], BalanceMode::Charge { base_charge: 0 }, 0.1).unwrap()
    }

    #[test]
    fn default_options() {
        let options = SolveOptions::default();

        assert_eq!(options.initial_guess, 7.0);
        assert!(options.coarse_scan);
        assert_eq!(options.scan.num_points, 1500);
        assert_eq!(options.descent.learning_rate, 1e-3);
        assert_eq!(options.descent.max_iterations, 10_000);
        assert_eq!(options.descent.tolerance, 1e-5);
        assert_eq!(options.descent.diff_step, 1e-5);
    }

    #[test]
    fn pure_water_needs_no_refinement() {
        let problem = EquilibriumProblem::new(Vec::new());
        let solution = solve(&problem, &SolveOptions::default()).unwrap();

        // Kw = 1.01e-14 puts neutral just under 7
        assert!((solution.ph - 6.9978).abs() < 0.01);
        assert_eq!(solution.iterations, 0);
        assert!(solution.scanned);
        assert!(solution.species.is_empty());
    }

    #[test]
    fn pure_water_converges_at_the_guess() {
        let problem = EquilibriumProblem::new(Vec::new());
        let options = SolveOptions {
            coarse_scan: false,
            ..SolveOptions::default()
        };
        let solution = solve(&problem, &options).unwrap();

        assert_eq!(solution.ph, 7.0);
        assert_eq!(solution.iterations, 0);
        assert!(!solution.scanned);
    }

    #[test]
    fn non_finite_guess_is_rejected() {
        let problem = EquilibriumProblem::new(vec![acetic()]);
        let options = SolveOptions {
            initial_guess: f64::NAN,
            ..SolveOptions::default()
        };

        assert!(matches!(
            solve(&problem, &options),
            Err(SolverError::ProblemSetup { .. })
        ));
    }

    #[test]
    fn non_positive_numerics_are_rejected() {
        let problem = EquilibriumProblem::new(vec![acetic()]);

        for options in [
            SolveOptions {
                descent: DescentConfig {
                    learning_rate: 0.0,
                    ..DescentConfig::default()
                },
                ..SolveOptions::default()
            },
            SolveOptions {
                descent: DescentConfig {
                    tolerance: -1e-5,
                    ..DescentConfig::default()
                },
                ..SolveOptions::default()
            },
            SolveOptions {
                descent: DescentConfig {
                    diff_step: f64::INFINITY,
                    ..DescentConfig::default()
                },
                ..SolveOptions::default()
            },
        ] {
            assert!(matches!(
                solve(&problem, &options),
                Err(SolverError::ProblemSetup { .. })
            ));
        }
    }

    #[test]
    fn progress_solve_matches_plain_solve() {
        let problem = EquilibriumProblem::new(vec![acetic()]);
        let options = SolveOptions::default();

        let plain = solve(&problem, &options).unwrap();

        let mut events = Vec::new();
        let mut cb = |event: &SolveProgressEvent| {
            events.push(event.clone());
            SolveControl::Continue
        };
        let observed = solve_with_progress(&problem, &options, &mut cb).unwrap();

        assert_eq!(plain.ph, observed.ph);
        assert_eq!(plain.iterations, observed.iterations);
        assert!(!events.is_empty());
        assert_eq!(events[0].phase, SolvePhase::Scanning);
        assert!(
            events[1..]
                .iter()
                .all(|e| e.phase == SolvePhase::Refining)
        );
    }

    #[test]
    fn cancel_during_scan_phase() {
        let problem = EquilibriumProblem::new(vec![acetic()]);
        let mut cb = |event: &SolveProgressEvent| {
            if event.phase == SolvePhase::Scanning {
                SolveControl::Stop
            } else {
                SolveControl::Continue
            }
        };
        let result = solve_with_progress(&problem, &SolveOptions::default(), &mut cb);

        assert!(matches!(
            result,
            Err(SolverError::Cancelled { iterations: 0 })
        ));
    }

    #[test]
    fn cancel_during_refinement() {
        let problem = EquilibriumProblem::new(vec![acetic()]);
        // The default tolerance would accept the scan pick outright.
        let options = SolveOptions {
            descent: DescentConfig {
                tolerance: 1e-9,
                ..DescentConfig::default()
            },
            ..SolveOptions::default()
        };
        let mut saw_scan = false;
        let mut cb = |event: &SolveProgressEvent| {
            if event.phase == SolvePhase::Refining {
                SolveControl::Stop
            } else {
                saw_scan = true;
                SolveControl::Continue
            }
        };
        let result = solve_with_progress(&problem, &options, &mut cb);

        assert!(saw_scan);
        assert!(matches!(result, Err(SolverError::Cancelled { .. })));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn monoprotic_acids_solve_within_tolerance(
                pka in 3.0..11.0f64,
                concentration in 1e-4..0.05f64,
            ) {
                let acid = AcidBase::from_pka(
                    vec![pka],
                    BalanceMode::Charge { base_charge: 0 },
                    concentration,
                )
                .unwrap();
                let problem = EquilibriumProblem::new(vec![acid]);
                let options = SolveOptions::default();

                let solution = solve(&problem, &options).unwrap();

                prop_assert!(solution.residual <= options.descent.tolerance);
                prop_assert!(solution.ph > 0.0 && solution.ph < 14.0);
            }
        }
    }
}
