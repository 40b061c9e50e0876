//! Equilibrium problem definition.

use crate::error::{SolverError, SolverResult};
use aq_chem::{AcidBase, KW_DEFAULT, hydronium, hydroxide};
use aq_core::{Real, ensure_finite};

/// An aqueous system whose pH is the single unknown.
///
/// Holds the species list and the water ion product. The residual is the
/// absolute charge or proton imbalance at a candidate pH; it is zero at
/// equilibrium. An empty species list is valid and describes pure water.
#[derive(Debug, Clone)]
pub struct EquilibriumProblem {
    species: Vec<AcidBase>,
    kw: Real,
}

/// State weights and fractions of one species at a given pH.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDistribution {
    pub state_weights: Vec<i32>,
    pub fractions: Vec<Real>,
}

impl EquilibriumProblem {
    /// Create a problem with the default water ion product.
    pub fn new(species: Vec<AcidBase>) -> Self {
        Self {
            species,
            kw: KW_DEFAULT,
        }
    }

    /// Override the water ion product.
    pub fn with_kw(mut self, kw: Real) -> SolverResult<Self> {
        if !kw.is_finite() || kw <= 0.0 {
            return Err(SolverError::ProblemSetup {
                what: format!("ion product must be finite and positive, got {kw}"),
            });
        }
        self.kw = kw;
        Ok(self)
    }

    pub fn species(&self) -> &[AcidBase] {
        &self.species
    }

    pub fn kw(&self) -> Real {
        self.kw
    }

    /// Absolute balance imbalance at the candidate pH.
    ///
    /// Accumulates `h - oh` plus each species' concentration-weighted state
    /// fractions. A non-finite accumulation is an error, never a residual
    /// value, so it can never pass a convergence check.
    pub fn imbalance(&self, ph: Real) -> SolverResult<Real> {
        let h = hydronium(ph);
        let mut x = h - hydroxide(ph, self.kw);

        for species in &self.species {
            let fractions = species.alpha(ph);
            let weighted: Real = species
                .state_weights()
                .iter()
                .zip(&fractions)
                .map(|(&w, &f)| w as Real * f)
                .sum();
            x += species.concentration() * weighted;
        }

        Ok(ensure_finite(x, "balance residual")?.abs())
    }

    /// Per-species state weights and fractions at the given pH.
    pub fn speciation(&self, ph: Real) -> Vec<SpeciesDistribution> {
        self.species
            .iter()
            .map(|s| SpeciesDistribution {
                state_weights: s.state_weights().to_vec(),
                fractions: s.alpha(ph),
            })
            .collect()
    }
}
