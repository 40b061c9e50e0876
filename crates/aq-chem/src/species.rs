//! Polyprotic acid/base species model.

use crate::error::{ChemError, ChemResult};
use crate::water::hydronium;
use aq_core::Real;

/// How a species contributes to the system balance equation.
///
/// The solver weighs each protonation state by an integer; the two balance
/// formulations differ only in how that weight ladder is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceMode {
    /// Charge balance: states are weighted by their net ionic charge.
    Charge {
        /// Charge of the fully protonated state.
        base_charge: i32,
    },
    /// Proton balance: states are weighted by protons held relative to a
    /// reference state.
    Proton {
        /// Dissociable protons on the fully protonated state.
        max_protons: u32,
        /// Proton count of the reference state.
        reference: i32,
    },
}

impl BalanceMode {
    /// Weight of each protonation state, fully protonated first.
    fn state_weights(self, num_constants: usize) -> ChemResult<Vec<i32>> {
        let num_states = num_constants + 1;
        match self {
            BalanceMode::Charge { base_charge } => {
                Ok((0..num_states).map(|i| base_charge - i as i32).collect())
            }
            BalanceMode::Proton {
                max_protons,
                reference,
            } => {
                if max_protons == 0 {
                    return Err(ChemError::InvalidArg {
                        what: "proton balance requires at least one dissociable proton",
                    });
                }
                if max_protons > i32::MAX as u32 {
                    return Err(ChemError::InvalidArg {
                        what: "proton count exceeds the supported range",
                    });
                }
                Ok((0..num_states)
                    .map(|i| max_protons as i32 - i as i32 - reference)
                    .collect())
            }
        }
    }
}

/// One polyprotic acid or base in solution.
///
/// The dissociation ladder is kept in canonical order (Ka descending, pKa
/// ascending) regardless of input order, with the running products of the
/// extended constant basis `[1, Ka1, Ka1*Ka2, ...]` precomputed for
/// [`AcidBase::alpha`]. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AcidBase {
    ka: Vec<Real>,
    pka: Vec<Real>,
    state_weights: Vec<i32>,
    concentration: Real,
    cumulative_ka: Vec<Real>,
}

impl AcidBase {
    /// Build a species from acid dissociation constants.
    ///
    /// Every Ka must be finite and positive; the list may be in any order.
    pub fn from_ka(ka: Vec<Real>, mode: BalanceMode, concentration: Real) -> ChemResult<Self> {
        if ka.is_empty() {
            return Err(ChemError::MissingConstants);
        }
        for &k in &ka {
            if !k.is_finite() || k <= 0.0 {
                return Err(ChemError::NonPhysical {
                    what: "dissociation constant",
                });
            }
        }
        let mut ka = ka;
        ka.sort_by(|a, b| b.total_cmp(a));
        let pka = ka.iter().map(|k| -k.log10()).collect();
        Self::build(ka, pka, mode, concentration)
    }

    /// Build a species from pKa values.
    ///
    /// Every pKa must be finite; the list may be in any order.
    pub fn from_pka(pka: Vec<Real>, mode: BalanceMode, concentration: Real) -> ChemResult<Self> {
        if pka.is_empty() {
            return Err(ChemError::MissingConstants);
        }
        for &p in &pka {
            if !p.is_finite() {
                return Err(ChemError::NonPhysical {
                    what: "pKa value",
                });
            }
        }
        let mut pka = pka;
        pka.sort_by(|a, b| a.total_cmp(b));
        let ka = pka.iter().map(|p| 10.0_f64.powf(-p)).collect();
        Self::build(ka, pka, mode, concentration)
    }

    fn build(
        ka: Vec<Real>,
        pka: Vec<Real>,
        mode: BalanceMode,
        concentration: Real,
    ) -> ChemResult<Self> {
        if !concentration.is_finite() || concentration < 0.0 {
            return Err(ChemError::NonPhysical {
                what: "concentration",
            });
        }

        let state_weights = mode.state_weights(ka.len())?;

        let mut cumulative_ka = Vec::with_capacity(ka.len() + 1);
        let mut running = 1.0;
        cumulative_ka.push(running);
        for &k in &ka {
            running *= k;
            cumulative_ka.push(running);
        }

        Ok(Self {
            ka,
            pka,
            state_weights,
            concentration,
            cumulative_ka,
        })
    }

    /// Fraction of each protonation state at the given pH, fully protonated
    /// first.
    ///
    /// Closed form from the dissociation ladder: state `i` carries
    /// `h^(N-i) * cumulative_ka[i]`, normalized over all states. Any pH is
    /// accepted; extreme inputs can push the hydronium powers out of range,
    /// in which case the fractions come back non-finite and the caller
    /// decides what to do.
    pub fn alpha(&self, ph: Real) -> Vec<Real> {
        let h = hydronium(ph);
        let top = self.ka.len();

        let mut terms = Vec::with_capacity(self.num_states());
        for (i, &k_prod) in self.cumulative_ka.iter().enumerate() {
            terms.push(h.powi((top - i) as i32) * k_prod);
        }

        let denominator: Real = terms.iter().sum();
        terms.iter().map(|t| t / denominator).collect()
    }

    /// Dissociation constants, strongest first.
    pub fn ka(&self) -> &[Real] {
        &self.ka
    }

    /// pKa values, smallest first.
    pub fn pka(&self) -> &[Real] {
        &self.pka
    }

    /// Balance weight of each protonation state, fully protonated first.
    pub fn state_weights(&self) -> &[i32] {
        &self.state_weights
    }

    /// Total analytical concentration.
    pub fn concentration(&self) -> Real {
        self.concentration
    }

    /// Number of protonation states (dissociation constants plus one).
    pub fn num_states(&self) -> usize {
        self.ka.len() + 1
    }
}
