//! System file schema and its translation into a solvable problem.

use serde::{Deserialize, Serialize};

use aq_chem::{AcidBase, BalanceMode};
use aq_solver::{EquilibriumProblem, SolveOptions};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub balance: BalanceDef,
    /// Water ion product; omit or set 0 for the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kw: Option<f64>,
    #[serde(default)]
    pub species: Vec<SpeciesDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BalanceDef {
    Charge,
    Proton,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Dissociation constants, strongest first. Give either these or pKa.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ka: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pka: Option<Vec<f64>>,
    pub concentration: f64,
    /// Charge of the fully protonated form (charge balance only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<i32>,
    /// Acidic protons on the fully protonated form (proton balance only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protons: Option<u32>,
    /// Protons carried by the form as added (proton balance only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guess: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_points: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_step: Option<f64>,
}

impl SolverDef {
    pub fn apply(&self, options: &mut SolveOptions) {
        if let Some(guess) = self.guess {
            options.initial_guess = guess;
        }
        if let Some(scan) = self.scan {
            options.coarse_scan = scan;
        }
        if let Some(points) = self.scan_points {
            options.scan.num_points = points;
        }
        if let Some(ph_min) = self.scan_min {
            options.scan.ph_min = ph_min;
        }
        if let Some(ph_max) = self.scan_max {
            options.scan.ph_max = ph_max;
        }
        if let Some(tolerance) = self.tolerance {
            options.descent.tolerance = tolerance;
        }
        if let Some(budget) = self.max_iterations {
            options.descent.max_iterations = budget;
        }
        if let Some(rate) = self.learning_rate {
            options.descent.learning_rate = rate;
        }
        if let Some(step) = self.diff_step {
            options.descent.diff_step = step;
        }
    }
}

/// A system file translated into solver inputs.
pub struct CompiledSystem {
    pub problem: EquilibriumProblem,
    pub options: SolveOptions,
    pub labels: Vec<String>,
}

/// Check a parsed definition against its balance mode and build the problem.
pub fn compile(def: &SystemDef) -> AppResult<CompiledSystem> {
    let mut species = Vec::with_capacity(def.species.len());
    let mut labels = Vec::with_capacity(def.species.len());

    for (index, spec) in def.species.iter().enumerate() {
        let label = spec
            .label
            .clone()
            .unwrap_or_else(|| format!("species {}", index + 1));

        let mode = match def.balance {
            BalanceDef::Charge => {
                if spec.protons.is_some() || spec.reference.is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "{label}: protons/reference apply to proton balance only"
                    )));
                }
                let base_charge = spec.charge.ok_or_else(|| {
                    AppError::InvalidInput(format!("{label}: charge balance needs a charge"))
                })?;
                BalanceMode::Charge { base_charge }
            }
            BalanceDef::Proton => {
                if spec.charge.is_some() {
                    return Err(AppError::InvalidInput(format!(
                        "{label}: charge applies to charge balance only"
                    )));
                }
                let max_protons = spec.protons.ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "{label}: proton balance needs a proton count"
                    ))
                })?;
                let reference = spec.reference.ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "{label}: proton balance needs a reference proton count"
                    ))
                })?;
                BalanceMode::Proton {
                    max_protons,
                    reference,
                }
            }
        };

        let acid_base = match (&spec.ka, &spec.pka) {
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidInput(format!(
                    "{label}: give ka or pka, not both"
                )));
            }
            (Some(ka), None) => AcidBase::from_ka(ka.clone(), mode, spec.concentration)?,
            (None, Some(pka)) => AcidBase::from_pka(pka.clone(), mode, spec.concentration)?,
            (None, None) => {
                return Err(AppError::InvalidInput(format!(
                    "{label}: give ka or pka values"
                )));
            }
        };

        species.push(acid_base);
        labels.push(label);
    }

    let mut problem = EquilibriumProblem::new(species);
    if let Some(kw) = def.kw {
        if kw != 0.0 {
            problem = problem.with_kw(kw)?;
        }
    }

    let mut options = SolveOptions::default();
    if let Some(solver) = &def.solver {
        solver.apply(&mut options);
    }

    Ok(CompiledSystem {
        problem,
        options,
        labels,
    })
}
