//! Result rendering for the console and for JSON export.

use std::io::Write;

use aq_chem::AcidBase;
use aq_solver::{EquilibriumProblem, EquilibriumSolution};
use serde::Serialize;

use crate::error::AppResult;

/// Classic console report: the pH headline, then a digest per species.
pub fn render_text<W: Write>(
    out: &mut W,
    problem: &EquilibriumProblem,
    solution: &EquilibriumSolution,
    labels: &[String],
) -> AppResult<()> {
    writeln!(out)?;
    writeln!(out, "The pH is: {:.5}", solution.ph)?;
    let anchor = if solution.scanned {
        ", scan anchored"
    } else {
        ""
    };
    writeln!(
        out,
        "residual {:.3e} after {} iteration(s){anchor}",
        solution.residual, solution.iterations
    )?;

    for ((species, dist), label) in problem
        .species()
        .iter()
        .zip(&solution.species)
        .zip(labels)
    {
        writeln!(out)?;
        write_species_digest(out, species, label)?;
        for (weight, fraction) in dist.state_weights.iter().zip(&dist.fractions) {
            writeln!(out, "  state {weight:+}: fraction {fraction:.5}")?;
        }
    }
    Ok(())
}

fn write_species_digest<W: Write>(out: &mut W, species: &AcidBase, label: &str) -> AppResult<()> {
    writeln!(out, "{label}: {:.2e} M", species.concentration())?;
    for (ka, pka) in species.ka().iter().zip(species.pka()) {
        writeln!(out, "  Ka {ka:.2e}  (pKa {pka:.2})")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ph: f64,
    residual: f64,
    iterations: usize,
    scanned: bool,
    species: Vec<JsonSpecies<'a>>,
}

#[derive(Serialize)]
struct JsonSpecies<'a> {
    label: &'a str,
    concentration: f64,
    pka: &'a [f64],
    state_weights: &'a [i32],
    fractions: &'a [f64],
}

/// Machine-readable form of the same report.
pub fn render_json<W: Write>(
    out: &mut W,
    problem: &EquilibriumProblem,
    solution: &EquilibriumSolution,
    labels: &[String],
) -> AppResult<()> {
    let species = problem
        .species()
        .iter()
        .zip(&solution.species)
        .zip(labels)
        .map(|((species, dist), label)| JsonSpecies {
            label: label.as_str(),
            concentration: species.concentration(),
            pka: species.pka(),
            state_weights: &dist.state_weights,
            fractions: &dist.fractions,
        })
        .collect();

    let report = JsonReport {
        ph: solution.ph,
        residual: solution.residual,
        iterations: solution.iterations,
        scanned: solution.scanned,
        species,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
