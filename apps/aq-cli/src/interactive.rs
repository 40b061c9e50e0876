//! Interactive data entry for a console session.

use std::io::{BufRead, Write};
use std::str::FromStr;

use aq_chem::{AcidBase, BalanceMode};

use crate::error::{AppError, AppResult};

/// Upper bounds on user-typed counts.
const MAX_SPECIES: usize = 64;
const MAX_CONSTANTS: usize = 64;

/// Which balance convention the session collects species for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Charge,
    Proton,
}

/// Everything a session gathered from the user.
pub struct CollectedSystem {
    pub species: Vec<AcidBase>,
    pub labels: Vec<String>,
    /// Kw override, `None` when the user asked for the default.
    pub kw: Option<f64>,
}

/// Walk the user through describing a system, one species at a time.
///
/// Lines that fail to parse re-prompt; a species the model rejects is
/// re-entered from scratch. Errors out only on I/O failure or end of input.
pub fn collect_system<R, W>(
    input: &mut R,
    output: &mut W,
    mode: SessionMode,
) -> AppResult<CollectedSystem>
where
    R: BufRead,
    W: Write,
{
    let count = prompt_count(
        input,
        output,
        "How many acids or bases are in solution?",
        MAX_SPECIES,
    )?;

    let mut species = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for index in 0..count {
        writeln!(output)?;
        writeln!(output, "-- species {} of {} --", index + 1, count)?;
        loop {
            match read_species(input, output, mode) {
                Ok(one) => {
                    species.push(one);
                    break;
                }
                Err(AppError::Chem(err)) => {
                    writeln!(output, "{err}; starting this species over.")?;
                }
                Err(err) => return Err(err),
            }
        }
        labels.push(format!("species {}", index + 1));
    }

    let kw: f64 = prompt(input, output, "Water ion product Kw (0 for the default)?")?;
    let kw = if kw == 0.0 { None } else { Some(kw) };

    Ok(CollectedSystem {
        species,
        labels,
        kw,
    })
}

fn read_species<R, W>(input: &mut R, output: &mut W, mode: SessionMode) -> AppResult<AcidBase>
where
    R: BufRead,
    W: Write,
{
    let use_pka = loop {
        let choice: u32 = prompt(input, output, "Enter constants as Ka (1) or pKa (2)?")?;
        match choice {
            1 => break false,
            2 => break true,
            _ => writeln!(output, "Please answer 1 or 2.")?,
        }
    };

    let count = prompt_count(input, output, "How many dissociable protons?", MAX_CONSTANTS)?;
    let name = if use_pka { "pKa" } else { "Ka" };
    let mut constants = Vec::with_capacity(count);
    for i in 0..count {
        let value: f64 = prompt(input, output, &format!("{name} {} of {}?", i + 1, count))?;
        constants.push(value);
    }

    let mode = match mode {
        SessionMode::Charge => {
            let base_charge: i32 = prompt(input, output, "Charge of the fully protonated form?")?;
            BalanceMode::Charge { base_charge }
        }
        SessionMode::Proton => {
            let max_protons: u32 =
                prompt(input, output, "Acidic protons when fully protonated?")?;
            let reference: i32 = prompt(input, output, "Protons carried by the form as added?")?;
            BalanceMode::Proton {
                max_protons,
                reference,
            }
        }
    };

    let concentration: f64 = prompt(input, output, "Concentration in mol/L?")?;

    let species = if use_pka {
        AcidBase::from_pka(constants, mode, concentration)?
    } else {
        AcidBase::from_ka(constants, mode, concentration)?
    };
    Ok(species)
}

/// Prompt for a count, re-asking while it is beyond `limit`.
fn prompt_count<R, W>(input: &mut R, output: &mut W, label: &str, limit: usize) -> AppResult<usize>
where
    R: BufRead,
    W: Write,
{
    loop {
        let count: usize = prompt(input, output, label)?;
        if count <= limit {
            return Ok(count);
        }
        writeln!(output, "At most {limit}, try again.")?;
    }
}

/// Prompt until the line parses as a `T`.
fn prompt<T, R, W>(input: &mut R, output: &mut W, label: &str) -> AppResult<T>
where
    T: FromStr,
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{label} ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::InvalidInput("input ended mid-session".to_string()));
        }
        match line.trim().parse::<T>() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(output, "Could not read `{}`, try again.", line.trim())?,
        }
    }
}
