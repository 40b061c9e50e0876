//! Aqueous acid/base speciation.
//!
//! Models a polyprotic acid or base as an ordered ladder of dissociation
//! constants and computes the fraction of each protonation state present at a
//! given pH. Species carry an integer weight per state (ionic charge or
//! relative proton count) so a solver can assemble charge- or proton-balance
//! residuals from the same model.

pub mod error;
pub mod species;
pub mod water;

pub use error::{ChemError, ChemResult};
pub use species::{AcidBase, BalanceMode};
pub use water::{KW_DEFAULT, hydronium, hydroxide};
