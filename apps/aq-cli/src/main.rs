use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use aq_solver::{
    EquilibriumProblem, EquilibriumSolution, SolveControl, SolveOptions, SolvePhase,
    SolveProgressEvent, solve, solve_with_progress,
};

mod error;
mod interactive;
mod report;
mod schema;

use error::AppResult;
use interactive::SessionMode;

#[derive(Parser)]
#[command(name = "aq-cli")]
#[command(about = "Aquilibrium CLI - Equilibrium pH for weak acid/base mixtures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enter species interactively, balancing charge
    Charge {
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Enter species interactively, balancing protons against a reference form
    Proton {
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Solve a system described in a YAML file
    Solve {
        /// Path to the system YAML file
        file: PathBuf,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        solver: SolverArgs,
    },
}

/// Solver knobs shared by every command. Unset flags keep the defaults
/// (or whatever the system file's solver section chose).
#[derive(Args)]
struct SolverArgs {
    /// Starting pH guess, used when the scan is off or inconclusive
    #[arg(long)]
    guess: Option<f64>,
    /// Skip the coarse scan and descend from the guess alone
    #[arg(long)]
    no_scan: bool,
    /// Number of coarse scan grid points
    #[arg(long)]
    scan_points: Option<usize>,
    /// Accept the pH once the residual drops below this value
    #[arg(long)]
    tolerance: Option<f64>,
    /// Gradient descent iteration budget
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Gradient descent step size
    #[arg(long)]
    learning_rate: Option<f64>,
    /// Show solver progress while it runs
    #[arg(long)]
    progress: bool,
}

impl SolverArgs {
    fn apply(&self, options: &mut SolveOptions) {
        if let Some(guess) = self.guess {
            options.initial_guess = guess;
        }
        if self.no_scan {
            options.coarse_scan = false;
        }
        if let Some(points) = self.scan_points {
            options.scan.num_points = points;
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
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Charge { solver } => cmd_interactive(SessionMode::Charge, &solver),
        Commands::Proton { solver } => cmd_interactive(SessionMode::Proton, &solver),
        Commands::Solve { file, json, solver } => cmd_solve_file(&file, json, &solver),
    }
}

fn cmd_interactive(mode: SessionMode, solver: &SolverArgs) -> AppResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let system = interactive::collect_system(&mut input, &mut output, mode)?;

    let mut problem = EquilibriumProblem::new(system.species);
    if let Some(kw) = system.kw {
        problem = problem.with_kw(kw)?;
    }

    let mut options = SolveOptions::default();
    solver.apply(&mut options);

    let solution = run_solve(&problem, &options, solver.progress)?;
    report::render_text(&mut output, &problem, &solution, &system.labels)?;
    Ok(())
}

fn cmd_solve_file(file: &Path, json: bool, solver: &SolverArgs) -> AppResult<()> {
    let text = std::fs::read_to_string(file)?;
    let def: schema::SystemDef = serde_yaml::from_str(&text)?;
    let compiled = schema::compile(&def)?;
    tracing::debug!(species = compiled.labels.len(), "system description loaded");

    let mut options = compiled.options;
    solver.apply(&mut options);

    let solution = run_solve(&compiled.problem, &options, solver.progress)?;

    let mut out = io::stdout();
    if json {
        report::render_json(&mut out, &compiled.problem, &solution, &compiled.labels)?;
    } else {
        report::render_text(&mut out, &compiled.problem, &solution, &compiled.labels)?;
    }
    Ok(())
}

fn run_solve(
    problem: &EquilibriumProblem,
    options: &SolveOptions,
    progress: bool,
) -> AppResult<EquilibriumSolution> {
    if !progress {
        return Ok(solve(problem, options)?);
    }

    let mut cb = |event: &SolveProgressEvent| {
        match event.phase {
            SolvePhase::Scanning => {
                print!(
                    "\rscan anchored at pH {:.3}  residual={:.3e}",
                    event.ph, event.residual
                );
                let _ = io::stdout().flush();
            }
            SolvePhase::Refining if event.iteration % 250 == 0 => {
                print!(
                    "\riteration {:>5}  pH {:.4}  residual={:.3e}",
                    event.iteration, event.ph, event.residual
                );
                let _ = io::stdout().flush();
            }
            _ => {}
        }
        SolveControl::Continue
    };
    let solution = solve_with_progress(problem, options, &mut cb);
    clear_progress_line();

    Ok(solution?)
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}
