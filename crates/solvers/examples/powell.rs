//! Solves Powell's badly scaled system and prints the iteration history.
//!
//! Run with `cargo run -p ipnewt-solvers --example powell`.

use std::error::Error;

use ipnewt_problems::Powell;
use ipnewt_solvers::{
    line_search::{self, AdaptiveLineSearch},
    linear::LuSolver,
    newton::{Config, NewtonSolver},
};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::new(100, 100.0, 1e-10, 1e-10)?;
    let line_search = AdaptiveLineSearch::new(line_search::Config::default().with_alpha_max(3.0)?);

    let solver = NewtonSolver::setup(Powell::new(), LuSolver::default(), line_search, config)?;
    let solution = solver.solve_unobserved();

    println!(
        "{:>4}  {:>14}  {:>14}  {:>12}  {:>12}  {:>10}",
        "iter", "x", "y", "|r|", "tau", "alpha"
    );
    for record in &solution.history {
        println!(
            "{:>4}  {:>14.6e}  {:>14.6e}  {:>12.4e}  {:>12.4e}  {:>10.4}",
            record.iter,
            record.states[0],
            record.states[1],
            record.residual_norm,
            record.tau,
            record.alpha,
        );
    }

    println!("\n{:?} after {} iterations", solution.status, solution.iters);
    if let Some(failure) = &solution.failure {
        println!("failure: {failure}");
    }

    Ok(())
}
