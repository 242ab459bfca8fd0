mod backtrack;
mod domain;
#[cfg(feature = "gurobi")]
mod gurobi;

use crate::core::Solver;

pub use backtrack::Backtracking;
pub use domain::{normalize, FiniteDomain, Normalized};
#[cfg(feature = "gurobi")]
pub use gurobi::Gurobi;

/// Constructors of every solver backend compiled into the binary.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SOLVERS: [fn() -> Box<dyn Solver>];

/// Name of the backend used when none is requested.
pub const DEFAULT_SOLVER: &str = "backtracking";

/// Returns a new instance of the solver with the given name.
#[must_use]
pub fn solver(name: &str) -> Option<Box<dyn Solver>> {
    SOLVERS.iter().map(|init| init()).find(|solver| solver.name() == name)
}

/// Returns the names of all registered solvers, sorted.
#[must_use]
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = SOLVERS.iter().map(|init| init().name().to_string()).collect();
    names.sort_unstable();
    names
}
