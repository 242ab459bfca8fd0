mod csp;
mod error;
mod outcome;
mod problem;

pub use csp::*;
pub use error::*;
pub use outcome::*;
pub use problem::*;

/// Checks satisfiability of a finite-domain instance.
///
/// A backend owns every resource it acquires for a check and releases it
/// before returning, whatever the result.
pub trait Solver {
    /// Checks the instance and returns a model when it is satisfiable.
    ///
    /// # Errors
    /// - If the backend cannot acquire its context.
    fn check(&mut self, instance: &Instance, config: &SolverConfig)
        -> Result<SatResult, ResourceError>;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}
