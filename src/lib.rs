#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;

pub mod algo;
pub mod core;
pub mod data;
pub mod engine;
pub mod logging;

/// Reads a roster document from reader, assigns duties with the given solver
/// and writes the timetable or the verdict to stdout.
///
/// # Errors
/// - If the document could not be read or is invalid.
/// - If the solver failed to run or returned an invalid model.
pub fn run_reader(
    solver: &mut dyn core::Solver,
    options: &engine::AssignOptions,
    operating_hours: &core::OperatingHours,
    reader: &mut impl BufRead,
) -> Result<core::Outcome> {
    let document: data::RosterDocument = data::deserialize(reader)?;
    let schedule = document.into_schedule(operating_hours)?;
    let outcome = engine::assign(&schedule, solver, options)?;

    if let core::Outcome::Assigned(assignment) = &outcome {
        debug_assert!(assignment.verify(&schedule).is_ok(), "Assignment is invalid: {assignment:?}");
    }

    print!("{outcome}");
    Ok(outcome)
}
