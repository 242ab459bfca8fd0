//! Turns a validated [`Schedule`] into an [`Outcome`]: short-circuit checks, encoding,
//! a single solver call and decoding of the model.

mod encoder;
mod extractor;

pub use encoder::*;
pub use extractor::extract;

use crate::core::{Error, Infeasibility, Outcome, SatResult, Schedule, Solver, SolverConfig};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Options of a single assignment run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AssignOptions {
    pub encoder: EncoderOptions,
    pub solver: SolverConfig,
}

/// Finds a reason the schedule cannot be staffed without asking a solver.
#[must_use]
pub fn precheck(schedule: &Schedule) -> Option<Infeasibility> {
    let required = schedule.duties_per_person();
    let mut covered = BTreeSet::new();

    for person in schedule.people() {
        let slots = person.available_slots();
        if slots.len() < required {
            return Some(Infeasibility::InsufficientAvailability {
                person: person.name().to_string(),
                available: slots.len(),
                required,
            });
        }
        covered.extend(slots);
    }

    (covered.len() < schedule.total_duties()).then(|| Infeasibility::NotEnoughSlots {
        required: schedule.total_duties(),
        distinct: covered.len(),
    })
}

/// Assigns duty hours to every person of the schedule.
///
/// # Errors
/// - If encoding fails, the solver cannot acquire its resources or returns an invalid model.
pub fn assign(
    schedule: &Schedule,
    solver: &mut dyn Solver,
    options: &AssignOptions,
) -> Result<Outcome, Error> {
    if let Some(reason) = precheck(schedule) {
        info!(%reason, "schedule is infeasible before solving");
        return Ok(Outcome::Infeasible(reason));
    }

    let encoding = encode(schedule, options.encoder)?;
    debug!(
        variables = encoding.instance.var_count(),
        constraints = encoding.instance.constraints().len(),
        "schedule encoded"
    );

    info!(solver = solver.name(), people = schedule.people().len(), "solving");
    match solver.check(&encoding.instance, &options.solver)? {
        SatResult::Satisfiable(model) => {
            let assignment = extract(schedule, &encoding, &model).map_err(Error::InvalidModel)?;
            info!("assignment found");
            Ok(Outcome::Assigned(assignment))
        }
        SatResult::Unsatisfiable => {
            info!("schedule is infeasible");
            Ok(Outcome::Infeasible(Infeasibility::Unsatisfiable))
        }
        SatResult::Unknown(reason) => {
            warn!(%reason, "solver could not decide");
            Ok(Outcome::Indeterminate(reason))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Instance, Model, OperatingHours, Person, ResourceError, UnknownReason};

    /// Replays a fixed answer and records what it was asked.
    struct Scripted {
        answer: Option<Result<SatResult, ResourceError>>,
        seen: Option<usize>,
    }

    impl Scripted {
        fn new(answer: Result<SatResult, ResourceError>) -> Self {
            Self {
                answer: Some(answer),
                seen: None,
            }
        }
    }

    impl Solver for Scripted {
        fn check(
            &mut self,
            instance: &Instance,
            _config: &SolverConfig,
        ) -> Result<SatResult, ResourceError> {
            self.seen = Some(instance.var_count());
            self.answer
                .take()
                .unwrap_or_else(|| Err(ResourceError::new("scripted", "called twice")))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn single(hours: &[i64], duties: i64) -> anyhow::Result<Schedule> {
        let person = Person::new("A", [hours.to_vec(), vec![], vec![], vec![], vec![]]);
        Ok(Schedule::new(vec![person], duties, OperatingHours::default())?)
    }

    #[test]
    fn short_circuit_skips_solver() -> anyhow::Result<()> {
        let mut solver = Scripted::new(Ok(SatResult::Unsatisfiable));
        let outcome = assign(&single(&[9, 10], 3)?, &mut solver, &AssignOptions::default())?;

        assert_eq!(
            outcome,
            Outcome::Infeasible(Infeasibility::InsufficientAvailability {
                person: "A".into(),
                available: 2,
                required: 3,
            })
        );
        assert_eq!(solver.seen, None);
        Ok(())
    }

    #[test]
    fn shared_single_slot_is_caught_early() -> anyhow::Result<()> {
        let people = vec![
            Person::new("A", [vec![9], vec![], vec![], vec![], vec![]]),
            Person::new("B", [vec![9], vec![], vec![], vec![], vec![]]),
        ];
        let schedule = Schedule::new(people, 1, OperatingHours::default())?;
        assert_eq!(
            precheck(&schedule),
            Some(Infeasibility::NotEnoughSlots {
                required: 2,
                distinct: 1
            })
        );
        Ok(())
    }

    #[test]
    fn unknown_is_not_infeasible() -> anyhow::Result<()> {
        let mut solver = Scripted::new(Ok(SatResult::Unknown(UnknownReason::Timeout)));
        let outcome = assign(&single(&[9, 10], 2)?, &mut solver, &AssignOptions::default())?;
        assert_eq!(outcome, Outcome::Indeterminate(UnknownReason::Timeout));
        assert_eq!(solver.seen, Some(2));
        Ok(())
    }

    #[test]
    fn resource_error_is_surfaced() -> anyhow::Result<()> {
        let failure = ResourceError::new("scripted", "no licence");
        let mut solver = Scripted::new(Err(failure.clone()));
        let result = assign(&single(&[9, 10], 2)?, &mut solver, &AssignOptions::default());
        assert_eq!(result, Err(Error::Resource(failure)));
        Ok(())
    }

    #[test]
    fn invalid_model_is_a_defect() -> anyhow::Result<()> {
        let schedule = single(&[9, 10], 2)?;
        let encoding = encode(&schedule, EncoderOptions::default())?;
        let same = Model::new(encoding.duties[0].iter().map(|&var| (var, 109)));

        let mut solver = Scripted::new(Ok(SatResult::Satisfiable(same)));
        let result = assign(&schedule, &mut solver, &AssignOptions::default());
        assert!(matches!(result, Err(Error::InvalidModel(_))));
        Ok(())
    }

    #[test]
    fn unsatisfiable_maps_to_infeasible() -> anyhow::Result<()> {
        let mut solver = Scripted::new(Ok(SatResult::Unsatisfiable));
        let outcome = assign(&single(&[9, 10], 2)?, &mut solver, &AssignOptions::default())?;
        assert_eq!(outcome, Outcome::Infeasible(Infeasibility::Unsatisfiable));
        Ok(())
    }
}
