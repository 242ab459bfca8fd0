use super::{Schedule, Slot, UnknownReason};
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result};

/// Duty slots assigned to each person, keyed by name.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Assignment {
    duties: BTreeMap<String, BTreeSet<Slot>>,
}

impl Assignment {
    /// Create a new assignment from per person slots.
    #[must_use]
    pub const fn new(duties: BTreeMap<String, BTreeSet<Slot>>) -> Self {
        Self { duties }
    }

    /// Returns the slots assigned to a person.
    #[must_use]
    pub fn slots(&self, name: &str) -> Option<&BTreeSet<Slot>> {
        self.duties.get(name)
    }

    /// Iterates people and their slots ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Slot>)> {
        self.duties.iter().map(|(name, slots)| (name.as_str(), slots))
    }

    /// Weekly timetable view: who staffs each slot.
    /// A slot claimed twice keeps the name that sorts last.
    #[must_use]
    pub fn by_slot(&self) -> BTreeMap<Slot, &str> {
        self.iter()
            .flat_map(|(name, slots)| slots.iter().map(move |&slot| (slot, name)))
            .collect()
    }

    /// Checks the assignment against the schedule it was made for.
    /// Every person must have exactly the required number of available slots,
    /// and no slot may be shared.
    ///
    /// # Errors
    /// - Describes the first violation found.
    pub fn verify(&self, schedule: &Schedule) -> std::result::Result<(), String> {
        if self.duties.len() != schedule.people().len() {
            return Err(format!(
                "{} people assigned, {} expected",
                self.duties.len(),
                schedule.people().len()
            ));
        }

        let mut taken = HashSet::with_capacity(schedule.total_duties());
        for person in schedule.people() {
            let slots = self
                .slots(person.name())
                .ok_or_else(|| format!("`{}` has no assignment", person.name()))?;

            if slots.len() != schedule.duties_per_person() {
                return Err(format!(
                    "`{}` has {} duties, {} required",
                    person.name(),
                    slots.len(),
                    schedule.duties_per_person()
                ));
            }

            for &slot in slots {
                if !person.is_available(slot) {
                    return Err(format!("`{}` is not available on {slot}", person.name()));
                }
                if !taken.insert(slot) {
                    return Err(format!("{slot} is assigned twice"));
                }
            }
        }

        Ok(())
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (slot, name) in self.by_slot() {
            writeln!(f, "{:>12}: {name}", slot.to_string())?;
        }
        Ok(())
    }
}

/// Why no valid assignment exists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Infeasibility {
    /// A person is free for fewer slots than the required duty count.
    InsufficientAvailability {
        person: String,
        available: usize,
        required: usize,
    },
    /// All people together are free for fewer distinct slots than duties to fill.
    NotEnoughSlots { required: usize, distinct: usize },
    /// The solver proved the constraints unsatisfiable.
    Unsatisfiable,
}

impl Display for Infeasibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InsufficientAvailability {
                person,
                available,
                required,
            } => write!(
                f,
                "`{person}` is available for {available} hours but must fill {required}"
            ),
            Self::NotEnoughSlots { required, distinct } => write!(
                f,
                "{required} duties must be filled but only {distinct} distinct hours are covered"
            ),
            Self::Unsatisfiable => write!(f, "no conflict-free assignment exists"),
        }
    }
}

/// Result of an assignment attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Assigned(Assignment),
    Infeasible(Infeasibility),
    /// The solver could not decide within its resource bounds.
    Indeterminate(UnknownReason),
}

impl Outcome {
    /// Whether an assignment was found.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// Get the assignment, if one was found.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        match self {
            Self::Assigned(assignment) => Some(assignment),
            _ => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Assigned(assignment) => write!(f, "{assignment}"),
            Self::Infeasible(reason) => writeln!(f, "infeasible: {reason}"),
            Self::Indeterminate(reason) => writeln!(f, "indeterminate: {reason}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{OperatingHours, Person, Weekday};

    fn schedule() -> anyhow::Result<Schedule> {
        let people = vec![
            Person::new("A", [vec![9, 10], vec![], vec![], vec![], vec![]]),
            Person::new("B", [vec![9], vec![9], vec![], vec![], vec![]]),
        ];
        Ok(Schedule::new(people, 1, OperatingHours::default())?)
    }

    fn assignment(a: Slot, b: Slot) -> Assignment {
        Assignment::new(BTreeMap::from([
            ("A".to_string(), BTreeSet::from([a])),
            ("B".to_string(), BTreeSet::from([b])),
        ]))
    }

    #[test]
    fn verify_accepts_valid_assignment() -> anyhow::Result<()> {
        let valid = assignment(
            Slot::new(Weekday::Monday, 9),
            Slot::new(Weekday::Tuesday, 9),
        );
        assert_eq!(valid.verify(&schedule()?), Ok(()));
        assert_eq!(valid.by_slot().len(), 2);
        Ok(())
    }

    #[test]
    fn timetable_follows_the_clock() {
        let afternoon_first = assignment(
            Slot::new(Weekday::Monday, 1),
            Slot::new(Weekday::Monday, 9),
        );
        let rendered = afternoon_first.to_string();
        let lines: Vec<_> = rendered.lines().map(str::trim).collect();
        assert_eq!(lines, ["Monday 9: B", "Monday 1: A"]);
    }

    #[test]
    fn verify_rejects_shared_slot() -> anyhow::Result<()> {
        let shared = assignment(Slot::new(Weekday::Monday, 9), Slot::new(Weekday::Monday, 9));
        assert!(shared.verify(&schedule()?).is_err());
        Ok(())
    }

    #[test]
    fn verify_rejects_unavailable_slot() -> anyhow::Result<()> {
        let unavailable = assignment(
            Slot::new(Weekday::Tuesday, 9),
            Slot::new(Weekday::Monday, 9),
        );
        assert!(unavailable.verify(&schedule()?).is_err());
        Ok(())
    }
}
