use super::encoder::{decode_slot, Encoding};
use crate::core::{Assignment, Model, Schedule};
use std::collections::{BTreeMap, BTreeSet};

/// Decodes a satisfying model into per person duty slots and verifies the result.
///
/// # Errors
/// - If a duty variable has no value or a value that decodes to no slot.
/// - If the decoded assignment violates the schedule, meaning the solver broke its contract.
pub fn extract(schedule: &Schedule, encoding: &Encoding, model: &Model) -> Result<Assignment, String> {
    let mut duties = BTreeMap::new();

    for (person, vars) in schedule.people().iter().zip(&encoding.duties) {
        let mut slots = BTreeSet::new();
        for &var in vars {
            let name = encoding.instance.name(var).unwrap_or("?");
            let value = model
                .value(var)
                .ok_or_else(|| format!("model has no value for `{name}`"))?;
            let slot =
                decode_slot(value).ok_or_else(|| format!("`{name}` = {value} is not a slot"))?;
            slots.insert(slot);
        }
        duties.insert(person.name().to_string(), slots);
    }

    let assignment = Assignment::new(duties);
    assignment.verify(schedule)?;
    Ok(assignment)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{OperatingHours, Person, Slot, Weekday};
    use crate::engine::encoder::{encode, EncoderOptions};

    fn schedule() -> anyhow::Result<Schedule> {
        let people = vec![
            Person::new("A", [vec![9, 10], vec![], vec![], vec![], vec![]]),
            Person::new("B", [vec![10], vec![], vec![], vec![], vec![]]),
        ];
        Ok(Schedule::new(people, 1, OperatingHours::default())?)
    }

    #[test]
    fn decodes_model() -> anyhow::Result<()> {
        let schedule = schedule()?;
        let encoding = encode(&schedule, EncoderOptions::default())?;
        let model = Model::new([(encoding.duties[0][0], 109), (encoding.duties[1][0], 110)]);

        let assignment = extract(&schedule, &encoding, &model).map_err(anyhow::Error::msg)?;
        assert_eq!(
            assignment.slots("A"),
            Some(&BTreeSet::from([Slot::new(Weekday::Monday, 9)]))
        );
        assert_eq!(
            assignment.slots("B"),
            Some(&BTreeSet::from([Slot::new(Weekday::Monday, 10)]))
        );
        Ok(())
    }

    #[test]
    fn rejects_double_booking() -> anyhow::Result<()> {
        let schedule = schedule()?;
        let encoding = encode(&schedule, EncoderOptions::default())?;
        let model = Model::new([(encoding.duties[0][0], 110), (encoding.duties[1][0], 110)]);
        assert!(extract(&schedule, &encoding, &model).is_err());
        Ok(())
    }

    #[test]
    fn rejects_missing_and_undecodable_values() -> anyhow::Result<()> {
        let schedule = schedule()?;
        let encoding = encode(&schedule, EncoderOptions::default())?;

        let missing = Model::new([(encoding.duties[0][0], 109)]);
        assert!(extract(&schedule, &encoding, &missing).is_err());

        let garbage = Model::new([(encoding.duties[0][0], 109), (encoding.duties[1][0], 7)]);
        assert!(extract(&schedule, &encoding, &garbage).is_err());
        Ok(())
    }
}
