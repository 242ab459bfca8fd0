mod gen;
mod run;

pub use gen::generate;
pub use run::*;

use crate::core::{OperatingHours, Person, Schedule, ValidationError, WEEKDAYS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// A person as written in a roster document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PersonDocument {
    pub name: String,
    /// Free hours, Monday to Friday.
    pub hours: [Vec<i64>; WEEKDAYS],
}

/// The input document of a roster.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDocument {
    pub duties_per_person: i64,
    pub people: Vec<PersonDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<[Vec<i64>; WEEKDAYS]>,
}

impl RosterDocument {
    /// Validates the document into a schedule.
    /// Operating hours given in the document take precedence over `fallback`.
    ///
    /// # Errors
    /// - If the document violates any schedule invariant.
    pub fn into_schedule(self, fallback: &OperatingHours) -> Result<Schedule, ValidationError> {
        let operating_hours = match self.operating_hours {
            Some(hours) => OperatingHours::new(hours)?,
            None => fallback.clone(),
        };
        let people = self
            .people
            .into_iter()
            .map(|person| Person::new(person.name, person.hours))
            .collect();
        Schedule::new(people, self.duties_per_person, operating_hours)
    }
}

/// Reads a JSON value from the reader.
///
/// # Errors
/// - If the input is not valid JSON for `T`.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl BufRead) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a value as pretty printed JSON.
///
/// # Errors
/// - If the value cannot be serialized.
pub fn to_string<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Weekday;

    const SOURCE: &str = r#"{
        "dutiesPerPerson": 2,
        "people": [
            { "name": "Karl", "hours": [[4], [3, 4], [4], [3, 4], [11, 12, 4]] }
        ]
    }"#;

    #[test]
    fn document_should_deserialize() -> anyhow::Result<()> {
        let document: RosterDocument = deserialize(&mut SOURCE.as_bytes())?;
        assert_eq!(document.duties_per_person, 2);
        assert_eq!(document.people[0].hours[4], vec![11, 12, 4]);

        let schedule = document.into_schedule(&OperatingHours::default())?;
        assert_eq!(schedule.duties_per_person(), 2);
        assert_eq!(schedule.people()[0].available_slots().len(), 8);
        Ok(())
    }

    #[test]
    fn document_should_round_trip() -> anyhow::Result<()> {
        let document: RosterDocument = deserialize(&mut SOURCE.as_bytes())?;
        let serialized = to_string(&document)?;
        assert!(serialized.contains("dutiesPerPerson"));
        assert!(!serialized.contains("operatingHours"));
        let again: RosterDocument = deserialize(&mut serialized.as_bytes())?;
        assert_eq!(document, again);
        Ok(())
    }

    #[test]
    fn wrong_number_of_days_is_rejected() {
        let source = r#"{ "dutiesPerPerson": 1, "people": [{ "name": "A", "hours": [[9]] }] }"#;
        assert!(deserialize::<RosterDocument>(&mut source.as_bytes()).is_err());
    }

    #[test]
    fn document_operating_hours_override_fallback() -> anyhow::Result<()> {
        let source = r#"{
            "dutiesPerPerson": 1,
            "people": [{ "name": "A", "hours": [[], [], [], [], [17]] }],
            "operatingHours": [[], [], [], [], [16, 17]]
        }"#;
        let document: RosterDocument = deserialize(&mut source.as_bytes())?;
        let schedule = document.into_schedule(&OperatingHours::default())?;
        assert!(schedule.operating_hours().contains(Weekday::Friday, 17));
        assert_eq!(schedule.operating_hours().len(), 2);
        Ok(())
    }

    #[test]
    fn negative_duties_reach_validation() -> anyhow::Result<()> {
        let source = r#"{ "dutiesPerPerson": -1, "people": [{ "name": "A", "hours": [[9], [], [], [], []] }] }"#;
        let document: RosterDocument = deserialize(&mut source.as_bytes())?;
        assert_eq!(
            document.into_schedule(&OperatingHours::default()),
            Err(ValidationError::NonPositiveDuties(-1))
        );
        Ok(())
    }
}
