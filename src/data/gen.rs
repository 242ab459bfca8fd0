use super::{PersonDocument, RosterDocument};
use crate::core::{OperatingHours, Weekday};
use rand::Rng;

/// Generates a random roster document over the given operating hours.
/// Each open slot is independently available to a person with probability `density`.
#[must_use]
pub fn generate(
    people: usize,
    duties: u32,
    density: f64,
    operating_hours: &OperatingHours,
    rng: &mut impl Rng,
) -> RosterDocument {
    let density = density.clamp(0.0, 1.0);
    let people = (0..people)
        .map(|i| PersonDocument {
            name: format!("person_{i}"),
            hours: Weekday::ALL.map(|day| {
                operating_hours
                    .hours(day)
                    .iter()
                    .filter(|_| rng.gen_bool(density))
                    .map(|&hour| i64::from(hour))
                    .collect()
            }),
        })
        .collect();

    RosterDocument {
        duties_per_person: i64::from(duties),
        people,
        operating_hours: None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_documents_validate() -> anyhow::Result<()> {
        let hours = OperatingHours::default();
        let mut rng = StdRng::seed_from_u64(7);
        let document = generate(5, 2, 0.5, &hours, &mut rng);

        assert_eq!(document.people.len(), 5);
        let schedule = document.into_schedule(&hours)?;
        assert_eq!(schedule.duties_per_person(), 2);
        Ok(())
    }

    #[test]
    fn full_density_uses_every_slot() {
        let hours = OperatingHours::default();
        let document = generate(1, 1, 1.0, &hours, &mut StdRng::seed_from_u64(0));
        let slots: usize = document.people[0].hours.iter().map(Vec::len).sum();
        assert_eq!(slots, hours.len());
    }
}
