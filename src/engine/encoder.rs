use crate::core::{Constraint, CspError, Instance, Schedule, Slot, VarId, Weekday};

/// Encodes a slot as `(day + 1) * 100 + hour`.
/// Injective for hour labels below 100, which operating hours enforce.
#[must_use]
pub fn encode_slot(slot: Slot) -> i64 {
    let day = i64::try_from(slot.day.index()).unwrap_or_else(|_| unreachable!("five weekdays"));
    (day + 1) * 100 + i64::from(slot.hour)
}

/// Inverts [`encode_slot`]. Returns `None` for values no slot encodes to.
#[must_use]
pub fn decode_slot(value: i64) -> Option<Slot> {
    let day = usize::try_from(value / 100 - 1).ok()?;
    let hour = u8::try_from(value % 100).ok().filter(|&hour| hour > 0)?;
    Weekday::from_index(day).map(|day| Slot::new(day, hour))
}

/// How the no-double-booking rule is stated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AllDifferentEncoding {
    /// One disequality per pair of duty variables.
    Pairwise,
    /// A single all-different constraint over every duty variable.
    #[default]
    Global,
}

/// How a person's availability is stated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AvailabilityEncoding {
    /// A disjunction of `var = slot` equalities.
    Disjunction,
    /// A domain constraint listing the allowed slots.
    #[default]
    Domain,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EncoderOptions {
    pub all_different: AllDifferentEncoding,
    pub availability: AvailabilityEncoding,
}

/// A schedule formulated as a constraint instance.
/// `duties[p]` holds the duty variables of `schedule.people()[p]`.
#[derive(Clone, Debug)]
pub struct Encoding {
    pub instance: Instance,
    pub duties: Vec<Vec<VarId>>,
}

/// Formulates the schedule as a finite-domain instance.
/// Each person gets `duties_per_person` variables named `<name>_<k>`, each restricted to
/// the person's available slots, and all duty variables of the schedule must differ.
///
/// # Errors
/// - If two variable names collide, which a validated schedule never causes.
pub fn encode(schedule: &Schedule, options: EncoderOptions) -> Result<Encoding, CspError> {
    let mut instance = Instance::new();
    let mut duties = Vec::with_capacity(schedule.people().len());

    for person in schedule.people() {
        let vars = (0..schedule.duties_per_person())
            .map(|k| instance.declare_int_var(format!("{}_{k}", person.name())))
            .collect::<Result<Vec<_>, _>>()?;
        duties.push(vars);
    }

    for (person, vars) in schedule.people().iter().zip(&duties) {
        let slots: Vec<i64> = person.available_slots().into_iter().map(encode_slot).collect();
        for &var in vars {
            let constraint = match options.availability {
                AvailabilityEncoding::Disjunction => Constraint::or(
                    slots
                        .iter()
                        .map(|&slot| Constraint::equals(var, instance.int_literal(slot))),
                ),
                AvailabilityEncoding::Domain => Constraint::in_domain(var, slots.iter().copied()),
            };
            instance.assert(constraint);
        }
    }

    let all: Vec<VarId> = duties.iter().flatten().copied().collect();
    match options.all_different {
        AllDifferentEncoding::Pairwise => {
            for (i, &first) in all.iter().enumerate() {
                for &second in &all[i + 1..] {
                    instance.assert(Constraint::not(Constraint::equals(first, second)));
                }
            }
        }
        AllDifferentEncoding::Global => instance.assert(Constraint::all_different(all)),
    }

    Ok(Encoding { instance, duties })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{OperatingHours, Person};
    use proptest::prelude::*;

    fn schedule() -> anyhow::Result<Schedule> {
        let people = vec![
            Person::new("A", [vec![9, 10], vec![], vec![], vec![], vec![]]),
            Person::new("B", [vec![], vec![4], vec![], vec![], vec![1]]),
        ];
        Ok(Schedule::new(people, 2, OperatingHours::default())?)
    }

    #[test]
    fn encoding_matches_source_scheme() {
        assert_eq!(encode_slot(Slot::new(Weekday::Monday, 9)), 109);
        assert_eq!(encode_slot(Slot::new(Weekday::Friday, 4)), 504);
        assert_eq!(decode_slot(304), Some(Slot::new(Weekday::Wednesday, 4)));
        assert_eq!(decode_slot(600), None);
        assert_eq!(decode_slot(100), None);
        assert_eq!(decode_slot(-5), None);
    }

    #[test]
    fn pairwise_encoding_counts() -> anyhow::Result<()> {
        let options = EncoderOptions {
            all_different: AllDifferentEncoding::Pairwise,
            availability: AvailabilityEncoding::Disjunction,
        };
        let encoding = encode(&schedule()?, options)?;

        assert_eq!(encoding.instance.var_count(), 4);
        assert!(encoding.instance.var("A_0").is_some());
        assert!(encoding.instance.var("B_1").is_some());
        // 4 availability disjunctions + C(4, 2) disequalities
        assert_eq!(encoding.instance.constraints().len(), 4 + 6);
        assert!(encoding.instance.validate().is_ok());
        Ok(())
    }

    #[test]
    fn availability_disjunction_lists_every_slot() -> anyhow::Result<()> {
        let options = EncoderOptions {
            availability: AvailabilityEncoding::Disjunction,
            ..EncoderOptions::default()
        };
        let encoding = encode(&schedule()?, options)?;
        let var = encoding.duties[1][0];

        let Constraint::Or(items) = &encoding.instance.constraints()[2] else {
            panic!("expected a disjunction");
        };
        let expected: Vec<_> = [204_i64, 501]
            .into_iter()
            .map(|slot| Constraint::equals(var, slot))
            .collect();
        assert_eq!(items, &expected);
        Ok(())
    }

    #[test]
    fn global_encoding_uses_one_all_different() -> anyhow::Result<()> {
        let encoding = encode(&schedule()?, EncoderOptions::default())?;
        let last = encoding.instance.constraints().last();
        assert!(matches!(last, Some(Constraint::AllDifferent(vars)) if vars.len() == 4));
        assert_eq!(encoding.instance.constraints().len(), 5);
        Ok(())
    }

    #[test]
    fn person_without_hours_gets_empty_disjunction() -> anyhow::Result<()> {
        let people = vec![Person::new("Idle", Default::default())];
        let schedule = Schedule::new(people, 1, OperatingHours::default())?;
        let options = EncoderOptions {
            availability: AvailabilityEncoding::Disjunction,
            ..EncoderOptions::default()
        };
        let encoding = encode(&schedule, options)?;
        assert_eq!(encoding.instance.constraints()[0], Constraint::Or(vec![]));
        Ok(())
    }

    proptest! {
        #[test]
        fn slot_encoding_round_trips(day in 0usize..5, hour in 1u8..=99) {
            let slot = Slot::new(Weekday::ALL[day], hour);
            prop_assert_eq!(decode_slot(encode_slot(slot)), Some(slot));
        }
    }
}
