use super::ValidationError;
use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Number of scheduled weekdays.
pub const WEEKDAYS: usize = 5;

/// A working day of the week.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// All weekdays in order.
    pub const ALL: [Self; WEEKDAYS] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Zero based index of the day, Monday is 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the day with the given index, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A duty slot: one hour on one day.
/// Ordered by day first, then by position on the clock, so `12` comes before `1`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Slot {
    pub day: Weekday,
    pub hour: u8,
}

impl Slot {
    /// Labels below this one are afternoon hours of a 12-hour clock.
    pub const FIRST_MORNING_LABEL: u8 = 8;

    /// Create a new slot.
    #[must_use]
    pub const fn new(day: Weekday, hour: u8) -> Self {
        Self { day, hour }
    }

    /// Hour of the day on a 24-hour clock. Afternoon labels `1..=7` map to `13..=19`.
    #[must_use]
    pub const fn clock_hour(self) -> u8 {
        if self.hour < Self::FIRST_MORNING_LABEL {
            self.hour + 12
        } else {
            self.hour
        }
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |slot: &Self| (slot.day, slot.clock_hour(), slot.hour);
        key(self).cmp(&key(other))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.day, self.hour)
    }
}

/// The universe of slots a schedule may use, i.e. the hours the desk is open.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperatingHours {
    open: [BTreeSet<u8>; WEEKDAYS],
}

impl OperatingHours {
    /// Clock hour labels used when nothing else is configured.
    pub const DEFAULT_LABELS: [u8; 8] = [9, 10, 11, 12, 1, 2, 3, 4];

    /// Largest hour label the slot encoding can represent.
    pub const MAX_LABEL: i64 = 99;

    /// Creates operating hours from per day hour labels.
    ///
    /// # Errors
    /// - If any label is outside `1..=99`.
    pub fn new(hours: [Vec<i64>; WEEKDAYS]) -> Result<Self, ValidationError> {
        let mut open: [BTreeSet<u8>; WEEKDAYS] = Default::default();
        for (day, labels) in Weekday::ALL.into_iter().zip(hours) {
            for hour in labels {
                let label = u8::try_from(hour)
                    .ok()
                    .filter(|&label| (1..=Self::MAX_LABEL).contains(&i64::from(label)))
                    .ok_or(ValidationError::InvalidOperatingHour { day, hour })?;
                open[day.index()].insert(label);
            }
        }
        Ok(Self { open })
    }

    /// Creates operating hours with the same labels on every weekday.
    ///
    /// # Errors
    /// - If any label is outside `1..=99`.
    pub fn uniform(labels: &[i64]) -> Result<Self, ValidationError> {
        Self::new(std::array::from_fn(|_| labels.to_vec()))
    }

    /// Returns whether the desk is open at the given hour of the day.
    #[must_use]
    pub fn contains(&self, day: Weekday, hour: i64) -> bool {
        u8::try_from(hour).is_ok_and(|hour| self.open[day.index()].contains(&hour))
    }

    /// Returns the open hours of a day.
    #[must_use]
    pub fn hours(&self, day: Weekday) -> &BTreeSet<u8> {
        &self.open[day.index()]
    }

    /// Iterates every slot of the week.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        Weekday::ALL
            .into_iter()
            .flat_map(|day| self.hours(day).iter().map(move |&hour| Slot::new(day, hour)))
    }

    /// Number of slots in the week.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.iter().map(BTreeSet::len).sum()
    }

    /// Whether the desk is never open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        let labels = BTreeSet::from(Self::DEFAULT_LABELS);
        Self {
            open: std::array::from_fn(|_| labels.clone()),
        }
    }
}

/// A person with a weekly availability profile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Person {
    name: String,
    hours: [BTreeSet<i64>; WEEKDAYS],
}

impl Person {
    /// Creates a person. Hours listed twice on the same day are merged.
    #[must_use]
    pub fn new(name: impl Into<String>, hours: [Vec<i64>; WEEKDAYS]) -> Self {
        Self {
            name: name.into(),
            hours: hours.map(|day| day.into_iter().collect()),
        }
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hours the person is free on the given day.
    #[must_use]
    pub fn hours(&self, day: Weekday) -> &BTreeSet<i64> {
        &self.hours[day.index()]
    }

    /// Returns the distinct slots the person may be assigned to.
    /// Hours that cannot be a slot label are skipped; a validated schedule has none.
    #[must_use]
    pub fn available_slots(&self) -> BTreeSet<Slot> {
        Weekday::ALL
            .into_iter()
            .flat_map(|day| {
                self.hours(day)
                    .iter()
                    .filter_map(move |&hour| u8::try_from(hour).ok().map(|hour| Slot::new(day, hour)))
            })
            .collect()
    }

    /// Returns whether the person is free in the given slot.
    #[must_use]
    pub fn is_available(&self, slot: Slot) -> bool {
        self.hours(slot.day).contains(&i64::from(slot.hour))
    }
}

/// A validated scheduling problem. Immutable once constructed: the only way to
/// obtain one is [`Schedule::new`], and its fields cannot be changed afterwards.
///
/// ```compile_fail
/// use duty_roster::core::{OperatingHours, Person, Schedule};
///
/// let people = vec![Person::new("A", [vec![9], vec![], vec![], vec![], vec![]])];
/// let mut schedule = Schedule::new(people, 1, OperatingHours::default()).unwrap();
/// schedule.duties_per_person = 0;
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    people: Vec<Person>,
    duties_per_person: usize,
    operating_hours: OperatingHours,
}

impl Schedule {
    /// Creates a schedule, validating it against the operating hours.
    ///
    /// # Errors
    /// - If there are no people.
    /// - If `duties_per_person` is not positive.
    /// - If a name is empty or used twice.
    /// - If an availability hour is outside the operating hours.
    pub fn new(
        people: Vec<Person>,
        duties_per_person: i64,
        operating_hours: OperatingHours,
    ) -> Result<Self, ValidationError> {
        if people.is_empty() {
            return Err(ValidationError::NoPeople);
        }

        let duties = usize::try_from(duties_per_person)
            .ok()
            .filter(|&duties| duties > 0)
            .ok_or(ValidationError::NonPositiveDuties(duties_per_person))?;

        let mut names = HashSet::with_capacity(people.len());
        for (index, person) in people.iter().enumerate() {
            if person.name.is_empty() {
                return Err(ValidationError::EmptyName { index });
            }
            if !names.insert(person.name.as_str()) {
                return Err(ValidationError::DuplicateName(person.name.clone()));
            }
            for day in Weekday::ALL {
                if let Some(&hour) = person
                    .hours(day)
                    .iter()
                    .find(|&&hour| !operating_hours.contains(day, hour))
                {
                    return Err(ValidationError::HourOutOfRange {
                        person: person.name.clone(),
                        day,
                        hour,
                    });
                }
            }
        }

        Ok(Self {
            people,
            duties_per_person: duties,
            operating_hours,
        })
    }

    /// Get the people in input order.
    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Get the number of duty hours each person must fill.
    #[must_use]
    pub const fn duties_per_person(&self) -> usize {
        self.duties_per_person
    }

    /// Get the operating hours the schedule was validated against.
    #[must_use]
    pub const fn operating_hours(&self) -> &OperatingHours {
        &self.operating_hours
    }

    /// Returns the person with the given name.
    #[must_use]
    pub fn person(&self, name: &str) -> Option<&Person> {
        self.people.iter().find(|person| person.name == name)
    }

    /// Total number of duty hours to fill.
    #[must_use]
    pub fn total_duties(&self) -> usize {
        self.people.len() * self.duties_per_person
    }
}
