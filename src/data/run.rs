use crate::core::{OperatingHours, Outcome, Solver};
use crate::data::{deserialize, RosterDocument};
use crate::engine::{assign, AssignOptions};
use anyhow::{anyhow, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;
use tracing::info;

/// Expected verdict encoded in a sample file name, e.g. `three_people.sat.json`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Sat,
    Unsat,
    Unknown,
}

impl Verdict {
    fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Assigned(_) => Self::Sat,
            Outcome::Infeasible(_) => Self::Unsat,
            Outcome::Indeterminate(_) => Self::Unknown,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            Self::Sat => "sat",
            Self::Unsat => "unsat",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Report of running a directory of roster documents.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    solver: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(solver: String) -> Self {
        let entries = Vec::new();
        Self { solver, entries }
    }

    /// Get the name of the solver.
    #[must_use]
    pub fn solver_name(&self) -> &str {
        &self.solver
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Solver: {}", self.solver)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of solving a single document.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub verdict: Verdict,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {} in {:.3} sec", self.name, self.verdict, self.time)
    }
}

/// Solves every document in the `samples` directory and checks the verdicts.
/// Prints the report to stdout.
///
/// # Errors
/// - If a file cannot be read or solved.
/// - If no samples are found.
/// - If a verdict differs from the one in the file name.
pub fn samples(solver: &mut dyn Solver) -> anyhow::Result<()> {
    let report = run("samples", true, solver, &AssignOptions::default())?;
    ensure!(!report.entries.is_empty(), "No samples found");
    println!("{report}");
    Ok(())
}

/// Solves every `*.json` document in `dir`.
///
/// # Arguments
/// - `check`: compare verdicts with the ones named in the file names.
/// - `solver`: the backend to use.
///
/// # Errors
/// - If a file cannot be read, parsed or validated.
/// - If solving fails.
/// - If `check` is set and a verdict differs from the expected one.
pub fn run(
    dir: &str,
    check: bool,
    solver: &mut dyn Solver,
    options: &AssignOptions,
) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    files.sort_by_key(std::fs::DirEntry::file_name);

    for file in files {
        let Some((name, expected)) = parse_filename(&file.file_name())? else {
            continue;
        };

        let document: RosterDocument = deserialize(&mut BufReader::new(File::open(file.path())?))?;
        let schedule = document.into_schedule(&OperatingHours::default())?;

        let time = std::time::Instant::now();
        let outcome = assign(&schedule, solver, options)?;
        let time = time.elapsed().as_secs_f64();

        if let Outcome::Assigned(assignment) = &outcome {
            assignment.verify(&schedule).map_err(|err| anyhow!("{name}: {err}"))?;
        }

        let verdict = Verdict::of(&outcome);
        if let Some(expected) = expected.filter(|_| check) {
            ensure!(verdict == expected, "Invalid verdict {name}: {verdict}, expected {expected}");
        }

        info!(%name, %verdict, time, "sample solved");
        report.entries.push(ReportEntry { name, verdict, time });
    }

    Ok(report)
}

/// Splits `<stem>[.<verdict>].json`. Returns `None` for files that are not documents.
fn parse_filename(filename: &std::ffi::OsStr) -> anyhow::Result<Option<(String, Option<Verdict>)>> {
    let name = filename.to_str().ok_or_else(|| anyhow!("Cannot read filename"))?;
    let Some(stem) = name.strip_suffix(".json") else {
        return Ok(None);
    };
    ensure!(!stem.is_empty(), "Empty document name {name}");

    let expected = match stem.rsplit_once('.') {
        None => None,
        Some((_, "sat")) => Some(Verdict::Sat),
        Some((_, "unsat")) => Some(Verdict::Unsat),
        Some((_, "unknown")) => Some(Verdict::Unknown),
        Some((_, other)) => return Err(anyhow!("Unknown verdict `{other}` in {name}")),
    };
    Ok(Some((name.into(), expected)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::Backtracking;

    #[test]
    fn test_parse_filename() -> anyhow::Result<()> {
        let parsed = parse_filename("three_people.sat.json".as_ref())?;
        assert_eq!(parsed, Some(("three_people.sat.json".into(), Some(Verdict::Sat))));

        let parsed = parse_filename("4_2_0.json".as_ref())?;
        assert_eq!(parsed, Some(("4_2_0.json".into(), None)));

        assert_eq!(parse_filename("README.md".as_ref())?, None);
        Ok(())
    }

    #[test]
    fn test_parse_filename_errors() {
        assert!(parse_filename(".json".as_ref()).is_err());
        assert!(parse_filename("a.maybe.json".as_ref()).is_err());
    }

    #[test]
    fn test_backtracking_samples() {
        assert!(samples(&mut Backtracking).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        assert!(run("no-such-dir", false, &mut Backtracking, &AssignOptions::default()).is_err());
    }
}
