use clap::{Parser, ValueEnum};
use duty_roster::core::{OperatingHours, Outcome, Solver, SolverConfig};
use duty_roster::engine::{AllDifferentEncoding, AssignOptions, AvailabilityEncoding, EncoderOptions};
use duty_roster::{algo, data, logging, run_reader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{BufReader, Write};
use std::num::NonZero;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Copy, Clone, Debug)]
struct Backend(usize, &'static str);

impl From<Backend> for Box<dyn Solver> {
    fn from(value: Backend) -> Box<dyn Solver> {
        algo::SOLVERS[value.0]()
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Backend {
    fn value_variants<'a>() -> &'a [Self] {
        static BACKENDS: std::sync::LazyLock<Vec<Backend>> = std::sync::LazyLock::new(|| {
            let iter = algo::SOLVERS.iter().enumerate();
            iter.map(|(i, init)| Backend(i, init().name())).collect()
        });

        BACKENDS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Assigns weekly duty hours to people without double booking.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Solve one roster document.
    Run {
        /// The roster document. Reads stdin when omitted.
        input: Option<PathBuf>,
        /// The solver backend.
        #[clap(short, long, default_value = algo::DEFAULT_SOLVER)]
        solver: Backend,
        /// Give up after this many milliseconds.
        #[clap(short, long, default_value = "30000")]
        timeout_ms: u64,
        /// Give up after this many search nodes.
        #[clap(short, long)]
        node_limit: Option<u64>,
        /// State no-double-booking as pairwise disequalities.
        #[clap(long)]
        pairwise: bool,
        /// State availability as disjunctions of equalities.
        #[clap(long)]
        disjunction: bool,
        /// Open hour labels, the same on every weekday.
        #[clap(long, value_delimiter = ',')]
        hours: Option<Vec<i64>>,
    },
    /// Solve every document in a directory with every solver.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude solvers.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Backend>,
    },
    /// Generate random roster documents.
    Gen {
        /// The number of people.
        people: NonZero<usize>,
        /// Duty hours per person.
        duties: NonZero<u32>,
        /// Probability that a person is free in an open slot.
        #[clap(short, long, default_value = "0.3")]
        density: f64,
        /// Number of documents to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Seed of the random generator. Random when omitted.
        #[clap(long)]
        seed: Option<u64>,
        /// Output directory. Created if it does not exist.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
    /// List the available solvers.
    Solvers,
}

fn solvers(exclude: &[Backend]) -> impl Iterator<Item = Box<dyn Solver>> + '_ {
    let iter = algo::SOLVERS.iter().map(|init| init());
    iter.filter(|solver| !exclude.iter().any(|name| name.1 == solver.name()))
}

const fn exit_code(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Assigned(_) => 0,
        Outcome::Infeasible(_) => 1,
        Outcome::Indeterminate(_) => 2,
    }
}

fn main() -> anyhow::Result<ExitCode> {
    logging::init();

    match Application::parse() {
        Application::Run {
            input,
            solver,
            timeout_ms,
            node_limit,
            pairwise,
            disjunction,
            hours,
        } => {
            let mut solver = Box::<dyn Solver>::from(solver);
            let operating_hours = match hours {
                Some(labels) => OperatingHours::uniform(&labels)?,
                None => OperatingHours::default(),
            };
            let options = AssignOptions {
                encoder: EncoderOptions {
                    all_different: if pairwise {
                        AllDifferentEncoding::Pairwise
                    } else {
                        AllDifferentEncoding::Global
                    },
                    availability: if disjunction {
                        AvailabilityEncoding::Disjunction
                    } else {
                        AvailabilityEncoding::Domain
                    },
                },
                solver: SolverConfig {
                    timeout: Some(Duration::from_millis(timeout_ms)),
                    node_limit,
                },
            };

            let outcome = match input {
                Some(path) => run_reader(
                    solver.as_mut(),
                    &options,
                    &operating_hours,
                    &mut BufReader::new(std::fs::File::open(path)?),
                ),
                None => run_reader(
                    solver.as_mut(),
                    &options,
                    &operating_hours,
                    &mut std::io::stdin().lock(),
                ),
            }?;
            Ok(ExitCode::from(exit_code(&outcome)))
        }
        Application::Bench { input, exclude } => {
            for mut solver in solvers(&exclude) {
                let report = data::run(&input, false, solver.as_mut(), &AssignOptions::default())?;
                print!("{report}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Application::Gen {
            people,
            duties,
            density,
            amount,
            seed,
            output,
        } => {
            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            let hours = OperatingHours::default();
            for i in 0..amount.get() {
                let document = data::generate(people.get(), duties.get(), density, &hours, &mut rng);
                let filename = format!("{people}_{duties}_{i}.json");
                std::fs::File::create(output.join(filename))?
                    .write_all(data::to_string(&document)?.as_bytes())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Application::Solvers => {
            for name in algo::names() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
