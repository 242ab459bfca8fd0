use super::domain::{normalize, FiniteDomain, Normalized};
use crate::core::{Instance, Model, ResourceError, SatResult, Solver, SolverConfig, UnknownReason};
use std::time::Instant;
use tracing::debug;

/// Depth-first search with forward checking over explicit finite domains.
/// Picks the unassigned variable with the fewest remaining values first.
#[derive(Clone, Debug, Default)]
pub struct Backtracking;

enum Search {
    Found,
    Exhausted,
    Aborted(UnknownReason),
}

/// State of one check. Dropped when the check returns.
struct Session<'a> {
    problem: &'a FiniteDomain,
    values: Vec<Option<i64>>,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: u64,
}

impl<'a> Session<'a> {
    fn open(problem: &'a FiniteDomain, config: &SolverConfig) -> Self {
        Self {
            problem,
            values: vec![None; problem.domains.len()],
            deadline: config.timeout.map(|timeout| Instant::now() + timeout),
            node_limit: config.node_limit,
            nodes: 0,
        }
    }

    fn tick(&mut self) -> Option<UnknownReason> {
        self.nodes += 1;
        if self.node_limit.is_some_and(|limit| self.nodes > limit) {
            return Some(UnknownReason::NodeLimit);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(UnknownReason::Timeout);
        }
        None
    }

    fn select(&self, domains: &[Vec<i64>]) -> Option<usize> {
        (0..domains.len())
            .filter(|&var| self.values[var].is_none())
            .min_by_key(|&var| domains[var].len())
    }

    /// Variables that must differ from `var`.
    fn rivals(&self, var: usize) -> impl Iterator<Item = usize> + '_ {
        let groups = self.problem.memberships[var]
            .iter()
            .flat_map(move |&group| self.problem.groups[group].iter().copied());
        self.problem.neighbours[var]
            .iter()
            .copied()
            .chain(groups)
            .filter(move |&other| other != var)
    }

    /// Removes `value` from the domains of the rivals of `var`.
    /// Returns `None` when a rival is left without values.
    fn propagate(&self, domains: &[Vec<i64>], var: usize, value: i64) -> Option<Vec<Vec<i64>>> {
        let mut next = domains.to_vec();
        next[var] = vec![value];

        for other in self.rivals(var) {
            match self.values[other] {
                Some(taken) if taken == value => return None,
                Some(_) => {}
                None => {
                    next[other].retain(|&candidate| candidate != value);
                    if next[other].is_empty() {
                        return None;
                    }
                }
            }
        }

        Some(next)
    }

    fn consistent(&self, var: usize) -> bool {
        let value = |var: crate::core::VarId| self.values[var.index()];
        self.problem.watches[var]
            .iter()
            .all(|&index| self.problem.generic[index].evaluate(&value) != Some(false))
    }

    fn search(&mut self, domains: &[Vec<i64>]) -> Search {
        let Some(var) = self.select(domains) else {
            return Search::Found;
        };

        for &value in &domains[var] {
            if let Some(reason) = self.tick() {
                return Search::Aborted(reason);
            }

            self.values[var] = Some(value);
            if let Some(next) = self.propagate(domains, var, value) {
                if self.consistent(var) {
                    match self.search(&next) {
                        Search::Exhausted => {}
                        other => return other,
                    }
                }
            }
            self.values[var] = None;
        }

        Search::Exhausted
    }
}

impl Solver for Backtracking {
    fn check(
        &mut self,
        instance: &Instance,
        config: &SolverConfig,
    ) -> Result<SatResult, ResourceError> {
        let problem = match normalize(instance) {
            Normalized::Problem(problem) => problem,
            Normalized::Unsatisfiable => return Ok(SatResult::Unsatisfiable),
            Normalized::Unsupported(what) => {
                return Ok(SatResult::Unknown(UnknownReason::Unsupported(what)))
            }
        };

        let start = Instant::now();
        let mut session = Session::open(&problem, config);
        let result = match session.search(&problem.domains) {
            Search::Found => {
                let values = instance.vars().zip(&session.values);
                let model = Model::new(values.map(|(var, value)| (var, value.unwrap_or_default())));
                SatResult::Satisfiable(model)
            }
            Search::Exhausted => SatResult::Unsatisfiable,
            Search::Aborted(reason) => SatResult::Unknown(reason),
        };

        debug!(
            nodes = session.nodes,
            seconds = start.elapsed().as_secs_f64(),
            "backtracking search finished"
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "backtracking"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(Backtracking);
