use crate::core::{Constraint, Instance, Term, VarId};
use std::collections::BTreeSet;

/// An instance rewritten into explicit finite domains, disequalities and all-different groups.
/// Constraints that fit none of these are kept as they are.
#[derive(Clone, Debug, Default)]
pub struct FiniteDomain {
    /// Allowed values per variable, ascending.
    pub domains: Vec<Vec<i64>>,
    /// Variables each variable must differ from.
    pub neighbours: Vec<Vec<usize>>,
    /// All-different groups.
    pub groups: Vec<Vec<usize>>,
    /// Groups each variable belongs to.
    pub memberships: Vec<Vec<usize>>,
    /// Constraints evaluated on partial assignments.
    pub generic: Vec<Constraint>,
    /// Generic constraints each variable appears in.
    pub watches: Vec<Vec<usize>>,
}

#[derive(Clone, Debug)]
pub enum Normalized {
    Problem(FiniteDomain),
    Unsatisfiable,
    Unsupported(String),
}

#[derive(Default)]
struct Builder {
    domains: Vec<Option<BTreeSet<i64>>>,
    excluded: Vec<BTreeSet<i64>>,
    mentioned: Vec<bool>,
    neighbours: Vec<BTreeSet<usize>>,
    groups: Vec<Vec<usize>>,
    generic: Vec<Constraint>,
    contradiction: bool,
}

impl Builder {
    fn new(vars: usize) -> Self {
        Self {
            domains: vec![None; vars],
            excluded: vec![BTreeSet::new(); vars],
            mentioned: vec![false; vars],
            neighbours: vec![BTreeSet::new(); vars],
            ..Self::default()
        }
    }

    fn restrict(&mut self, var: VarId, values: BTreeSet<i64>) {
        let domain = &mut self.domains[var.index()];
        *domain = Some(match domain.take() {
            Some(current) => current.intersection(&values).copied().collect(),
            None => values,
        });
    }

    fn add(&mut self, constraint: &Constraint) {
        constraint.for_each_var(&mut |var| self.mentioned[var.index()] = true);

        match constraint {
            Constraint::And(items) => items.iter().for_each(|item| self.add(item)),
            Constraint::InDomain { var, values } => self.restrict(*var, values.clone()),
            Constraint::AllDifferent(vars) => {
                let group: BTreeSet<usize> = vars.iter().map(|var| var.index()).collect();
                if group.len() == vars.len() {
                    self.groups.push(group.into_iter().collect());
                } else {
                    self.contradiction = true;
                }
            }
            Constraint::Eq(a, b) => match (*a, *b) {
                (Term::Var(var), Term::Const(value)) | (Term::Const(value), Term::Var(var)) => {
                    self.restrict(var, BTreeSet::from([value]));
                }
                (Term::Const(a), Term::Const(b)) => self.contradiction |= a != b,
                (Term::Var(a), Term::Var(b)) if a == b => {}
                _ => self.generic.push(constraint.clone()),
            },
            Constraint::Not(inner) => match inner.as_ref() {
                Constraint::Not(twice) => self.add(twice),
                Constraint::Eq(a, b) => match (*a, *b) {
                    (Term::Var(a), Term::Var(b)) if a == b => self.contradiction = true,
                    (Term::Var(a), Term::Var(b)) => {
                        self.neighbours[a.index()].insert(b.index());
                        self.neighbours[b.index()].insert(a.index());
                    }
                    (Term::Var(var), Term::Const(value)) | (Term::Const(value), Term::Var(var)) => {
                        self.excluded[var.index()].insert(value);
                    }
                    (Term::Const(a), Term::Const(b)) => self.contradiction |= a == b,
                },
                _ => self.generic.push(constraint.clone()),
            },
            Constraint::Or(items) => {
                if items.is_empty() {
                    self.contradiction = true;
                } else if let Some((var, values)) = single_var_equalities(items) {
                    self.restrict(var, values);
                } else {
                    self.generic.push(constraint.clone());
                }
            }
        }
    }

    fn finish(self, instance: &Instance) -> Normalized {
        if self.contradiction {
            return Normalized::Unsatisfiable;
        }

        let mut domains = Vec::with_capacity(self.domains.len());
        for (index, (domain, excluded)) in self.domains.into_iter().zip(&self.excluded).enumerate() {
            let domain = match domain {
                Some(domain) => domain,
                None if self.mentioned[index] => {
                    let var = instance.vars().nth(index);
                    let name = var.and_then(|var| instance.name(var)).unwrap_or("?");
                    return Normalized::Unsupported(format!("variable `{name}` has no finite domain"));
                }
                None => BTreeSet::from([0]),
            };
            let values: Vec<i64> = domain.difference(excluded).copied().collect();
            if values.is_empty() {
                return Normalized::Unsatisfiable;
            }
            domains.push(values);
        }

        let mut generic = Vec::with_capacity(self.generic.len());
        for constraint in self.generic {
            match constraint.evaluate(&|_| None) {
                Some(false) => return Normalized::Unsatisfiable,
                Some(true) => {}
                None => generic.push(constraint),
            }
        }

        let mut memberships = vec![Vec::new(); domains.len()];
        for (group, vars) in self.groups.iter().enumerate() {
            for &var in vars {
                memberships[var].push(group);
            }
        }

        let mut watches = vec![Vec::new(); domains.len()];
        for (index, constraint) in generic.iter().enumerate() {
            constraint.for_each_var(&mut |var| {
                let watch: &mut Vec<usize> = &mut watches[var.index()];
                if watch.last() != Some(&index) {
                    watch.push(index);
                }
            });
        }

        Normalized::Problem(FiniteDomain {
            domains,
            neighbours: self.neighbours.into_iter().map(|n| n.into_iter().collect()).collect(),
            groups: self.groups,
            memberships,
            generic,
            watches,
        })
    }
}

/// Recognises `var = a OR var = b OR ...` over a single variable.
fn single_var_equalities(items: &[Constraint]) -> Option<(VarId, BTreeSet<i64>)> {
    let mut target = None;
    let mut values = BTreeSet::new();

    for item in items {
        let Constraint::Eq(a, b) = item else {
            return None;
        };
        let (var, value) = match (*a, *b) {
            (Term::Var(var), Term::Const(value)) | (Term::Const(value), Term::Var(var)) => (var, value),
            _ => return None,
        };
        if *target.get_or_insert(var) != var {
            return None;
        }
        values.insert(value);
    }

    target.map(|var| (var, values))
}

/// Rewrites the instance into finite-domain form.
#[must_use]
pub fn normalize(instance: &Instance) -> Normalized {
    if let Err(err) = instance.validate() {
        return Normalized::Unsupported(err.to_string());
    }

    let mut builder = Builder::new(instance.var_count());
    for constraint in instance.constraints() {
        builder.add(constraint);
    }
    builder.finish(instance)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn disjunction_becomes_domain() -> anyhow::Result<()> {
        let mut instance = Instance::new();
        let x = instance.declare_int_var("x")?;
        let y = instance.declare_int_var("y")?;
        instance.assert(Constraint::or([
            Constraint::equals(x, 3_i64),
            Constraint::equals(1_i64, x),
        ]));
        instance.assert(Constraint::in_domain(y, [1, 2, 3]));
        instance.assert(Constraint::not(Constraint::equals(y, 2_i64)));
        instance.assert(Constraint::not(Constraint::equals(x, y)));

        let Normalized::Problem(problem) = normalize(&instance) else {
            panic!("expected a problem");
        };
        assert_eq!(problem.domains, vec![vec![1, 3], vec![1, 3]]);
        assert_eq!(problem.neighbours, vec![vec![1], vec![0]]);
        assert!(problem.generic.is_empty());
        Ok(())
    }

    #[test]
    fn mixed_disjunction_stays_generic() -> anyhow::Result<()> {
        let mut instance = Instance::new();
        let x = instance.declare_int_var("x")?;
        let y = instance.declare_int_var("y")?;
        instance.assert(Constraint::in_domain(x, [1, 2]));
        instance.assert(Constraint::in_domain(y, [1, 2]));
        instance.assert(Constraint::or([
            Constraint::equals(x, 1_i64),
            Constraint::equals(y, 1_i64),
        ]));

        let Normalized::Problem(problem) = normalize(&instance) else {
            panic!("expected a problem");
        };
        assert_eq!(problem.generic.len(), 1);
        assert_eq!(problem.watches, vec![vec![0], vec![0]]);
        Ok(())
    }

    #[test]
    fn contradictions_are_unsatisfiable() -> anyhow::Result<()> {
        let mut instance = Instance::new();
        instance.declare_int_var("x")?;
        instance.assert(Constraint::or([]));
        assert!(matches!(normalize(&instance), Normalized::Unsatisfiable));

        let mut instance = Instance::new();
        let x = instance.declare_int_var("x")?;
        instance.assert(Constraint::all_different([x, x]));
        assert!(matches!(normalize(&instance), Normalized::Unsatisfiable));
        Ok(())
    }

    #[test]
    fn unbounded_variable_is_unsupported() -> anyhow::Result<()> {
        let mut instance = Instance::new();
        let x = instance.declare_int_var("x")?;
        instance.assert(Constraint::not(Constraint::equals(x, 4_i64)));
        assert!(matches!(normalize(&instance), Normalized::Unsupported(_)));
        Ok(())
    }
}
