use super::CspError;
use ahash::HashMap;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Handle of an integer variable declared in an [`Instance`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VarId(usize);

impl VarId {
    /// Position of the variable in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An integer valued term: a variable or a literal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Term {
    Var(VarId),
    Const(i64),
}

impl From<VarId> for Term {
    fn from(var: VarId) -> Self {
        Self::Var(var)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::Const(value)
    }
}

/// A boolean constraint over integer terms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    Eq(Term, Term),
    Not(Box<Constraint>),
    /// Disjunction. Empty is false.
    Or(Vec<Constraint>),
    /// Conjunction. Empty is true.
    And(Vec<Constraint>),
    /// All listed variables take pairwise distinct values.
    AllDifferent(Vec<VarId>),
    /// The variable takes one of the listed values.
    InDomain { var: VarId, values: BTreeSet<i64> },
}

impl Constraint {
    /// Create an equality of two terms.
    #[must_use]
    pub fn equals(a: impl Into<Term>, b: impl Into<Term>) -> Self {
        Self::Eq(a.into(), b.into())
    }

    /// Negate a constraint.
    #[must_use]
    pub fn not(constraint: Self) -> Self {
        Self::Not(Box::new(constraint))
    }

    /// Create a disjunction.
    #[must_use]
    pub fn or(constraints: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(constraints.into_iter().collect())
    }

    /// Create a conjunction.
    #[must_use]
    pub fn and(constraints: impl IntoIterator<Item = Self>) -> Self {
        Self::And(constraints.into_iter().collect())
    }

    /// Require pairwise distinct values.
    #[must_use]
    pub fn all_different(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self::AllDifferent(vars.into_iter().collect())
    }

    /// Restrict a variable to the listed values.
    #[must_use]
    pub fn in_domain(var: VarId, values: impl IntoIterator<Item = i64>) -> Self {
        Self::InDomain {
            var,
            values: values.into_iter().collect(),
        }
    }

    /// Calls `f` for every variable the constraint mentions.
    pub fn for_each_var(&self, f: &mut impl FnMut(VarId)) {
        match self {
            Self::Eq(a, b) => {
                for term in [a, b] {
                    if let Term::Var(var) = term {
                        f(*var);
                    }
                }
            }
            Self::Not(inner) => inner.for_each_var(f),
            Self::Or(items) | Self::And(items) => {
                for item in items {
                    item.for_each_var(f);
                }
            }
            Self::AllDifferent(vars) => vars.iter().copied().for_each(f),
            Self::InDomain { var, .. } => f(*var),
        }
    }

    /// Evaluates the constraint under a partial assignment.
    /// Returns `None` when the outcome depends on unassigned variables.
    #[must_use]
    pub fn evaluate(&self, value: &impl Fn(VarId) -> Option<i64>) -> Option<bool> {
        let term = |term: &Term| match *term {
            Term::Var(var) => value(var),
            Term::Const(constant) => Some(constant),
        };

        match self {
            Self::Eq(a, b) => Some(term(a)? == term(b)?),
            Self::Not(inner) => inner.evaluate(value).map(|result| !result),
            Self::Or(items) => {
                let mut decided = true;
                for item in items {
                    match item.evaluate(value) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => decided = false,
                    }
                }
                decided.then_some(false)
            }
            Self::And(items) => {
                let mut decided = true;
                for item in items {
                    match item.evaluate(value) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => decided = false,
                    }
                }
                decided.then_some(true)
            }
            Self::AllDifferent(vars) => {
                let mut seen = BTreeSet::new();
                let mut decided = true;
                for &var in vars {
                    match value(var) {
                        Some(v) if !seen.insert(v) => return Some(false),
                        Some(_) => {}
                        None => decided = false,
                    }
                }
                decided.then_some(true)
            }
            Self::InDomain { var, values } => value(*var).map(|v| values.contains(&v)),
        }
    }
}

/// A finite-domain problem description: declared variables and asserted constraints.
/// Built once, then handed to a solver as a whole.
#[derive(Clone, Debug, Default)]
pub struct Instance {
    names: Vec<String>,
    lookup: HashMap<String, VarId>,
    constraints: Vec<Constraint>,
}

impl Instance {
    /// Create an empty instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an integer variable with a unique name.
    ///
    /// # Errors
    /// - If a variable with the same name exists.
    pub fn declare_int_var(&mut self, name: impl Into<String>) -> Result<VarId, CspError> {
        let name = name.into();
        if self.lookup.contains_key(&name) {
            return Err(CspError::DuplicateVariable(name));
        }
        let var = VarId(self.names.len());
        self.lookup.insert(name.clone(), var);
        self.names.push(name);
        Ok(var)
    }

    /// Creates an integer literal term.
    #[must_use]
    pub const fn int_literal(&self, value: i64) -> Term {
        Term::Const(value)
    }

    /// Adds a constraint to the problem.
    pub fn assert(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Checks that every constraint only references declared variables.
    ///
    /// # Errors
    /// - If an undeclared variable is referenced.
    pub fn validate(&self) -> Result<(), CspError> {
        let mut undeclared = None;
        for constraint in &self.constraints {
            constraint.for_each_var(&mut |var| {
                if var.0 >= self.names.len() {
                    undeclared.get_or_insert(var.0);
                }
            });
        }
        undeclared.map_or(Ok(()), |index| Err(CspError::UndeclaredVariable(index)))
    }

    /// Returns the declared variables in declaration order.
    pub fn vars(&self) -> impl ExactSizeIterator<Item = VarId> {
        (0..self.names.len()).map(VarId)
    }

    /// Returns the name of a variable.
    #[must_use]
    pub fn name(&self, var: VarId) -> Option<&str> {
        self.names.get(var.0).map(String::as_str)
    }

    /// Returns the variable with the given name.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<VarId> {
        self.lookup.get(name).copied()
    }

    /// Get the number of declared variables.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.names.len()
    }

    /// Get the asserted constraints in assertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

/// Values assigned to every declared variable by a satisfiable check.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Model {
    values: HashMap<VarId, i64>,
}

impl Model {
    /// Creates a model from `(variable, value)` pairs.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = (VarId, i64)>) -> Self {
        let values = values.into_iter().collect();
        Self { values }
    }

    /// Get the value of a variable, if the model assigns one.
    #[must_use]
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(&var).copied()
    }

    /// Get the number of assigned variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the model assigns no variable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns whether the model satisfies every constraint of the instance.
    #[must_use]
    pub fn satisfies(&self, instance: &Instance) -> bool {
        let value = |var| self.value(var);
        instance
            .constraints()
            .iter()
            .all(|constraint| constraint.evaluate(&value) == Some(true))
    }
}

/// Why a solver could not decide satisfiability.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnknownReason {
    Timeout,
    NodeLimit,
    Unsupported(String),
}

impl Display for UnknownReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "time limit reached"),
            Self::NodeLimit => write!(f, "search node limit reached"),
            Self::Unsupported(what) => write!(f, "unsupported by solver: {what}"),
        }
    }
}

/// Result of checking satisfiability. The model exists only when satisfiable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SatResult {
    Satisfiable(Model),
    Unsatisfiable,
    Unknown(UnknownReason),
}

/// Resource bounds of a single check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolverConfig {
    pub timeout: Option<Duration>,
    pub node_limit: Option<u64>,
}

impl SolverConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Configuration without any resource bound.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            timeout: None,
            node_limit: None,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Self::DEFAULT_TIMEOUT),
            node_limit: None,
        }
    }
}
