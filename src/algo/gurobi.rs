#![allow(clippy::cast_precision_loss)]
use super::domain::{normalize, FiniteDomain, Normalized};
use crate::core::{Instance, Model as Values, ResourceError, SatResult, Solver, SolverConfig, UnknownReason};
use ahash::{HashMap, HashMapExt};
use grb::prelude::*;

/// Solves the finite-domain fragment as a 0/1 program with Gurobi.
/// Each variable gets one indicator per allowed value; exactly one is set.
#[derive(Clone, Debug, Default)]
pub struct Gurobi;

impl Solver for Gurobi {
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

        if !problem.generic.is_empty() {
            let what = format!("{} non-domain constraints", problem.generic.len());
            return Ok(SatResult::Unknown(UnknownReason::Unsupported(what)));
        }

        let resource = |err: grb::Error| ResourceError::new("gurobi", err.to_string());
        let mut model = create_model("duty-roster", config).map_err(resource)?;
        gurobi_impl(&mut model, &problem, instance).map_err(resource)
    }

    fn name(&self) -> &'static str {
        "gurobi"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(Gurobi);

fn create_model(name: &str, config: &SolverConfig) -> grb::Result<Model> {
    let mut env = Env::new("")?;
    env.set(param::OutputFlag, 0)?;
    env.set(param::LogToConsole, 0)?;
    if let Some(timeout) = config.timeout {
        env.set(param::TimeLimit, timeout.as_secs_f64())?;
    }
    if let Some(limit) = config.node_limit {
        env.set(param::NodeLimit, limit as f64)?;
    }
    Model::with_env(name, env)
}

fn indicator_vars(model: &mut Model, problem: &FiniteDomain) -> grb::Result<Vec<HashMap<i64, Var>>> {
    let mut indicators = Vec::with_capacity(problem.domains.len());
    for (i, domain) in problem.domains.iter().enumerate() {
        let mut by_value = HashMap::with_capacity(domain.len());
        for &value in domain {
            by_value.insert(value, add_binvar!(model, name: &format!("x_{i}_{value}"))?);
        }
        indicators.push(by_value);
    }
    Ok(indicators)
}

fn gurobi_impl(model: &mut Model, problem: &FiniteDomain, instance: &Instance) -> grb::Result<SatResult> {
    let x = indicator_vars(model, problem)?;

    for (i, xi) in x.iter().enumerate() {
        model.add_constr(&format!("c_one_{i}"), c!(xi.values().copied().grb_sum() == 1))?;
    }

    for (a, neighbours) in problem.neighbours.iter().enumerate() {
        for &b in neighbours.iter().filter(|&&b| b > a) {
            for (value, &xa) in &x[a] {
                if let Some(&xb) = x[b].get(value) {
                    model.add_constr(&format!("c_neq_{a}_{b}_{value}"), c!(xa + xb <= 1))?;
                }
            }
        }
    }

    for (g, group) in problem.groups.iter().enumerate() {
        let mut by_value: HashMap<i64, Vec<Var>> = HashMap::new();
        for &var in group {
            for (&value, &xv) in &x[var] {
                by_value.entry(value).or_default().push(xv);
            }
        }
        for (value, vars) in by_value.into_iter().filter(|(_, vars)| vars.len() > 1) {
            model.add_constr(&format!("c_alldiff_{g}_{value}"), c!(vars.into_iter().grb_sum() <= 1))?;
        }
    }

    model.optimize()?;

    Ok(match model.status()? {
        Status::Optimal | Status::SubOptimal => {
            let mut values = Vec::with_capacity(x.len());
            for (var, xi) in instance.vars().zip(&x) {
                let mut chosen = None;
                for (&value, xv) in xi {
                    if model.get_obj_attr(attr::X, xv)? > 0.5 {
                        chosen = Some(value);
                    }
                }
                values.push((var, chosen.unwrap_or_default()));
            }
            SatResult::Satisfiable(Values::new(values))
        }
        Status::Infeasible | Status::InfOrUnbd => SatResult::Unsatisfiable,
        Status::TimeLimit => SatResult::Unknown(UnknownReason::Timeout),
        Status::NodeLimit => SatResult::Unknown(UnknownReason::NodeLimit),
        status => SatResult::Unknown(UnknownReason::Unsupported(format!("gurobi status {status:?}"))),
    })
}
