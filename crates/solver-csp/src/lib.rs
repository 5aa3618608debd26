pub mod assemble;
pub mod domain;
pub mod expand;
pub mod network;
pub mod search;

use std::time::{Duration, Instant};

use sched_core::{ProblemInstance, SolveError, Solver};
use tracing::info;
use types::{SolveOutcome, SolveParams, SolveReport, SolveStats};

use crate::domain::build_domains;
use crate::network::ConstraintNetwork;
use crate::search::{Budget, Calendar, SearchOutcome};

/// Exact solver: expands workloads, builds domains and the conflict network,
/// then runs a backtracking search for the first feasible timetable.
#[derive(Clone, Copy, Debug, Default)]
pub struct CspSolver;

impl CspSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for CspSolver {
    fn solve(
        &self,
        instance: &ProblemInstance,
        params: &SolveParams,
    ) -> Result<SolveReport, SolveError> {
        let started = Instant::now();
        let budget = Budget::new(
            params.time_limit_ms.map(Duration::from_millis),
            params.step_limit,
        );

        let requests = expand::expand_instance(instance);
        let mut errors = expand::check_teacher_loads(instance, &requests);
        let domains = match build_domains(instance, &requests) {
            Ok(d) => d,
            Err(e) => {
                errors.extend(e);
                return Err(SolveError::Input(errors));
            }
        };
        if !errors.is_empty() {
            return Err(SolveError::Input(errors));
        }

        let network = ConstraintNetwork::build(&requests, &domains);
        let conflicts = network.fixed_conflicts(&domains);
        if !conflicts.is_empty() {
            return Err(SolveError::Input(conflicts));
        }

        let fixed = requests.iter().filter(|r| r.is_fixed()).count();
        info!(
            sessions = requests.len(),
            fixed,
            constraints = network.constraints().len(),
            seed = ?params.seed,
            "starting search"
        );

        let calendar = Calendar {
            days: instance.days().len(),
            slots_per_day: instance.slots_per_day(),
        };
        let (outcome, search_stats) =
            search::search(&domains, &network, calendar, params.seed, budget);

        let outcome = match outcome {
            SearchOutcome::Solved(values) => SolveOutcome::Solved {
                solution: assemble::assemble(instance, &requests, &values),
            },
            SearchOutcome::Infeasible => SolveOutcome::Infeasible,
            SearchOutcome::TimedOut => SolveOutcome::TimedOut,
        };
        let stats = SolveStats {
            sessions: requests.len(),
            fixed,
            constraints: network.constraints().len(),
            nodes: search_stats.nodes,
            backtracks: search_stats.backtracks,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            status = outcome_name(&outcome),
            nodes = stats.nodes,
            elapsed_ms = stats.elapsed_ms,
            "search done"
        );
        Ok(SolveReport { outcome, stats })
    }
}

fn outcome_name(outcome: &SolveOutcome) -> &'static str {
    match outcome {
        SolveOutcome::Solved { .. } => "solved",
        SolveOutcome::Infeasible => "infeasible",
        SolveOutcome::TimedOut => "timed_out",
    }
}

/// One-shot entry point: `Solved`, `Infeasible` or `TimedOut`, or the input
/// errors that prevented the search from starting.
pub fn solve(
    instance: &ProblemInstance,
    params: &SolveParams,
) -> Result<SolveReport, SolveError> {
    CspSolver::new().solve(instance, params)
}
