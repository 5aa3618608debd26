use parking_lot::RwLock;
use sched_core::{InputError, ProblemInstance, SolveError, Solver};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info};
use types::{SolveOutcome, SolveParams, SolveReport, SolveStats, Solution};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Solved {
        solution: Solution,
        stats: SolveStats,
    },
    Infeasible {
        stats: SolveStats,
    },
    TimedOut {
        stats: SolveStats,
    },
    Rejected {
        errors: Vec<InputError>,
    },
    Failed {
        message: String,
    },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

impl From<Result<SolveReport, SolveError>> for JobStatus {
    fn from(res: Result<SolveReport, SolveError>) -> Self {
        match res {
            Ok(SolveReport { outcome, stats }) => match outcome {
                SolveOutcome::Solved { solution } => JobStatus::Solved { solution, stats },
                SolveOutcome::Infeasible => JobStatus::Infeasible { stats },
                SolveOutcome::TimedOut => JobStatus::TimedOut { stats },
            },
            Err(SolveError::Input(errors)) => JobStatus::Rejected { errors },
        }
    }
}

/// Finished jobs kept when no explicit limit is given.
pub const DEFAULT_KEEP_FINISHED: usize = 1_000;

#[derive(Default)]
struct Table {
    statuses: HashMap<String, JobStatus>,
    /// Finished job ids, oldest first.
    finished: VecDeque<String>,
}

/// Job table kept in memory for the life of the process. Solves run on the
/// blocking pool so the async runtime stays responsive. Only the newest
/// `keep_finished` finished jobs are retained; pending jobs are never evicted.
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<Table>>,
    solver: Arc<S>,
    keep_finished: usize,
}

impl<S: Solver> Clone for InMemJobs<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            solver: Arc::clone(&self.solver),
            keep_finished: self.keep_finished,
        }
    }
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self::with_retention(solver, DEFAULT_KEEP_FINISHED)
    }

    pub fn with_retention(solver: S, keep_finished: usize) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
            keep_finished,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, instance: ProblemInstance, params: SolveParams) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .statuses
            .insert(id.clone(), JobStatus::Queued);

        let table = Arc::clone(&self.inner);
        let solver = Arc::clone(&self.solver);
        let keep = self.keep_finished;
        let id_for_task = id.clone();

        tokio::spawn(async move {
            table
                .write()
                .statuses
                .insert(id_for_task.clone(), JobStatus::Running);
            let joined =
                tokio::task::spawn_blocking(move || solver.solve(&instance, &params)).await;
            let status = match joined {
                Ok(res) => JobStatus::from(res),
                Err(e) => {
                    error!(?e, job = %id_for_task, "job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };
            info!(job = %id_for_task, finished = status.is_finished(), "job settled");

            let mut t = table.write();
            t.statuses.insert(id_for_task.clone(), status);
            t.finished.push_back(id_for_task);
            while t.finished.len() > keep {
                if let Some(old) = t.finished.pop_front() {
                    debug!(job = %old, "evicting finished job");
                    t.statuses.remove(&old);
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().statuses.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::template::template_instance;
    use std::time::Duration;

    struct Canned(fn() -> Result<SolveReport, SolveError>);

    impl Solver for Canned {
        fn solve(
            &self,
            _instance: &ProblemInstance,
            _params: &SolveParams,
        ) -> Result<SolveReport, SolveError> {
            (self.0)()
        }
    }

    async fn settle<S: Solver>(jobs: &InMemJobs<S>, id: &JobId) -> JobStatus {
        for _ in 0..200 {
            if let Some(st) = jobs.get(&id.0).filter(JobStatus::is_finished) {
                return st;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} never finished", id.0);
    }

    fn instance() -> ProblemInstance {
        ProblemInstance::new(template_instance()).unwrap()
    }

    #[tokio::test]
    async fn records_solver_outcome() {
        let jobs = InMemJobs::new(Canned(|| {
            Ok(SolveReport {
                outcome: SolveOutcome::Infeasible,
                stats: SolveStats {
                    sessions: 4,
                    ..SolveStats::default()
                },
            })
        }));
        let id = jobs.enqueue(instance(), SolveParams::default());
        match settle(&jobs, &id).await {
            JobStatus::Infeasible { stats } => assert_eq!(stats.sessions, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn input_errors_reject_the_job() {
        let jobs = InMemJobs::new(Canned(|| {
            Err(SolveError::Input(vec![InputError::TeacherOverloaded {
                teacher: "T1".into(),
                sessions: 9,
                cap: 8,
            }]))
        }));
        let id = jobs.enqueue(instance(), SolveParams::default());
        assert!(matches!(
            settle(&jobs, &id).await,
            JobStatus::Rejected { errors } if errors.len() == 1
        ));
    }

    #[tokio::test]
    async fn panicking_solver_fails_the_job() {
        let jobs = InMemJobs::new(Canned(|| panic!("boom")));
        let id = jobs.enqueue(instance(), SolveParams::default());
        assert!(matches!(settle(&jobs, &id).await, JobStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn oldest_finished_jobs_are_evicted() {
        let jobs = InMemJobs::with_retention(
            Canned(|| {
                Ok(SolveReport {
                    outcome: SolveOutcome::TimedOut,
                    stats: SolveStats::default(),
                })
            }),
            1,
        );
        let first = jobs.enqueue(instance(), SolveParams::default());
        settle(&jobs, &first).await;
        let second = jobs.enqueue(instance(), SolveParams::default());
        settle(&jobs, &second).await;

        assert!(jobs.get(&first.0).is_none());
        assert!(matches!(jobs.get(&second.0), Some(JobStatus::TimedOut { .. })));
    }

    #[test]
    fn unknown_job_is_none() {
        let jobs = InMemJobs::new(Canned(|| unreachable!()));
        assert!(jobs.get("nope").is_none());
    }

    #[test]
    fn status_serializes_with_tag() {
        let v = serde_json::to_value(JobStatus::TimedOut {
            stats: SolveStats::default(),
        })
        .unwrap();
        assert_eq!(v["status"], "timed_out");
        assert_eq!(v["stats"]["nodes"], 0);
    }
}
