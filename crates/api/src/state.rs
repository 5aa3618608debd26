use std::sync::Arc;

use jobs::InMemJobs;
use solver_csp::CspSolver;
use types::SolveParams;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<CspSolver>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            jobs: Arc::new(InMemJobs::with_retention(
                CspSolver::new(),
                config.keep_finished_jobs,
            )),
            config: Arc::new(config),
        }
    }

    pub fn with_defaults(&self, mut params: SolveParams) -> SolveParams {
        if params.time_limit_ms.is_none() {
            params.time_limit_ms = self.config.default_time_limit_ms;
        }
        params
    }
}
