use std::sync::Arc;

use jobs::InMemJobs;
use solver_cpsat::CpSatSolver;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<CpSatSolver>>,
    pub default_time_limit_sec: u64,
}

impl AppState {
    pub fn new_default() -> Self {
        let default_time_limit_sec = std::env::var("UNISCHEDULE__SOLVE__TIME_LIMIT_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(12);

        Self {
            jobs: Arc::new(InMemJobs::new(CpSatSolver::new())),
            default_time_limit_sec,
        }
    }
}
