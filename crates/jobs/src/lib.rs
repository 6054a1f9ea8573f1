use parking_lot::RwLock;
use sched_core::{GenerateParams, ScheduleEntry, Solver, World};
use std::collections::HashMap;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done { entries: Vec<ScheduleEntry> },
    Failed { message: String },
}

/// In-memory job queue, dispatching `generate` calls onto their own tokio
/// task so a caller can enqueue and poll rather than block on a multi-second
/// solve. One process's worth of state; nothing survives a restart.
#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: std::sync::Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: std::sync::Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: std::sync::Arc::new(solver),
        }
    }

    pub fn enqueue(&self, world: World, params: GenerateParams) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            match solver.generate(world, params).await {
                Ok(entries) => {
                    map.write()
                        .insert(id_for_task, JobStatus::Done { entries });
                }
                Err(e) => {
                    error!(%e, "job failed");
                    map.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sched_core::PlanningError;
    use std::time::Duration;

    struct Instant;

    #[async_trait]
    impl Solver for Instant {
        async fn generate(
            &self,
            _world: World,
            _params: GenerateParams,
        ) -> Result<Vec<ScheduleEntry>, PlanningError> {
            Ok(vec![])
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Solver for AlwaysFails {
        async fn generate(
            &self,
            _world: World,
            _params: GenerateParams,
        ) -> Result<Vec<ScheduleEntry>, PlanningError> {
            Err(PlanningError::Infeasible("no".into()))
        }
    }

    async fn wait_until_settled<S: Solver>(jobs: &InMemJobs<S>, id: &str) -> JobStatus {
        for _ in 0..100 {
            match jobs.get(id) {
                Some(JobStatus::Queued) | Some(JobStatus::Running) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                Some(status) => return status,
                None => panic!("job {id} vanished"),
            }
        }
        panic!("job {id} never settled");
    }

    #[tokio::test]
    async fn enqueue_reaches_done_on_success() {
        let jobs = InMemJobs::new(Instant);
        let id = jobs.enqueue(World::default(), GenerateParams::default());
        let status = wait_until_settled(&jobs, &id.0).await;
        assert!(matches!(status, JobStatus::Done { entries } if entries.is_empty()));
    }

    #[tokio::test]
    async fn enqueue_reaches_failed_on_error() {
        let jobs = InMemJobs::new(AlwaysFails);
        let id = jobs.enqueue(World::default(), GenerateParams::default());
        let status = wait_until_settled(&jobs, &id.0).await;
        assert!(matches!(status, JobStatus::Failed { .. }));
    }

    #[test]
    fn unknown_job_id_returns_none() {
        let jobs = InMemJobs::new(Instant);
        assert!(jobs.get("does-not-exist").is_none());
    }
}
