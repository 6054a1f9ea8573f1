//! CP-SAT-style timetable solver: candidate enumeration, Boolean-variable
//! model building and a timed solve, targeting the abstract interface
//! spec.md §9 describes (Boolean vars, linear constraints, min-sum
//! objective, timed solve) via `good_lp`/`coin_cbc`.

mod candidates;
mod model;

use async_trait::async_trait;
use tracing::info;

use sched_core::{validate, PlanningError, Solver};
use types::{GenerateParams, ScheduleEntry, World};

pub struct CpSatSolver;

impl CpSatSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpSatSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for CpSatSolver {
    /// `generate` itself is synchronous and CPU-bound (spec §5); running it
    /// on a blocking thread keeps the async job queue's executor responsive
    /// while it runs, the same tradeoff the teacher's job queue makes by
    /// spawning a task per job (`crates/jobs/src/lib.rs`).
    async fn generate(
        &self,
        world: World,
        params: GenerateParams,
    ) -> Result<Vec<ScheduleEntry>, PlanningError> {
        tokio::task::spawn_blocking(move || generate(&world, params))
            .await
            .map_err(|e| PlanningError::Internal(format!("solver task panicked: {e}")))?
    }
}

/// Validates `world`, builds per-session candidates, solves the Boolean
/// model and decodes it into a sorted schedule (spec §4.1–§4.7).
pub fn generate(world: &World, params: GenerateParams) -> Result<Vec<ScheduleEntry>, PlanningError> {
    validate(world)?;

    let sessions = candidates::build_candidates(world)?;
    info!(
        sessions = sessions.len(),
        time_limit_sec = params.time_limit_sec,
        "starting solve"
    );

    let decisions = model::solve(world, &sessions, &params)?;

    let mut entries: Vec<ScheduleEntry> = sessions
        .iter()
        .zip(decisions.iter())
        .map(|(session, decision)| {
            let assignment = &world.assignments[session.session.assignment_idx];
            ScheduleEntry {
                assignment: session.session.assignment_id.clone(),
                discipline: assignment.discipline.clone(),
                teacher: assignment.teacher.clone(),
                group_ids: session.group_ids.clone(),
                day: decision.cell.0,
                slot: decision.cell.1,
                room: decision.room.clone(),
                start_week: assignment.start_week,
                end_week: assignment.end_week,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        (a.day, a.slot, &a.assignment.0).cmp(&(b.day, b.slot, &b.assignment.0))
    });

    info!(entries = entries.len(), "solve complete");
    Ok(entries)
}
