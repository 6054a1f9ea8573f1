pub mod scoring;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use types::{
    Assignment, AssignmentId, Discipline, DisciplineId, GenerateParams, Group, GroupId, Policy,
    Room, RoomId, ScheduleEntry, Stream, StreamId, Teacher, TeacherId, World,
};

/// The one error type the core ever returns. Variant implies the message
/// category described in the error taxonomy; all failures abort the run.
#[derive(Debug, Clone, Error)]
pub enum PlanningError {
    #[error("{0}")]
    Referential(String),
    #[error("{0}")]
    Numeric(String),
    #[error("{0}")]
    Window(String),
    #[error("{0}")]
    NoCandidates(String),
    #[error("{0}")]
    Infeasible(String),
    #[error("{0}")]
    Internal(String),
}

/// `groups(A) = sorted(set(A.group_ids ∪ A.stream.group_ids))`.
///
/// Assumes `a.stream`, when set, resolves to a real stream — callers run
/// `validate` first.
pub fn effective_group_ids(a: &Assignment, world: &World) -> Vec<GroupId> {
    let mut ids: Vec<GroupId> = Vec::new();
    if let Some(stream_id) = &a.stream {
        if let Some(stream) = world.streams.iter().find(|s| &s.id == stream_id) {
            ids.extend(stream.group_ids.iter().cloned());
        }
    }
    ids.extend(a.group_ids.iter().cloned());
    ids.sort();
    ids.dedup();
    ids
}

/// Validates referential integrity and numeric/window sanity of `world`
/// (spec §4.1). Fails fast with the first violation found, naming the
/// offending entity.
pub fn validate(world: &World) -> Result<(), PlanningError> {
    let teacher_ids: HashSet<&TeacherId> = world.teachers.iter().map(|t| &t.id).collect();
    let room_ids: HashSet<&RoomId> = world.rooms.iter().map(|r| &r.id).collect();
    let group_ids: HashSet<&GroupId> = world.groups.iter().map(|g| &g.id).collect();
    let stream_ids: HashSet<&StreamId> = world.streams.iter().map(|s| &s.id).collect();
    let discipline_ids: HashSet<&DisciplineId> = world.disciplines.iter().map(|d| &d.id).collect();

    let teachers_by_id: HashMap<&TeacherId, &Teacher> =
        world.teachers.iter().map(|t| (&t.id, t)).collect();
    let groups_by_id: HashMap<&GroupId, &Group> = world.groups.iter().map(|g| (&g.id, g)).collect();

    for stream in &world.streams {
        for group_id in &stream.group_ids {
            if !group_ids.contains(group_id) {
                return Err(PlanningError::Referential(format!(
                    "stream {}: unknown group {}",
                    stream.id, group_id
                )));
            }
        }
        if let Some(room_id) = &stream.preferred_room {
            if !room_ids.contains(room_id) {
                return Err(PlanningError::Referential(format!(
                    "stream {}: unknown room {}",
                    stream.id, room_id
                )));
            }
        }
    }

    for a in &world.assignments {
        let teacher = teachers_by_id.get(&a.teacher).ok_or_else(|| {
            PlanningError::Referential(format!(
                "assignment {}: unknown teacher {}",
                a.id, a.teacher
            ))
        })?;
        if !discipline_ids.contains(&a.discipline) {
            return Err(PlanningError::Referential(format!(
                "assignment {}: unknown discipline {}",
                a.id, a.discipline
            )));
        }
        if let Some(stream_id) = &a.stream {
            if !stream_ids.contains(stream_id) {
                return Err(PlanningError::Referential(format!(
                    "assignment {}: unknown stream {}",
                    a.id, stream_id
                )));
            }
        }
        for group_id in &a.group_ids {
            if !group_ids.contains(group_id) {
                return Err(PlanningError::Referential(format!(
                    "assignment {}: unknown group {}",
                    a.id, group_id
                )));
            }
        }
        if let Some(room_id) = &a.room {
            if !room_ids.contains(room_id) {
                return Err(PlanningError::Referential(format!(
                    "assignment {}: unknown room {}",
                    a.id, room_id
                )));
            }
        }
        if let Some(room_id) = &a.lock_room {
            if !room_ids.contains(room_id) {
                return Err(PlanningError::Referential(format!(
                    "assignment {}: unknown lock_room {}",
                    a.id, room_id
                )));
            }
        }
        if a.sessions_per_week == 0 {
            return Err(PlanningError::Numeric(format!(
                "assignment {}: sessions_per_week must be > 0",
                a.id
            )));
        }
        if a.start_week > a.end_week {
            return Err(PlanningError::Numeric(format!(
                "assignment {}: start_week {} is after end_week {}",
                a.id, a.start_week, a.end_week
            )));
        }

        if a.start_week < teacher.contract_start_week || a.end_week > teacher.contract_end_week {
            return Err(PlanningError::Window(format!(
                "assignment {}: weeks [{}, {}] fall outside teacher {} contract [{}, {}]",
                a.id,
                a.start_week,
                a.end_week,
                teacher.id,
                teacher.contract_start_week,
                teacher.contract_end_week
            )));
        }

        let groups = effective_group_ids(a, world);
        if groups.is_empty() {
            return Err(PlanningError::Referential(format!(
                "assignment {}: no groups (neither group_ids nor stream resolve any)",
                a.id
            )));
        }
        for group_id in &groups {
            let group = groups_by_id
                .get(group_id)
                .expect("group_id already resolved above");
            if a.start_week < group.program_start_week || a.end_week > group.program_end_week {
                return Err(PlanningError::Window(format!(
                    "assignment {}: weeks [{}, {}] fall outside group {} program [{}, {}]",
                    a.id,
                    a.start_week,
                    a.end_week,
                    group.id,
                    group.program_start_week,
                    group.program_end_week
                )));
            }
        }
    }

    Ok(())
}

/// A pluggable backend for `generate`. The production backend lives in
/// `solver-cpsat`; this trait is the seam the ambient job queue dispatches
/// through.
#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn generate(
        &self,
        world: World,
        params: GenerateParams,
    ) -> Result<Vec<ScheduleEntry>, PlanningError>;
}
