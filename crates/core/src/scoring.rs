//! Post-hoc recomputation of the soft-penalty objective (spec §4.5) for an
//! already-decoded schedule. Used by the `/v1/explain` endpoint and by
//! tests that check a solver's reported objective against an independent
//! calculation.

use std::collections::HashMap;
use types::{Assignment, AssignmentId, PenaltyWeights, ScheduleEntry, World};

#[derive(Clone, Debug, Default)]
pub struct PenaltyBreakdown {
    pub total: i64,
    pub by_assignment: HashMap<String, i64>,
}

/// Recomputes the same per-session penalty terms the model builder scores in
/// its objective (spec §4.5), from a decoded schedule rather than from the
/// solver's internal `x` variables.
pub fn compute_penalties(world: &World, entries: &[ScheduleEntry]) -> PenaltyBreakdown {
    let w: &PenaltyWeights = &world.policy.weights;

    let assignments: HashMap<&AssignmentId, &Assignment> =
        world.assignments.iter().map(|a| (&a.id, a)).collect();
    let teachers: HashMap<_, _> = world.teachers.iter().map(|t| (&t.id, t)).collect();
    let disciplines: HashMap<_, _> = world.disciplines.iter().map(|d| (&d.id, d)).collect();
    let groups: HashMap<_, _> = world.groups.iter().map(|g| (&g.id, g)).collect();

    let mut total = 0i64;
    let mut by_assignment: HashMap<String, i64> = HashMap::new();

    for e in entries {
        let mut penalty = 0i64;

        if let Some(teacher) = teachers.get(&e.teacher) {
            if let Some(default_room) = &teacher.default_room {
                if default_room != &e.room {
                    penalty += w.default_room_mismatch;
                }
            }
        }

        if let Some(assignment) = assignments.get(&e.assignment) {
            if let Some(preferred) = &assignment.room {
                if preferred != &e.room {
                    penalty += w.explicit_room_mismatch;
                }
            }
        }

        if let Some(discipline) = disciplines.get(&e.discipline) {
            if let Some(fixed_room) = &discipline.fixed_room {
                if fixed_room != &e.room {
                    penalty += w.fixed_room_mismatch;
                }
            }
        }

        if e.slot >= 6 {
            penalty += w.late_slot;
        }

        for group_id in &e.group_ids {
            if let Some(group) = groups.get(group_id) {
                if e.slot > group.shift_end_slot {
                    penalty += w.group_shift_over;
                }
                if e.slot < group.shift_start_slot {
                    penalty += w.group_shift_under;
                }
            }
        }

        total += penalty;
        *by_assignment.entry(e.assignment.0.clone()).or_insert(0) += penalty;
    }

    PenaltyBreakdown {
        total,
        by_assignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Discipline, DisciplineId, Group, GroupId, RoomId, Teacher, TeacherId};

    fn world_with_mismatch() -> World {
        let mut world = World::default();
        world.teachers.push(Teacher {
            id: TeacherId("t1".into()),
            name: String::new(),
            default_room: Some(RoomId("r1".into())),
            work_days: Default::default(),
            blocked_slots: Default::default(),
            max_per_day: 8,
            max_per_week: 40,
            contract_start_week: 1,
            contract_end_week: 20,
        });
        world.groups.push(Group {
            id: GroupId("g1".into()),
            size: 20,
            shift_start_slot: 1,
            shift_end_slot: 4,
            blocked_days: Default::default(),
            blocked_slots: Default::default(),
            program_start_week: 1,
            program_end_week: 20,
        });
        world.disciplines.push(Discipline {
            id: DisciplineId("d1".into()),
            credits: 0,
            required_room_features: Default::default(),
            fixed_room: None,
            kind: Default::default(),
            split_by_subgroups: false,
            practice_as_lab_exception: false,
        });
        world.assignments.push(Assignment {
            id: AssignmentId("a1".into()),
            discipline: DisciplineId("d1".into()),
            teacher: TeacherId("t1".into()),
            group_ids: vec![GroupId("g1".into())],
            stream: None,
            start_week: 1,
            end_week: 20,
            sessions_per_week: 1,
            duration_slots: 1,
            room: None,
            lock_day: None,
            lock_slot: None,
            lock_room: None,
            lock_teacher: None,
        });
        world
    }

    #[test]
    fn penalizes_default_room_mismatch_late_slot_and_shift_overrun() {
        let world = world_with_mismatch();
        let entries = vec![ScheduleEntry {
            assignment: AssignmentId("a1".into()),
            discipline: DisciplineId("d1".into()),
            teacher: TeacherId("t1".into()),
            group_ids: vec![GroupId("g1".into())],
            day: 0,
            slot: 7,
            room: RoomId("r2".into()),
            start_week: 1,
            end_week: 20,
        }];
        let breakdown = compute_penalties(&world, &entries);
        let w = &world.policy.weights;
        assert_eq!(
            breakdown.total,
            w.default_room_mismatch + w.late_slot + w.group_shift_over
        );
        assert_eq!(breakdown.by_assignment.get("a1"), Some(&breakdown.total));
    }

    #[test]
    fn no_penalty_when_everything_matches() {
        let mut world = world_with_mismatch();
        world.groups[0].shift_end_slot = 8;
        let entries = vec![ScheduleEntry {
            assignment: AssignmentId("a1".into()),
            discipline: DisciplineId("d1".into()),
            teacher: TeacherId("t1".into()),
            group_ids: vec![GroupId("g1".into())],
            day: 0,
            slot: 1,
            room: RoomId("r1".into()),
            start_week: 1,
            end_week: 20,
        }];
        let breakdown = compute_penalties(&world, &entries);
        assert_eq!(breakdown.total, 0);
    }
}
