//! Per-session feasible (day, slot) and room enumeration (spec §4.2).

use sched_core::{effective_group_ids, PlanningError};
use types::{cell_key, Assignment, AssignmentId, GroupId, RoomId, World, DAYS, SLOTS};

/// One of an assignment's `sessions_per_week` indistinguishable placement units.
#[derive(Clone, Debug)]
pub struct Session {
    pub assignment_idx: usize,
    pub assignment_id: AssignmentId,
}

#[derive(Clone, Debug)]
pub struct SessionCandidates {
    pub session: Session,
    pub cells: Vec<(u8, u8)>,
    pub rooms: Vec<RoomId>,
    pub group_ids: Vec<GroupId>,
}

/// Expands every assignment into its sessions and computes `T(s)`/`R(s)` for each.
pub fn build_candidates(world: &World) -> Result<Vec<SessionCandidates>, PlanningError> {
    let mut out = Vec::new();

    for (ai, a) in world.assignments.iter().enumerate() {
        let teacher = world
            .teachers
            .iter()
            .find(|t| t.id == a.teacher)
            .expect("validate() already resolved this id");
        let group_ids = effective_group_ids(a, world);
        let groups: Vec<_> = group_ids
            .iter()
            .map(|gid| {
                world
                    .groups
                    .iter()
                    .find(|g| &g.id == gid)
                    .expect("validate() already resolved this id")
            })
            .collect();

        let cells = timeslot_candidates(a, teacher, &groups)?;
        let rooms = room_candidates(world, a, &group_ids)?;

        for _ in 0..a.sessions_per_week {
            out.push(SessionCandidates {
                session: Session {
                    assignment_idx: ai,
                    assignment_id: a.id.clone(),
                },
                cells: cells.clone(),
                rooms: rooms.clone(),
                group_ids: group_ids.clone(),
            });
        }
    }

    Ok(out)
}

fn timeslot_candidates(
    a: &Assignment,
    teacher: &types::Teacher,
    groups: &[&types::Group],
) -> Result<Vec<(u8, u8)>, PlanningError> {
    let locked = match (a.lock_day, a.lock_slot) {
        (Some(d), Some(s)) => Some((d, s)),
        _ => None,
    };

    let mut cells = Vec::new();
    for day in DAYS {
        for slot in SLOTS {
            if let Some((ld, ls)) = locked {
                if (day, slot) != (ld, ls) {
                    continue;
                }
            }
            if !teacher.work_days.contains(&day) {
                continue;
            }
            if teacher.blocked_slots.contains(&cell_key(day, slot)) {
                continue;
            }
            let blocked_by_group = groups.iter().any(|g| {
                g.blocked_days.contains(&day)
                    || slot < g.shift_start_slot
                    || slot > g.shift_end_slot
                    || g.blocked_slots.contains(&cell_key(day, slot))
            });
            if blocked_by_group {
                continue;
            }
            cells.push((day, slot));
        }
    }

    if cells.is_empty() {
        return Err(PlanningError::NoCandidates(format!(
            "assignment {}: no available slots",
            a.id
        )));
    }
    Ok(cells)
}

fn room_candidates(
    world: &World,
    a: &Assignment,
    group_ids: &[GroupId],
) -> Result<Vec<RoomId>, PlanningError> {
    let discipline = world
        .disciplines
        .iter()
        .find(|d| d.id == a.discipline)
        .expect("validate() already resolved this id");
    let stream_preferred_room = a.stream.as_ref().and_then(|sid| {
        world
            .streams
            .iter()
            .find(|s| &s.id == sid)
            .and_then(|s| s.preferred_room.clone())
    });

    let requested_room = a
        .lock_room
        .clone()
        .or_else(|| a.room.clone())
        .or_else(|| discipline.fixed_room.clone())
        .or(stream_preferred_room);

    let required_size: u32 = group_ids
        .iter()
        .map(|gid| {
            world
                .groups
                .iter()
                .find(|g| &g.id == gid)
                .expect("validate() already resolved this id")
                .size
        })
        .sum();

    let is_feasible = |room: &types::Room| -> bool {
        room.capacity >= required_size
            && discipline
                .required_room_features
                .iter()
                .all(|f| room.features.contains(f))
    };

    if let Some(room_id) = requested_room {
        let room = world.rooms.iter().find(|r| r.id == room_id);
        return match room {
            Some(r) if is_feasible(r) => Ok(vec![room_id]),
            _ => Err(PlanningError::NoCandidates(format!(
                "assignment {}: no feasible room",
                a.id
            ))),
        };
    }

    let rooms: Vec<RoomId> = world
        .rooms
        .iter()
        .filter(|r| is_feasible(r))
        .map(|r| r.id.clone())
        .collect();

    if rooms.is_empty() {
        return Err(PlanningError::NoCandidates(format!(
            "assignment {}: no feasible room",
            a.id
        )));
    }
    Ok(rooms)
}

/// Random small worlds whose filtered candidates must still satisfy the
/// predicates they were filtered by (spec V1/V2/V10), complementing the
/// deterministic fixtures in `lib.rs`.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use types::{Discipline, DisciplineId, DisciplineKind, Group, Room, Teacher, TeacherId};

    fn base_world(
        work_days: HashSet<u8>,
        teacher_blocked: (u8, u8),
        shift_start: u8,
        shift_end: u8,
        group_blocked_day: u8,
        group_blocked: (u8, u8),
        room_capacity: u32,
        required_feature: Option<&str>,
        room_features: HashSet<String>,
    ) -> World {
        let mut world = World::default();
        world.teachers.push(Teacher {
            id: TeacherId("t1".into()),
            name: String::new(),
            default_room: None,
            work_days,
            blocked_slots: [cell_key(teacher_blocked.0, teacher_blocked.1)]
                .into_iter()
                .collect(),
            max_per_day: 8,
            max_per_week: 48,
            contract_start_week: 1,
            contract_end_week: 20,
        });
        world.rooms.push(Room {
            id: RoomId("r1".into()),
            capacity: room_capacity,
            building: String::new(),
            features: room_features,
        });
        world.groups.push(Group {
            id: GroupId("g1".into()),
            size: 1,
            shift_start_slot: shift_start,
            shift_end_slot: shift_end,
            blocked_days: [group_blocked_day].into_iter().collect(),
            blocked_slots: [cell_key(group_blocked.0, group_blocked.1)]
                .into_iter()
                .collect(),
            program_start_week: 1,
            program_end_week: 20,
        });
        world.disciplines.push(Discipline {
            id: DisciplineId("d1".into()),
            credits: 0,
            required_room_features: required_feature
                .map(|f| [f.to_string()].into_iter().collect())
                .unwrap_or_default(),
            fixed_room: None,
            kind: DisciplineKind::Lecture,
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
            end_week: 1,
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

    proptest! {
        #[test]
        fn feasible_cells_satisfy_teacher_and_group_filters(
            work_days in prop::collection::hash_set(0u8..6, 1..6),
            teacher_blocked_day in 0u8..6,
            teacher_blocked_slot in 1u8..=8,
            shift_start in 1u8..=8,
            shift_len in 0u8..=7,
            group_blocked_day in 0u8..6,
            group_blocked_day_b in 0u8..6,
            group_blocked_slot in 1u8..=8,
        ) {
            let shift_end = (shift_start + shift_len).min(8);
            let world = base_world(
                work_days,
                (teacher_blocked_day, teacher_blocked_slot),
                shift_start,
                shift_end,
                group_blocked_day,
                (group_blocked_day_b, group_blocked_slot),
                100,
                None,
                HashSet::new(),
            );

            let teacher = &world.teachers[0];
            let groups: Vec<&types::Group> = world.groups.iter().collect();
            if let Ok(cells) = timeslot_candidates(&world.assignments[0], teacher, &groups) {
                for (day, slot) in cells {
                    prop_assert!(teacher.work_days.contains(&day));
                    prop_assert!(!teacher.blocked_slots.contains(&cell_key(day, slot)));
                    for g in &groups {
                        prop_assert!(!g.blocked_days.contains(&day));
                        prop_assert!(slot >= g.shift_start_slot && slot <= g.shift_end_slot);
                        prop_assert!(!g.blocked_slots.contains(&cell_key(day, slot)));
                    }
                }
            }
        }

        #[test]
        fn feasible_rooms_satisfy_capacity_and_feature_filters(
            room_capacity in 0u32..5,
            group_size in 0u32..5,
            require_feature in any::<bool>(),
            room_has_feature in any::<bool>(),
        ) {
            let mut room_features = HashSet::new();
            if room_has_feature {
                room_features.insert("lab".to_string());
            }
            let mut world = base_world(
                (0..6).collect(),
                (0, 1),
                1,
                8,
                6, // out of range day, never blocks
                (6, 1),
                room_capacity,
                require_feature.then_some("lab"),
                room_features,
            );
            world.groups[0].size = group_size;

            let group_ids = vec![GroupId("g1".into())];
            if let Ok(rooms) = room_candidates(&world, &world.assignments[0], &group_ids) {
                for room_id in rooms {
                    let room = world.rooms.iter().find(|r| r.id == room_id).unwrap();
                    prop_assert!(room.capacity >= group_size);
                    if require_feature {
                        prop_assert!(room.features.contains("lab"));
                    }
                }
            }
        }
    }
}
