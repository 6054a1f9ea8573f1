//! Boolean decision variables, hard constraints and the soft-penalty
//! objective over the abstract CP-SAT-style interface (spec §4.3–§4.6),
//! realized with `good_lp`.

use std::collections::HashMap;
use std::time::Duration;

use good_lp::{variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use sched_core::PlanningError;
use types::{GenerateParams, RoomId, TeacherId, World};

use crate::candidates::SessionCandidates;

struct YVar {
    session_idx: usize,
    day: u8,
    slot: u8,
    var: Variable,
}

struct XVar {
    session_idx: usize,
    day: u8,
    slot: u8,
    room: RoomId,
    var: Variable,
}

pub struct Decision {
    pub cell: (u8, u8),
    pub room: RoomId,
}

/// Builds every variable and constraint, solves, and returns one decision
/// per session index (parallel to the `sessions` slice passed in).
pub fn solve(
    world: &World,
    sessions: &[SessionCandidates],
    params: &GenerateParams,
) -> Result<Vec<Decision>, PlanningError> {
    let mut vars = ProblemVariables::new();
    let mut y_vars: Vec<YVar> = Vec::new();
    let mut x_vars: Vec<XVar> = Vec::new();

    for (session_idx, s) in sessions.iter().enumerate() {
        for &(day, slot) in &s.cells {
            let y = vars.add(variable().binary());
            y_vars.push(YVar {
                session_idx,
                day,
                slot,
                var: y,
            });
            for room in &s.rooms {
                let x = vars.add(variable().binary());
                x_vars.push(XVar {
                    session_idx,
                    day,
                    slot,
                    room: room.clone(),
                    var: x,
                });
            }
        }
    }

    let objective = build_objective(world, sessions, &x_vars);
    let mut model = vars.minimise(objective.clone()).using(good_lp::default_solver);

    let time_limit = Duration::from_secs(params.time_limit_sec.max(1));
    model.set_parameter("seconds", &time_limit.as_secs_f64().to_string());
    model.set_parameter("threads", &params.num_workers.max(1).to_string());

    model = add_channeling_and_exactly_one(model, sessions, &y_vars, &x_vars);
    model = add_distinct_cells_per_assignment(model, sessions, &y_vars);
    model = add_hard_constraints(model, world, sessions, &y_vars, &x_vars);

    let solution = model.solve().map_err(|e| {
        PlanningError::Infeasible(format!(
            "cannot build schedule with current constraints; relax or substitute resources ({e})"
        ))
    })?;

    decode(sessions, &y_vars, &x_vars, &solution)
}

fn build_objective(world: &World, sessions: &[SessionCandidates], x_vars: &[XVar]) -> Expression {
    let w = &world.policy.weights;
    let teachers_by_id: HashMap<&TeacherId, &types::Teacher> =
        world.teachers.iter().map(|t| (&t.id, t)).collect();

    let mut objective = Expression::from(0.0);

    for x in x_vars {
        let session = &sessions[x.session_idx];
        let assignment = &world.assignments[session.session.assignment_idx];
        let teacher = teachers_by_id[&assignment.teacher];
        let discipline = world
            .disciplines
            .iter()
            .find(|d| d.id == assignment.discipline)
            .expect("validate() already resolved this id");

        let mut penalty = 0i64;

        if let Some(default_room) = &teacher.default_room {
            if default_room != &x.room {
                penalty += w.default_room_mismatch;
            }
        }
        if let Some(room_id) = &assignment.room {
            if room_id != &x.room {
                penalty += w.explicit_room_mismatch;
            }
        }
        if let Some(fixed_room) = &discipline.fixed_room {
            if fixed_room != &x.room {
                penalty += w.fixed_room_mismatch;
            }
        }
        if x.slot >= 6 {
            penalty += w.late_slot;
        }
        for group_id in &session.group_ids {
            let group = world
                .groups
                .iter()
                .find(|g| &g.id == group_id)
                .expect("validate() already resolved this id");
            if x.slot > group.shift_end_slot {
                penalty += w.group_shift_over;
            }
            if x.slot < group.shift_start_slot {
                penalty += w.group_shift_under;
            }
        }

        if penalty != 0 {
            objective = objective + (penalty as f64) * x.var;
        }
    }

    objective
}

fn add_channeling_and_exactly_one<M: SolverModel>(
    mut model: M,
    sessions: &[SessionCandidates],
    y_vars: &[YVar],
    x_vars: &[XVar],
) -> M {
    for (si, _s) in sessions.iter().enumerate() {
        let mut exactly_one = Expression::from(0.0);
        for y in y_vars.iter().filter(|y| y.session_idx == si) {
            exactly_one = exactly_one + y.var;

            let mut channel = Expression::from(0.0);
            for x in x_vars
                .iter()
                .filter(|x| x.session_idx == si && x.day == y.day && x.slot == y.slot)
            {
                channel = channel + x.var;
            }
            model = model.with((channel - y.var).eq(0.0));
        }
        model = model.with(exactly_one.eq(1.0));
    }
    model
}

/// Open-question resolution (§4.3 supplement): two sessions of the same
/// assignment may not collapse onto the same cell.
fn add_distinct_cells_per_assignment<M: SolverModel>(
    mut model: M,
    sessions: &[SessionCandidates],
    y_vars: &[YVar],
) -> M {
    let mut by_assignment: HashMap<usize, Vec<usize>> = HashMap::new();
    for (si, s) in sessions.iter().enumerate() {
        by_assignment
            .entry(s.session.assignment_idx)
            .or_default()
            .push(si);
    }

    for session_idxs in by_assignment.values() {
        if session_idxs.len() < 2 {
            continue;
        }
        for i in 0..session_idxs.len() {
            for j in (i + 1)..session_idxs.len() {
                let si = session_idxs[i];
                let sj = session_idxs[j];
                let cells_i: Vec<&YVar> = y_vars.iter().filter(|y| y.session_idx == si).collect();
                for yi in cells_i {
                    if let Some(yj) = y_vars
                        .iter()
                        .find(|y| y.session_idx == sj && y.day == yi.day && y.slot == yi.slot)
                    {
                        model = model.with((yi.var + yj.var).leq(1.0));
                    }
                }
            }
        }
    }
    model
}

fn add_hard_constraints<M: SolverModel>(
    mut model: M,
    world: &World,
    sessions: &[SessionCandidates],
    y_vars: &[YVar],
    x_vars: &[XVar],
) -> M {
    let mut by_week_day_teacher: HashMap<(u32, u8, &TeacherId), Vec<Variable>> = HashMap::new();
    let mut by_week_teacher: HashMap<(u32, &TeacherId), Vec<Variable>> = HashMap::new();
    let mut by_week_slot_teacher: HashMap<(u32, u8, u8, &TeacherId), Vec<Variable>> =
        HashMap::new();
    let mut by_week_slot_group: HashMap<(u32, u8, u8, &str), Vec<Variable>> = HashMap::new();
    let mut by_week_slot_room: HashMap<(u32, u8, u8, &RoomId), Vec<Variable>> = HashMap::new();

    for y in y_vars {
        let session = &sessions[y.session_idx];
        let assignment = &world.assignments[session.session.assignment_idx];
        for week in assignment.start_week..=assignment.end_week {
            by_week_day_teacher
                .entry((week, y.day, &assignment.teacher))
                .or_default()
                .push(y.var);
            by_week_teacher
                .entry((week, &assignment.teacher))
                .or_default()
                .push(y.var);
            by_week_slot_teacher
                .entry((week, y.day, y.slot, &assignment.teacher))
                .or_default()
                .push(y.var);
            for group_id in &session.group_ids {
                by_week_slot_group
                    .entry((week, y.day, y.slot, group_id.0.as_str()))
                    .or_default()
                    .push(y.var);
            }
        }
    }

    for x in x_vars {
        let session = &sessions[x.session_idx];
        let assignment = &world.assignments[session.session.assignment_idx];
        for week in assignment.start_week..=assignment.end_week {
            by_week_slot_room
                .entry((week, x.day, x.slot, &x.room))
                .or_default()
                .push(x.var);
        }
    }

    for vars in by_week_slot_teacher.values() {
        model = model.with(sum_of(vars).leq(1.0));
    }
    for vars in by_week_slot_group.values() {
        model = model.with(sum_of(vars).leq(1.0));
    }
    for vars in by_week_slot_room.values() {
        model = model.with(sum_of(vars).leq(1.0));
    }

    let teachers_by_id: HashMap<&TeacherId, &types::Teacher> =
        world.teachers.iter().map(|t| (&t.id, t)).collect();

    for ((_, _, teacher_id), vars) in &by_week_day_teacher {
        let teacher = teachers_by_id[teacher_id];
        model = model.with(sum_of(vars).leq(teacher.max_per_day as f64));
    }
    for ((_, teacher_id), vars) in &by_week_teacher {
        let teacher = teachers_by_id[teacher_id];
        model = model.with(sum_of(vars).leq(teacher.max_per_week as f64));
    }

    model
}

fn sum_of(vars: &[Variable]) -> Expression {
    let mut sum = Expression::from(0.0);
    for &v in vars {
        sum = sum + v;
    }
    sum
}

fn decode(
    sessions: &[SessionCandidates],
    y_vars: &[YVar],
    x_vars: &[XVar],
    solution: &impl Solution,
) -> Result<Vec<Decision>, PlanningError> {
    let mut decisions = Vec::with_capacity(sessions.len());

    for (si, s) in sessions.iter().enumerate() {
        let cell = y_vars
            .iter()
            .filter(|y| y.session_idx == si)
            .find(|y| solution.value(y.var) > 0.5)
            .map(|y| (y.day, y.slot))
            .ok_or_else(|| {
                PlanningError::Internal(format!(
                    "assignment {}: solver reported feasible but no cell was chosen",
                    s.session.assignment_id
                ))
            })?;

        let room = x_vars
            .iter()
            .filter(|x| x.session_idx == si && x.day == cell.0 && x.slot == cell.1)
            .find(|x| solution.value(x.var) > 0.5)
            .map(|x| x.room.clone())
            .ok_or_else(|| {
                PlanningError::Internal(format!(
                    "assignment {}: solver reported feasible but no room was chosen",
                    s.session.assignment_id
                ))
            })?;

        decisions.push(Decision { cell, room });
    }

    Ok(decisions)
}
