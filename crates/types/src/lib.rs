use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            Ord,
            PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(RoomId);
id_newtype!(GroupId);
id_newtype!(StreamId);
id_newtype!(DisciplineId);
id_newtype!(AssignmentId);

/// Weekday indices, 0 = Monday .. 5 = Saturday.
pub const DAYS: std::ops::Range<u8> = 0..6;
/// Valid period-of-day indices.
pub const SLOTS: std::ops::RangeInclusive<u8> = 1..=8;

/// Canonical `"day:slot"` encoding used wherever a blocklist addresses a single cell.
pub fn cell_key(day: u8, slot: u8) -> String {
    format!("{day}:{slot}")
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineKind {
    #[default]
    Lecture,
    Lab,
    Practice,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_room: Option<RoomId>,
    pub work_days: HashSet<u8>,
    #[serde(default)]
    pub blocked_slots: HashSet<String>,
    pub max_per_day: u32,
    pub max_per_week: u32,
    pub contract_start_week: u32,
    pub contract_end_week: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub features: HashSet<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Group {
    pub id: GroupId,
    pub size: u32,
    pub shift_start_slot: u8,
    pub shift_end_slot: u8,
    #[serde(default)]
    pub blocked_days: HashSet<u8>,
    #[serde(default)]
    pub blocked_slots: HashSet<String>,
    pub program_start_week: u32,
    pub program_end_week: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Stream {
    pub id: StreamId,
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub preferred_room: Option<RoomId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Discipline {
    pub id: DisciplineId,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub required_room_features: HashSet<String>,
    #[serde(default)]
    pub fixed_room: Option<RoomId>,
    #[serde(default)]
    pub kind: DisciplineKind,
    /// Carried for storage only; the generator does not act on it (spec Non-goals).
    #[serde(default)]
    pub split_by_subgroups: bool,
    /// Carried for storage only; the generator does not act on it (spec Non-goals).
    #[serde(default)]
    pub practice_as_lab_exception: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Assignment {
    pub id: AssignmentId,
    pub discipline: DisciplineId,
    pub teacher: TeacherId,
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub stream: Option<StreamId>,
    pub start_week: u32,
    pub end_week: u32,
    pub sessions_per_week: u32,
    /// Carried for storage only; the generator does not act on it (spec Non-goals).
    #[serde(default = "default_duration_slots")]
    pub duration_slots: u32,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub lock_day: Option<u8>,
    #[serde(default)]
    pub lock_slot: Option<u8>,
    #[serde(default)]
    pub lock_room: Option<RoomId>,
    /// Reserved: unused by the generator, same as the upstream model this was
    /// distilled from never reads its `lock_teacher_id` either.
    #[serde(default)]
    pub lock_teacher: Option<TeacherId>,
}

fn default_duration_slots() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleEntry {
    pub assignment: AssignmentId,
    pub discipline: DisciplineId,
    pub teacher: TeacherId,
    pub group_ids: Vec<GroupId>,
    pub day: u8,
    pub slot: u8,
    pub room: RoomId,
    pub start_week: u32,
    pub end_week: u32,
}

/// Weights for the soft-penalty objective. Defaults reproduce the fixed
/// constants from the original design; embedders may retune per-deployment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(default)]
pub struct PenaltyWeights {
    pub default_room_mismatch: i64,
    pub explicit_room_mismatch: i64,
    pub fixed_room_mismatch: i64,
    pub late_slot: i64,
    pub group_shift_over: i64,
    pub group_shift_under: i64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            default_room_mismatch: 2,
            explicit_room_mismatch: 5,
            fixed_room_mismatch: 7,
            late_slot: 1,
            group_shift_over: 4,
            group_shift_under: 4,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct Policy {
    #[serde(default)]
    pub weights: PenaltyWeights,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct World {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub disciplines: Vec<Discipline>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Carried for round-tripping through a collaborator's persistence layer;
    /// `generate` never reads or writes this field.
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub policy: Policy,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct GenerateParams {
    pub time_limit_sec: u64,
    pub num_workers: usize,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            time_limit_sec: 12,
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(1),
        }
    }
}
