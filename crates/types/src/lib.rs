use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
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
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(GroupId);
id_newtype!(RoomId);
id_newtype!(CourseId);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[serde(alias = "Classroom")]
    Classroom,
    #[serde(alias = "Lab")]
    Lab,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::Classroom => f.write_str("classroom"),
            RoomType::Lab => f.write_str("lab"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    #[default]
    #[serde(alias = "Lecture")]
    Lecture,
    #[serde(alias = "Lab")]
    Lab,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    #[serde(alias = "Division")]
    Division,
    #[serde(alias = "Batch")]
    Batch,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_type: RoomType,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub name: Option<String>,
    /// Upper bound on the number of sessions this teacher gives per week.
    #[serde(default)]
    pub max_load_per_week: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: CourseKind,
    /// Number of contiguous slots one session occupies.
    pub duration_slots: u32,
}

/// A division, or a batch (sub-partition) of a division.
///
/// Batches and their parent division are scheduled independently; a
/// division-wide session only blocks a batch when a workload says so.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub year: String,
    pub division: String,
    #[serde(default)]
    pub batch: Option<String>,
    pub kind: GroupKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub group_id: GroupId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub sessions_per_week: u32,
    pub room_type_required: RoomType,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preassignment {
    pub group_id: GroupId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub day: String,
    pub start_slot_index: u32,
    /// Informational only; the course's own duration is what gets scheduled.
    #[serde(default)]
    pub duration_slots: Option<u32>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
}

/// Wall-clock label of one slot index, `"HH:MM"` on both ends.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct SlotTime {
    pub start: String,
    pub end: String,
}

impl SlotTime {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub days: Vec<String>,
    pub slots_per_day: u32,
    #[serde(default)]
    pub slot_times: Vec<SlotTime>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub groups: Vec<Group>,
    pub workloads: Vec<Workload>,
    #[serde(default)]
    pub preassignments: Vec<Preassignment>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolveParams {
    /// Seeds value ordering; equal seeds reproduce equal timetables.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes to expand.
    #[serde(default)]
    pub step_limit: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveEnvelope {
    pub instance: Instance,
    #[serde(default)]
    pub params: SolveParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDecision {
    pub group_id: GroupId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub duration_slots: u32,
    pub day: String,
    pub start_slot_index: u32,
    pub room_id: RoomId,
}

impl SessionDecision {
    /// Slot indices covered by this session, start inclusive.
    pub fn slots(&self) -> std::ops::Range<u32> {
        self.start_slot_index..self.end_slot_index()
    }

    /// Exclusive end slot, saturating at `u32::MAX`.
    pub fn end_slot_index(&self) -> u32 {
        self.start_slot_index.saturating_add(self.duration_slots)
    }

    pub fn overlaps(&self, other: &SessionDecision) -> bool {
        self.day == other.day
            && self.start_slot_index < other.end_slot_index()
            && other.start_slot_index < self.end_slot_index()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Solution {
    pub sessions: Vec<SessionDecision>,
}

impl Solution {
    pub fn sessions_by_group(&self) -> BTreeMap<&GroupId, Vec<&SessionDecision>> {
        let mut by: BTreeMap<&GroupId, Vec<&SessionDecision>> = BTreeMap::new();
        for s in &self.sessions {
            by.entry(&s.group_id).or_default().push(s);
        }
        by
    }

    /// Every (day, slot) cell occupied by a session, multi-slot sessions
    /// appearing once per covered cell.
    pub fn sessions_by_cell(&self) -> BTreeMap<(&str, u32), Vec<&SessionDecision>> {
        let mut by: BTreeMap<(&str, u32), Vec<&SessionDecision>> = BTreeMap::new();
        for s in &self.sessions {
            for slot in s.slots() {
                by.entry((s.day.as_str(), slot)).or_default().push(s);
            }
        }
        by
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolveStats {
    pub sessions: usize,
    pub fixed: usize,
    pub constraints: usize,
    pub nodes: u64,
    pub backtracks: u64,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    Solved { solution: Solution },
    Infeasible,
    TimedOut,
}

impl SolveOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved { solution } => Some(solution),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub stats: SolveStats,
}
