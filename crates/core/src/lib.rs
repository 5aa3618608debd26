pub mod audit;
pub mod grid;
pub mod instance;
pub mod template;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

pub use instance::ProblemInstance;
pub use types::{
    Course, CourseId, Group, GroupId, Instance, Preassignment, Room, RoomId, RoomType,
    SessionDecision, SolveOutcome, SolveParams, SolveReport, SolveStats, Solution, Teacher,
    TeacherId, Workload,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        match self {
            ValidationError::Invalid(m) => m,
        }
    }
}

/// Which shared resource makes two sessions mutually exclusive in time.
#[derive(Clone, Copy, Debug, Serialize, ToSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Teacher,
    Group,
    Room,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Teacher => f.write_str("teacher"),
            ConflictKind::Group => f.write_str("group"),
            ConflictKind::Room => f.write_str("room"),
        }
    }
}

/// An input-integrity problem tied to one expanded session (or, for load
/// caps, to one teacher). Detected before search; fatal to the solve call.
#[derive(Clone, Debug, Error, Serialize, ToSchema, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputError {
    #[error("session {session} ({group}/{course}): preassigned room {room} does not exist")]
    UnknownRoom {
        session: usize,
        group: GroupId,
        course: CourseId,
        room: RoomId,
    },
    #[error("session {session} ({group}/{course}): no room of type {room_type}")]
    EmptyRoomDomain {
        session: usize,
        group: GroupId,
        course: CourseId,
        room_type: RoomType,
    },
    #[error("session {session} ({group}/{course}): preassigned day {day} is not configured")]
    UnknownDay {
        session: usize,
        group: GroupId,
        course: CourseId,
        day: String,
    },
    #[error(
        "session {session} ({group}/{course}): preassigned start {start} with duration {duration} overruns the day"
    )]
    FixedOutOfDay {
        session: usize,
        group: GroupId,
        course: CourseId,
        start: u32,
        duration: u32,
    },
    #[error("session {session} ({group}/{course}): no start slot fits duration {duration}")]
    NoStartSlot {
        session: usize,
        group: GroupId,
        course: CourseId,
        duration: u32,
    },
    #[error("teacher {teacher} has {sessions} sessions, above the weekly cap of {cap}")]
    TeacherOverloaded {
        teacher: TeacherId,
        sessions: u32,
        cap: u32,
    },
    #[error("preassigned sessions {first} and {second} overlap on a shared {kind}")]
    FixedConflict {
        first: usize,
        second: usize,
        kind: ConflictKind,
    },
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("instance rejected: {}", join_errors(.0))]
    Input(Vec<InputError>),
}

impl SolveError {
    pub fn input_errors(&self) -> &[InputError] {
        match self {
            SolveError::Input(errors) => errors,
        }
    }
}

fn join_errors(errors: &[InputError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A week has at most this many days.
pub const MAX_DAYS: usize = 7;
/// Half-hour slots around the clock.
pub const MAX_SLOTS_PER_DAY: u32 = 48;
/// Upper bound on expanded sessions (weekly sessions plus preassignments).
pub const MAX_SESSIONS: u64 = 2_000;
/// Upper bound on sessions x days x slots x rooms, i.e. on the total size of
/// all candidate domains the solver materializes.
pub const MAX_SEARCH_VALUES: u64 = 20_000_000;

pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if inst.days.is_empty() {
        errors.push("days is empty".into());
    }
    if inst.days.len() > MAX_DAYS {
        errors.push(format!(
            "{} days configured, at most {MAX_DAYS} allowed",
            inst.days.len()
        ));
    }
    if inst.slots_per_day == 0 {
        errors.push("slotsPerDay must be at least 1".into());
    }
    if inst.slots_per_day > MAX_SLOTS_PER_DAY {
        errors.push(format!(
            "slotsPerDay is {}, at most {MAX_SLOTS_PER_DAY} allowed",
            inst.slots_per_day
        ));
    }
    check_size(inst, &mut errors);

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("day", inst.days.iter(), &mut errors);
    chk_unique("teacher", inst.teachers.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("group", inst.groups.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("room", inst.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("course", inst.courses.iter().map(|x| &x.id.0), &mut errors);

    check_slot_times(inst, &mut errors);

    let teachers: HashSet<_> = inst.teachers.iter().map(|t| &t.id).collect();
    let groups: HashSet<_> = inst.groups.iter().map(|g| &g.id).collect();
    let courses: HashSet<_> = inst.courses.iter().map(|c| &c.id).collect();

    for g in &inst.groups {
        if g.kind == types::GroupKind::Batch && g.batch.is_none() {
            errors.push(format!("group {} is a batch without a batch name", g.id));
        }
    }

    for c in &inst.courses {
        if c.duration_slots == 0 || c.duration_slots > inst.slots_per_day {
            errors.push(format!(
                "course {} has invalid duration {} for {} slots per day",
                c.id, c.duration_slots, inst.slots_per_day
            ));
        }
    }

    for (i, w) in inst.workloads.iter().enumerate() {
        if !groups.contains(&w.group_id) {
            errors.push(format!("workload {i} references missing group {}", w.group_id));
        }
        if !courses.contains(&w.course_id) {
            errors.push(format!("workload {i} references missing course {}", w.course_id));
        }
        if !teachers.contains(&w.teacher_id) {
            errors.push(format!(
                "workload {i} references missing teacher {}",
                w.teacher_id
            ));
        }
        if w.sessions_per_week == 0 {
            errors.push(format!("workload {i} has sessionsPerWeek=0"));
        }
    }

    // Rooms and days of preassignments are checked per session when domains
    // are built, so they can be reported against the offending session.
    for (i, p) in inst.preassignments.iter().enumerate() {
        if !groups.contains(&p.group_id) {
            errors.push(format!(
                "preassignment {i} references missing group {}",
                p.group_id
            ));
        }
        if !courses.contains(&p.course_id) {
            errors.push(format!(
                "preassignment {i} references missing course {}",
                p.course_id
            ));
        }
        if !teachers.contains(&p.teacher_id) {
            errors.push(format!(
                "preassignment {i} references missing teacher {}",
                p.teacher_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

fn check_size(inst: &Instance, errors: &mut Vec<String>) {
    let sessions: u64 = inst
        .workloads
        .iter()
        .map(|w| u64::from(w.sessions_per_week))
        .sum::<u64>()
        + inst.preassignments.len() as u64;
    if sessions > MAX_SESSIONS {
        errors.push(format!(
            "{sessions} sessions requested, at most {MAX_SESSIONS} allowed"
        ));
        return;
    }
    let values = sessions
        .saturating_mul(inst.days.len() as u64)
        .saturating_mul(u64::from(inst.slots_per_day))
        .saturating_mul(inst.rooms.len() as u64);
    if values > MAX_SEARCH_VALUES {
        errors.push(format!(
            "instance too large: {sessions} sessions over {} days x {} slots x {} rooms",
            inst.days.len(),
            inst.slots_per_day,
            inst.rooms.len()
        ));
    }
}

fn check_slot_times(inst: &Instance, errors: &mut Vec<String>) {
    if inst.slot_times.is_empty() {
        return;
    }
    if inst.slot_times.len() != inst.slots_per_day as usize {
        errors.push(format!(
            "slotTimes has {} entries but slotsPerDay is {}",
            inst.slot_times.len(),
            inst.slots_per_day
        ));
        return;
    }
    let mut prev_end: Option<u32> = None;
    for (i, st) in inst.slot_times.iter().enumerate() {
        let (Some(start), Some(end)) = (parse_hhmm(&st.start), parse_hhmm(&st.end)) else {
            errors.push(format!("slot {i} has malformed time {}", st.label()));
            continue;
        };
        if start >= end {
            errors.push(format!("slot {i} ends before it starts: {}", st.label()));
        }
        if prev_end.is_some_and(|p| start < p) {
            errors.push(format!("slot {i} starts before the previous slot ends"));
        }
        prev_end = Some(end);
    }
}

/// Minutes since midnight for an `"HH:MM"` label.
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

/// Synchronous, CPU-bound timetable solver.
///
/// Each call works on its own snapshot of the instance; implementations
/// keep no state between calls.
pub trait Solver: Send + Sync + 'static {
    fn solve(
        &self,
        instance: &ProblemInstance,
        params: &SolveParams,
    ) -> Result<SolveReport, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_instance_is_valid() {
        assert!(validate(&template::template_instance()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut inst = template::template_instance();
        inst.rooms.push(inst.rooms[0].clone());
        inst.workloads[0].teacher_id = "ghost".into();
        inst.workloads[1].sessions_per_week = 0;
        inst.courses[1].duration_slots = 9;

        let err = validate(&inst).unwrap_err();
        let msgs = err.messages();
        assert_eq!(msgs.len(), 4, "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("duplicate room id: CR1")));
        assert!(msgs.iter().any(|m| m.contains("missing teacher ghost")));
        assert!(msgs.iter().any(|m| m.contains("sessionsPerWeek=0")));
        assert!(msgs.iter().any(|m| m.contains("invalid duration 9")));
    }

    #[test]
    fn slot_times_must_match_and_be_monotone() {
        let mut inst = template::template_instance();
        inst.slot_times.swap(0, 1);
        let err = validate(&inst).unwrap_err();
        assert!(err.messages()[0].contains("starts before the previous slot ends"));

        inst.slot_times.pop();
        let err = validate(&inst).unwrap_err();
        assert!(err.messages()[0].contains("slotTimes has 6 entries"));
    }

    #[test]
    fn oversized_calendars_are_rejected() {
        let mut inst = template::template_instance();
        inst.slot_times.clear();
        inst.slots_per_day = 4_000_000_000;
        inst.days.push("Sun".into());
        inst.days.push("Holiday".into());
        let err = validate(&inst).unwrap_err();
        let msgs = err.messages();
        assert!(msgs.iter().any(|m| m.contains("8 days configured")), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("slotsPerDay is 4000000000")));
        assert!(msgs.iter().any(|m| m.contains("instance too large")));
    }

    #[test]
    fn session_count_is_bounded_without_overflow() {
        let mut inst = template::template_instance();
        inst.workloads[0].sessions_per_week = u32::MAX;
        inst.workloads[1].sessions_per_week = u32::MAX;
        let err = validate(&inst).unwrap_err();
        assert!(err.messages()[0].contains("at most 2000 allowed"), "{:?}", err.messages());
    }

    #[test]
    fn parses_clock_labels() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("17:10"), Some(1030));
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("nine"), None);
    }

    #[test]
    fn solve_error_lists_each_input_error() {
        let err = SolveError::Input(vec![
            InputError::UnknownRoom {
                session: 0,
                group: "SY-A".into(),
                course: "SUB1".into(),
                room: "X9".into(),
            },
            InputError::TeacherOverloaded {
                teacher: "T1".into(),
                sessions: 5,
                cap: 4,
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("preassigned room X9 does not exist"));
        assert!(text.contains("above the weekly cap of 4"));
    }
}
