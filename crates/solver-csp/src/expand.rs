//! Workloads -> atomic session requests.

use std::collections::{HashMap, VecDeque};

use sched_core::{InputError, ProblemInstance};
use tracing::{debug, warn};
use types::{CourseId, GroupId, Preassignment, RoomId, RoomType, TeacherId, Workload};

/// Dense index of a session request; every downstream table is keyed by it.
pub type SessionId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Pinned by a preassignment. A `None` room still has to be resolved.
    Fixed {
        day: String,
        start: u32,
        room: Option<RoomId>,
    },
    Free,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub id: SessionId,
    pub group: GroupId,
    pub course: CourseId,
    pub teacher: TeacherId,
    pub duration: u32,
    pub room_type: RoomType,
    pub placement: Placement,
}

impl SessionRequest {
    pub fn is_fixed(&self) -> bool {
        matches!(self.placement, Placement::Fixed { .. })
    }
}

type Key<'a> = (&'a GroupId, &'a CourseId, &'a TeacherId);

/// Expands every workload into `max(sessions_per_week, matched preassignments)`
/// requests: one Fixed request per matching preassignment, then Free requests
/// for whatever the preassignments leave uncovered.
///
/// A preassignment is consumed by the first workload with the same
/// (group, course, teacher); surplus preassignments are all kept, so a
/// workload may end up with more sessions than it declares.
pub fn expand_sessions(
    workloads: &[Workload],
    preassignments: &[Preassignment],
    durations: &HashMap<CourseId, u32>,
) -> Vec<SessionRequest> {
    let mut pending: HashMap<Key<'_>, VecDeque<&Preassignment>> = HashMap::new();
    for p in preassignments {
        pending
            .entry((&p.group_id, &p.course_id, &p.teacher_id))
            .or_default()
            .push_back(p);
    }

    let mut out = Vec::new();
    for w in workloads {
        let duration = durations.get(&w.course_id).copied().unwrap_or(1);
        let request = |id: SessionId, placement: Placement| SessionRequest {
            id,
            group: w.group_id.clone(),
            course: w.course_id.clone(),
            teacher: w.teacher_id.clone(),
            duration,
            room_type: w.room_type_required,
            placement,
        };

        let pinned = pending
            .remove(&(&w.group_id, &w.course_id, &w.teacher_id))
            .unwrap_or_default();
        let matched = pinned.len() as u32;
        if matched > w.sessions_per_week {
            warn!(
                group = %w.group_id,
                course = %w.course_id,
                teacher = %w.teacher_id,
                declared = w.sessions_per_week,
                preassigned = matched,
                "more preassignments than declared sessions; keeping all of them"
            );
        }
        for p in pinned {
            if let Some(d) = p.duration_slots.filter(|&d| d != duration) {
                warn!(
                    course = %w.course_id,
                    preassigned = d,
                    course_duration = duration,
                    "preassignment duration ignored in favour of course duration"
                );
            }
            out.push(request(
                out.len(),
                Placement::Fixed {
                    day: p.day.clone(),
                    start: p.start_slot_index,
                    room: p.room_id.clone(),
                },
            ));
        }
        for _ in 0..w.sessions_per_week.saturating_sub(matched) {
            out.push(request(out.len(), Placement::Free));
        }
    }

    for ((group, course, teacher), left) in pending {
        warn!(
            %group,
            %course,
            %teacher,
            count = left.len(),
            "preassignment matches no workload; ignored"
        );
    }
    debug!(sessions = out.len(), "expanded workloads");
    out
}

pub fn expand_instance(instance: &ProblemInstance) -> Vec<SessionRequest> {
    let durations: HashMap<CourseId, u32> = instance
        .courses()
        .iter()
        .map(|c| (c.id.clone(), c.duration_slots))
        .collect();
    expand_sessions(instance.workloads(), instance.preassignments(), &durations)
}

/// Teachers whose expanded session count exceeds their weekly cap.
pub fn check_teacher_loads(
    instance: &ProblemInstance,
    requests: &[SessionRequest],
) -> Vec<InputError> {
    let mut load: HashMap<&TeacherId, u32> = HashMap::new();
    for r in requests {
        *load.entry(&r.teacher).or_default() += 1;
    }
    instance
        .teachers()
        .iter()
        .filter_map(|t| {
            let cap = t.max_load_per_week?;
            let sessions = load.get(&t.id).copied().unwrap_or(0);
            (sessions > cap).then(|| InputError::TeacherOverloaded {
                teacher: t.id.clone(),
                sessions,
                cap,
            })
        })
        .collect()
}
