//! Independent hard-constraint check of a finished timetable.

use serde::Serialize;
use utoipa::ToSchema;

use types::{SessionDecision, Solution};

use crate::{ConflictKind, ProblemInstance};

#[derive(Clone, Copy, Debug, Serialize, ToSchema, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Overlap(ConflictKind),
    UnknownDay,
    UnknownRoom,
    OutsideDay,
    RoomTypeMismatch,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Positions in `Solution::sessions`.
    pub sessions: Vec<usize>,
    pub message: String,
}

/// Reports every session pair sharing a teacher, group or room that overlaps
/// in time, plus sessions that do not fit the calendar or sit in a room of the
/// wrong type. Preassigned sessions with an explicit room are exempt from the
/// room-type check.
pub fn audit(instance: &ProblemInstance, solution: &Solution) -> Vec<Violation> {
    let sessions = &solution.sessions;
    let mut out = Vec::new();

    for (i, s) in sessions.iter().enumerate() {
        if instance.day_index(&s.day).is_none() {
            out.push(Violation {
                kind: ViolationKind::UnknownDay,
                sessions: vec![i],
                message: format!("session {i} is on unconfigured day {}", s.day),
            });
        }
        let fits = s
            .start_slot_index
            .checked_add(s.duration_slots)
            .is_some_and(|end| end <= instance.slots_per_day());
        if s.duration_slots == 0 || !fits {
            out.push(Violation {
                kind: ViolationKind::OutsideDay,
                sessions: vec![i],
                message: format!(
                    "session {i} spans slots {:?} outside a {}-slot day",
                    s.slots(),
                    instance.slots_per_day()
                ),
            });
        }
        match instance.room(&s.room_id) {
            None => out.push(Violation {
                kind: ViolationKind::UnknownRoom,
                sessions: vec![i],
                message: format!("session {i} uses unknown room {}", s.room_id),
            }),
            Some(room) => {
                let required = instance
                    .workloads()
                    .iter()
                    .find(|w| {
                        w.group_id == s.group_id
                            && w.course_id == s.course_id
                            && w.teacher_id == s.teacher_id
                    })
                    .map(|w| w.room_type_required);
                if let Some(required) = required {
                    if required != room.room_type && !is_pinned_room(instance, s) {
                        out.push(Violation {
                            kind: ViolationKind::RoomTypeMismatch,
                            sessions: vec![i],
                            message: format!(
                                "session {i} needs a {required} but {} is a {}",
                                room.id, room.room_type
                            ),
                        });
                    }
                }
            }
        }
    }

    for i in 0..sessions.len() {
        for j in (i + 1)..sessions.len() {
            let (a, b) = (&sessions[i], &sessions[j]);
            if !a.overlaps(b) {
                continue;
            }
            let shared = [
                (a.teacher_id == b.teacher_id, ConflictKind::Teacher),
                (a.group_id == b.group_id, ConflictKind::Group),
                (a.room_id == b.room_id, ConflictKind::Room),
            ];
            for (hit, kind) in shared {
                if hit {
                    out.push(Violation {
                        kind: ViolationKind::Overlap(kind),
                        sessions: vec![i, j],
                        message: format!("sessions {i} and {j} overlap on {kind}"),
                    });
                }
            }
        }
    }

    out
}

fn is_pinned_room(instance: &ProblemInstance, s: &SessionDecision) -> bool {
    instance.preassignments().iter().any(|p| {
        p.group_id == s.group_id
            && p.course_id == s.course_id
            && p.teacher_id == s.teacher_id
            && p.day == s.day
            && p.start_slot_index == s.start_slot_index
            && p.room_id.as_ref() == Some(&s.room_id)
    })
}
