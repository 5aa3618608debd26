use sched_core::ProblemInstance;
use types::{SessionDecision, Solution};

use crate::domain::Value;
use crate::expand::SessionRequest;

/// Pairs each request with its solved value. Identity fields are copied from
/// the request untouched; no checking happens here.
pub fn assemble(
    instance: &ProblemInstance,
    requests: &[SessionRequest],
    values: &[Value],
) -> Solution {
    let sessions = requests
        .iter()
        .zip(values)
        .map(|(r, v)| SessionDecision {
            group_id: r.group.clone(),
            course_id: r.course.clone(),
            teacher_id: r.teacher.clone(),
            duration_slots: r.duration,
            day: instance.days()[v.day].clone(),
            start_slot_index: v.start,
            room_id: instance.rooms()[v.room].id.clone(),
        })
        .collect();
    Solution { sessions }
}
