//! Starter instance handed to users who are filling in their own data.

use types::{
    Course, CourseKind, Group, GroupKind, Instance, Room, RoomType, SlotTime, Teacher, Workload,
};

pub const DEFAULT_DAYS: [&str; 6] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// College hours 09:00-17:10 with breaks at 11:00-11:10 and 13:10-14:10.
pub fn default_slot_times() -> Vec<SlotTime> {
    [
        ("09:00", "10:00"),
        ("10:00", "11:00"),
        ("11:10", "12:10"),
        ("12:10", "13:10"),
        ("14:10", "15:10"),
        ("15:10", "16:10"),
        ("16:10", "17:10"),
    ]
    .into_iter()
    .map(|(s, e)| SlotTime::new(s, e))
    .collect()
}

pub fn template_instance() -> Instance {
    let slot_times = default_slot_times();
    let rooms = (1..=3)
        .map(|i| Room {
            id: format!("CR{i}").as_str().into(),
            room_type: RoomType::Classroom,
        })
        .chain((1..=9).map(|i| Room {
            id: format!("L{i}").as_str().into(),
            room_type: RoomType::Lab,
        }))
        .collect();

    Instance {
        days: DEFAULT_DAYS.iter().map(|d| d.to_string()).collect(),
        slots_per_day: slot_times.len() as u32,
        slot_times,
        rooms,
        teachers: vec![Teacher {
            id: "T1".into(),
            name: None,
            max_load_per_week: None,
        }],
        courses: vec![
            Course {
                id: "SUB1".into(),
                name: None,
                kind: CourseKind::Lecture,
                duration_slots: 1,
            },
            Course {
                id: "LAB1".into(),
                name: None,
                kind: CourseKind::Lab,
                duration_slots: 2,
            },
        ],
        groups: vec![
            Group {
                id: "SY-A".into(),
                year: "SY".into(),
                division: "A".into(),
                batch: None,
                kind: GroupKind::Division,
            },
            Group {
                id: "SY-A-B1".into(),
                year: "SY".into(),
                division: "A".into(),
                batch: Some("B1".into()),
                kind: GroupKind::Batch,
            },
        ],
        workloads: vec![
            Workload {
                group_id: "SY-A".into(),
                course_id: "SUB1".into(),
                teacher_id: "T1".into(),
                sessions_per_week: 3,
                room_type_required: RoomType::Classroom,
            },
            Workload {
                group_id: "SY-A-B1".into(),
                course_id: "LAB1".into(),
                teacher_id: "T1".into(),
                sessions_per_week: 1,
                room_type_required: RoomType::Lab,
            },
        ],
        preassignments: vec![],
    }
}
