#![allow(dead_code)]

use sched_core::ProblemInstance;
use types::{
    Course, CourseKind, Group, GroupKind, Instance, Preassignment, Room, RoomType, SlotTime,
    Teacher, Workload,
};

/// Terse instance construction for tests. Teachers and groups named by a
/// workload are declared on the fly.
pub struct InstanceBuilder {
    inst: Instance,
}

impl InstanceBuilder {
    pub fn new(days: &[&str], slots_per_day: u32) -> Self {
        Self {
            inst: Instance {
                days: days.iter().map(|d| d.to_string()).collect(),
                slots_per_day,
                slot_times: vec![],
                rooms: vec![],
                teachers: vec![],
                courses: vec![],
                groups: vec![],
                workloads: vec![],
                preassignments: vec![],
            },
        }
    }

    pub fn slot_times(mut self, times: &[(&str, &str)]) -> Self {
        self.inst.slot_times = times.iter().map(|(s, e)| SlotTime::new(s, e)).collect();
        self
    }

    pub fn rooms(mut self, prefix: &str, n: usize, room_type: RoomType) -> Self {
        for i in 1..=n {
            self.inst.rooms.push(Room {
                id: format!("{prefix}{i}").as_str().into(),
                room_type,
            });
        }
        self
    }

    pub fn course(mut self, id: &str, kind: CourseKind, duration_slots: u32) -> Self {
        self.inst.courses.push(Course {
            id: id.into(),
            name: None,
            kind,
            duration_slots,
        });
        self
    }

    pub fn teacher_cap(mut self, id: &str, cap: u32) -> Self {
        self.ensure_teacher(id);
        if let Some(t) = self.inst.teachers.iter_mut().find(|t| t.id.0 == id) {
            t.max_load_per_week = Some(cap);
        }
        self
    }

    pub fn batch(mut self, id: &str, division: &str, batch: &str) -> Self {
        self.inst.groups.push(Group {
            id: id.into(),
            year: "SY".into(),
            division: division.into(),
            batch: Some(batch.into()),
            kind: GroupKind::Batch,
        });
        self
    }

    pub fn workload(
        mut self,
        group: &str,
        course: &str,
        teacher: &str,
        sessions_per_week: u32,
        room_type: RoomType,
    ) -> Self {
        self.ensure_teacher(teacher);
        if !self.inst.groups.iter().any(|g| g.id.0 == group) {
            self.inst.groups.push(Group {
                id: group.into(),
                year: "SY".into(),
                division: group.into(),
                batch: None,
                kind: GroupKind::Division,
            });
        }
        self.inst.workloads.push(Workload {
            group_id: group.into(),
            course_id: course.into(),
            teacher_id: teacher.into(),
            sessions_per_week,
            room_type_required: room_type,
        });
        self
    }

    pub fn pin(
        mut self,
        (group, course, teacher): (&str, &str, &str),
        day: &str,
        start: u32,
        room: Option<&str>,
    ) -> Self {
        self.inst.preassignments.push(Preassignment {
            group_id: group.into(),
            course_id: course.into(),
            teacher_id: teacher.into(),
            day: day.into(),
            start_slot_index: start,
            duration_slots: None,
            room_id: room.map(Into::into),
        });
        self
    }

    pub fn instance(self) -> Instance {
        self.inst
    }

    pub fn build(self) -> ProblemInstance {
        ProblemInstance::new(self.inst).expect("test instance must validate")
    }

    fn ensure_teacher(&mut self, id: &str) {
        if !self.inst.teachers.iter().any(|t| t.id.0 == id) {
            self.inst.teachers.push(Teacher {
                id: id.into(),
                name: None,
                max_load_per_week: None,
            });
        }
    }
}
