use std::collections::HashMap;

use types::{
    Course, CourseId, Group, GroupId, Instance, Preassignment, Room, RoomId, SlotTime, Teacher,
    TeacherId, Workload,
};

use crate::{validate, ValidationError};

/// A validated instance with its lookup tables.
///
/// Built once from a loaded [`Instance`]; nothing is mutated afterwards, so
/// a `ProblemInstance` can be shared freely between concurrent solves.
#[derive(Clone, Debug)]
pub struct ProblemInstance {
    inst: Instance,
    day_index: HashMap<String, usize>,
    room_by_id: HashMap<RoomId, usize>,
    teacher_by_id: HashMap<TeacherId, usize>,
    course_by_id: HashMap<CourseId, usize>,
    group_by_id: HashMap<GroupId, usize>,
}

impl ProblemInstance {
    pub fn new(inst: Instance) -> Result<Self, ValidationError> {
        validate(&inst)?;
        let day_index = inst
            .days
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
        let room_by_id = inst
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        let teacher_by_id = inst
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let course_by_id = inst
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let group_by_id = inst
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.clone(), i))
            .collect();
        Ok(Self {
            inst,
            day_index,
            room_by_id,
            teacher_by_id,
            course_by_id,
            group_by_id,
        })
    }

    pub fn as_instance(&self) -> &Instance {
        &self.inst
    }

    pub fn days(&self) -> &[String] {
        &self.inst.days
    }

    pub fn slots_per_day(&self) -> u32 {
        self.inst.slots_per_day
    }

    pub fn slot_times(&self) -> &[SlotTime] {
        &self.inst.slot_times
    }

    pub fn rooms(&self) -> &[Room] {
        &self.inst.rooms
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.inst.teachers
    }

    pub fn courses(&self) -> &[Course] {
        &self.inst.courses
    }

    pub fn groups(&self) -> &[Group] {
        &self.inst.groups
    }

    pub fn workloads(&self) -> &[Workload] {
        &self.inst.workloads
    }

    pub fn preassignments(&self) -> &[Preassignment] {
        &self.inst.preassignments
    }

    pub fn day_index(&self, day: &str) -> Option<usize> {
        self.day_index.get(day).copied()
    }

    pub fn room_index(&self, id: &RoomId) -> Option<usize> {
        self.room_by_id.get(id).copied()
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.room_index(id).map(|i| &self.inst.rooms[i])
    }

    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teacher_by_id.get(id).map(|&i| &self.inst.teachers[i])
    }

    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.course_by_id.get(id).map(|&i| &self.inst.courses[i])
    }

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.group_by_id.get(id).map(|&i| &self.inst.groups[i])
    }

    /// True when a break separates `slot` from `slot + 1`. Only slot clock
    /// labels can introduce breaks; without them the day is continuous.
    pub fn has_break_after(&self, slot: u32) -> bool {
        let times = &self.inst.slot_times;
        let i = slot as usize;
        match (times.get(i), times.get(i + 1)) {
            (Some(a), Some(b)) => a.end != b.start,
            _ => false,
        }
    }

    /// Column headers for a day row: clock labels when configured, else `S1..Sn`.
    pub fn slot_labels(&self) -> Vec<String> {
        if self.inst.slot_times.is_empty() {
            (1..=self.inst.slots_per_day).map(|i| format!("S{i}")).collect()
        } else {
            self.inst.slot_times.iter().map(SlotTime::label).collect()
        }
    }
}

impl TryFrom<Instance> for ProblemInstance {
    type Error = ValidationError;

    fn try_from(inst: Instance) -> Result<Self, Self::Error> {
        Self::new(inst)
    }
}
