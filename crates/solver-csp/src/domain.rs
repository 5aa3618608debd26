//! Candidate (day, start, room) values per session request.

use sched_core::{InputError, ProblemInstance};
use types::RoomType;

use crate::expand::{Placement, SessionRequest};

/// One concrete placement: indices into the instance's days and rooms plus a
/// start slot within the day. Orders by (day, start, room).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value {
    pub day: usize,
    pub start: u32,
    pub room: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    pub days: Vec<usize>,
    pub starts: Vec<u32>,
    /// Ascending room indices.
    pub rooms: Vec<usize>,
}

impl Domain {
    pub fn size(&self) -> usize {
        self.days.len() * self.starts.len() * self.rooms.len()
    }

    /// Cartesian product of the three component domains, in [`Value`] order.
    pub fn values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.size());
        for &day in &self.days {
            for &start in &self.starts {
                for &room in &self.rooms {
                    out.push(Value { day, start, room });
                }
            }
        }
        out
    }

    /// Day and start pinned; the room may still be open.
    pub fn pinned_time(&self) -> Option<(usize, u32)> {
        match (self.days.as_slice(), self.starts.as_slice()) {
            ([d], [s]) => Some((*d, *s)),
            _ => None,
        }
    }

    pub fn pinned_room(&self) -> Option<usize> {
        match self.rooms.as_slice() {
            [r] => Some(*r),
            _ => None,
        }
    }

    pub fn shares_room_with(&self, other: &Domain) -> bool {
        self.rooms
            .iter()
            .any(|r| other.rooms.binary_search(r).is_ok())
    }
}

/// Start slots at which a free session of `duration` fits inside one day
/// without crossing a break.
pub fn free_starts(instance: &ProblemInstance, duration: u32) -> Vec<u32> {
    let slots = instance.slots_per_day();
    if duration == 0 || duration > slots {
        return Vec::new();
    }
    (0..=slots - duration)
        .filter(|&start| (start..start + duration - 1).all(|s| !instance.has_break_after(s)))
        .collect()
}

fn rooms_of_type(instance: &ProblemInstance, room_type: RoomType) -> Vec<usize> {
    instance
        .rooms()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.room_type == room_type)
        .map(|(i, _)| i)
        .collect()
}

/// Builds the domain of every request, or every input-integrity error found.
pub fn build_domains(
    instance: &ProblemInstance,
    requests: &[SessionRequest],
) -> Result<Vec<Domain>, Vec<InputError>> {
    let all_days: Vec<usize> = (0..instance.days().len()).collect();
    let classrooms = rooms_of_type(instance, RoomType::Classroom);
    let labs = rooms_of_type(instance, RoomType::Lab);
    let typed_rooms = |t: RoomType| match t {
        RoomType::Classroom => classrooms.clone(),
        RoomType::Lab => labs.clone(),
    };

    let mut domains = Vec::with_capacity(requests.len());
    let mut errors = Vec::new();

    for r in requests {
        let (days, starts, rooms) = match &r.placement {
            Placement::Free => (
                all_days.clone(),
                free_starts(instance, r.duration),
                typed_rooms(r.room_type),
            ),
            Placement::Fixed { day, start, room } => {
                let days = match instance.day_index(day) {
                    Some(d) => vec![d],
                    None => {
                        errors.push(InputError::UnknownDay {
                            session: r.id,
                            group: r.group.clone(),
                            course: r.course.clone(),
                            day: day.clone(),
                        });
                        Vec::new()
                    }
                };
                let fits = start
                    .checked_add(r.duration)
                    .is_some_and(|end| end <= instance.slots_per_day());
                let starts = if fits {
                    vec![*start]
                } else {
                    errors.push(InputError::FixedOutOfDay {
                        session: r.id,
                        group: r.group.clone(),
                        course: r.course.clone(),
                        start: *start,
                        duration: r.duration,
                    });
                    Vec::new()
                };
                let rooms = match room {
                    Some(id) => match instance.room_index(id) {
                        Some(ri) => vec![ri],
                        None => {
                            errors.push(InputError::UnknownRoom {
                                session: r.id,
                                group: r.group.clone(),
                                course: r.course.clone(),
                                room: id.clone(),
                            });
                            // Reported; skip the empty-domain error for this session.
                            domains.push(Domain {
                                days,
                                starts,
                                rooms: Vec::new(),
                            });
                            continue;
                        }
                    },
                    None => typed_rooms(r.room_type),
                };
                (days, starts, rooms)
            }
        };

        if rooms.is_empty() {
            errors.push(InputError::EmptyRoomDomain {
                session: r.id,
                group: r.group.clone(),
                course: r.course.clone(),
                room_type: r.room_type,
            });
        }
        if starts.is_empty() && !r.is_fixed() {
            errors.push(InputError::NoStartSlot {
                session: r.id,
                group: r.group.clone(),
                course: r.course.clone(),
                duration: r.duration,
            });
        }
        domains.push(Domain {
            days,
            starts,
            rooms,
        });
    }

    if errors.is_empty() {
        Ok(domains)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand_instance;
    use sched_core::template::template_instance;
    use types::Preassignment;

    fn pinned(day: &str, start: u32, room: Option<&str>) -> Preassignment {
        Preassignment {
            group_id: "SY-A".into(),
            course_id: "SUB1".into(),
            teacher_id: "T1".into(),
            day: day.into(),
            start_slot_index: start,
            duration_slots: None,
            room_id: room.map(Into::into),
        }
    }

    #[test]
    fn free_lecture_gets_full_calendar_and_typed_rooms() {
        let pi = ProblemInstance::new(template_instance()).unwrap();
        let reqs = expand_instance(&pi);
        let domains = build_domains(&pi, &reqs).unwrap();

        let lecture = &domains[0];
        assert_eq!(lecture.days, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(lecture.starts, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(lecture.rooms, vec![0, 1, 2]);
        assert_eq!(lecture.size(), 6 * 7 * 3);

        let lab = domains.last().unwrap();
        assert_eq!(lab.rooms, (3..12).collect::<Vec<_>>());
    }

    #[test]
    fn two_slot_session_never_crosses_break_or_day_end() {
        let pi = ProblemInstance::new(template_instance()).unwrap();
        // breaks after slots 1 and 3 in the template calendar
        assert_eq!(free_starts(&pi, 2), vec![0, 2, 4, 5]);

        let mut inst = template_instance();
        inst.slot_times.clear();
        let pi = ProblemInstance::new(inst).unwrap();
        assert_eq!(free_starts(&pi, 2), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(free_starts(&pi, 7), vec![0]);
    }

    #[test]
    fn fixed_request_is_pinned() {
        let mut inst = template_instance();
        inst.preassignments = vec![pinned("Thu", 3, Some("CR2")), pinned("Fri", 0, None)];
        let pi = ProblemInstance::new(inst).unwrap();
        let domains = build_domains(&pi, &expand_instance(&pi)).unwrap();

        assert_eq!(domains[0].values(), vec![Value { day: 3, start: 3, room: 1 }]);
        assert_eq!(domains[1].pinned_time(), Some((4, 0)));
        assert_eq!(domains[1].rooms, vec![0, 1, 2]);
        assert_eq!(domains[1].pinned_room(), None);
    }

    #[test]
    fn reports_each_offending_request() {
        let mut inst = template_instance();
        inst.preassignments = vec![
            pinned("Mon", 0, Some("CR9")),
            pinned("Sun", 0, None),
            pinned("Tue", 7, None),
        ];
        inst.rooms.retain(|r| r.room_type == RoomType::Classroom);
        let pi = ProblemInstance::new(inst).unwrap();

        let errors = build_domains(&pi, &expand_instance(&pi)).unwrap_err();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(matches!(&errors[0], InputError::UnknownRoom { session: 0, room, .. } if room.0 == "CR9"));
        assert!(matches!(&errors[1], InputError::UnknownDay { session: 1, .. }));
        assert!(matches!(&errors[2], InputError::FixedOutOfDay { session: 2, start: 7, .. }));
        assert!(matches!(
            &errors[3],
            InputError::EmptyRoomDomain {
                session: 3,
                room_type: RoomType::Lab,
                ..
            }
        ));
    }
}
