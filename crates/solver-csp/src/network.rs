//! Binary non-overlap constraints between session requests.

use std::collections::HashMap;

use sched_core::{ConflictKind, InputError};

use crate::domain::{Domain, Value};
use crate::expand::{SessionId, SessionRequest};

/// Same day and intersecting `[start, start + duration)` intervals.
pub fn overlaps(a: Value, da: u32, b: Value, db: u32) -> bool {
    a.day == b.day && a.start < b.start + db && b.start < a.start + da
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub a: SessionId,
    pub b: SessionId,
    pub kind: ConflictKind,
}

impl Constraint {
    pub fn other(&self, s: SessionId) -> SessionId {
        if s == self.a {
            self.b
        } else {
            self.a
        }
    }

    /// Symmetric in its two endpoints. Teacher and group constraints forbid any
    /// overlap; a room constraint only bites when both sides got the same room.
    pub fn permits(&self, va: Value, da: u32, vb: Value, db: u32) -> bool {
        match self.kind {
            ConflictKind::Teacher | ConflictKind::Group => !overlaps(va, da, vb, db),
            ConflictKind::Room => va.room != vb.room || !overlaps(va, da, vb, db),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConstraintNetwork {
    constraints: Vec<Constraint>,
    incident: Vec<Vec<usize>>,
    durations: Vec<u32>,
    teacher_of: Vec<usize>,
    group_of: Vec<usize>,
    by_teacher: Vec<Vec<SessionId>>,
    by_group: Vec<Vec<SessionId>>,
}

fn dense_index<'a, K: Eq + std::hash::Hash>(
    keys: impl Iterator<Item = &'a K>,
) -> (Vec<usize>, Vec<Vec<SessionId>>)
where
    K: 'a,
{
    let mut ids: HashMap<&K, usize> = HashMap::new();
    let mut of = Vec::new();
    let mut members: Vec<Vec<SessionId>> = Vec::new();
    for (s, k) in keys.enumerate() {
        let next = ids.len();
        let idx = *ids.entry(k).or_insert(next);
        if idx == members.len() {
            members.push(Vec::new());
        }
        members[idx].push(s);
        of.push(idx);
    }
    (of, members)
}

impl ConstraintNetwork {
    /// Generates the teacher, group and room families over every pair.
    ///
    /// Room constraints are only emitted for pairs whose room domains
    /// intersect; other pairs can never end up in the same room.
    pub fn build(requests: &[SessionRequest], domains: &[Domain]) -> Self {
        let n = requests.len();
        let (teacher_of, by_teacher) = dense_index(requests.iter().map(|r| &r.teacher));
        let (group_of, by_group) = dense_index(requests.iter().map(|r| &r.group));

        let mut constraints = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if teacher_of[i] == teacher_of[j] {
                    constraints.push(Constraint {
                        a: i,
                        b: j,
                        kind: ConflictKind::Teacher,
                    });
                }
                if group_of[i] == group_of[j] {
                    constraints.push(Constraint {
                        a: i,
                        b: j,
                        kind: ConflictKind::Group,
                    });
                }
                if domains[i].shares_room_with(&domains[j]) {
                    constraints.push(Constraint {
                        a: i,
                        b: j,
                        kind: ConflictKind::Room,
                    });
                }
            }
        }

        let mut incident = vec![Vec::new(); n];
        for (ci, c) in constraints.iter().enumerate() {
            incident[c.a].push(ci);
            incident[c.b].push(ci);
        }

        Self {
            constraints,
            incident,
            durations: requests.iter().map(|r| r.duration).collect(),
            teacher_of,
            group_of,
            by_teacher,
            by_group,
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn incident(&self, s: SessionId) -> impl Iterator<Item = &Constraint> + '_ {
        self.incident[s].iter().map(move |&ci| &self.constraints[ci])
    }

    pub fn duration(&self, s: SessionId) -> u32 {
        self.durations[s]
    }

    pub fn sessions(&self) -> usize {
        self.durations.len()
    }

    pub fn teacher_of(&self, s: SessionId) -> usize {
        self.teacher_of[s]
    }

    pub fn group_of(&self, s: SessionId) -> usize {
        self.group_of[s]
    }

    pub fn teacher_sessions(&self) -> &[Vec<SessionId>] {
        &self.by_teacher
    }

    pub fn group_sessions(&self) -> &[Vec<SessionId>] {
        &self.by_group
    }

    /// Constraints already violated by preassignments alone.
    ///
    /// Teacher and group constraints only need both times pinned; a room
    /// constraint also needs both rooms pinned.
    pub fn fixed_conflicts(&self, domains: &[Domain]) -> Vec<InputError> {
        self.constraints
            .iter()
            .filter(|c| {
                let (Some((da, sa)), Some((db, sb))) =
                    (domains[c.a].pinned_time(), domains[c.b].pinned_time())
                else {
                    return false;
                };
                let (ra, rb) = match c.kind {
                    ConflictKind::Room => {
                        match (domains[c.a].pinned_room(), domains[c.b].pinned_room()) {
                            (Some(ra), Some(rb)) => (ra, rb),
                            _ => return false,
                        }
                    }
                    ConflictKind::Teacher | ConflictKind::Group => (0, 0),
                };
                let va = Value {
                    day: da,
                    start: sa,
                    room: ra,
                };
                let vb = Value {
                    day: db,
                    start: sb,
                    room: rb,
                };
                !c.permits(va, self.durations[c.a], vb, self.durations[c.b])
            })
            .map(|c| InputError::FixedConflict {
                first: c.a,
                second: c.b,
                kind: c.kind,
            })
            .collect()
    }
}
