use serde::Serialize;
use utoipa::ToSchema;

use types::{GroupId, SessionDecision, Solution};

use crate::ProblemInstance;

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupGrid {
    pub group_id: GroupId,
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GridRow {
    pub day: String,
    /// One entry per slot index, each holding the labels of the sessions
    /// occupying that cell.
    pub cells: Vec<Vec<String>>,
}

pub fn cell_label(s: &SessionDecision) -> String {
    format!("{} | {} | {}", s.course_id, s.teacher_id, s.room_id)
}

/// Weekly day x slot grid for every declared group, in declaration order.
///
/// Sessions on undeclared days or past the end of the day are left out;
/// [`crate::audit::audit`] reports those.
pub fn render_group_grids(instance: &ProblemInstance, solution: &Solution) -> Vec<GroupGrid> {
    let by_group = solution.sessions_by_group();
    let slots = instance.slots_per_day() as usize;
    let columns = instance.slot_labels();

    instance
        .groups()
        .iter()
        .map(|g| {
            let mut rows: Vec<GridRow> = instance
                .days()
                .iter()
                .map(|d| GridRow {
                    day: d.clone(),
                    cells: vec![Vec::new(); slots],
                })
                .collect();
            for s in by_group.get(&g.id).into_iter().flatten() {
                let Some(di) = instance.day_index(&s.day) else {
                    continue;
                };
                let end = s.end_slot_index().min(slots as u32);
                for slot in s.start_slot_index..end {
                    rows[di].cells[slot as usize].push(cell_label(s));
                }
            }
            GroupGrid {
                group_id: g.id.clone(),
                columns: columns.clone(),
                rows,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::template_instance;

    #[test]
    fn multi_slot_sessions_fill_every_cell() {
        let pi = ProblemInstance::new(template_instance()).unwrap();
        let solution = Solution {
            sessions: vec![
                SessionDecision {
                    group_id: "SY-A-B1".into(),
                    course_id: "LAB1".into(),
                    teacher_id: "T1".into(),
                    duration_slots: 2,
                    day: "Tue".into(),
                    start_slot_index: 4,
                    room_id: "L2".into(),
                },
                SessionDecision {
                    group_id: "SY-A".into(),
                    course_id: "SUB1".into(),
                    teacher_id: "T1".into(),
                    duration_slots: 1,
                    day: "Mon".into(),
                    start_slot_index: 0,
                    room_id: "CR1".into(),
                },
            ],
        };

        let grids = render_group_grids(&pi, &solution);
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].group_id.0, "SY-A");
        assert_eq!(grids[0].columns[0], "09:00-10:00");
        assert_eq!(grids[0].rows.len(), 6);
        assert_eq!(grids[0].rows[0].cells[0], vec!["SUB1 | T1 | CR1".to_string()]);

        let batch = &grids[1];
        let tue = &batch.rows[1];
        assert_eq!(tue.day, "Tue");
        assert_eq!(tue.cells[4], vec!["LAB1 | T1 | L2".to_string()]);
        assert_eq!(tue.cells[5], vec!["LAB1 | T1 | L2".to_string()]);
        assert!(tue.cells[3].is_empty() && tue.cells[6].is_empty());
    }

    #[test]
    fn sessions_past_the_day_are_clipped() {
        let pi = ProblemInstance::new(template_instance()).unwrap();
        let late = |start, duration_slots| SessionDecision {
            group_id: "SY-A".into(),
            course_id: "SUB1".into(),
            teacher_id: "T1".into(),
            duration_slots,
            day: "Mon".into(),
            start_slot_index: start,
            room_id: "CR1".into(),
        };
        let solution = Solution {
            sessions: vec![late(u32::MAX, 3), late(6, 4)],
        };

        let grids = render_group_grids(&pi, &solution);
        let mon = &grids[0].rows[0];
        assert_eq!(mon.cells.len(), 7);
        assert_eq!(mon.cells[6], vec!["SUB1 | T1 | CR1".to_string()]);
        assert!(mon.cells[..6].iter().all(Vec::is_empty));
    }
}
