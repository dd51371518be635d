use types::{CourseType, Instance, PeriodLabel, ScheduleEntry, REMOTE_ROOM_LABEL};

use crate::model::Layout;

/// Reads the solved assignment variables back into timetable rows, one per
/// group for every occupied (course, period, room, teacher).
///
/// Rows come out ordered by group name, then period number.
pub fn extract_schedule(inst: &Instance, layout: &Layout, values: &[f64]) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for (c, subject) in inst.subjects.iter().enumerate() {
        let remote = subject.kind == CourseType::Lecture;
        for p in 0..layout.periods {
            for (r, room) in inst.rooms.iter().enumerate() {
                for (e, teacher) in inst.teachers.iter().enumerate() {
                    if values[layout.x(c, p, r, e).0] <= 0.5 {
                        continue;
                    }
                    let room_label = if remote {
                        REMOTE_ROOM_LABEL.to_string()
                    } else {
                        room.id.0.clone()
                    };
                    for group in &inst.groups {
                        entries.push(ScheduleEntry {
                            group: group.id.clone(),
                            subject: subject.id.clone(),
                            teacher: teacher.id.clone(),
                            period: PeriodLabel::from_index(p),
                            room: room_label.clone(),
                            modality: subject.kind.modality(),
                        });
                    }
                }
            }
        }
    }
    sort_schedule(&mut entries);
    entries
}

/// Stable, so rows sharing a group and period keep course order.
pub fn sort_schedule(entries: &mut [ScheduleEntry]) {
    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelBuilder;
    use proptest::prelude::*;
    use types::{Group, Modality, Room, Subject, Teacher};

    fn instance(groups: &[&str], periods_per_day: u32) -> Instance {
        Instance {
            groups: groups
                .iter()
                .map(|g| Group {
                    id: (*g).into(),
                    size: 30,
                })
                .collect(),
            rooms: vec![
                Room {
                    id: "A".into(),
                    capacity: 60,
                },
                Room {
                    id: "B".into(),
                    capacity: 60,
                },
            ],
            subjects: vec![
                Subject {
                    id: "Maths CM".into(),
                    kind: CourseType::Lecture,
                    duration: 2,
                },
                Subject {
                    id: "Maths TD".into(),
                    kind: CourseType::Tutorial,
                    duration: 2,
                },
            ],
            teachers: vec![Teacher {
                id: "Mme Camila".into(),
                specialties: vec!["Maths CM".into(), "Maths TD".into()],
            }],
            periods_per_day,
            days_per_week: 3,
        }
    }

    #[test]
    fn rows_carry_labels_per_course_type() {
        let inst = instance(&["DIA1"], 4);
        let (l, _) = ModelBuilder::new(&inst).build();
        let mut v = vec![0.0; l.var_count()];
        v[l.x(0, 0, 0, 0).0] = 1.0;
        v[l.x(0, 1, 0, 0).0] = 1.0;
        v[l.x(1, 2, 1, 0).0] = 1.0;
        v[l.x(1, 3, 1, 0).0] = 1.0;

        let rows = extract_schedule(&inst, &l, &v);
        assert_eq!(rows.len(), 4);
        let lecture: Vec<_> = rows.iter().filter(|r| r.subject.0 == "Maths CM").collect();
        assert!(lecture
            .iter()
            .all(|r| r.room == REMOTE_ROOM_LABEL && r.modality == Modality::Remote));
        let tutorial: Vec<_> = rows.iter().filter(|r| r.subject.0 == "Maths TD").collect();
        assert!(tutorial
            .iter()
            .all(|r| r.room == "B" && r.modality == Modality::OnSite));
        assert_eq!(rows[0].period.to_string(), "Period 1");
        assert_eq!(rows[3].period.to_string(), "Period 4");
    }

    #[test]
    fn every_group_gets_every_slot() {
        let inst = instance(&["DIA2", "DIA1"], 4);
        let (l, _) = ModelBuilder::new(&inst).build();
        let mut v = vec![0.0; l.var_count()];
        v[l.x(1, 5, 0, 0).0] = 1.0;
        v[l.x(1, 0, 1, 0).0] = 1.0;

        let rows = extract_schedule(&inst, &l, &v);
        let keys: Vec<_> = rows.iter().map(|r| (r.group.0.as_str(), r.period.0)).collect();
        assert_eq!(keys, vec![("DIA1", 1), ("DIA1", 6), ("DIA2", 1), ("DIA2", 6)]);
    }

    #[test]
    fn periods_sort_numerically_past_nine() {
        let inst = instance(&["G"], 4);
        let (l, _) = ModelBuilder::new(&inst).build();
        let mut v = vec![0.0; l.var_count()];
        v[l.x(0, 9, 0, 0).0] = 1.0;
        v[l.x(0, 1, 0, 0).0] = 1.0;
        let rows = extract_schedule(&inst, &l, &v);
        let labels: Vec<String> = rows.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(labels, vec!["Period 2", "Period 10"]);
    }

    proptest! {
        #[test]
        fn output_order_is_idempotent(bits in proptest::collection::vec(any::<bool>(), 48)) {
            let inst = instance(&["DIA2", "DIA1", "B1"], 4);
            let (l, _) = ModelBuilder::new(&inst).build();
            let mut v = vec![0.0; l.var_count()];
            for (i, b) in bits.iter().enumerate().take(l.assignment_count()) {
                if *b {
                    v[i] = 1.0;
                }
            }
            let rows = extract_schedule(&inst, &l, &v);
            let mut again = rows.clone();
            sort_schedule(&mut again);
            prop_assert_eq!(&rows, &again);
            let active = bits.iter().take(l.assignment_count()).filter(|b| **b).count();
            prop_assert_eq!(rows.len(), active * inst.groups.len());
        }
    }
}
