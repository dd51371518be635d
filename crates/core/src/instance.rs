use std::collections::{BTreeMap, HashSet};
use types::{
    Group, Instance, Room, ScheduleRequest, Subject, Teacher, DEFAULT_DAYS_PER_WEEK,
    DEFAULT_DURATION, DEFAULT_GROUP_SIZE, DEFAULT_PERIODS_PER_DAY, DEFAULT_ROOM_CAPACITY,
};

use crate::classify::CourseTypeClassifier;
use crate::{ScheduleError, ValidationError};

fn required<T>(field: Option<T>, name: &'static str) -> Result<T, ScheduleError> {
    field.ok_or(ScheduleError::MissingField(name))
}

/// Turns a wire request into a resolved [`Instance`].
///
/// Required fields are checked in request order, so the first absent one is
/// the one reported. Subjects missing from an explicit `course_type` map are
/// classified by name.
pub fn resolve_request(
    req: ScheduleRequest,
    classifier: &dyn CourseTypeClassifier,
) -> Result<Instance, ScheduleError> {
    let group_names = required(req.group_names, "group_names")?;
    let room_names = required(req.rooms, "rooms")?;
    let subject_names = required(req.subjects, "subjects")?;
    let teacher_names = required(req.teachers, "teachers")?;
    let specialties = required(req.teacher_specialties, "teacher_specialties")?;
    let explicit_types = req.course_type.unwrap_or_default();

    let mut unknown = Vec::new();
    check_override_keys("subject_durations", &req.subject_durations, &subject_names, &mut unknown);
    check_override_keys("group_sizes", &req.group_sizes, &group_names, &mut unknown);
    check_override_keys("room_capacities", &req.room_capacities, &room_names, &mut unknown);
    if !unknown.is_empty() {
        return Err(ValidationError::Problems(unknown).into());
    }

    let mut subjects = Vec::with_capacity(subject_names.len());
    for name in subject_names {
        let kind = match explicit_types.get(&name) {
            Some(&k) => k,
            None => classifier
                .classify(&name)
                .ok_or_else(|| ScheduleError::UnclassifiableSubject(name.clone()))?,
        };
        let duration = req
            .subject_durations
            .get(&name)
            .copied()
            .unwrap_or(DEFAULT_DURATION);
        subjects.push(Subject {
            id: name.into(),
            kind,
            duration,
        });
    }

    let groups = group_names
        .into_iter()
        .map(|name| Group {
            size: req.group_sizes.get(&name).copied().unwrap_or(DEFAULT_GROUP_SIZE),
            id: name.into(),
        })
        .collect();

    let rooms = room_names
        .into_iter()
        .map(|name| Room {
            capacity: req
                .room_capacities
                .get(&name)
                .copied()
                .unwrap_or(DEFAULT_ROOM_CAPACITY),
            id: name.into(),
        })
        .collect();

    let teachers = teacher_names
        .into_iter()
        .map(|name| Teacher {
            specialties: specialties
                .get(&name)
                .map(|subs| subs.iter().map(|s| s.as_str().into()).collect())
                .unwrap_or_default(),
            id: name.into(),
        })
        .collect();

    Ok(Instance {
        groups,
        rooms,
        subjects,
        teachers,
        periods_per_day: req.periods_per_day.unwrap_or(DEFAULT_PERIODS_PER_DAY),
        days_per_week: req.days_per_week.unwrap_or(DEFAULT_DAYS_PER_WEEK),
    })
}

fn check_override_keys(
    field: &str,
    overrides: &BTreeMap<String, u32>,
    known: &[String],
    errors: &mut Vec<String>,
) {
    let known: HashSet<&str> = known.iter().map(String::as_str).collect();
    for key in overrides.keys() {
        if !known.contains(key.as_str()) {
            errors.push(format!("{field} references unknown name {key}"));
        }
    }
}
