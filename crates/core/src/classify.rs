use std::collections::BTreeMap;
use types::CourseType;

use crate::ScheduleError;

/// Decides whether a subject is delivered as a lecture or a tutorial.
pub trait CourseTypeClassifier: Send + Sync {
    fn classify(&self, subject: &str) -> Option<CourseType>;
}

/// Classifies by marker substrings in the subject name. The lecture marker
/// is checked first, so a name carrying both markers is a lecture.
#[derive(Clone, Debug)]
pub struct SubstringClassifier {
    lecture_marker: String,
    tutorial_marker: String,
}

impl SubstringClassifier {
    pub fn new(lecture_marker: impl Into<String>, tutorial_marker: impl Into<String>) -> Self {
        Self {
            lecture_marker: lecture_marker.into(),
            tutorial_marker: tutorial_marker.into(),
        }
    }
}

impl Default for SubstringClassifier {
    fn default() -> Self {
        Self::new("CM", "TD")
    }
}

impl CourseTypeClassifier for SubstringClassifier {
    fn classify(&self, subject: &str) -> Option<CourseType> {
        if subject.contains(&self.lecture_marker) {
            Some(CourseType::Lecture)
        } else if subject.contains(&self.tutorial_marker) {
            Some(CourseType::Tutorial)
        } else {
            None
        }
    }
}

pub fn classify_subjects(
    classifier: &dyn CourseTypeClassifier,
    subjects: &[String],
) -> Result<BTreeMap<String, CourseType>, ScheduleError> {
    let mut out = BTreeMap::new();
    for s in subjects {
        let kind = classifier
            .classify(s)
            .ok_or_else(|| ScheduleError::UnclassifiableSubject(s.clone()))?;
        out.insert(s.clone(), kind);
    }
    Ok(out)
}
