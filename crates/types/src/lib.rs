use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
            PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(GroupId);
id_newtype!(RoomId);
id_newtype!(SubjectId);

pub const DEFAULT_DURATION: u32 = 2;
pub const DEFAULT_GROUP_SIZE: u32 = 30;
pub const DEFAULT_ROOM_CAPACITY: u32 = 60;
pub const DEFAULT_PERIODS_PER_DAY: u32 = 4;
pub const DEFAULT_DAYS_PER_WEEK: u32 = 5;

/// Room label reported for courses that are delivered remotely.
pub const REMOTE_ROOM_LABEL: &str = "no room (remote)";

/// Delivery category of a subject.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[serde(alias = "CM")]
    Lecture,
    #[serde(alias = "TD")]
    Tutorial,
}

impl CourseType {
    /// Lectures are always remote, tutorials always on site.
    pub fn modality(self) -> Modality {
        match self {
            CourseType::Lecture => Modality::Remote,
            CourseType::Tutorial => Modality::OnSite,
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseType::Lecture => f.write_str("lecture"),
            CourseType::Tutorial => f.write_str("tutorial"),
        }
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    OnSite,
    Remote,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::OnSite, Modality::Remote];

    pub fn index(self) -> usize {
        match self {
            Modality::OnSite => 0,
            Modality::Remote => 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: CourseType,
    pub duration: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Group {
    pub id: GroupId,
    pub size: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default)]
    pub specialties: Vec<SubjectId>,
}

impl Teacher {
    pub fn can_teach(&self, subject: &SubjectId) -> bool {
        self.specialties.contains(subject)
    }
}

/// A fully resolved scheduling instance: every subject classified, every
/// size, capacity and duration filled in.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Instance {
    pub groups: Vec<Group>,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub periods_per_day: u32,
    pub days_per_week: u32,
}

impl Instance {
    pub fn period_count(&self) -> usize {
        (self.periods_per_day as usize).saturating_mul(self.days_per_week as usize)
    }
}

/// Body of `POST /v1/schedule` as it arrives on the wire. Required fields are
/// optional here so a missing key can be reported by name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub group_names: Option<Vec<String>>,
    #[serde(default)]
    pub rooms: Option<Vec<String>>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub teachers: Option<Vec<String>>,
    #[serde(default)]
    pub teacher_specialties: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub periods_per_day: Option<u32>,
    #[serde(default)]
    pub days_per_week: Option<u32>,
    #[serde(default)]
    pub course_type: Option<BTreeMap<String, CourseType>>,
    #[serde(default)]
    pub subject_durations: BTreeMap<String, u32>,
    #[serde(default)]
    pub group_sizes: BTreeMap<String, u32>,
    #[serde(default)]
    pub room_capacities: BTreeMap<String, u32>,
    #[serde(default)]
    pub time_limit_sec: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
}

/// One-based period number, rendered as `Period N`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PeriodLabel(pub u32);

impl PeriodLabel {
    pub fn from_index(p: usize) -> Self {
        Self(p as u32 + 1)
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period {}", self.0)
    }
}

impl FromStr for PeriodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .strip_prefix("Period ")
            .and_then(|x| x.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid period label: {s}"))?;
        Ok(Self(n))
    }
}

impl Serialize for PeriodLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the timetable: a group attending a subject in one period.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct ScheduleEntry {
    pub group: GroupId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    #[schema(value_type = String)]
    #[schemars(with = "String")]
    pub period: PeriodLabel,
    pub room: String,
    pub modality: Modality,
}

impl ScheduleEntry {
    pub fn sort_key(&self) -> (&str, PeriodLabel) {
        (self.group.as_str(), self.period)
    }
}

pub fn request_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ScheduleRequest)
}
