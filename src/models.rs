use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReportError;

/// Declares a closed set of stored codes with their display labels.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ReportError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($code => Ok($name::$variant),)+
                    other => Err(ReportError::Validation(format!(
                        "unknown {} '{}'",
                        $what, other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum! {
    ActivityKind, "activity kind" {
        Workshop => ("workshop", "Workshop"),
        Lecture => ("lecture", "Lecture"),
        Exhibition => ("exhibition", "Exhibition"),
        GuidedTour => ("guided_tour", "Guided Tour"),
        ChildrensActivity => ("childrens_activity", "Children's Activity"),
        SpecialEvent => ("special_event", "Special Event"),
        Festival => ("festival", "Festival"),
        Other => ("other", "Other"),
    }
}

coded_enum! {
    ActivityStatus, "activity status" {
        Planned => ("planned", "Planned"),
        Confirmed => ("confirmed", "Confirmed"),
        InProgress => ("in_progress", "In Progress"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
        Postponed => ("postponed", "Postponed"),
    }
}

coded_enum! {
    TargetAudience, "target audience" {
        Children => ("children", "Children (0-12)"),
        Youth => ("youth", "Youth (13-17)"),
        Adults => ("adults", "Adults"),
        Seniors => ("seniors", "Seniors"),
        Family => ("family", "Family"),
        School => ("school", "School"),
        University => ("university", "University"),
        General => ("general", "General Public"),
    }
}

coded_enum! {
    AgeBracket, "age bracket" {
        UpTo12 => ("0-12", "0-12 years"),
        From13To17 => ("13-17", "13-17 years"),
        From18To25 => ("18-25", "18-25 years"),
        From26To40 => ("26-40", "26-40 years"),
        From41To60 => ("41-60", "41-60 years"),
        Over60 => ("61+", "61+ years"),
        Mixed => ("mixed", "Mixed"),
    }
}

coded_enum! {
    Origin, "visitor origin" {
        Local => ("local", "Local"),
        National => ("national", "National"),
        International => ("international", "International"),
        SchoolGroup => ("school_group", "School Group"),
        UniversityGroup => ("university_group", "University Group"),
        Tourist => ("tourist", "Tourist"),
        Other => ("other", "Other"),
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        ActivityKind::Workshop
    }
}

impl Default for ActivityStatus {
    fn default() -> Self {
        ActivityStatus::Planned
    }
}

impl Default for TargetAudience {
    fn default() -> Self {
        TargetAudience::General
    }
}

impl Default for AgeBracket {
    fn default() -> Self {
        AgeBracket::Mixed
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Local
    }
}

/// Parses a report filter value where `all` means no restriction.
pub fn parse_filter<T: FromStr<Err = ReportError>>(value: &str) -> Result<Option<T>, ReportError> {
    match value.trim() {
        "" | "all" => Ok(None),
        other => other.parse().map(Some),
    }
}

pub const DEFAULT_CAPACITY: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Museum {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRef {
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub museum_id: Uuid,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: ActivityKind,
    pub status: ActivityStatus,
    pub workers: Vec<WorkerRef>,
    pub capacity: i32,
    pub confirmed_attendees: i64,
    pub cost: f64,
    pub room: Option<String>,
    pub audience: TargetAudience,
}

impl ActivityRecord {
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    pub fn worker_names(&self) -> String {
        self.workers
            .iter()
            .map(|worker| worker.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn room_label(&self) -> &str {
        self.room.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub date: NaiveDate,
    pub attendees: i32,
    pub age_bracket: AgeBracket,
    pub origin: Origin,
    pub satisfaction: Option<f64>,
    pub comments: Option<String>,
}
