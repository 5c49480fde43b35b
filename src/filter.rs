use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::{ActivityKind, ActivityRecord, ActivityStatus};
use crate::period::DateRange;
use crate::report::ReportRequest;

/// Predicate selecting the activities a report covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFilter {
    pub museum_id: Uuid,
    pub starts_at_or_after: NaiveDateTime,
    pub ends_before: NaiveDateTime,
    pub kind: Option<ActivityKind>,
    pub status: Option<ActivityStatus>,
}

/// A value bound to a positional SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    Text(&'static str),
}

impl ActivityFilter {
    pub fn from_request(request: &ReportRequest) -> Self {
        Self::new(
            request.museum_id,
            request.period,
            request.kind_filter,
            request.status_filter,
        )
    }

    pub fn new(
        museum_id: Uuid,
        period: DateRange,
        kind: Option<ActivityKind>,
        status: Option<ActivityStatus>,
    ) -> Self {
        ActivityFilter {
            museum_id,
            starts_at_or_after: period.start_bound(),
            ends_before: period.end_bound(),
            kind,
            status,
        }
    }

    pub fn matches(&self, activity: &ActivityRecord) -> bool {
        activity.museum_id == self.museum_id
            && activity.start >= self.starts_at_or_after
            && activity.end < self.ends_before
            && self.kind.map_or(true, |kind| activity.kind == kind)
            && self.status.map_or(true, |status| activity.status == status)
    }

    /// Keeps matching activities in their original order.
    pub fn apply<'a>(&self, activities: &'a [ActivityRecord]) -> Vec<&'a ActivityRecord> {
        activities
            .iter()
            .filter(|activity| self.matches(activity))
            .collect()
    }

    /// Renders the predicate against the `activities` table aliased as `a`,
    /// numbering parameters from `$1`.
    pub fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut clause =
            String::from("a.museum_id = $1 AND a.start_at >= $2 AND a.end_at < $3");
        let mut binds = vec![
            SqlValue::Uuid(self.museum_id),
            SqlValue::Timestamp(self.starts_at_or_after),
            SqlValue::Timestamp(self.ends_before),
        ];

        if let Some(kind) = self.kind {
            binds.push(SqlValue::Text(kind.code()));
            clause.push_str(&format!(" AND a.kind = ${}", binds.len()));
        }

        if let Some(status) = self.status {
            binds.push(SqlValue::Text(status.code()));
            clause.push_str(&format!(" AND a.status = ${}", binds.len()));
        }

        (clause, binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetAudience;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn activity(museum_id: Uuid, start: NaiveDateTime, end: NaiveDateTime) -> ActivityRecord {
        ActivityRecord {
            id: Uuid::new_v4(),
            museum_id,
            name: "Clay modelling".to_string(),
            start,
            end,
            kind: ActivityKind::Workshop,
            status: ActivityStatus::Completed,
            workers: Vec::new(),
            capacity: 20,
            confirmed_attendees: 0,
            cost: 0.0,
            room: None,
            audience: TargetAudience::General,
        }
    }

    fn january() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn includes_activities_ending_on_the_last_day() {
        let museum = Uuid::new_v4();
        let filter = ActivityFilter::new(museum, january(), None, None);
        assert!(filter.matches(&activity(museum, at(31, 10), at(31, 12))));
        assert!(filter.matches(&activity(museum, at(1, 0), at(1, 2))));
    }

    #[test]
    fn excludes_other_museums_and_overflowing_activities() {
        let museum = Uuid::new_v4();
        let filter = ActivityFilter::new(museum, january(), None, None);
        assert!(!filter.matches(&activity(Uuid::new_v4(), at(10, 10), at(10, 12))));

        let overflowing = activity(
            museum,
            at(31, 22),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(1, 0, 0).unwrap(),
        );
        assert!(!filter.matches(&overflowing));
    }

    #[test]
    fn kind_and_status_filters_apply_when_set() {
        let museum = Uuid::new_v4();
        let filter = ActivityFilter::new(
            museum,
            january(),
            Some(ActivityKind::Lecture),
            Some(ActivityStatus::Completed),
        );
        let mut lecture = activity(museum, at(5, 10), at(5, 11));
        lecture.kind = ActivityKind::Lecture;
        let workshop = activity(museum, at(5, 10), at(5, 11));
        let mut cancelled = lecture.clone();
        cancelled.status = ActivityStatus::Cancelled;

        let all = vec![lecture.clone(), workshop, cancelled];
        let selected = filter.apply(&all);
        assert_eq!(selected, vec![&lecture]);
    }

    #[test]
    fn sql_clause_numbers_optional_parameters() {
        let museum = Uuid::new_v4();
        let filter = ActivityFilter::new(museum, january(), None, Some(ActivityStatus::Completed));
        let (clause, binds) = filter.where_clause();
        assert!(clause.ends_with("AND a.status = $4"));
        assert!(!clause.contains("a.kind"));
        assert_eq!(binds.len(), 4);
        assert_eq!(binds[3], SqlValue::Text("completed"));
    }
}
