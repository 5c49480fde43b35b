use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ActivityKind, ActivityRecord, ActivityStatus, TargetAudience};

/// Headline figures for a museum over a period, counting completed
/// activities only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistics {
    pub total_activities: usize,
    pub total_attendees: i64,
    pub average_attendance: f64,
    pub activities_per_kind: BTreeMap<ActivityKind, usize>,
    pub total_revenue: f64,
    pub attendees_per_audience: BTreeMap<TargetAudience, i64>,
    pub activities_per_worker: BTreeMap<String, usize>,
}

impl PeriodStatistics {
    pub fn compute<'a, I>(activities: I) -> Self
    where
        I: IntoIterator<Item = &'a ActivityRecord>,
    {
        let mut stats = PeriodStatistics {
            total_activities: 0,
            total_attendees: 0,
            average_attendance: 0.0,
            activities_per_kind: BTreeMap::new(),
            total_revenue: 0.0,
            attendees_per_audience: BTreeMap::new(),
            activities_per_worker: BTreeMap::new(),
        };

        for activity in activities
            .into_iter()
            .filter(|activity| activity.status == ActivityStatus::Completed)
        {
            stats.total_activities += 1;
            stats.total_attendees += activity.confirmed_attendees;
            stats.total_revenue += activity.cost * activity.confirmed_attendees as f64;
            *stats.activities_per_kind.entry(activity.kind).or_insert(0) += 1;
            *stats
                .attendees_per_audience
                .entry(activity.audience)
                .or_insert(0) += activity.confirmed_attendees;
            for worker in &activity.workers {
                *stats
                    .activities_per_worker
                    .entry(worker.name.clone())
                    .or_insert(0) += 1;
            }
        }

        if stats.total_activities > 0 {
            stats.average_attendance = stats.total_attendees as f64 / stats.total_activities as f64;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{at, january_workshops};
    use uuid::Uuid;

    #[test]
    fn summarises_completed_activities() {
        let museum = Uuid::new_v4();
        let (mut activities, _, _) = january_workshops(museum);
        activities[2].audience = TargetAudience::School;
        let mut cancelled = activities[0].clone();
        cancelled.status = ActivityStatus::Cancelled;
        cancelled.start = at(1, 20, 10);
        activities.push(cancelled);

        let stats = PeriodStatistics::compute(&activities);
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.total_attendees, 35);
        assert!((stats.average_attendance - 35.0 / 3.0).abs() < 1e-9);
        assert!((stats.total_revenue - 175.0).abs() < 1e-9);
        assert_eq!(stats.activities_per_kind[&ActivityKind::Workshop], 3);
        assert_eq!(stats.attendees_per_audience[&TargetAudience::School], 20);
        assert_eq!(stats.attendees_per_audience[&TargetAudience::General], 15);
        assert_eq!(stats.activities_per_worker["Ana Ruiz"], 2);
        assert_eq!(stats.activities_per_worker["Luis Gomez"], 1);
    }

    #[test]
    fn no_activities_means_zero_average() {
        let stats = PeriodStatistics::compute(&Vec::<ActivityRecord>::new());
        assert_eq!(stats.total_activities, 0);
        assert_eq!(stats.average_attendance, 0.0);
    }
}
