use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::filter::ActivityFilter;
use crate::models::{ActivityRecord, ActivityStatus, Museum};
use crate::period::{AutoPeriod, DateRange};
use crate::report::{self, ReportKind, ReportRequest, ReportResult};
use crate::statistics::PeriodStatistics;

/// Identity of an automatic report; at most one exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub museum_id: Uuid,
    pub period: AutoPeriod,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReport {
    pub key: PeriodKey,
    pub request: ReportRequest,
    pub result: ReportResult,
    pub statistics: PeriodStatistics,
}

pub fn default_request(museum: &Museum, period: AutoPeriod, range: DateRange) -> ReportRequest {
    ReportRequest {
        name: format!("{} Report - {} - {}", period.label(), museum.name, range),
        museum_id: museum.id,
        museum_name: museum.name.clone(),
        period: range,
        kind: ReportKind::ByDate,
        workers: Vec::new(),
        kind_filter: None,
        status_filter: Some(ActivityStatus::Completed),
    }
}

/// Generates the prior-period report for every active museum that does not
/// have one yet.
pub fn generate_default_reports(
    period: AutoPeriod,
    today: NaiveDate,
    museums: &[Museum],
    snapshot: &[ActivityRecord],
    already_generated: &HashSet<PeriodKey>,
) -> Result<Vec<ScheduledReport>> {
    let range = period.prior_range(today);
    let mut seen = already_generated.clone();
    let mut reports = Vec::new();

    for museum in museums.iter().filter(|museum| museum.active) {
        let key = PeriodKey {
            museum_id: museum.id,
            period,
            range,
        };
        if !seen.insert(key) {
            debug!(museum = %museum.name, period = period.code(), "report already exists");
            continue;
        }

        let request = default_request(museum, period, range);
        let result = report::generate(&request, snapshot)?;
        let statistics =
            PeriodStatistics::compute(ActivityFilter::from_request(&request).apply(snapshot));
        reports.push(ScheduledReport {
            key,
            request,
            result,
            statistics,
        });
    }

    info!(
        period = period.code(),
        range = %range,
        generated = reports.len(),
        "automatic reports generated"
    );
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::january_workshops;
    use crate::models::TargetAudience;
    use crate::report::ReportBody;

    fn museum(name: &str, active: bool) -> Museum {
        Museum {
            id: Uuid::new_v4(),
            name: name.to_string(),
            active,
        }
    }

    fn february_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn one_report_per_active_museum() {
        let city = museum("City Museum", true);
        let closed = museum("Closed Museum", false);
        let (activities, _, _) = january_workshops(city.id);

        let reports = generate_default_reports(
            AutoPeriod::Monthly,
            february_first(),
            &[city.clone(), closed],
            &activities,
            &HashSet::new(),
        )
        .unwrap();

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.key.museum_id, city.id);
        assert_eq!(report.request.period, AutoPeriod::Monthly.prior_range(february_first()));
        assert_eq!(report.result.total_activities(), 3);
        assert!(matches!(report.result.body, ReportBody::ByDate(_)));
    }

    #[test]
    fn period_statistics_travel_with_each_report() {
        let city = museum("City Museum", true);
        let harbour = museum("Harbour Museum", true);
        let (mut activities, _, _) = january_workshops(city.id);
        activities[2].audience = TargetAudience::School;
        let (other, _, _) = january_workshops(harbour.id);
        activities.extend(other);

        let reports = generate_default_reports(
            AutoPeriod::Monthly,
            february_first(),
            &[city.clone(), harbour],
            &activities,
            &HashSet::new(),
        )
        .unwrap();

        let city_report = reports
            .iter()
            .find(|report| report.key.museum_id == city.id)
            .unwrap();
        let stats = &city_report.statistics;
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.total_attendees, 35);
        assert!((stats.total_revenue - 175.0).abs() < 1e-9);
        assert_eq!(stats.attendees_per_audience[&TargetAudience::School], 20);
        assert_eq!(stats.attendees_per_audience[&TargetAudience::General], 15);
        assert_eq!(stats.activities_per_worker["Ana Ruiz"], 2);
    }

    #[test]
    fn existing_reports_are_not_regenerated() {
        let city = museum("City Museum", true);
        let range = AutoPeriod::Monthly.prior_range(february_first());
        let existing: HashSet<PeriodKey> = [PeriodKey {
            museum_id: city.id,
            period: AutoPeriod::Monthly,
            range,
        }]
        .into_iter()
        .collect();

        let reports =
            generate_default_reports(AutoPeriod::Monthly, february_first(), &[city], &[], &existing)
                .unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn duplicate_museums_in_one_run_generate_once() {
        let city = museum("City Museum", true);
        let reports = generate_default_reports(
            AutoPeriod::Yearly,
            february_first(),
            &[city.clone(), city],
            &[],
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn only_completed_activities_are_counted() {
        let city = museum("City Museum", true);
        let (mut activities, _, _) = january_workshops(city.id);
        activities[0].status = ActivityStatus::Cancelled;

        let reports = generate_default_reports(
            AutoPeriod::Monthly,
            february_first(),
            &[city],
            &activities,
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(reports[0].result.total_activities(), 2);
    }
}
