use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ReportError, Result};
use crate::filter::ActivityFilter;
use crate::models::{ActivityKind, ActivityRecord, ActivityStatus};
use crate::period::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    ByWorker,
    ByDate,
}

impl ReportKind {
    pub fn code(self) -> &'static str {
        match self {
            ReportKind::ByWorker => "by_worker",
            ReportKind::ByDate => "by_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::ByWorker => "Activities by Worker",
            ReportKind::ByDate => "Activities by Date Range",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "by_worker" | "by-worker" => Ok(ReportKind::ByWorker),
            "by_date" | "by-date" => Ok(ReportKind::ByDate),
            other => Err(ReportError::Validation(format!(
                "unknown report kind '{other}'"
            ))),
        }
    }
}

/// What to report on. An empty `workers` list means every worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub name: String,
    pub museum_id: Uuid,
    pub museum_name: String,
    pub period: DateRange,
    pub kind: ReportKind,
    #[serde(default)]
    pub workers: Vec<Uuid>,
    pub kind_filter: Option<ActivityKind>,
    pub status_filter: Option<ActivityStatus>,
}

impl ReportRequest {
    pub fn default_name(kind: ReportKind, museum_name: &str, period: &DateRange) -> String {
        format!("Report {} - {} - {}", kind.label(), museum_name, period.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub museum: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub activity_kind: String,
    pub activity_status: String,
}

impl AppliedFilters {
    fn from_request(request: &ReportRequest) -> Self {
        AppliedFilters {
            museum: request.museum_name.clone(),
            from: request.period.from,
            to: request.period.to,
            activity_kind: request
                .kind_filter
                .map_or("all", |kind| kind.code())
                .to_string(),
            activity_status: request
                .status_filter
                .map_or("all", |status| status.code())
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLine {
    pub name: String,
    pub start: NaiveDateTime,
    pub kind: ActivityKind,
    pub status: ActivityStatus,
    pub duration_hours: f64,
    pub attendees: i64,
    pub capacity: i32,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerBucket {
    pub worker_id: Uuid,
    pub name: String,
    pub role: String,
    pub activities: Vec<ActivityLine>,
    pub total_activities: usize,
    pub total_hours: f64,
    pub total_attendees: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub period_label: String,
    pub total_workers: usize,
    pub total_activities: usize,
    pub total_hours: f64,
    pub total_attendees: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerBreakdown {
    pub summary: WorkerSummary,
    pub workers: Vec<WorkerBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayActivityLine {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub kind: ActivityKind,
    pub status: ActivityStatus,
    pub duration_hours: f64,
    pub attendees: i64,
    pub capacity: i32,
    pub room: String,
    pub workers: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub weekday: String,
    pub activities: Vec<DayActivityLine>,
    pub total_activities: usize,
    pub total_attendees: i64,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindTotals {
    pub kind: ActivityKind,
    pub activities: usize,
    pub attendees: i64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSummary {
    pub period_label: String,
    pub total_days: usize,
    pub total_activities: usize,
    pub total_attendees: i64,
    pub total_hours: f64,
    pub per_kind: Vec<KindTotals>,
    pub average_activities_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBreakdown {
    pub summary: DateSummary,
    pub days: Vec<DayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBody {
    ByWorker(WorkerBreakdown),
    ByDate(DateBreakdown),
}

/// Point-in-time aggregation of a request over an activity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub name: String,
    pub museum_name: String,
    pub kind: ReportKind,
    pub period: DateRange,
    pub filters: AppliedFilters,
    pub body: ReportBody,
    pub generated_at: DateTime<Utc>,
}

impl ReportResult {
    pub fn total_activities(&self) -> usize {
        match &self.body {
            ReportBody::ByWorker(breakdown) => breakdown.summary.total_activities,
            ReportBody::ByDate(breakdown) => breakdown.summary.total_activities,
        }
    }

    pub fn total_attendees(&self) -> i64 {
        match &self.body {
            ReportBody::ByWorker(breakdown) => breakdown.summary.total_attendees,
            ReportBody::ByDate(breakdown) => breakdown.summary.total_attendees,
        }
    }

    pub fn total_hours(&self) -> f64 {
        match &self.body {
            ReportBody::ByWorker(breakdown) => breakdown.summary.total_hours,
            ReportBody::ByDate(breakdown) => breakdown.summary.total_hours,
        }
    }
}

/// Filters `snapshot` with the request and aggregates what remains.
pub fn generate(request: &ReportRequest, snapshot: &[ActivityRecord]) -> Result<ReportResult> {
    request.period.validate()?;

    let filter = ActivityFilter::from_request(request);
    let selected = filter.apply(snapshot);
    debug!(
        museum = %request.museum_name,
        candidates = snapshot.len(),
        selected = selected.len(),
        "filtered activities for report"
    );

    let body = match request.kind {
        ReportKind::ByWorker => {
            ReportBody::ByWorker(aggregate_by_worker(&selected, &request.period, &request.workers))
        }
        ReportKind::ByDate => ReportBody::ByDate(aggregate_by_date(&selected, &request.period)),
    };

    let result = ReportResult {
        name: request.name.clone(),
        museum_name: request.museum_name.clone(),
        kind: request.kind,
        period: request.period,
        filters: AppliedFilters::from_request(request),
        body,
        generated_at: Utc::now(),
    };

    info!(
        report = %result.name,
        kind = request.kind.code(),
        activities = result.total_activities(),
        "report generated"
    );
    Ok(result)
}

pub fn aggregate_by_worker(
    activities: &[&ActivityRecord],
    period: &DateRange,
    only_workers: &[Uuid],
) -> WorkerBreakdown {
    let subset: HashSet<Uuid> = only_workers.iter().copied().collect();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut buckets: Vec<WorkerBucket> = Vec::new();

    for activity in activities {
        let hours = activity.duration_hours();
        for worker in &activity.workers {
            if !subset.is_empty() && !subset.contains(&worker.id) {
                continue;
            }

            let position = *index.entry(worker.id).or_insert_with(|| {
                buckets.push(WorkerBucket {
                    worker_id: worker.id,
                    name: worker.name.clone(),
                    role: worker.role.clone(),
                    activities: Vec::new(),
                    total_activities: 0,
                    total_hours: 0.0,
                    total_attendees: 0,
                });
                buckets.len() - 1
            });

            let bucket = &mut buckets[position];
            bucket.activities.push(ActivityLine {
                name: activity.name.clone(),
                start: activity.start,
                kind: activity.kind,
                status: activity.status,
                duration_hours: hours,
                attendees: activity.confirmed_attendees,
                capacity: activity.capacity,
                room: activity.room_label().to_string(),
            });
            bucket.total_activities += 1;
            bucket.total_hours += hours;
            bucket.total_attendees += activity.confirmed_attendees;
        }
    }

    // Vec::sort_by is stable, so equal counts keep encounter order.
    buckets.sort_by(|a, b| b.total_activities.cmp(&a.total_activities));

    let summary = WorkerSummary {
        period_label: period.label(),
        total_workers: buckets.len(),
        total_activities: buckets.iter().map(|b| b.total_activities).sum(),
        total_hours: buckets.iter().map(|b| b.total_hours).sum(),
        total_attendees: buckets.iter().map(|b| b.total_attendees).sum(),
    };

    WorkerBreakdown {
        summary,
        workers: buckets,
    }
}

pub fn aggregate_by_date(activities: &[&ActivityRecord], period: &DateRange) -> DateBreakdown {
    let mut ordered: Vec<&ActivityRecord> = activities.to_vec();
    ordered.sort_by_key(|activity| activity.start);

    let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    let mut per_kind: BTreeMap<ActivityKind, KindTotals> = BTreeMap::new();

    for activity in &ordered {
        let date = activity.start.date();
        let hours = activity.duration_hours();

        let day = days.entry(date).or_insert_with(|| DayBucket {
            date,
            weekday: date.format("%A").to_string(),
            activities: Vec::new(),
            total_activities: 0,
            total_attendees: 0,
            total_hours: 0.0,
        });
        day.activities.push(DayActivityLine {
            name: activity.name.clone(),
            start_time: activity.start.time(),
            end_time: activity.end.time(),
            kind: activity.kind,
            status: activity.status,
            duration_hours: hours,
            attendees: activity.confirmed_attendees,
            capacity: activity.capacity,
            room: activity.room_label().to_string(),
            workers: activity.worker_names(),
        });
        day.total_activities += 1;
        day.total_attendees += activity.confirmed_attendees;
        day.total_hours += hours;

        let totals = per_kind.entry(activity.kind).or_insert_with(|| KindTotals {
            kind: activity.kind,
            activities: 0,
            attendees: 0,
            hours: 0.0,
        });
        totals.activities += 1;
        totals.attendees += activity.confirmed_attendees;
        totals.hours += hours;
    }

    let days: Vec<DayBucket> = days.into_values().collect();
    let total_activities = ordered.len();

    let summary = DateSummary {
        period_label: period.label(),
        total_days: days.len(),
        total_activities,
        total_attendees: ordered.iter().map(|a| a.confirmed_attendees).sum(),
        total_hours: ordered.iter().map(|a| a.duration_hours()).sum(),
        per_kind: per_kind.into_values().collect(),
        average_activities_per_day: total_activities as f64 / days.len().max(1) as f64,
    };

    DateBreakdown { summary, days }
}

/// Short markdown digest printed after generating a report.
pub fn summary_markdown(result: &ReportResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {}", result.name);
    let _ = writeln!(
        output,
        "{} for {} ({})",
        result.kind.label(),
        result.museum_name,
        result.period
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Statistics");
    let _ = writeln!(output, "- Activities: {}", result.total_activities());
    let _ = writeln!(output, "- Attendees: {}", result.total_attendees());
    let _ = writeln!(output, "- Hours: {:.2}", result.total_hours());

    match &result.body {
        ReportBody::ByWorker(breakdown) => {
            let _ = writeln!(output, "- Workers: {}", breakdown.summary.total_workers);
            let _ = writeln!(output);
            let _ = writeln!(output, "## Busiest Workers");
            if breakdown.workers.is_empty() {
                let _ = writeln!(output, "No activities recorded for this window.");
            }
            for worker in breakdown.workers.iter().take(10) {
                let _ = writeln!(
                    output,
                    "- {} ({}): {} activities, {:.2} h, {} attendees",
                    worker.name,
                    worker.role,
                    worker.total_activities,
                    worker.total_hours,
                    worker.total_attendees
                );
            }
        }
        ReportBody::ByDate(breakdown) => {
            let _ = writeln!(output, "- Days: {}", breakdown.summary.total_days);
            let _ = writeln!(
                output,
                "- Average activities per day: {:.2}",
                breakdown.summary.average_activities_per_day
            );
            let _ = writeln!(output);
            let _ = writeln!(output, "## Activity Mix");
            if breakdown.summary.per_kind.is_empty() {
                let _ = writeln!(output, "No activities recorded for this window.");
            }
            for totals in &breakdown.summary.per_kind {
                let _ = writeln!(
                    output,
                    "- {}: {} activities, {} attendees, {:.2} h",
                    totals.kind.label(),
                    totals.activities,
                    totals.attendees,
                    totals.hours
                );
            }
        }
    }

    output
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    use super::{ReportKind, ReportRequest};
    use crate::models::{
        ActivityKind, ActivityRecord, ActivityStatus, TargetAudience, WorkerRef,
    };
    use crate::period::DateRange;

    pub fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn worker(name: &str, role: &str) -> WorkerRef {
        WorkerRef {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role: role.to_string(),
        }
    }

    pub fn activity(
        museum_id: Uuid,
        name: &str,
        start: NaiveDateTime,
        hours: i64,
        attendees: i64,
        workers: Vec<WorkerRef>,
    ) -> ActivityRecord {
        ActivityRecord {
            id: Uuid::new_v4(),
            museum_id,
            name: name.to_string(),
            start,
            end: start + chrono::Duration::hours(hours),
            kind: ActivityKind::Workshop,
            status: ActivityStatus::Completed,
            workers,
            capacity: 30,
            confirmed_attendees: attendees,
            cost: 5.0,
            room: Some("Hall A".to_string()),
            audience: TargetAudience::General,
        }
    }

    pub fn january_request(museum_id: Uuid, kind: ReportKind) -> ReportRequest {
        let period = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap();
        ReportRequest {
            name: "January".to_string(),
            museum_id,
            museum_name: "City Museum".to_string(),
            period,
            kind,
            workers: Vec::new(),
            kind_filter: None,
            status_filter: None,
        }
    }

    /// Worker A runs two workshops (2h/10, 1h/5) on Jan 10, worker B one
    /// (3h/20) on Jan 12.
    pub fn january_workshops(museum_id: Uuid) -> (Vec<ActivityRecord>, WorkerRef, WorkerRef) {
        let a = worker("Ana Ruiz", "Educator");
        let b = worker("Luis Gomez", "Curator");
        let activities = vec![
            activity(museum_id, "Pottery", at(1, 10, 9), 2, 10, vec![a.clone()]),
            activity(museum_id, "Weaving", at(1, 10, 14), 1, 5, vec![a.clone()]),
            activity(museum_id, "Printmaking", at(1, 12, 10), 3, 20, vec![b.clone()]),
        ];
        (activities, a, b)
    }
}
