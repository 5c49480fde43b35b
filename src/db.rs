use std::collections::{HashMap, HashSet};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::activities::{
    ActivityDraft, ActivityService, ActivityStore, AttendanceDraft, CalendarEvent, CalendarSync,
};
use crate::filter::{ActivityFilter, SqlValue};
use crate::models::{
    ActivityKind, ActivityRecord, ActivityStatus, AgeBracket, AttendanceRecord, Museum, Origin,
    TargetAudience, WorkerRef, DEFAULT_CAPACITY,
};
use crate::period::{AutoPeriod, DateRange};
use crate::report::{ReportRequest, ReportResult};
use crate::schedule::{PeriodKey, ScheduledReport};
use crate::stored::{to_json, ReportState, StoredReport};

const ACTIVITY_COLUMNS: &str = "a.id, a.museum_id, a.name, a.start_at, a.end_at, a.kind, \
     a.status, a.capacity, a.cost, a.room, a.audience, \
     COALESCE((SELECT SUM(r.attendees) FROM museum_reports.attendance_records r \
     WHERE r.activity_id = a.id), 0)::BIGINT AS confirmed_attendees";

const CSV_TIMESTAMP: &str = "%Y-%m-%d %H:%M";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn fetch_museums(pool: &PgPool) -> anyhow::Result<Vec<Museum>> {
    let rows = sqlx::query(
        "SELECT id, name, active FROM museum_reports.museums ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Museum {
            id: row.get("id"),
            name: row.get("name"),
            active: row.get("active"),
        })
        .collect())
}

pub async fn find_museum(pool: &PgPool, name: &str) -> anyhow::Result<Museum> {
    let row = sqlx::query("SELECT id, name, active FROM museum_reports.museums WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no museum named '{name}'"))?;

    Ok(Museum {
        id: row.get("id"),
        name: row.get("name"),
        active: row.get("active"),
    })
}

pub async fn upsert_museum(pool: &PgPool, name: &str) -> anyhow::Result<Museum> {
    let row = sqlx::query(
        r#"
        INSERT INTO museum_reports.museums (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, active
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(Museum {
        id: row.get("id"),
        name: row.get("name"),
        active: row.get("active"),
    })
}

pub async fn upsert_worker(pool: &PgPool, name: &str, role: &str) -> anyhow::Result<WorkerRef> {
    let row = sqlx::query(
        r#"
        INSERT INTO museum_reports.workers (id, full_name, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (full_name) DO UPDATE
        SET role = CASE WHEN EXCLUDED.role = '' THEN workers.role ELSE EXCLUDED.role END
        RETURNING id, full_name, role
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(WorkerRef {
        id: row.get("id"),
        name: row.get("full_name"),
        role: row.get("role"),
    })
}

pub async fn find_worker_ids(pool: &PgPool, names: &[String]) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::new();
    for name in names {
        let id: Uuid = sqlx::query("SELECT id FROM museum_reports.workers WHERE full_name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?
            .with_context(|| format!("no worker named '{name}'"))?
            .get("id");
        ids.push(id);
    }
    Ok(ids)
}

fn activity_from_row(row: &PgRow) -> anyhow::Result<ActivityRecord> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    let audience: String = row.get("audience");

    Ok(ActivityRecord {
        id: row.get("id"),
        museum_id: row.get("museum_id"),
        name: row.get("name"),
        start: row.get("start_at"),
        end: row.get("end_at"),
        kind: kind.parse()?,
        status: status.parse()?,
        workers: Vec::new(),
        capacity: row.get("capacity"),
        confirmed_attendees: row.get("confirmed_attendees"),
        cost: row.get("cost"),
        room: row.get("room"),
        audience: audience.parse()?,
    })
}

async fn load_activities(
    pool: &PgPool,
    clause: &str,
    binds: Vec<SqlValue>,
) -> anyhow::Result<Vec<ActivityRecord>> {
    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM museum_reports.activities a WHERE {clause} \
         ORDER BY a.start_at, a.name"
    );

    let mut query = sqlx::query(&sql);
    for value in binds {
        query = match value {
            SqlValue::Uuid(value) => query.bind(value),
            SqlValue::Timestamp(value) => query.bind(value),
            SqlValue::Text(value) => query.bind(value),
        };
    }

    let rows = query.fetch_all(pool).await?;
    let mut activities = rows
        .iter()
        .map(activity_from_row)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let ids: Vec<Uuid> = activities.iter().map(|activity| activity.id).collect();
    let worker_rows = sqlx::query(
        r#"
        SELECT aw.activity_id, w.id, w.full_name, w.role
        FROM museum_reports.activity_workers aw
        JOIN museum_reports.workers w ON w.id = aw.worker_id
        WHERE aw.activity_id = ANY($1)
        ORDER BY aw.activity_id, aw.position
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut workers: HashMap<Uuid, Vec<WorkerRef>> = HashMap::new();
    for row in worker_rows {
        workers
            .entry(row.get("activity_id"))
            .or_default()
            .push(WorkerRef {
                id: row.get("id"),
                name: row.get("full_name"),
                role: row.get("role"),
            });
    }

    for activity in &mut activities {
        activity.workers = workers.remove(&activity.id).unwrap_or_default();
    }

    Ok(activities)
}

/// Activities selected by `filter`, ordered by start time.
pub async fn fetch_activities(
    pool: &PgPool,
    filter: &ActivityFilter,
) -> anyhow::Result<Vec<ActivityRecord>> {
    let (clause, binds) = filter.where_clause();
    load_activities(pool, &clause, binds).await
}

pub async fn find_activity_id(
    pool: &PgPool,
    museum_id: Uuid,
    name: &str,
    starts_on: NaiveDate,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        SELECT id FROM museum_reports.activities
        WHERE museum_id = $1 AND name = $2 AND start_at::date = $3
        ORDER BY start_at
        LIMIT 1
        "#,
    )
    .bind(museum_id)
    .bind(name)
    .bind(starts_on)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no activity '{name}' starting on {starts_on}"))?
    .get("id");
    Ok(id)
}

/// Postgres-backed activity store and calendar.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn service(pool: &PgPool) -> ActivityService<PgStore, PgStore> {
        ActivityService::new(PgStore::new(pool.clone()), PgStore::new(pool.clone()))
    }
}

async fn insert_activity_workers(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    activity: &ActivityRecord,
) -> anyhow::Result<()> {
    for (position, worker) in activity.workers.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO museum_reports.activity_workers (activity_id, worker_id, position)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(activity.id)
        .bind(worker.id)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn load_activity(&self, id: Uuid) -> anyhow::Result<Option<ActivityRecord>> {
        let mut found = load_activities(&self.pool, "a.id = $1", vec![SqlValue::Uuid(id)]).await?;
        Ok(found.pop())
    }

    async fn insert_activity(&self, activity: &ActivityRecord) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO museum_reports.activities
            (id, museum_id, name, start_at, end_at, kind, status, capacity, cost, room, audience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(activity.id)
        .bind(activity.museum_id)
        .bind(&activity.name)
        .bind(activity.start)
        .bind(activity.end)
        .bind(activity.kind.code())
        .bind(activity.status.code())
        .bind(activity.capacity)
        .bind(activity.cost)
        .bind(&activity.room)
        .bind(activity.audience.code())
        .execute(&mut *tx)
        .await?;
        insert_activity_workers(&mut tx, activity).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_activity(&self, activity: &ActivityRecord) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            UPDATE museum_reports.activities
            SET name = $2, start_at = $3, end_at = $4, kind = $5, status = $6,
                capacity = $7, cost = $8, room = $9, audience = $10
            WHERE id = $1
            "#,
        )
        .bind(activity.id)
        .bind(&activity.name)
        .bind(activity.start)
        .bind(activity.end)
        .bind(activity.kind.code())
        .bind(activity.status.code())
        .bind(activity.capacity)
        .bind(activity.cost)
        .bind(&activity.room)
        .bind(activity.audience.code())
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM museum_reports.activity_workers WHERE activity_id = $1")
            .bind(activity.id)
            .execute(&mut *tx)
            .await?;
        insert_activity_workers(&mut tx, activity).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_activity(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM museum_reports.activities WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM museum_reports.calendar_events WHERE activity_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_attendance(&self, record: &AttendanceRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO museum_reports.attendance_records
            (id, activity_id, recorded_on, attendees, age_bracket, origin, satisfaction, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.activity_id)
        .bind(record.date)
        .bind(record.attendees)
        .bind(record.age_bracket.code())
        .bind(record.origin.code())
        .bind(record.satisfaction)
        .bind(&record.comments)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CalendarSync for PgStore {
    async fn upsert_event(&self, event: &CalendarEvent) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO museum_reports.calendar_events
            (activity_id, title, start_at, stop_at, location, attendee_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (activity_id) DO UPDATE
            SET title = EXCLUDED.title, start_at = EXCLUDED.start_at,
                stop_at = EXCLUDED.stop_at, location = EXCLUDED.location,
                attendee_ids = EXCLUDED.attendee_ids, updated_at = now()
            "#,
        )
        .bind(event.activity_id)
        .bind(&event.title)
        .bind(event.start)
        .bind(event.stop)
        .bind(&event.location)
        .bind(&event.attendee_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_event(&self, activity_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM museum_reports.calendar_events WHERE activity_id = $1")
            .bind(activity_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn stored_from_row(row: &PgRow) -> anyhow::Result<StoredReport> {
    let request: String = row.get("request");
    let result: Option<String> = row.get("result");
    let state: String = row.get("state");
    let auto_period: Option<String> = row.get("auto_period");

    let id: Uuid = row.get("id");
    StoredReport::decode(
        id,
        &request,
        &state,
        auto_period.as_deref(),
        result.as_deref(),
    )
    .with_context(|| format!("stored report {id} is corrupt"))
}

pub async fn insert_report(pool: &PgPool, request: &ReportRequest) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO museum_reports.reports
        (id, museum_id, name, kind, request, state, period_from, period_to)
        VALUES ($1, $2, $3, $4, $5::jsonb, 'draft', $6, $7)
        "#,
    )
    .bind(id)
    .bind(request.museum_id)
    .bind(&request.name)
    .bind(request.kind.code())
    .bind(to_json(request)?)
    .bind(request.period.from)
    .bind(request.period.to)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn save_result(pool: &PgPool, id: Uuid, result: &ReportResult) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE museum_reports.reports
        SET result = $2::jsonb, state = 'generated', generated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(to_json(result)?)
    .bind(result.generated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn load_report(pool: &PgPool, id: Uuid) -> anyhow::Result<StoredReport> {
    let row = sqlx::query(
        r#"
        SELECT id, request::text AS request, result::text AS result, state, auto_period
        FROM museum_reports.reports
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no report with id {id}"))?;

    stored_from_row(&row)
}

pub async fn mark_exported(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE museum_reports.reports SET state = $2, exported_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(ReportState::Exported.code())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn existing_period_keys(
    pool: &PgPool,
    period: AutoPeriod,
) -> anyhow::Result<HashSet<PeriodKey>> {
    let rows = sqlx::query(
        r#"
        SELECT museum_id, period_from, period_to
        FROM museum_reports.reports
        WHERE auto_period = $1
        "#,
    )
    .bind(period.code())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PeriodKey {
            museum_id: row.get("museum_id"),
            period,
            range: DateRange {
                from: row.get("period_from"),
                to: row.get("period_to"),
            },
        })
        .collect())
}

/// Stores an automatic report; a concurrent run that got there first wins.
pub async fn insert_scheduled(pool: &PgPool, scheduled: &ScheduledReport) -> anyhow::Result<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO museum_reports.reports
        (id, museum_id, name, kind, request, result, statistics, state, auto_period,
         period_from, period_to, generated_at)
        VALUES ($1, $2, $3, $4, $5::jsonb, $6::jsonb, $7::jsonb, 'generated', $8, $9, $10, $11)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(scheduled.key.museum_id)
    .bind(&scheduled.request.name)
    .bind(scheduled.request.kind.code())
    .bind(to_json(&scheduled.request)?)
    .bind(to_json(&scheduled.result)?)
    .bind(to_json(&scheduled.statistics)?)
    .bind(scheduled.key.period.code())
    .bind(scheduled.key.range.from)
    .bind(scheduled.key.range.to)
    .bind(scheduled.result.generated_at)
    .execute(pool)
    .await?;

    Ok(inserted.rows_affected() > 0)
}

pub async fn cleanup_drafts(pool: &PgPool, older_than: DateTime<Utc>) -> anyhow::Result<u64> {
    let result = sqlx::query(
        "DELETE FROM museum_reports.reports WHERE state = 'draft' AND created_at < $1",
    )
    .bind(older_than)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Makes `image_id` the only primary image of its museum.
pub async fn set_primary_image(pool: &PgPool, image_id: Uuid) -> anyhow::Result<Uuid> {
    let mut tx = pool.begin().await?;

    let museum_id: Uuid = sqlx::query(
        r#"
        SELECT museum_id FROM museum_reports.gallery_images
        WHERE id = $1 AND active
        FOR UPDATE
        "#,
    )
    .bind(image_id)
    .fetch_optional(&mut *tx)
    .await?
    .with_context(|| format!("no active gallery image with id {image_id}"))?
    .get("museum_id");

    sqlx::query(
        r#"
        UPDATE museum_reports.gallery_images
        SET is_primary = FALSE
        WHERE museum_id = $1 AND is_primary AND id <> $2
        "#,
    )
    .bind(museum_id)
    .bind(image_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE museum_reports.gallery_images SET is_primary = TRUE WHERE id = $1")
        .bind(image_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(museum_id)
}

fn parse_timestamp(value: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), CSV_TIMESTAMP)
        .with_context(|| format!("'{value}' is not a '{CSV_TIMESTAMP}' timestamp"))
}

/// Parses `Name|Role;Name|Role` worker lists.
pub(crate) fn parse_worker_list(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('|') {
            Some((name, role)) => (name.trim().to_string(), role.trim().to_string()),
            None => (entry.to_string(), String::new()),
        })
        .collect()
}

pub async fn import_activities(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        museum: String,
        name: String,
        start: String,
        end: String,
        kind: String,
        status: Option<String>,
        capacity: Option<i32>,
        cost: Option<f64>,
        room: Option<String>,
        audience: Option<String>,
        workers: Option<String>,
    }

    let service = PgStore::service(pool);
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let museum = upsert_museum(pool, &row.museum).await?;

        let mut workers = Vec::new();
        for (name, role) in parse_worker_list(row.workers.as_deref().unwrap_or("")) {
            workers.push(upsert_worker(pool, &name, &role).await?);
        }

        let draft = ActivityDraft {
            museum_id: museum.id,
            name: row.name,
            start: parse_timestamp(&row.start)?,
            end: parse_timestamp(&row.end)?,
            kind: row.kind.parse::<ActivityKind>()?,
            status: row
                .status
                .as_deref()
                .map(str::parse::<ActivityStatus>)
                .transpose()?
                .unwrap_or_default(),
            capacity: row.capacity.unwrap_or(DEFAULT_CAPACITY),
            cost: row.cost.unwrap_or(0.0),
            room: row.room.filter(|room| !room.trim().is_empty()),
            audience: row
                .audience
                .as_deref()
                .map(str::parse::<TargetAudience>)
                .transpose()?
                .unwrap_or_default(),
            workers,
        };

        service
            .create(draft)
            .await
            .with_context(|| format!("row {} of {}", line + 2, csv_path.display()))?;
        inserted += 1;
    }

    Ok(inserted)
}

pub async fn import_attendance(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        museum: String,
        activity: String,
        date: NaiveDate,
        attendees: i32,
        age_bracket: Option<String>,
        origin: Option<String>,
        satisfaction: Option<f64>,
        comments: Option<String>,
    }

    let service = PgStore::service(pool);
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let museum = find_museum(pool, &row.museum).await?;
        let activity_id = find_activity_id(pool, museum.id, &row.activity, row.date).await?;

        let draft = AttendanceDraft {
            date: row.date,
            attendees: row.attendees,
            age_bracket: row
                .age_bracket
                .as_deref()
                .map(str::parse::<AgeBracket>)
                .transpose()?
                .unwrap_or_default(),
            origin: row
                .origin
                .as_deref()
                .map(str::parse::<Origin>)
                .transpose()?
                .unwrap_or_default(),
            satisfaction: row.satisfaction,
            comments: row.comments.filter(|text| !text.trim().is_empty()),
        };

        match service.record_attendance(activity_id, draft).await {
            Ok(_) => inserted += 1,
            Err(err) => warn!(line = line + 2, error = %err, "skipped attendance row"),
        }
    }

    Ok(inserted)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let museum = upsert_museum(pool, "City History Museum").await?;

    let existing: i64 = sqlx::query(
        "SELECT COUNT(*) AS total FROM museum_reports.activities WHERE museum_id = $1",
    )
    .bind(museum.id)
    .fetch_one(pool)
    .await?
    .get("total");
    if existing > 0 {
        info!(museum = %museum.name, "seed data already present");
        return Ok(());
    }

    let ana = upsert_worker(pool, "Ana Ruiz", "Education Coordinator").await?;
    let luis = upsert_worker(pool, "Luis Gomez", "Curator").await?;
    let marta = upsert_worker(pool, "Marta Diaz", "Guide").await?;

    let at = |y: i32, m: u32, d: u32, h: u32| {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .context("invalid seed timestamp")
    };

    let activities = vec![
        ("Pottery for Families", at(2026, 1, 10, 10)?, at(2026, 1, 10, 12)?,
         ActivityKind::Workshop, TargetAudience::Family, vec![ana.clone()], 10),
        ("Textile Traditions", at(2026, 1, 10, 15)?, at(2026, 1, 10, 16)?,
         ActivityKind::Lecture, TargetAudience::Adults, vec![ana.clone(), luis.clone()], 5),
        ("Old Town Walk", at(2026, 1, 12, 9)?, at(2026, 1, 12, 12)?,
         ActivityKind::GuidedTour, TargetAudience::General, vec![marta.clone()], 20),
        ("Little Archaeologists", at(2026, 2, 3, 10)?, at(2026, 2, 3, 11)?,
         ActivityKind::ChildrensActivity, TargetAudience::Children, vec![ana], 12),
    ];

    let service = PgStore::service(pool);
    for (name, start, end, kind, audience, workers, attendees) in activities {
        let activity = service
            .create(ActivityDraft {
                museum_id: museum.id,
                name: name.to_string(),
                start,
                end,
                kind,
                status: ActivityStatus::Completed,
                capacity: 30,
                cost: 4.0,
                room: Some("Education Room".to_string()),
                audience,
                workers,
            })
            .await?;

        service
            .record_attendance(
                activity.id,
                AttendanceDraft {
                    date: start.date(),
                    attendees,
                    age_bracket: AgeBracket::Mixed,
                    origin: Origin::Local,
                    satisfaction: Some(4.5),
                    comments: None,
                },
            )
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO museum_reports.gallery_images (id, museum_id, title, is_primary)
        VALUES ($1, $2, 'Main facade', TRUE), ($3, $2, 'Textile room', FALSE)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(museum.id)
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_lists_split_names_and_roles() {
        let workers = parse_worker_list("Ana Ruiz|Educator; Luis Gomez ;;");
        assert_eq!(
            workers,
            vec![
                ("Ana Ruiz".to_string(), "Educator".to_string()),
                ("Luis Gomez".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn csv_timestamps_use_minutes() {
        let parsed = parse_timestamp("2026-01-10 09:30").unwrap();
        assert_eq!(parsed.format("%H:%M").to_string(), "09:30");
        assert!(parse_timestamp("10/01/2026").is_err());
    }
}
