use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ReportError, Result};
use crate::models::{
    ActivityKind, ActivityRecord, ActivityStatus, AgeBracket, AttendanceRecord, Origin,
    TargetAudience, WorkerRef,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub museum_id: Uuid,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: ActivityKind,
    pub status: ActivityStatus,
    pub capacity: i32,
    pub cost: f64,
    pub room: Option<String>,
    pub audience: TargetAudience,
    pub workers: Vec<WorkerRef>,
}

impl ActivityDraft {
    fn into_record(self, id: Uuid, confirmed_attendees: i64) -> ActivityRecord {
        ActivityRecord {
            id,
            museum_id: self.museum_id,
            name: self.name,
            start: self.start,
            end: self.end,
            kind: self.kind,
            status: self.status,
            workers: self.workers,
            capacity: self.capacity,
            confirmed_attendees,
            cost: self.cost,
            room: self.room,
            audience: self.audience,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceDraft {
    pub date: NaiveDate,
    pub attendees: i32,
    pub age_bracket: AgeBracket,
    pub origin: Origin,
    pub satisfaction: Option<f64>,
    pub comments: Option<String>,
}

pub fn validate_activity(activity: &ActivityRecord) -> Result<()> {
    if activity.name.trim().is_empty() {
        return Err(ReportError::Validation("activity name is required".to_string()));
    }
    if activity.start > activity.end {
        return Err(ReportError::Validation(format!(
            "activity '{}' starts after it ends",
            activity.name
        )));
    }
    if activity.capacity < 0 {
        return Err(ReportError::Validation(format!(
            "activity '{}' has a negative capacity",
            activity.name
        )));
    }
    check_capacity(activity, activity.confirmed_attendees)
}

pub fn check_capacity(activity: &ActivityRecord, confirmed_attendees: i64) -> Result<()> {
    if confirmed_attendees > activity.capacity as i64 {
        return Err(ReportError::Validation(format!(
            "activity '{}' would have {} attendees, above its capacity of {}",
            activity.name, confirmed_attendees, activity.capacity
        )));
    }
    Ok(())
}

pub fn validate_attendance(draft: &AttendanceDraft) -> Result<()> {
    if draft.attendees < 1 {
        return Err(ReportError::Validation(
            "an attendance record needs at least one attendee".to_string(),
        ));
    }
    if let Some(score) = draft.satisfaction {
        if !(1.0..=5.0).contains(&score) {
            return Err(ReportError::Validation(format!(
                "satisfaction {score} is outside 1-5"
            )));
        }
    }
    Ok(())
}

/// Calendar entry mirroring one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub activity_id: Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub location: Option<String>,
    pub attendee_ids: Vec<Uuid>,
}

impl CalendarEvent {
    pub fn for_activity(activity: &ActivityRecord) -> Self {
        CalendarEvent {
            activity_id: activity.id,
            title: activity.name.clone(),
            start: activity.start,
            stop: activity.end,
            location: activity.room.clone(),
            attendee_ids: activity.workers.iter().map(|worker| worker.id).collect(),
        }
    }
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn load_activity(&self, id: Uuid) -> anyhow::Result<Option<ActivityRecord>>;
    async fn insert_activity(&self, activity: &ActivityRecord) -> anyhow::Result<()>;
    async fn update_activity(&self, activity: &ActivityRecord) -> anyhow::Result<()>;
    async fn delete_activity(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn insert_attendance(&self, record: &AttendanceRecord) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn upsert_event(&self, event: &CalendarEvent) -> anyhow::Result<()>;
    async fn remove_event(&self, activity_id: Uuid) -> anyhow::Result<()>;
}

/// Activity writes with the calendar kept in step after each one.
pub struct ActivityService<S, C> {
    store: S,
    calendar: C,
}

impl<S: ActivityStore, C: CalendarSync> ActivityService<S, C> {
    pub fn new(store: S, calendar: C) -> Self {
        Self { store, calendar }
    }

    pub async fn create(&self, draft: ActivityDraft) -> anyhow::Result<ActivityRecord> {
        let activity = draft.into_record(Uuid::new_v4(), 0);
        validate_activity(&activity)?;

        self.store.insert_activity(&activity).await?;
        self.calendar
            .upsert_event(&CalendarEvent::for_activity(&activity))
            .await?;

        info!(activity = %activity.name, id = %activity.id, "activity created");
        Ok(activity)
    }

    pub async fn update(&self, activity: &ActivityRecord) -> anyhow::Result<()> {
        validate_activity(activity)?;

        self.store.update_activity(activity).await?;
        self.calendar
            .upsert_event(&CalendarEvent::for_activity(activity))
            .await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: ActivityStatus,
    ) -> anyhow::Result<ActivityRecord> {
        let mut activity = self
            .store
            .load_activity(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("activity {id} not found"))?;
        activity.status = status;
        self.update(&activity).await?;
        info!(activity = %activity.name, status = status.code(), "activity status changed");
        Ok(activity)
    }

    pub async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = self.store.delete_activity(id).await?;
        if deleted {
            if let Err(err) = self.calendar.remove_event(id).await {
                warn!(%id, error = %err, "activity deleted but its calendar event remains");
            }
            info!(%id, "activity deleted");
        } else {
            warn!(%id, "no activity to delete");
        }
        Ok(deleted)
    }

    pub async fn record_attendance(
        &self,
        activity_id: Uuid,
        draft: AttendanceDraft,
    ) -> anyhow::Result<AttendanceRecord> {
        validate_attendance(&draft)?;

        let activity = self
            .store
            .load_activity(activity_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("activity {activity_id} not found"))?;
        check_capacity(
            &activity,
            activity.confirmed_attendees + draft.attendees as i64,
        )?;

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            activity_id,
            date: draft.date,
            attendees: draft.attendees,
            age_bracket: draft.age_bracket,
            origin: draft.origin,
            satisfaction: draft.satisfaction,
            comments: draft.comments,
        };
        self.store.insert_attendance(&record).await?;
        Ok(record)
    }
}
