use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReportError, Result};
use crate::period::AutoPeriod;
use crate::report::{ReportRequest, ReportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    Draft,
    Generated,
    Exported,
}

impl ReportState {
    pub fn code(self) -> &'static str {
        match self {
            ReportState::Draft => "draft",
            ReportState::Generated => "generated",
            ReportState::Exported => "exported",
        }
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReportState {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "draft" => Ok(ReportState::Draft),
            "generated" => Ok(ReportState::Generated),
            "exported" => Ok(ReportState::Exported),
            other => Err(ReportError::Validation(format!(
                "unknown report state '{other}'"
            ))),
        }
    }
}

/// A report as kept in the database: the request plus, once generated, the
/// cached result.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub id: Uuid,
    pub request: ReportRequest,
    pub state: ReportState,
    pub auto_period: Option<AutoPeriod>,
    pub result: Option<ReportResult>,
}

impl StoredReport {
    /// Rebuilds a report from its stored columns.
    pub fn decode(
        id: Uuid,
        request: &str,
        state: &str,
        auto_period: Option<&str>,
        result: Option<&str>,
    ) -> Result<Self> {
        Ok(StoredReport {
            id,
            request: serde_json::from_str(request)?,
            state: state.parse()?,
            auto_period: auto_period.map(str::parse).transpose()?,
            result: result.map(serde_json::from_str).transpose()?,
        })
    }

    /// The cached result, or `NotGenerated` while the report is a draft.
    pub fn generated_result(&self) -> Result<&ReportResult> {
        match (&self.state, &self.result) {
            (ReportState::Generated | ReportState::Exported, Some(result)) => Ok(result),
            _ => Err(ReportError::NotGenerated(self.request.name.clone())),
        }
    }
}

/// Serialises a value for a JSONB column.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Drafts created before the returned instant are past retention.
pub fn draft_cutoff(now: DateTime<Utc>, retention_days: i64) -> Result<DateTime<Utc>> {
    if retention_days < 0 {
        return Err(ReportError::Validation(format!(
            "draft retention must not be negative, got {retention_days} days"
        )));
    }
    Duration::try_days(retention_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            ReportError::Validation(format!(
                "draft retention of {retention_days} days is out of range"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::january_request;
    use crate::report::{generate, ReportKind};

    fn stored(state: ReportState, with_result: bool) -> StoredReport {
        let request = january_request(Uuid::new_v4(), ReportKind::ByDate);
        let result = with_result.then(|| generate(&request, &[]).unwrap());
        StoredReport {
            id: Uuid::new_v4(),
            request,
            state,
            auto_period: None,
            result,
        }
    }

    #[test]
    fn drafts_cannot_be_exported() {
        let err = stored(ReportState::Draft, false).generated_result().unwrap_err();
        assert!(matches!(err, ReportError::NotGenerated(ref name) if name == "January"));
        assert!(err.is_input_error());
    }

    #[test]
    fn generated_and_exported_reports_expose_their_result() {
        assert!(stored(ReportState::Generated, true).generated_result().is_ok());
        assert!(stored(ReportState::Exported, true).generated_result().is_ok());
        assert!(stored(ReportState::Generated, false).generated_result().is_err());
    }

    #[test]
    fn stored_columns_decode_back_into_a_report() {
        let report = stored(ReportState::Generated, true);
        let request = to_json(&report.request).unwrap();
        let result = report.result.as_ref().map(|result| to_json(result).unwrap());

        let decoded = StoredReport::decode(
            report.id,
            &request,
            "generated",
            Some("monthly"),
            result.as_deref(),
        )
        .unwrap();
        assert_eq!(decoded.request, report.request);
        assert_eq!(decoded.result, report.result);
        assert_eq!(decoded.auto_period, Some(AutoPeriod::Monthly));
    }

    #[test]
    fn corrupt_stored_json_is_a_serialization_error() {
        let err = StoredReport::decode(Uuid::new_v4(), "{\"name\":", "draft", None, None)
            .unwrap_err();
        assert!(matches!(err, ReportError::Json(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn draft_cutoff_subtracts_the_retention_window() {
        let now = Utc::now();
        assert_eq!(draft_cutoff(now, 30).unwrap(), now - Duration::days(30));
        assert_eq!(draft_cutoff(now, 0).unwrap(), now);
    }

    #[test]
    fn negative_retention_is_rejected() {
        let err = draft_cutoff(Utc::now(), -30).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn oversized_retention_is_rejected_without_panicking() {
        for days in [200_000_000_000_000, 1_000_000_000, i64::MAX] {
            let err = draft_cutoff(Utc::now(), days).unwrap_err();
            assert!(err.is_input_error(), "{days} days");
        }
    }

    #[test]
    fn state_codes_parse() {
        for state in [ReportState::Draft, ReportState::Generated, ReportState::Exported] {
            assert_eq!(state.code().parse::<ReportState>().unwrap(), state);
        }
    }
}
