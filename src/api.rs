//! API types and request handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock;
use crate::config::AppConfig;
use crate::db::{NewSleepRecord, SleepRecordChanges};
use crate::error::ApiError;
use crate::AppState;

// ============================================================================
// Wire types
// ============================================================================

/// One day of sleep data, exactly one row per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub id: Option<i64>,
    pub date: String,
    pub wake_time: Option<String>,
    pub sleep_time: Option<String>,
    pub sleep_duration: Option<f64>,
}

/// Body of `POST /record`
///
/// `record_type` stays a plain string so an unknown kind reaches the
/// handler's own checks instead of being rejected during deserialization.
#[derive(Debug, Deserialize)]
pub struct TimeRecordRequest {
    pub auth_code: String,
    pub record_type: String,
}

/// The two recognized event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Wake,
    Sleep,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Wake => write!(f, "wake"),
            RecordKind::Sleep => write!(f, "sleep"),
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wake" => Ok(RecordKind::Wake),
            "sleep" => Ok(RecordKind::Sleep),
            _ => Err("record_type must be \"wake\" or \"sleep\"".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub message: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    30
}

#[derive(Debug, Serialize)]
pub struct RecordsListResponse {
    pub success: bool,
    pub records: Vec<SleepRecord>,
}

#[derive(Debug, Serialize)]
pub struct RecordLookupResponse {
    pub success: bool,
    pub record: Option<SleepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Event validation and upsert decision
// ============================================================================

/// Check the auth code for the claimed kind, then the kind itself.
///
/// The order matters: a bad code for a known kind is Unauthorized, an
/// unrecognized kind is BadRequest regardless of the code.
fn authorize_event(
    record_type: &str,
    auth_code: &str,
    config: &AppConfig,
) -> Result<RecordKind, ApiError> {
    if record_type == "wake" && auth_code != config.wake_code {
        return Err(ApiError::Unauthorized("Invalid wake auth code".to_string()));
    }
    if record_type == "sleep" && auth_code != config.sleep_code {
        return Err(ApiError::Unauthorized("Invalid sleep auth code".to_string()));
    }
    record_type.parse().map_err(ApiError::BadRequest)
}

/// Fields to write for an event, given today's existing record if any.
///
/// A wake event on a day that already has a sleep time also stores the
/// computed sleep duration.
fn changes_for_event(
    kind: RecordKind,
    time: &str,
    existing: Option<&SleepRecord>,
) -> SleepRecordChanges {
    match kind {
        RecordKind::Wake => {
            let sleep_duration = existing
                .and_then(|record| record.sleep_time.as_deref())
                .map(|sleep_time| clock::calculate_sleep_duration(sleep_time, time));

            SleepRecordChanges {
                wake_time: Some(time.to_string()),
                sleep_duration,
                ..Default::default()
            }
        }
        RecordKind::Sleep => SleepRecordChanges {
            sleep_time: Some(time.to_string()),
            ..Default::default()
        },
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /record` — record a wake or sleep event at the current KST time
pub async fn record_time(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TimeRecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let kind = authorize_event(&request.record_type, &request.auth_code, &state.config)?;

    let now = clock::kst_now();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();

    let existing = state
        .store
        .find_by_date(&date)
        .await
        .map_err(ApiError::database)?;

    let changes = changes_for_event(kind, &time, existing.as_ref());

    if existing.is_some() {
        state
            .store
            .update(&date, &changes)
            .await
            .map_err(ApiError::database)?;
    } else {
        let record = NewSleepRecord {
            date: date.clone(),
            wake_time: changes.wake_time.clone(),
            sleep_time: changes.sleep_time.clone(),
        };
        state.store.insert(&record).await.map_err(ApiError::database)?;
    }

    tracing::info!(%kind, %date, %time, "event recorded");

    let message = match kind {
        RecordKind::Wake => "Wake time recorded".to_string(),
        RecordKind::Sleep => "Sleep time recorded".to_string(),
    };

    Ok(Json(RecordResponse {
        success: true,
        message,
        date,
        time,
    }))
}

/// `GET /records?limit=N` — most recent records, newest date first
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<RecordsListResponse>, ApiError> {
    let records = state
        .store
        .list_recent(params.limit)
        .await
        .map_err(ApiError::database)?;

    Ok(Json(RecordsListResponse {
        success: true,
        records,
    }))
}

/// `GET /records/{date}` — exact-date lookup; a miss is data, not an error
pub async fn get_record_by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<RecordLookupResponse>, ApiError> {
    let record = state
        .store
        .find_by_date(&date)
        .await
        .map_err(ApiError::database)?;

    let message = record
        .is_none()
        .then(|| "No record for that date".to_string());

    Ok(Json(RecordLookupResponse {
        success: true,
        record,
        message,
    }))
}

/// `GET /health`
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"success": true, "status": "healthy"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            supabase_url: "https://example.supabase.co".to_string(),
            supabase_key: "key".to_string(),
            port: 8000,
            static_dir: "./static".into(),
            wake_code: "666".to_string(),
            sleep_code: "999".to_string(),
        }
    }

    fn record_with_sleep(sleep_time: &str) -> SleepRecord {
        SleepRecord {
            id: Some(1),
            date: "2024-01-15".to_string(),
            wake_time: None,
            sleep_time: Some(sleep_time.to_string()),
            sleep_duration: None,
        }
    }

    #[test]
    fn test_authorize_valid_codes() {
        let config = test_config();
        assert_eq!(
            authorize_event("wake", "666", &config).unwrap(),
            RecordKind::Wake
        );
        assert_eq!(
            authorize_event("sleep", "999", &config).unwrap(),
            RecordKind::Sleep
        );
    }

    #[test]
    fn test_authorize_wrong_wake_code() {
        let config = test_config();
        let err = authorize_event("wake", "999", &config).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_authorize_wrong_sleep_code() {
        let config = test_config();
        let err = authorize_event("sleep", "666", &config).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_authorize_unknown_kind_is_bad_request() {
        // An unknown kind skips both auth checks, whatever the code
        let config = test_config();
        let err = authorize_event("nap", "666", &config).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = authorize_event("nap", "wrong", &config).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_changes_first_wake_of_day() {
        let changes = changes_for_event(RecordKind::Wake, "06:30:00", None);
        assert_eq!(changes.wake_time.as_deref(), Some("06:30:00"));
        assert_eq!(changes.sleep_time, None);
        assert_eq!(changes.sleep_duration, None);
    }

    #[test]
    fn test_changes_first_sleep_of_day() {
        let changes = changes_for_event(RecordKind::Sleep, "23:30:00", None);
        assert_eq!(changes.sleep_time.as_deref(), Some("23:30:00"));
        assert_eq!(changes.wake_time, None);
        assert_eq!(changes.sleep_duration, None);
    }

    #[test]
    fn test_changes_wake_after_sleep_computes_duration() {
        let existing = record_with_sleep("23:30:00");
        let changes = changes_for_event(RecordKind::Wake, "06:30:00", Some(&existing));
        assert_eq!(changes.wake_time.as_deref(), Some("06:30:00"));
        assert_eq!(changes.sleep_duration, Some(7.0));
    }

    #[test]
    fn test_changes_wake_without_stored_sleep_has_no_duration() {
        let existing = SleepRecord {
            id: Some(1),
            date: "2024-01-15".to_string(),
            wake_time: Some("06:00:00".to_string()),
            sleep_time: None,
            sleep_duration: None,
        };
        let changes = changes_for_event(RecordKind::Wake, "06:30:00", Some(&existing));
        assert_eq!(changes.sleep_duration, None);
    }

    #[test]
    fn test_changes_sleep_never_sets_duration() {
        let existing = record_with_sleep("22:00:00");
        let changes = changes_for_event(RecordKind::Sleep, "23:30:00", Some(&existing));
        assert_eq!(changes.sleep_time.as_deref(), Some("23:30:00"));
        assert_eq!(changes.sleep_duration, None);
    }

    #[test]
    fn test_record_kind_round_trip() {
        assert_eq!("wake".parse::<RecordKind>().unwrap(), RecordKind::Wake);
        assert_eq!("sleep".parse::<RecordKind>().unwrap(), RecordKind::Sleep);
        assert!("Wake".parse::<RecordKind>().is_err());
        assert_eq!(RecordKind::Wake.to_string(), "wake");
        assert_eq!(RecordKind::Sleep.to_string(), "sleep");
    }

    #[test]
    fn test_lookup_miss_serializes_null_record() {
        let response = RecordLookupResponse {
            success: true,
            record: None,
            message: Some("No record for that date".to_string()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["record"], serde_json::Value::Null);
        assert_eq!(json["message"], "No record for that date");
    }

    #[test]
    fn test_lookup_hit_omits_message() {
        let response = RecordLookupResponse {
            success: true,
            record: Some(record_with_sleep("23:30:00")),
            message: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("message").is_none());
        assert_eq!(json["record"]["sleep_time"], "23:30:00");
    }

    #[test]
    fn test_list_params_default_limit() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 30);

        let params: ListParams = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(params.limit, 5);
    }
}
