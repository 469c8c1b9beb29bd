use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::FetchError;
use crate::models::AttendeeRow;
use crate::presentation::{self, AttendeeGroup};
use crate::services;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/attendees", get(list_attendees))
        .route("/attendees/grouped", get(list_attendees_grouped))
}

#[derive(Debug, Deserialize)]
pub struct AttendeesQuery {
    pub date: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    host_user_id: i64,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    seat_assignments_included: Option<bool>,
}

#[derive(Debug, Serialize)]
struct AttendeesResponse {
    results: Vec<AttendeeRow>,
    metadata: Metadata,
}

#[derive(Debug, Serialize)]
struct GroupedResponse {
    groups: Vec<AttendeeGroup>,
    metadata: Metadata,
}

// невалидную дату игнорируем и показываем все события (как и раньше)
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

// 503 только на недоступность БД, все остальное - 500; детали
// отдаем только вне production
fn error_response(err: &FetchError, production: bool) -> (StatusCode, Json<Value>) {
    let (status, message) = match err {
        FetchError::DataAccess(_) => (StatusCode::SERVICE_UNAVAILABLE, "База данных недоступна"),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Не удалось получить список участников",
        ),
    };
    let body = if production {
        json!({ "error": message })
    } else {
        json!({ "error": message, "details": format!("{:?}", err) })
    };
    (status, Json(body))
}

// GET /api/attendees?date=YYYY-MM-DD
async fn list_attendees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AttendeesQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let date = parse_date(params.date.as_deref());

    let listing = services::list_attendees(&state.store, &state.config.dashboard, date)
        .await
        .map_err(|e| {
            tracing::error!("list_attendees failed: {:?}", e);
            error_response(&e, state.config.app.is_production())
        })?;

    let metadata = Metadata {
        host_user_id: state.config.dashboard.host_user_id,
        total: listing.rows.len(),
        seat_assignments_included: listing.seat_assignments_included,
    };

    Ok((
        StatusCode::OK,
        Json(AttendeesResponse {
            results: listing.rows,
            metadata,
        }),
    ))
}

// GET /api/attendees/grouped?date=YYYY-MM-DD&q=ana - серверный вариант
// клиентской группировки
async fn list_attendees_grouped(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AttendeesQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let date = parse_date(params.date.as_deref());

    let listing = services::list_attendees(&state.store, &state.config.dashboard, date)
        .await
        .map_err(|e| {
            tracing::error!("list_attendees_grouped failed: {:?}", e);
            error_response(&e, state.config.app.is_production())
        })?;

    let filtered = presentation::filter_by_name(listing.rows, params.q.as_deref().unwrap_or(""));
    let total = filtered.len();
    let groups = presentation::group_rows(filtered);

    let metadata = Metadata {
        host_user_id: state.config.dashboard.host_user_id,
        total,
        seat_assignments_included: listing.seat_assignments_included,
    };

    Ok((StatusCode::OK, Json(GroupedResponse { groups, metadata })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_date_is_ignored() {
        assert_eq!(parse_date(Some("not-a-date")), None);
        assert_eq!(
            parse_date(Some("2024-01-15")),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn data_access_maps_to_503() {
        let err = FetchError::DataAccess(sqlx::Error::PoolClosed);
        let (status, _) = error_response(&err, true);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn exhausted_timeout_maps_to_generic_500() {
        let (status, Json(body)) = error_response(&FetchError::RetryableTimeout, true);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("details").is_none());
    }

    #[test]
    fn details_present_outside_production() {
        let (_, Json(body)) = error_response(&FetchError::RetryableTimeout, false);
        assert!(body.get("details").is_some());
    }
}
