pub mod fetcher;
pub mod projection;

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::errors::FetchError;
use crate::models::AttendeeRow;
use crate::store::AttendeeStore;

#[derive(Debug)]
pub struct AttendeeListing {
    pub rows: Vec<AttendeeRow>,
    // None, когда выборка не запускалась (нет подходящих событий)
    pub seat_assignments_included: Option<bool>,
}

/// Полный проход: события организатора -> цепочка выборки -> проекция.
pub async fn list_attendees<S: AttendeeStore + ?Sized>(
    store: &S,
    dashboard: &DashboardConfig,
    date: Option<NaiveDate>,
) -> Result<AttendeeListing, FetchError> {
    let events = store.resolve_events(dashboard, date).await?;
    if events.is_empty() {
        debug!("no qualifying events, skipping attendee fetch");
        return Ok(AttendeeListing {
            rows: Vec::new(),
            seat_assignments_included: None,
        });
    }

    let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();
    let outcome = fetcher::fetch_with_fallback(store, &event_ids, dashboard.max_rows).await?;

    let start_times: HashMap<i64, String> = events
        .iter()
        .map(|e| {
            let local = e.datetime_start.with_timezone(&dashboard.timezone);
            (e.id, local.format(projection::DISPLAY_TIME_FORMAT).to_string())
        })
        .collect();

    let rows = projection::project_rows(outcome.rows, &start_times, dashboard.timezone);
    Ok(AttendeeListing {
        rows,
        seat_assignments_included: Some(outcome.seat_assignments_included),
    })
}
