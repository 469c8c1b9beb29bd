use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;

use crate::config::DashboardConfig;
use crate::errors::FetchError;
use crate::models::{EventSummary, RawAttendeeRow};

/// Порт к хранилищу: выборка событий организатора и строк участник/место.
/// За trait'ом, чтобы цепочку деградации можно было гонять без живой БД.
#[async_trait]
pub trait AttendeeStore: Send + Sync {
    async fn resolve_events(
        &self,
        dashboard: &DashboardConfig,
        date: Option<NaiveDate>,
    ) -> Result<Vec<EventSummary>, FetchError>;

    /// Один join по всем событиям сразу
    async fn fetch_bulk(
        &self,
        event_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError>;

    /// Тот же join, но по одному событию
    async fn fetch_for_event(
        &self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError>;

    /// Только участники, без join'а мест
    async fn fetch_without_seats(
        &self,
        event_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError>;
}

#[derive(Clone)]
pub struct PgAttendeeStore {
    pool: PgPool,
}

impl PgAttendeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Календарный день в заданном поясе как полуинтервал [start, end) в UTC
fn day_bounds(date: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day_start(date, tz)?;
    let end = day_start(date.succ_opt()?, tz)?;
    Some((start, end))
}

// Первый существующий момент суток. Полночь может попасть в разрыв
// перехода на летнее время (в части зон часы переводят ровно в 00:00),
// тогда сдвигаемся вперед до первого валидного локального времени.
fn day_start(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let mut local = date.and_time(NaiveTime::MIN);
    // разрывы не длиннее двух часов, шаг 30 минут их все накрывает
    for _ in 0..=4 {
        if let Some(t) = tz.from_local_datetime(&local).earliest() {
            return Some(t.with_timezone(&Utc));
        }
        local += chrono::Duration::minutes(30);
    }
    None
}

#[async_trait]
impl AttendeeStore for PgAttendeeStore {
    async fn resolve_events(
        &self,
        dashboard: &DashboardConfig,
        date: Option<NaiveDate>,
    ) -> Result<Vec<EventSummary>, FetchError> {
        let bounds = date.and_then(|d| day_bounds(d, dashboard.timezone));
        let (from, to) = match bounds {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        let events = sqlx::query_as::<_, EventSummary>(
            r#"
            SELECT e.id, e.title, e.datetime_start
            FROM events e
            WHERE e.host_user_id = $1
              AND e.title ILIKE '%' || $2 || '%'
              AND e.title NOT ILIKE '%' || $3 || '%'
              AND EXISTS (
                SELECT 1 FROM attendees a
                WHERE a.event_id = e.id AND a.deleted_at IS NULL
              )
              AND ($4::timestamptz IS NULL OR
                   (e.datetime_start >= $4 AND e.datetime_start < $5))
            ORDER BY e.datetime_start DESC
            "#,
        )
        .bind(dashboard.host_user_id)
        .bind(&dashboard.event_name_include)
        .bind(&dashboard.event_name_exclude)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn fetch_bulk(
        &self,
        event_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError> {
        let rows = sqlx::query_as::<_, RawAttendeeRow>(
            r#"
            SELECT a.event_id, a.id AS attendee_id, a.first_name, a.last_name,
                   sa.id AS seat_assignment_id, sa.seat_label,
                   sa.seat_components, sa.checked_in_at
            FROM attendees a
            LEFT JOIN seat_assignments sa ON sa.attendee_id = a.id
            WHERE a.event_id = ANY($1) AND a.deleted_at IS NULL
            ORDER BY a.event_id DESC, a.id DESC, sa.id ASC
            LIMIT $2
            "#,
        )
        .bind(event_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_for_event(
        &self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError> {
        let rows = sqlx::query_as::<_, RawAttendeeRow>(
            r#"
            SELECT a.event_id, a.id AS attendee_id, a.first_name, a.last_name,
                   sa.id AS seat_assignment_id, sa.seat_label,
                   sa.seat_components, sa.checked_in_at
            FROM attendees a
            LEFT JOIN seat_assignments sa ON sa.attendee_id = a.id
            WHERE a.event_id = $1 AND a.deleted_at IS NULL
            ORDER BY a.id DESC, sa.id ASC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_without_seats(
        &self,
        event_ids: &[i64],
        limit: i64,
    ) -> Result<Vec<RawAttendeeRow>, FetchError> {
        let rows = sqlx::query_as::<_, RawAttendeeRow>(
            r#"
            SELECT a.event_id, a.id AS attendee_id, a.first_name, a.last_name,
                   NULL::bigint AS seat_assignment_id, NULL::text AS seat_label,
                   NULL::jsonb AS seat_components, NULL::timestamptz AS checked_in_at
            FROM attendees a
            WHERE a.event_id = ANY($1) AND a.deleted_at IS NULL
            ORDER BY a.event_id DESC, a.id DESC
            LIMIT $2
            "#,
        )
        .bind(event_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_are_half_open_in_utc() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let (from, to) = day_bounds(date, tz).unwrap();
        // EST = UTC-5 зимой
        assert_eq!(from.to_rfc3339(), "2024-01-15T05:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-01-16T05:00:00+00:00");
    }

    #[test]
    fn day_bounds_clamp_to_first_valid_instant_when_midnight_skipped() {
        // в Чили летнее время начинается ровно в полночь:
        // 2024-09-08 00:00 не существует, сутки начинаются с 01:00 -03
        let tz: Tz = "America/Santiago".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let (from, to) = day_bounds(date, tz).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-09-08T04:00:00+00:00");
        assert_eq!((to - from).num_hours(), 23);
    }

    #[test]
    fn day_bounds_cover_dst_transition_day() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (from, to) = day_bounds(date, tz).unwrap();
        // день перехода на летнее время длится 23 часа
        assert_eq!((to - from).num_hours(), 23);
    }
}
