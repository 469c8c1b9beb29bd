use chrono_tz::Tz;
use std::collections::HashMap;

use crate::models::{AttendeeRow, RawAttendeeRow, SeatComponent};

// Формат отображения времени; presentation разбирает его обратно
// при сортировке групп
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const MISSING: &str = "-";

/// Проекция сырых строк join'а в строки таблицы. `start_times` - уже
/// отформатированное время начала по id события (готовит оркестрация).
pub fn project_rows(
    rows: Vec<RawAttendeeRow>,
    start_times: &HashMap<i64, String>,
    tz: Tz,
) -> Vec<AttendeeRow> {
    rows.into_iter()
        .map(|row| project_row(row, start_times, tz))
        .collect()
}

fn project_row(row: RawAttendeeRow, start_times: &HashMap<i64, String>, tz: Tz) -> AttendeeRow {
    AttendeeRow {
        event_start_time: start_times
            .get(&row.event_id)
            .cloned()
            .unwrap_or_else(|| MISSING.to_string()),
        attendee_name: display_name(row.first_name.as_deref(), row.last_name.as_deref()),
        seat_info: seat_display(
            row.seat_label.as_deref(),
            row.seat_components.as_deref().map(|c| c.as_slice()),
        ),
        validated_at: row
            .checked_in_at
            .map(|t| t.with_timezone(&tz).format(DISPLAY_TIME_FORMAT).to_string())
            .unwrap_or_else(|| MISSING.to_string()),
    }
}

// "имя фамилия", либо та половина, которая есть, либо "Unknown"
fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let first = first.map(str::trim).filter(|s| !s.is_empty());
    let last = last.map(str::trim).filter(|s| !s.is_empty());
    match (first, last) {
        (Some(f), Some(l)) => format!("{} {}", f, l),
        (Some(f), None) => f.to_string(),
        (None, Some(l)) => l.to_string(),
        (None, None) => "Unknown".to_string(),
    }
}

// Приоритет: сырая метка места, затем структурированное описание
// парами "label: value", иначе None (в UI рисуется прочерк)
fn seat_display(label: Option<&str>, components: Option<&[SeatComponent]>) -> Option<String> {
    if let Some(l) = label {
        if !l.trim().is_empty() {
            return Some(l.to_string());
        }
    }
    let parts: Vec<String> = components?
        .iter()
        .map(|c| format!("{}: {}", c.label, c.value))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;

    fn tz() -> Tz {
        "America/New_York".parse().unwrap()
    }

    fn raw(event_id: i64, attendee_id: i64) -> RawAttendeeRow {
        RawAttendeeRow {
            event_id,
            attendee_id,
            first_name: Some("Ana".to_string()),
            last_name: Some("Lee".to_string()),
            seat_assignment_id: None,
            seat_label: None,
            seat_components: None,
            checked_in_at: None,
        }
    }

    #[test]
    fn raw_label_wins_over_components() {
        let label = Some("CAR 4-Seat 25");
        let components = [
            SeatComponent { label: "Car".to_string(), value: "9".to_string() },
        ];
        assert_eq!(
            seat_display(label, Some(&components)),
            Some("CAR 4-Seat 25".to_string())
        );
    }

    #[test]
    fn components_join_as_labeled_pairs() {
        let components = [
            SeatComponent { label: "Car".to_string(), value: "4".to_string() },
            SeatComponent { label: "Seat".to_string(), value: "25".to_string() },
        ];
        assert_eq!(
            seat_display(None, Some(&components)),
            Some("Car: 4, Seat: 25".to_string())
        );
    }

    #[test]
    fn empty_seat_data_resolves_to_none() {
        assert_eq!(seat_display(None, None), None);
        assert_eq!(seat_display(Some("  "), Some(&[])), None);
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(display_name(Some("Ana"), Some("Lee")), "Ana Lee");
        assert_eq!(display_name(Some("Ana"), None), "Ana");
        assert_eq!(display_name(None, Some("Lee")), "Lee");
        assert_eq!(display_name(None, None), "Unknown");
        assert_eq!(display_name(Some(" "), Some("Lee")), "Lee");
    }

    #[test]
    fn attendee_without_seat_still_projects_one_row() {
        let start_times = HashMap::from([(1_i64, "2024-01-15 18:00".to_string())]);
        let rows = project_rows(vec![raw(1, 11)], &start_times, tz());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_start_time, "2024-01-15 18:00");
        assert_eq!(rows[0].seat_info, None);
        assert_eq!(rows[0].validated_at, "-");
    }

    #[test]
    fn unknown_event_time_renders_dash() {
        let rows = project_rows(vec![raw(7, 11)], &HashMap::new(), tz());
        assert_eq!(rows[0].event_start_time, "-");
    }

    #[test]
    fn check_in_is_converted_to_dashboard_zone() {
        let mut row = raw(1, 11);
        // 23:30 UTC = 18:30 EST
        row.checked_in_at = Some(Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap());
        row.seat_components = Some(Json(vec![SeatComponent {
            label: "Table".to_string(),
            value: "7".to_string(),
        }]));
        let start_times = HashMap::from([(1_i64, "2024-01-15 18:00".to_string())]);
        let rows = project_rows(vec![row], &start_times, tz());
        assert_eq!(rows[0].validated_at, "2024-01-15 18:30");
        assert_eq!(rows[0].seat_info, Some("Table: 7".to_string()));
    }
}
