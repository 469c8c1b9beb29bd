use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::AttendeeRow;
use crate::services::projection::DISPLAY_TIME_FORMAT;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeGroup {
    pub event_start_time: String,
    pub attendees: Vec<AttendeeRow>,
}

/// Фильтр по имени: подстрока без учета регистра, пустой запрос
/// пропускает все строки
pub fn filter_by_name(rows: Vec<AttendeeRow>, query: &str) -> Vec<AttendeeRow> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| r.attendee_name.to_lowercase().contains(&q))
        .collect()
}

/// Группировка по строке времени события (именно по строке, см. DESIGN.md),
/// сортировка мест внутри группы и групп между собой.
pub fn group_rows(rows: Vec<AttendeeRow>) -> Vec<AttendeeGroup> {
    let mut groups: Vec<AttendeeGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let i = match index.get(&row.event_start_time) {
            Some(&i) => i,
            None => {
                index.insert(row.event_start_time.clone(), groups.len());
                groups.push(AttendeeGroup {
                    event_start_time: row.event_start_time.clone(),
                    attendees: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[i].attendees.push(row);
    }

    for group in &mut groups {
        group
            .attendees
            .sort_by_key(|r| seat_sort_key(r.seat_info.as_deref()));
    }
    groups.sort_by_key(|g| display_time_key(&g.event_start_time));
    groups
}

// (вагон, место); отсутствующее или нераспознанное место уходит в конец
fn seat_sort_key(seat: Option<&str>) -> (u64, u64) {
    seat.and_then(parse_seat).unwrap_or((u64::MAX, u64::MAX))
}

// нераспознанное время группы - в конец
fn display_time_key(display: &str) -> (bool, i64) {
    match NaiveDateTime::parse_from_str(display, DISPLAY_TIME_FORMAT) {
        Ok(t) => (false, t.and_utc().timestamp()),
        Err(_) => (true, 0),
    }
}

/// Разбор меток вида "CAR 4 - Seat 25" / "car2-Table 7": регистр
/// и разделители свободные, номер вагона и номер места обязательны
pub fn parse_seat(s: &str) -> Option<(u64, u64)> {
    let lower = s.trim().to_lowercase();
    let rest = lower.strip_prefix("car")?;
    let (car, rest) = take_number(rest)?;
    let rest = rest.trim_start_matches(is_separator);
    let rest = rest
        .strip_prefix("seat")
        .or_else(|| rest.strip_prefix("table"))?;
    let (seat, _) = take_number(rest)?;
    Some((car, seat))
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == ':' || c == '#' || c == '.'
}

fn take_number(s: &str) -> Option<(u64, &str)> {
    let s = s.trim_start_matches(is_separator);
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}
