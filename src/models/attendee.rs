use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// Компонент структурированного описания места, например {"label": "Car", "value": "4"}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatComponent {
    pub label: String,
    pub value: String,
}

// Сырая строка из join'а участников с местами. Одна строка на пару
// (участник, место-или-ничего); у участника без места поля места NULL.
#[derive(Debug, Clone, FromRow)]
pub struct RawAttendeeRow {
    pub event_id: i64,
    pub attendee_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub seat_assignment_id: Option<i64>,
    pub seat_label: Option<String>,
    pub seat_components: Option<Json<Vec<SeatComponent>>>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl RawAttendeeRow {
    // Принудительно убрать данные о местах (стратегия без join'а мест)
    pub fn without_seat(mut self) -> Self {
        self.seat_assignment_id = None;
        self.seat_label = None;
        self.seat_components = None;
        self.checked_in_at = None;
        self
    }
}

// Итоговая строка для таблицы дашборда
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRow {
    pub event_start_time: String,
    pub attendee_name: String,
    pub seat_info: Option<String>,
    pub validated_at: String,
}
