use tracing::warn;

use crate::errors::FetchError;
use crate::models::RawAttendeeRow;
use crate::store::AttendeeStore;

// Стратегии выборки, от дорогой к дешевой. Переход строго вниз и только
// по сигналу RetryableTimeout; любая другая ошибка прерывает операцию.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Bulk,
    PerEvent,
    NoSeats,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub rows: Vec<RawAttendeeRow>,
    pub seat_assignments_included: bool,
}

/// Выборка участников с деградацией: общий join -> join по одному событию ->
/// только участники без мест. Результат всегда ограничен `max_rows`.
pub async fn fetch_with_fallback<S: AttendeeStore + ?Sized>(
    store: &S,
    event_ids: &[i64],
    max_rows: i64,
) -> Result<FetchOutcome, FetchError> {
    if event_ids.is_empty() {
        return Ok(FetchOutcome {
            rows: Vec::new(),
            seat_assignments_included: true,
        });
    }

    let mut strategy = FetchStrategy::Bulk;
    loop {
        match strategy {
            FetchStrategy::Bulk => match store.fetch_bulk(event_ids, max_rows).await {
                Ok(rows) => {
                    return Ok(FetchOutcome {
                        rows,
                        seat_assignments_included: true,
                    })
                }
                Err(FetchError::RetryableTimeout) => {
                    warn!("bulk attendee fetch exceeded time budget, retrying per event");
                    strategy = FetchStrategy::PerEvent;
                }
                Err(e) => return Err(e),
            },
            FetchStrategy::PerEvent => match fetch_per_event(store, event_ids, max_rows).await {
                Ok(rows) => {
                    return Ok(FetchOutcome {
                        rows,
                        seat_assignments_included: true,
                    })
                }
                Err(FetchError::RetryableTimeout) => {
                    warn!("per-event attendee fetch exceeded time budget, dropping seat join");
                    strategy = FetchStrategy::NoSeats;
                }
                Err(e) => return Err(e),
            },
            FetchStrategy::NoSeats => {
                let rows = store.fetch_without_seats(event_ids, max_rows).await?;
                // места выключены для всей выборки, что бы ни вернул запрос
                let rows = rows.into_iter().map(RawAttendeeRow::without_seat).collect();
                return Ok(FetchOutcome {
                    rows,
                    seat_assignments_included: false,
                });
            }
        }
    }
}

// Запросы идут строго по одному, чтобы между итерациями проверять
// накопленный лимит строк. Достигли лимита - обрезаем и останавливаемся.
async fn fetch_per_event<S: AttendeeStore + ?Sized>(
    store: &S,
    event_ids: &[i64],
    max_rows: i64,
) -> Result<Vec<RawAttendeeRow>, FetchError> {
    let mut acc: Vec<RawAttendeeRow> = Vec::new();
    for &event_id in event_ids {
        let remaining = max_rows - acc.len() as i64;
        if remaining <= 0 {
            break;
        }
        let rows = store.fetch_for_event(event_id, remaining).await?;
        acc.extend(rows);
        if acc.len() as i64 >= max_rows {
            acc.truncate(max_rows as usize);
            break;
        }
    }
    Ok(acc)
}
