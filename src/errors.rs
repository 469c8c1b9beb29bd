use thiserror::Error;

// SQLSTATE 57014 (query_canceled) - запрос снят по statement_timeout.
// Единственный сигнал, по которому разрешено переходить на запасную стратегию.
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Запрос превысил лимит времени на стороне БД. Повторяемая ошибка:
    /// вызывает переход на следующую стратегию выборки, наружу не отдается.
    #[error("statement time budget exceeded")]
    RetryableTimeout,

    /// БД недоступна или соединение оборвалось
    #[error("data store unavailable: {0}")]
    DataAccess(#[source] sqlx::Error),

    /// Все остальное
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl FetchError {
    pub fn is_retryable_timeout(&self) -> bool {
        matches!(self, FetchError::RetryableTimeout)
    }
}

impl From<sqlx::Error> for FetchError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
                FetchError::RetryableTimeout
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => FetchError::DataAccess(e),
            _ => FetchError::Unknown(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_maps_to_data_access() {
        let err = FetchError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, FetchError::DataAccess(_)));
    }

    #[test]
    fn row_not_found_maps_to_unknown() {
        let err = FetchError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, FetchError::Unknown(_)));
    }

    #[test]
    fn retryable_flag_only_for_timeout() {
        assert!(FetchError::RetryableTimeout.is_retryable_timeout());
        assert!(!FetchError::from(sqlx::Error::PoolClosed).is_retryable_timeout());
    }
}
