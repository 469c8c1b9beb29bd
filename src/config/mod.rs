use chrono_tz::Tz;
use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub dashboard: DashboardConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки дашборда: фиксированный организатор, лимит строк,
// фильтры по названию события и часовой пояс отображения
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub host_user_id: i64,
    pub max_rows: i64,
    pub event_name_include: String,
    pub event_name_exclude: String,
    pub timezone: Tz,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "attendee_dashboard=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            dashboard: DashboardConfig {
                host_user_id: env::var("HOST_USER_ID")
                    .expect("HOST_USER_ID must be set")
                    .parse()
                    .expect("HOST_USER_ID must be a valid number"),
                max_rows: env::var("MAX_ROWS")
                    .unwrap_or_else(|_| "10000".to_string())
                    .parse()
                    .expect("MAX_ROWS must be a valid number"),
                event_name_include: env::var("EVENT_NAME_INCLUDE")
                    .unwrap_or_else(|_| "dinner".to_string()),
                event_name_exclude: env::var("EVENT_NAME_EXCLUDE")
                    .unwrap_or_else(|_| "test".to_string()),
                timezone: env::var("DASHBOARD_TIMEZONE")
                    .unwrap_or_else(|_| "America/New_York".to_string())
                    .parse()
                    .expect("DASHBOARD_TIMEZONE must be a valid IANA time zone"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tz в конфиге должен приниматься как имя IANA-зоны
    #[test]
    fn dashboard_config_deserializes_timezone_by_name() {
        let cfg: DashboardConfig = serde_json::from_value(serde_json::json!({
            "host_user_id": 42,
            "max_rows": 10000,
            "event_name_include": "dinner",
            "event_name_exclude": "test",
            "timezone": "America/New_York"
        }))
        .unwrap();
        assert_eq!(cfg.timezone, chrono_tz::America::New_York);
        assert_eq!(cfg.host_user_id, 42);
    }
}
