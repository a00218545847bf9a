use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::db::repositories::settings_repository::{SettingRow, SettingsRepository};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::settings::{ClockSettings, ReportLocale};

const KEY_TIMEZONE: &str = "timezone";
const KEY_LOCALE: &str = "report_locale";

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_LOCALE: ReportLocale = ReportLocale::PtBr;

#[derive(Debug, Default, Clone)]
pub struct SettingsUpdateInput {
    pub timezone: Option<String>,
    pub locale: Option<String>,
}

pub struct SettingsService {
    db: DbPool,
    cache: RwLock<Option<ClockSettings>>,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            cache: RwLock::new(None),
        }
    }

    pub fn get(&self) -> AppResult<ClockSettings> {
        if let Ok(guard) = self.cache.read() {
            if let Some(settings) = guard.as_ref() {
                return Ok(settings.clone());
            }
        }

        let settings = self.load_settings_from_db()?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(settings.clone());
        }
        Ok(settings)
    }

    /// Zone used to turn an instant into the local calendar day.
    pub fn timezone(&self) -> AppResult<Tz> {
        parse_timezone(&self.get()?.timezone)
    }

    pub fn update(&self, input: SettingsUpdateInput) -> AppResult<ClockSettings> {
        let mut current = self.get()?;
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(timezone) = input.timezone.as_ref() {
            let trimmed = timezone.trim();
            let parsed = parse_timezone(trimmed)?;
            current.timezone = parsed.name().to_string();
            pairs.push((KEY_TIMEZONE, current.timezone.clone()));
        }

        if let Some(locale) = input.locale.as_ref() {
            current.locale =
                ReportLocale::try_from(locale.trim()).map_err(AppError::validation)?;
            pairs.push((KEY_LOCALE, current.locale.as_str().to_string()));
        }

        if pairs.is_empty() {
            return Ok(current);
        }

        self.db
            .with_connection(|conn| SettingsRepository::upsert_all(conn, &pairs))?;
        current.updated_at = Utc::now().to_rfc3339();
        info!(
            target: "app::settings",
            timezone = %current.timezone,
            locale = %current.locale,
            "settings updated"
        );

        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(current.clone());
        }

        Ok(current)
    }

    fn load_settings_from_db(&self) -> AppResult<ClockSettings> {
        self.db.with_connection(|conn| {
            let rows = SettingsRepository::list(conn)?;
            let mut latest_updated_at: Option<String> = None;
            let mut map: HashMap<String, SettingRow> = HashMap::new();

            for row in rows {
                latest_updated_at = match latest_updated_at {
                    Some(ref current) if current >= &row.updated_at => Some(current.clone()),
                    _ => Some(row.updated_at.clone()),
                };
                map.insert(row.key.clone(), row);
            }

            let timezone = match map.get(KEY_TIMEZONE) {
                Some(row) if parse_timezone(&row.value).is_ok() => row.value.clone(),
                Some(row) => {
                    warn!(
                        target: "app::settings",
                        value = %row.value,
                        "stored timezone is invalid, falling back to default"
                    );
                    DEFAULT_TIMEZONE.to_string()
                }
                None => DEFAULT_TIMEZONE.to_string(),
            };

            let locale = map
                .get(KEY_LOCALE)
                .and_then(|row| ReportLocale::try_from(row.value.as_str()).ok())
                .unwrap_or(DEFAULT_LOCALE);

            Ok(ClockSettings {
                timezone,
                locale,
                updated_at: latest_updated_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
            })
        })
    }
}

fn parse_timezone(value: &str) -> AppResult<Tz> {
    Tz::from_str(value).map_err(|_| AppError::validation(format!("unknown time zone: {value}")))
}
