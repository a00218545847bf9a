use serde::Deserialize;

use crate::models::settings::ClockSettings;
use crate::services::settings_service::SettingsUpdateInput;

use super::{AppState, CommandError, CommandResult};

pub fn settings_get(state: &AppState) -> CommandResult<ClockSettings> {
    Ok(state.settings().get()?)
}

/// Administrators only: the zone decides which day a punch is filed under.
pub fn settings_update(
    state: &AppState,
    payload: SettingsUpdatePayload,
) -> CommandResult<ClockSettings> {
    let session = state.require_session()?;
    if !session.is_admin() {
        return Err(CommandError::new(
            "FORBIDDEN",
            "only administrators can change settings",
            None,
        ));
    }
    Ok(state.settings().update(payload.into_input())?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdatePayload {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    locale: Option<String>,
}

impl SettingsUpdatePayload {
    fn into_input(self) -> SettingsUpdateInput {
        SettingsUpdateInput {
            timezone: self.timezone.filter(|value| !value.trim().is_empty()),
            locale: self.locale.filter(|value| !value.trim().is_empty()),
        }
    }
}
