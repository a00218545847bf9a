use serde::Deserialize;

use crate::models::user::{Session, UserAccount, UserCreateInput};

use super::{AppState, CommandResult};

pub fn auth_session(state: &AppState) -> CommandResult<Option<Session>> {
    Ok(state.auth().restore()?)
}

pub fn auth_login(state: &AppState, payload: LoginPayload) -> CommandResult<Session> {
    Ok(state
        .auth()
        .login(&payload.employee_id, &payload.password)?)
}

pub fn auth_logout(state: &AppState) -> CommandResult<()> {
    Ok(state.auth().logout()?)
}

pub fn auth_change_password(
    state: &AppState,
    payload: ChangePasswordPayload,
) -> CommandResult<Session> {
    let session = state.require_session()?;
    Ok(state.auth().change_password(
        &session,
        &payload.current_password,
        &payload.new_password,
    )?)
}

pub fn auth_create_user(state: &AppState, payload: UserCreateInput) -> CommandResult<UserAccount> {
    let session = state.require_session()?;
    Ok(state.auth().create_user(&session, payload)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub employee_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}
