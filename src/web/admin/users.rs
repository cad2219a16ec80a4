use axum::{
    extract::{Form, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::{
    directory::{self, DirectoryError},
    web::AppState,
};

use super::auth::require_admin_user;

#[derive(Deserialize)]
pub(crate) struct CreateUserForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub(crate) struct RemoveUserForm {
    username: String,
    #[serde(default)]
    confirm: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ResetPasswordForm {
    username: String,
    password: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CreateUserForm>,
) -> Result<Redirect, Redirect> {
    let _admin = require_admin_user(&state, &jar).await?;

    let result = state
        .blocking_directory(move |directory| {
            directory::add_user(directory, &form.username, &form.password)
        })
        .await;
    Ok(outcome_redirect(result, "created", "failed to add user"))
}

pub async fn remove_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RemoveUserForm>,
) -> Result<Redirect, Redirect> {
    let (_, admin) = require_admin_user(&state, &jar).await?;

    if form.confirm.is_none() {
        return Ok(Redirect::to("/dashboard?error=confirm_required"));
    }

    let admin_names = state.config().admin_names.clone();
    let acting_user = admin.username().to_string();
    let result = state
        .blocking_directory(move |directory| {
            directory::remove_user(directory, &admin_names, &acting_user, &form.username)
        })
        .await;
    Ok(outcome_redirect(result, "removed", "failed to remove user"))
}

pub async fn reset_user_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Redirect, Redirect> {
    let _admin = require_admin_user(&state, &jar).await?;

    let result = state
        .blocking_directory(move |directory| {
            directory::reset_password(directory, &form.username, &form.password)
        })
        .await;
    Ok(outcome_redirect(
        result,
        "password_updated",
        "failed to reset user password",
    ))
}

fn outcome_redirect(
    result: Result<(), DirectoryError>,
    success: &str,
    failure_context: &'static str,
) -> Redirect {
    match result {
        Ok(()) => Redirect::to(&format!("/dashboard?status={success}")),
        Err(err) => {
            if let DirectoryError::Unavailable(_) = err {
                error!(%err, "{failure_context}");
            }
            Redirect::to(&format!("/dashboard?error={}", err.code()))
        }
    }
}
