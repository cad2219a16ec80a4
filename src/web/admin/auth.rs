use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::web::{AppState, auth::require_session, session::Session};

pub async fn require_admin_user(
    state: &AppState,
    jar: &CookieJar,
) -> Result<(Uuid, Session), Redirect> {
    let (token, session) = require_session(state, jar).await?;

    if !session.is_admin() {
        return Err(Redirect::to("/builder?error=not_authorized"));
    }

    Ok((token, session))
}
